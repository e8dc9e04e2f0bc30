//! End-to-end tests for suites, validation contexts and report formatting.

use serde_json::json;
use term_expect::core::{
    ContextConfig, Dataset, DefaultExpectationArgs, DerivationKind, ExpectationRegistry,
    ExpectationSuite, ResultFormat, ValidationContext, ValidationReport, Value,
};
use term_expect::expectations::{
    PairValuesAToBeGreaterThanB, ValuesToBeBetween, ValuesToBeUnique, ValuesToNotBeNull,
};
use term_expect::formatters::{
    FormatterConfig, HumanFormatter, JsonFormatter, MarkdownFormatter, ResultFormatter,
};
use term_expect::protocols::{ColumnMapExpectation, ColumnPairMapExpectation};

fn orders() -> Dataset {
    Dataset::from_columns([
        (
            "order_id",
            (1..=6).map(Value::Int).collect::<Vec<_>>(),
        ),
        (
            "amount",
            vec![
                Value::Float(10.0),
                Value::Float(25.5),
                Value::Null,
                Value::Float(40.0),
                Value::Float(-3.0),
                Value::Float(18.0),
            ],
        ),
        (
            "refunded",
            vec![
                Value::Float(0.0),
                Value::Float(5.0),
                Value::Float(0.0),
                Value::Float(0.0),
                Value::Float(0.0),
                Value::Float(2.0),
            ],
        ),
        (
            "email",
            vec![
                Value::from("a@example.com"),
                Value::from("b@example.com"),
                Value::from("not-an-email"),
                Value::Null,
                Value::from("e@example.com"),
                Value::from("f@example.com"),
            ],
        ),
    ])
    .unwrap()
}

fn suite_json() -> serde_json::Value {
    json!({
        "name": "orders",
        "expectations": [
            {
                "expectation_type": "expect_column_values_to_be_unique",
                "kwargs": {"column": "order_id"}
            },
            {
                "expectation_type": "expect_column_values_to_be_between",
                "kwargs": {"column": "amount", "min_value": 0, "max_value": 1000}
            },
            {
                "expectation_type": "expect_column_values_to_match_regex",
                "kwargs": {"column": "email", "regex": "^[^@]+@[^@]+$", "mostly": 0.7}
            },
            {
                "expectation_type": "expect_column_pair_values_A_to_be_greater_than_B",
                "kwargs": {"column_A": "amount", "column_B": "refunded", "or_equal": true}
            }
        ]
    })
}

#[test]
fn test_suite_from_json_runs_with_builtin_registry() {
    let suite: ExpectationSuite = serde_json::from_value(suite_json()).unwrap();
    assert_eq!(suite.len(), 4);

    let report = suite
        .run(
            &orders(),
            ExpectationRegistry::builtin(),
            &DefaultExpectationArgs::default().with_result_format(ResultFormat::summary()),
            false,
        )
        .unwrap();

    let verdicts: Vec<bool> = report.results.iter().map(|r| r.success).collect();
    assert_eq!(verdicts, vec![true, false, true, false]);
    assert!(!report.success);
    assert_eq!(report.statistics.successful_expectations, 2);

    let between = report.results[1].details().unwrap();
    assert_eq!(between.unexpected_count, Some(1));
    assert_eq!(between.unexpected_index_list, Some(vec![4]));

    let serialized = serde_json::to_value(&suite).unwrap();
    let reparsed: ExpectationSuite = serde_json::from_value(serialized).unwrap();
    assert_eq!(reparsed, suite);
}

#[test]
fn test_context_records_and_replays() {
    let mut context = ValidationContext::new(orders());
    let unique = context
        .expect(&ColumnMapExpectation::new("order_id", ValuesToBeUnique {}))
        .unwrap();
    assert!(unique.success);
    let not_null = context
        .expect(&ColumnMapExpectation::new("email", ValuesToNotBeNull {}).with_mostly(0.8))
        .unwrap();
    assert!(not_null.success);
    let greater = context
        .expect(
            &ColumnPairMapExpectation::new("amount", "refunded", PairValuesAToBeGreaterThanB::or_equal())
                .with_mostly(0.5),
        )
        .unwrap();
    assert!(greater.success);
    assert_eq!(context.suite().len(), 3);

    let report = context.validate().unwrap();
    assert!(report.success);
    assert_eq!(report.statistics.evaluated_expectations, 3);
}

#[test]
fn test_derivation_rules() {
    let mut context = ValidationContext::new(orders()).with_config(
        ContextConfig::default().with_discard_subset_failing_expectations(true),
    );
    context
        .expect(&ColumnMapExpectation::new(
            "amount",
            ValuesToBeBetween::new(Some(Value::Int(0)), None),
        ))
        .unwrap();
    context
        .expect(&ColumnMapExpectation::new("order_id", ValuesToBeUnique {}))
        .unwrap();
    assert_eq!(context.suite().len(), 2);

    // Rows 0..3 have no negative amounts, so both entries survive.
    let head = context.head(3).unwrap();
    assert_eq!(head.dataset().row_count(), 3);
    assert_eq!(head.suite().len(), 2);

    // The full copy keeps the failing range entry out.
    let copy = context.copy().unwrap();
    assert_eq!(copy.suite().len(), 1);

    let sampled = context.sample(4, 7).unwrap();
    assert_eq!(sampled.dataset().row_count(), 4);
    assert!(context.sample(7, 7).is_err());

    let combined = context.concat(&orders()).unwrap();
    assert_eq!(combined.dataset().row_count(), 12);
    assert!(combined.suite().is_empty());
    assert!(!DerivationKind::Join.propagates_suite());
}

#[test]
fn test_report_formatters() {
    let suite: ExpectationSuite = serde_json::from_value(suite_json()).unwrap();
    let report = suite
        .run(
            &orders(),
            ExpectationRegistry::builtin(),
            &DefaultExpectationArgs::default(),
            true,
        )
        .unwrap();

    let json = JsonFormatter::new().format(&report).unwrap();
    let parsed: ValidationReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);

    let human = HumanFormatter::with_config(FormatterConfig::ci()).format(&report).unwrap();
    assert!(human.contains("Validation FAILED"));
    assert!(human.contains("expect_column_values_to_be_between(column=amount)"));
    assert!(human.contains("Sample: [-3.0]"));
    assert!(!human.contains("\x1b["));

    let markdown = MarkdownFormatter::new().format(&report).unwrap();
    assert!(markdown.contains("| Evaluated | 4 |"));
    assert!(markdown.contains("column_A=amount, column_B=refunded"));
}
