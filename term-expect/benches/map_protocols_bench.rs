//! Benchmarks for the map-expectation protocols and suite execution.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use std::hint::black_box;
use term_expect::core::{
    Column, Dataset, DefaultExpectationArgs, ExpectationRegistry, ExpectationSuite,
    PairIgnorePolicy, ResultFormat, Table, Value,
};
use term_expect::expectations::{
    MulticolumnValuesToBeUnique, PairValuesAToBeGreaterThanB, ValuesToBeInSet, ValuesToMatchRegex,
};
use term_expect::protocols::{run_column_map, run_column_pair_map, run_multicolumn_map};

/// Generates a dataset with the specified number of rows.
fn create_test_data(rows: usize) -> Dataset {
    let mut rng = StdRng::seed_from_u64(42);
    let mut ids = Vec::with_capacity(rows);
    let mut emails = Vec::with_capacity(rows);
    let mut amounts = Vec::with_capacity(rows);
    let mut refunds = Vec::with_capacity(rows);
    let mut statuses = Vec::with_capacity(rows);

    for i in 0..rows {
        ids.push(Value::Int(i as i64));

        // 95% valid emails, 3% invalid, 2% null
        let roll = rng.random_range(0..100);
        emails.push(if roll < 95 {
            Value::Str(format!("user{i}@example.com"))
        } else if roll < 98 {
            Value::from("invalid-email")
        } else {
            Value::Null
        });

        let amount: f64 = rng.random_range(0.0..500.0);
        amounts.push(Value::Float(amount));
        refunds.push(if rng.random_range(0..100) < 90 {
            Value::Float(0.0)
        } else {
            Value::Float(rng.random_range(0.0..600.0))
        });
        statuses.push(Value::from(
            ["open", "closed", "pending", "void"][rng.random_range(0..4)],
        ));
    }

    Dataset::from_columns([
        ("id", ids),
        ("email", emails),
        ("amount", amounts),
        ("refunded", refunds),
        ("status", statuses),
    ])
    .expect("columns have equal length")
}

fn bench_column_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_map");
    let in_set = ValuesToBeInSet::new(["open", "closed", "pending"].map(Value::from));
    let regex = ValuesToMatchRegex::new(r"^[^@]+@[^@]+\.com$");

    for rows in [1_000, 10_000, 100_000] {
        let dataset = create_test_data(rows);
        let status: &Column = dataset.column("status").unwrap();
        let email: &Column = dataset.column("email").unwrap();

        group.bench_with_input(BenchmarkId::new("in_set", rows), &rows, |b, _| {
            b.iter(|| {
                run_column_map(black_box(status), &in_set, Some(0.7), &[], &ResultFormat::summary())
                    .unwrap()
            })
        });
        group.bench_with_input(BenchmarkId::new("regex", rows), &rows, |b, _| {
            b.iter(|| {
                run_column_map(black_box(email), &regex, Some(0.9), &[], &ResultFormat::basic())
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_pair_and_multicolumn(c: &mut Criterion) {
    let dataset = create_test_data(10_000);
    let amount = dataset.column("amount").unwrap();
    let refunded = dataset.column("refunded").unwrap();
    let table: Table = dataset.table(&["id", "status"]).unwrap();

    c.bench_function("pair_greater_than_10k", |b| {
        b.iter(|| {
            run_column_pair_map(
                black_box(amount),
                black_box(refunded),
                &PairValuesAToBeGreaterThanB::or_equal(),
                PairIgnorePolicy::EitherValueIsMissing,
                Some(0.9),
                &ResultFormat::basic(),
            )
            .unwrap()
        })
    });

    c.bench_function("multicolumn_unique_10k", |b| {
        b.iter(|| {
            run_multicolumn_map(
                black_box(&table),
                &MulticolumnValuesToBeUnique {},
                Default::default(),
                None,
                &ResultFormat::basic(),
            )
            .unwrap()
        })
    });
}

fn bench_suite(c: &mut Criterion) {
    let dataset = create_test_data(10_000);
    let suite: ExpectationSuite = serde_json::from_value(serde_json::json!({
        "name": "bench",
        "expectations": [
            {"expectation_type": "expect_column_values_to_be_unique", "kwargs": {"column": "id"}},
            {"expectation_type": "expect_column_values_to_not_be_null", "kwargs": {"column": "email", "mostly": 0.95}},
            {"expectation_type": "expect_column_values_to_be_between", "kwargs": {"column": "amount", "min_value": 0, "max_value": 500}},
            {"expectation_type": "expect_column_values_to_be_in_set", "kwargs": {"column": "status", "value_set": ["open", "closed", "pending", "void"]}}
        ]
    }))
    .unwrap();
    let defaults = DefaultExpectationArgs::default();

    c.bench_function("suite_4_expectations_10k", |b| {
        b.iter(|| {
            suite
                .run(black_box(&dataset), ExpectationRegistry::builtin(), &defaults, true)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_column_map, bench_pair_and_multicolumn, bench_suite);
criterion_main!(benches);
