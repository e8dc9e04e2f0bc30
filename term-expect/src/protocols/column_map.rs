//! Single-column map expectations.

use super::{check_verdicts, impl_option_setters, predicate_error, recorded_config};
use crate::core::{
    calc_map_expectation_success, format_map_output, validate_mostly, Column, Dataset, Expectation,
    ExpectationConfig, ExpectationKind, ExpectationOptions, ExpectationResult, IgnoreSet,
    MapOutput, ResultFormat, UnexpectedValue, Value,
};
use crate::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, instrument};

/// A per-element predicate over the non-missing values of one column.
///
/// The parameter struct is the serde form of the predicate's arguments, so a
/// predicate with no arguments is an empty braced struct.
///
/// # Examples
///
/// ```rust
/// use term_expect::prelude::*;
/// use term_expect::core::Value;
/// use term_expect::protocols::ColumnMapPredicate;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Positive {}
///
/// impl ColumnMapPredicate for Positive {
///     const NAME: &'static str = "expect_column_values_to_be_positive";
///
///     fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
///         Ok(values.iter().map(|v| v.as_f64().is_some_and(|x| x > 0.0)).collect())
///     }
/// }
/// ```
pub trait ColumnMapPredicate:
    Debug + Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Registered expectation type name.
    const NAME: &'static str;

    /// Null-focused predicates test nullness itself, so nothing is ignored
    /// and the partial unexpected breakdown is suppressed.
    fn null_focused(&self) -> bool {
        false
    }

    /// Checks the predicate arguments before any data is read.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Returns one verdict per value.
    fn map(&self, values: &[Value]) -> Result<Vec<bool>>;
}

/// Runs the single-column map protocol on `column`.
///
/// Values in the ignore-set (nulls plus `ignore_values`) are excluded from
/// accounting and never reach the predicate.
#[instrument(skip_all, fields(expectation.name = P::NAME, column = %column.name(), rows = column.len()))]
pub fn run_column_map<P: ColumnMapPredicate>(
    column: &Column,
    predicate: &P,
    mostly: Option<f64>,
    ignore_values: &[Value],
    result_format: &ResultFormat,
) -> Result<ExpectationResult> {
    validate_mostly(mostly)?;
    predicate.validate()?;

    let null_focused = predicate.null_focused();
    let ignore = if null_focused {
        IgnoreSet::empty()
    } else {
        IgnoreSet::nulls().with_values(ignore_values.iter().cloned())
    };
    let mask = ignore.mask(column);
    let nonmissing = column.filter(&mask.keep())?;

    let verdicts = predicate
        .map(nonmissing.values())
        .map_err(predicate_error(P::NAME))?;
    check_verdicts(P::NAME, &verdicts, nonmissing.len())?;

    let success_count = verdicts.iter().filter(|ok| **ok).count();
    let verdict = calc_map_expectation_success(success_count, nonmissing.len(), mostly)?;

    let (unexpected_list, unexpected_index_list): (Vec<_>, Vec<_>) = nonmissing
        .iter()
        .zip(&verdicts)
        .filter(|(_, ok)| !**ok)
        .map(|((row, value), _)| (UnexpectedValue::Single(value.clone()), row))
        .unzip();

    debug!(
        element_count = column.len(),
        missing_count = mask.missing_count(),
        unexpected_count = unexpected_list.len(),
        success = verdict.success,
        "Column map evaluated"
    );

    Ok(format_map_output(
        result_format,
        MapOutput {
            success: verdict.success,
            element_count: column.len(),
            nonmissing_count: nonmissing.len(),
            unexpected_list,
            unexpected_index_list,
        },
        null_focused,
    ))
}

/// An expectation applying a [`ColumnMapPredicate`] to one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMapExpectation<P> {
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mostly: Option<f64>,
    /// Sentinel values treated as missing in addition to nulls.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_values: Vec<Value>,
    #[serde(flatten)]
    pub predicate: P,
    #[serde(flatten)]
    pub options: ExpectationOptions,
}

impl<P: ColumnMapPredicate> ColumnMapExpectation<P> {
    pub fn new(column: impl Into<String>, predicate: P) -> Self {
        Self {
            column: column.into(),
            mostly: None,
            ignore_values: Vec::new(),
            predicate,
            options: ExpectationOptions::default(),
        }
    }

    pub fn with_mostly(mut self, mostly: f64) -> Self {
        self.mostly = Some(mostly);
        self
    }

    pub fn with_ignore_values<I: IntoIterator<Item = Value>>(mut self, values: I) -> Self {
        self.ignore_values.extend(values);
        self
    }
}

impl_option_setters!(ColumnMapExpectation<P: ColumnMapPredicate>);

impl<P: ColumnMapPredicate> Expectation for ColumnMapExpectation<P> {
    fn expectation_type(&self) -> &'static str {
        P::NAME
    }

    fn kind(&self) -> ExpectationKind {
        ExpectationKind::ColumnMap
    }

    fn options(&self) -> &ExpectationOptions {
        &self.options
    }

    fn config(&self) -> ExpectationConfig {
        recorded_config(P::NAME, self)
    }

    fn run(&self, dataset: &Dataset, result_format: &ResultFormat) -> Result<ExpectationResult> {
        validate_mostly(self.mostly)?;
        self.predicate.validate()?;
        let column = dataset.column(&self.column)?;
        run_column_map(
            column,
            &self.predicate,
            self.mostly,
            &self.ignore_values,
            result_format,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DefaultExpectationArgs;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Even {}

    impl ColumnMapPredicate for Even {
        const NAME: &'static str = "expect_column_values_to_be_even";

        fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
            values
                .iter()
                .map(|v| match v {
                    Value::Int(i) => Ok(i % 2 == 0),
                    other => Err(TermError::type_mismatch("int", other.type_name())),
                })
                .collect()
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct ShortVerdicts {}

    impl ColumnMapPredicate for ShortVerdicts {
        const NAME: &'static str = "expect_short";

        fn map(&self, _: &[Value]) -> Result<Vec<bool>> {
            Ok(vec![true])
        }
    }

    fn column(values: Vec<Value>) -> Column {
        Column::new("n", values)
    }

    #[test]
    fn test_predicate_never_sees_nulls() {
        let col = column(vec![Value::Int(2), Value::Null, Value::Int(3), Value::Float(f64::NAN)]);
        let result = run_column_map(&col, &Even {}, None, &[], &ResultFormat::summary()).unwrap();
        let details = result.result.unwrap();
        assert!(!result.success);
        assert_eq!(details.element_count, Some(4));
        assert_eq!(details.missing_count, Some(2));
        assert_eq!(details.unexpected_count, Some(1));
        assert_eq!(details.unexpected_index_list, Some(vec![2]));
    }

    #[test]
    fn test_ignore_values_are_missing() {
        let col = column(vec![Value::Int(2), Value::Int(-1), Value::Int(-1)]);
        let result =
            run_column_map(&col, &Even {}, None, &[Value::Int(-1)], &ResultFormat::basic()).unwrap();
        assert!(result.success);
        assert_eq!(result.result.unwrap().missing_count, Some(2));
    }

    #[test]
    fn test_empty_column_is_vacuously_true() {
        let result =
            run_column_map(&column(vec![]), &Even {}, Some(1.0), &[], &ResultFormat::basic()).unwrap();
        assert!(result.success);
        let details = result.result.unwrap();
        assert_eq!(details.element_count, Some(0));
        assert!(details.unexpected_percent.is_none());
    }

    #[test]
    fn test_predicate_errors_are_predicate_failures() {
        let col = column(vec![Value::from("x")]);
        let err = run_column_map(&col, &Even {}, None, &[], &ResultFormat::basic()).unwrap_err();
        assert!(err.is_catchable());

        let col = column(vec![Value::Int(1), Value::Int(2)]);
        let err = run_column_map(&col, &ShortVerdicts {}, None, &[], &ResultFormat::basic())
            .unwrap_err();
        assert!(matches!(err, TermError::PredicateFailure { .. }));
    }

    #[test]
    fn test_mostly_validated_before_column_lookup() {
        let expectation = ColumnMapExpectation::new("missing", Even {}).with_mostly(2.0);
        let err = expectation
            .evaluate(&Dataset::new(), &DefaultExpectationArgs::default())
            .unwrap_err();
        assert!(matches!(err, TermError::InvalidArgument { .. }));
    }

    #[test]
    fn test_config_round_trip() {
        let expectation = ColumnMapExpectation::new("n", Even {})
            .with_mostly(0.5)
            .with_result_format(ResultFormat::summary());
        let config = expectation.config();
        assert_eq!(config.expectation_type, "expect_column_values_to_be_even");
        assert_eq!(config.kwargs["column"], "n");
        assert_eq!(config.kwargs["mostly"], 0.5);

        let rebuilt: ColumnMapExpectation<Even> =
            serde_json::from_value(serde_json::Value::Object(config.kwargs)).unwrap();
        assert_eq!(rebuilt.mostly, Some(0.5));
        assert_eq!(rebuilt.options.result_format, Some(ResultFormat::summary()));
    }
}
