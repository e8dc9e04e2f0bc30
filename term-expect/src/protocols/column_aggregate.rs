//! Column aggregate expectations: one statistic over a whole column.

use super::{impl_option_setters, predicate_error, recorded_config};
use crate::core::{
    format::percent, Dataset, Expectation, ExpectationConfig, ExpectationKind, ExpectationOptions,
    ExpectationResult, ResultDetails, ResultFormat, ResultFormatLevel, Value,
};
use crate::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, instrument};

/// Outcome of an aggregate test.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOutcome {
    pub success: bool,
    pub observed_value: serde_json::Value,
    pub details: serde_json::Value,
}

/// A statistic computed over the non-null numeric values of a column.
pub trait ColumnAggregateFn:
    Debug + Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Registered expectation type name.
    const NAME: &'static str;

    /// Checks the arguments before any data is read.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Computes the outcome from the column's non-null values.
    fn aggregate(&self, values: &[f64]) -> Result<AggregateOutcome>;
}

/// An expectation applying a [`ColumnAggregateFn`] to one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnAggregateExpectation<F> {
    pub column: String,
    #[serde(flatten)]
    pub function: F,
    #[serde(flatten)]
    pub options: ExpectationOptions,
}

impl<F: ColumnAggregateFn> ColumnAggregateExpectation<F> {
    pub fn new(column: impl Into<String>, function: F) -> Self {
        Self {
            column: column.into(),
            function,
            options: ExpectationOptions::default(),
        }
    }
}

impl_option_setters!(ColumnAggregateExpectation<F: ColumnAggregateFn>);

impl<F: ColumnAggregateFn> Expectation for ColumnAggregateExpectation<F> {
    fn expectation_type(&self) -> &'static str {
        F::NAME
    }

    fn kind(&self) -> ExpectationKind {
        ExpectationKind::ColumnAggregate
    }

    fn options(&self) -> &ExpectationOptions {
        &self.options
    }

    fn config(&self) -> ExpectationConfig {
        recorded_config(F::NAME, self)
    }

    #[instrument(skip_all, fields(expectation.name = F::NAME, column = %self.column))]
    fn run(&self, dataset: &Dataset, result_format: &ResultFormat) -> Result<ExpectationResult> {
        self.function.validate()?;
        let column = dataset.column(&self.column)?;

        let values = column
            .values()
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| match v {
                Value::Int(_) | Value::Float(_) => v
                    .as_f64()
                    .ok_or_else(|| TermError::type_mismatch("number", v.type_name())),
                other => Err(TermError::type_mismatch("number", other.type_name())),
            })
            .collect::<Result<Vec<f64>>>()
            .map_err(predicate_error(F::NAME))?;

        let outcome = self
            .function
            .aggregate(&values)
            .map_err(predicate_error(F::NAME))?;

        debug!(
            element_count = column.len(),
            nonmissing_count = values.len(),
            success = outcome.success,
            "Column aggregate evaluated"
        );

        if result_format.level == ResultFormatLevel::BooleanOnly {
            return Ok(ExpectationResult::new(outcome.success));
        }
        let missing_count = column.len() - values.len();
        let mut details = ResultDetails {
            observed_value: Some(outcome.observed_value),
            element_count: Some(column.len()),
            missing_count: Some(missing_count),
            missing_percent: percent(missing_count, column.len()),
            ..Default::default()
        };
        if result_format.level >= ResultFormatLevel::Summary {
            details.details = Some(outcome.details);
        }
        Ok(ExpectationResult::with_details(outcome.success, details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DefaultExpectationArgs;
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct MeanAbove {
        threshold: f64,
    }

    impl ColumnAggregateFn for MeanAbove {
        const NAME: &'static str = "expect_column_mean_above";

        fn aggregate(&self, values: &[f64]) -> Result<AggregateOutcome> {
            if values.is_empty() {
                return Err(TermError::invalid_argument("column", "no numeric values"));
            }
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            Ok(AggregateOutcome {
                success: mean > self.threshold,
                observed_value: json!(mean),
                details: json!({"threshold": self.threshold}),
            })
        }
    }

    fn dataset(values: Vec<Value>) -> Dataset {
        Dataset::from_columns([("x", values)]).unwrap()
    }

    #[test]
    fn test_aggregate_skips_nulls() {
        let ds = dataset(vec![Value::Int(1), Value::Null, Value::Float(3.0)]);
        let expectation = ColumnAggregateExpectation::new("x", MeanAbove { threshold: 1.5 });
        let result = expectation
            .evaluate(&ds, &DefaultExpectationArgs::default())
            .unwrap();
        assert!(result.success);
        let details = result.result.unwrap();
        assert_eq!(details.observed_value, Some(json!(2.0)));
        assert_eq!(details.missing_count, Some(1));
        assert!(details.details.is_none());
    }

    #[test]
    fn test_summary_includes_details() {
        let ds = dataset(vec![Value::Int(1)]);
        let expectation = ColumnAggregateExpectation::new("x", MeanAbove { threshold: 5.0 })
            .with_result_format(ResultFormat::summary());
        let result = expectation
            .evaluate(&ds, &DefaultExpectationArgs::default())
            .unwrap();
        assert!(!result.success);
        assert_eq!(
            result.result.unwrap().details,
            Some(json!({"threshold": 5.0}))
        );
    }

    #[test]
    fn test_non_numeric_values_are_catchable() {
        let ds = dataset(vec![Value::from("a")]);
        let expectation = ColumnAggregateExpectation::new("x", MeanAbove { threshold: 0.0 })
            .with_catch_exceptions(true);
        let result = expectation
            .evaluate(&ds, &DefaultExpectationArgs::default())
            .unwrap();
        assert!(!result.success);
        assert!(result.raised_exception());
    }
}
