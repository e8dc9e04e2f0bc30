use crate::core::Value;
use crate::prelude::*;
use crate::protocols::ColumnMapPredicate;
use serde::{Deserialize, Serialize};

fn integral_bound(argument: &str, bound: Option<f64>) -> Result<Option<usize>> {
    match bound {
        None => Ok(None),
        Some(b) if b.is_finite() && b.fract() == 0.0 && b >= 0.0 => Ok(Some(b as usize)),
        Some(b) => Err(TermError::invalid_argument(
            argument,
            format!("must be a non-negative integer, got {b}"),
        )),
    }
}

/// Expects the rendered length of every value to lie within the bounds.
///
/// Bounds are inclusive integers; either may be omitted, but not both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueLengthsToBeBetween {
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
}

impl ValueLengthsToBeBetween {
    pub fn new(min_value: Option<usize>, max_value: Option<usize>) -> Self {
        Self {
            min_value: min_value.map(|v| v as f64),
            max_value: max_value.map(|v| v as f64),
        }
    }

    fn bounds(&self) -> Result<(Option<usize>, Option<usize>)> {
        let min = integral_bound("min_value", self.min_value)?;
        let max = integral_bound("max_value", self.max_value)?;
        match (min, max) {
            (None, None) => Err(TermError::invalid_argument(
                "min_value",
                "min_value and max_value cannot both be None",
            )),
            (Some(lo), Some(hi)) if lo > hi => Err(TermError::invalid_argument(
                "min_value",
                format!("min_value ({lo}) cannot be greater than max_value ({hi})"),
            )),
            bounds => Ok(bounds),
        }
    }
}

impl ColumnMapPredicate for ValueLengthsToBeBetween {
    const NAME: &'static str = "expect_column_value_lengths_to_be_between";

    fn validate(&self) -> Result<()> {
        self.bounds().map(|_| ())
    }

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        let (min, max) = self.bounds()?;
        Ok(values
            .iter()
            .map(|v| {
                let len = v.rendered_len();
                min.map_or(true, |lo| len >= lo) && max.map_or(true, |hi| len <= hi)
            })
            .collect())
    }
}

/// Expects every value to be a string of exactly `value` characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueLengthsToEqual {
    pub value: usize,
}

impl ColumnMapPredicate for ValueLengthsToEqual {
    const NAME: &'static str = "expect_column_value_lengths_to_equal";

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        Ok(values
            .iter()
            .map(|v| v.as_str().is_some_and(|s| s.chars().count() == self.value))
            .collect())
    }
}
