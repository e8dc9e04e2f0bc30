use super::maybe_parse_datetimes;
use crate::core::Value;
use crate::datetime::value_to_datetime;
use crate::prelude::*;
use crate::protocols::ColumnMapPredicate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Expects every value to lie within `[min_value, max_value]`.
///
/// Either bound may be omitted, but not both. Comparing a string with a
/// non-string fails the evaluation unless `allow_cross_type_comparisons`
/// is set, in which case incomparable values are simply unexpected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesToBeBetween {
    #[serde(default)]
    pub min_value: Option<Value>,
    #[serde(default)]
    pub max_value: Option<Value>,
    #[serde(default)]
    pub parse_strings_as_datetimes: bool,
    #[serde(default)]
    pub allow_cross_type_comparisons: bool,
}

impl ValuesToBeBetween {
    pub fn new(min_value: Option<Value>, max_value: Option<Value>) -> Self {
        Self {
            min_value,
            max_value,
            ..Default::default()
        }
    }

    pub fn with_parse_strings_as_datetimes(mut self, parse: bool) -> Self {
        self.parse_strings_as_datetimes = parse;
        self
    }

    pub fn with_allow_cross_type_comparisons(mut self, allow: bool) -> Self {
        self.allow_cross_type_comparisons = allow;
        self
    }

    fn bound(&self, argument: &str, bound: &Option<Value>) -> Result<Option<Value>> {
        match bound {
            Some(v) if v.is_null() => Ok(None),
            Some(v) if self.parse_strings_as_datetimes && v.is_str() => value_to_datetime(v)
                .map(Some)
                .map_err(|e| TermError::invalid_argument(argument, format!("{e}"))),
            other => Ok(other.clone()),
        }
    }

    fn bounds(&self) -> Result<(Option<Value>, Option<Value>)> {
        let min = self.bound("min_value", &self.min_value)?;
        let max = self.bound("max_value", &self.max_value)?;
        if min.is_none() && max.is_none() {
            return Err(TermError::invalid_argument(
                "min_value",
                "min_value and max_value cannot both be None",
            ));
        }
        if let (Some(lo), Some(hi)) = (&min, &max) {
            let ordering = lo
                .try_compare(hi)
                .map_err(|e| TermError::invalid_argument("min_value", format!("{e}")))?;
            if ordering == Ordering::Greater {
                return Err(TermError::invalid_argument(
                    "min_value",
                    format!("min_value ({lo}) cannot be greater than max_value ({hi})"),
                ));
            }
        }
        Ok((min, max))
    }

    /// Compares `value` against `bound`; `Ok(None)` means incomparable but tolerated.
    fn compare(&self, value: &Value, bound: &Value) -> Result<Option<Ordering>> {
        if self.allow_cross_type_comparisons {
            return Ok(value.try_compare(bound).ok());
        }
        if value.is_str() != bound.is_str() {
            return Err(TermError::type_mismatch(
                bound.type_name(),
                format!("{} ({value})", value.type_name()),
            ));
        }
        value.try_compare(bound).map(Some)
    }
}

impl ColumnMapPredicate for ValuesToBeBetween {
    const NAME: &'static str = "expect_column_values_to_be_between";

    fn validate(&self) -> Result<()> {
        self.bounds().map(|_| ())
    }

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        let (min, max) = self.bounds()?;
        let values = maybe_parse_datetimes(values, self.parse_strings_as_datetimes)?;
        values
            .iter()
            .map(|value| {
                let above_min = match &min {
                    Some(lo) => self
                        .compare(value, lo)?
                        .is_some_and(|o| o != Ordering::Less),
                    None => true,
                };
                let below_max = match &max {
                    Some(hi) => self
                        .compare(value, hi)?
                        .is_some_and(|o| o != Ordering::Greater),
                    None => true,
                };
                Ok(above_min && below_max)
            })
            .collect()
    }
}

/// Shared walk for the monotonicity expectations.
///
/// The first value always passes; each later value is compared with its
/// predecessor in the non-missing sequence.
fn monotonic(values: &[Value], parse: bool, accept: impl Fn(Ordering) -> bool) -> Result<Vec<bool>> {
    let values = maybe_parse_datetimes(values, parse)?;
    let mut verdicts = Vec::with_capacity(values.len());
    let mut previous: Option<&Value> = None;
    for value in &values {
        let ok = match previous {
            None => true,
            Some(prev) => accept(value.try_compare(prev)?),
        };
        verdicts.push(ok);
        previous = Some(value);
    }
    Ok(verdicts)
}

/// Expects values to be increasing in row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesToBeIncreasing {
    #[serde(default)]
    pub strictly: bool,
    #[serde(default)]
    pub parse_strings_as_datetimes: bool,
}

impl ValuesToBeIncreasing {
    pub fn strictly() -> Self {
        Self {
            strictly: true,
            ..Default::default()
        }
    }
}

impl ColumnMapPredicate for ValuesToBeIncreasing {
    const NAME: &'static str = "expect_column_values_to_be_increasing";

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        let strictly = self.strictly;
        monotonic(values, self.parse_strings_as_datetimes, |o| {
            o == Ordering::Greater || (!strictly && o == Ordering::Equal)
        })
    }
}

/// Expects values to be decreasing in row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesToBeDecreasing {
    #[serde(default)]
    pub strictly: bool,
    #[serde(default)]
    pub parse_strings_as_datetimes: bool,
}

impl ValuesToBeDecreasing {
    pub fn strictly() -> Self {
        Self {
            strictly: true,
            ..Default::default()
        }
    }
}

impl ColumnMapPredicate for ValuesToBeDecreasing {
    const NAME: &'static str = "expect_column_values_to_be_decreasing";

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        let strictly = self.strictly;
        monotonic(values, self.parse_strings_as_datetimes, |o| {
            o == Ordering::Less || (!strictly && o == Ordering::Equal)
        })
    }
}
