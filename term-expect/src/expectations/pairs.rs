use super::maybe_parse_datetimes;
use crate::core::Value;
use crate::prelude::*;
use crate::protocols::ColumnPairMapPredicate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Expects both columns to hold equal values row by row.
///
/// A row with a missing side is never equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairValuesToBeEqual {}

impl ColumnPairMapPredicate for PairValuesToBeEqual {
    const NAME: &'static str = "expect_column_pair_values_to_be_equal";

    fn map(&self, a: &[Value], b: &[Value]) -> Result<Vec<bool>> {
        Ok(a.iter()
            .zip(b)
            .map(|(x, y)| !x.is_null() && !y.is_null() && x == y)
            .collect())
    }
}

/// Expects column A to be greater than (or equal to) column B row by row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairValuesAToBeGreaterThanB {
    #[serde(default)]
    pub or_equal: bool,
    #[serde(default)]
    pub parse_strings_as_datetimes: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_cross_type_comparisons: Option<bool>,
}

impl PairValuesAToBeGreaterThanB {
    pub fn or_equal() -> Self {
        Self {
            or_equal: true,
            ..Default::default()
        }
    }

    pub fn with_parse_strings_as_datetimes(mut self, parse: bool) -> Self {
        self.parse_strings_as_datetimes = parse;
        self
    }
}

impl ColumnPairMapPredicate for PairValuesAToBeGreaterThanB {
    const NAME: &'static str = "expect_column_pair_values_A_to_be_greater_than_B";

    fn validate(&self) -> Result<()> {
        if self.allow_cross_type_comparisons == Some(true) {
            return Err(TermError::invalid_argument(
                "allow_cross_type_comparisons",
                "cross-type comparisons are not supported for column pairs",
            ));
        }
        Ok(())
    }

    fn map(&self, a: &[Value], b: &[Value]) -> Result<Vec<bool>> {
        let a = maybe_parse_datetimes(a, self.parse_strings_as_datetimes)?;
        let b = maybe_parse_datetimes(b, self.parse_strings_as_datetimes)?;
        a.iter()
            .zip(&b)
            .map(|(x, y)| {
                if x.is_null() || y.is_null() {
                    return Ok(false);
                }
                Ok(match x.try_compare(y)? {
                    Ordering::Greater => true,
                    Ordering::Equal => self.or_equal,
                    Ordering::Less => false,
                })
            })
            .collect()
    }
}

/// Expects every `(A, B)` row to be one of `value_pairs_set`.
///
/// NaN and null are the same value on either side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairValuesToBeInSet {
    pub value_pairs_set: Vec<(Value, Value)>,
}

impl PairValuesToBeInSet {
    pub fn new<I: IntoIterator<Item = (Value, Value)>>(pairs: I) -> Self {
        Self {
            value_pairs_set: pairs.into_iter().collect(),
        }
    }
}

impl ColumnPairMapPredicate for PairValuesToBeInSet {
    const NAME: &'static str = "expect_column_pair_values_to_be_in_set";

    fn map(&self, a: &[Value], b: &[Value]) -> Result<Vec<bool>> {
        let set: HashSet<(Value, Value)> = self
            .value_pairs_set
            .iter()
            .map(|(x, y)| (x.normalized(), y.normalized()))
            .collect();
        Ok(a.iter()
            .zip(b)
            .map(|(x, y)| set.contains(&(x.normalized(), y.normalized())))
            .collect())
    }
}
