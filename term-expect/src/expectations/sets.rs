use crate::core::Value;
use crate::datetime::value_to_datetime;
use crate::prelude::*;
use crate::protocols::ColumnMapPredicate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Builds the lookup set, parsing its strings as date-times when asked.
fn lookup_set(value_set: &[Value], parse_strings_as_datetimes: bool) -> Result<HashSet<Value>> {
    value_set
        .iter()
        .map(|v| {
            if parse_strings_as_datetimes && v.is_str() {
                value_to_datetime(v).map_err(|e| {
                    TermError::invalid_argument("value_set", format!("{e}"))
                })
            } else {
                Ok(v.clone())
            }
        })
        .collect()
}

/// Membership of each value, with unparseable strings never members.
fn membership(values: &[Value], set: &HashSet<Value>, parse: bool) -> Vec<bool> {
    values
        .iter()
        .map(|v| {
            if parse && v.is_str() {
                value_to_datetime(v).is_ok_and(|dt| set.contains(&dt))
            } else {
                set.contains(v)
            }
        })
        .collect()
}

/// Expects every value to be a member of `value_set`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesToBeInSet {
    pub value_set: Vec<Value>,
    #[serde(default)]
    pub parse_strings_as_datetimes: bool,
}

impl ValuesToBeInSet {
    pub fn new<I: IntoIterator<Item = Value>>(value_set: I) -> Self {
        Self {
            value_set: value_set.into_iter().collect(),
            parse_strings_as_datetimes: false,
        }
    }

    pub fn with_parse_strings_as_datetimes(mut self, parse: bool) -> Self {
        self.parse_strings_as_datetimes = parse;
        self
    }
}

impl ColumnMapPredicate for ValuesToBeInSet {
    const NAME: &'static str = "expect_column_values_to_be_in_set";

    fn validate(&self) -> Result<()> {
        lookup_set(&self.value_set, self.parse_strings_as_datetimes).map(|_| ())
    }

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        let set = lookup_set(&self.value_set, self.parse_strings_as_datetimes)?;
        Ok(membership(values, &set, self.parse_strings_as_datetimes))
    }
}

/// Expects no value to be a member of `value_set`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesToNotBeInSet {
    pub value_set: Vec<Value>,
    #[serde(default)]
    pub parse_strings_as_datetimes: bool,
}

impl ValuesToNotBeInSet {
    pub fn new<I: IntoIterator<Item = Value>>(value_set: I) -> Self {
        Self {
            value_set: value_set.into_iter().collect(),
            parse_strings_as_datetimes: false,
        }
    }

    pub fn with_parse_strings_as_datetimes(mut self, parse: bool) -> Self {
        self.parse_strings_as_datetimes = parse;
        self
    }
}

impl ColumnMapPredicate for ValuesToNotBeInSet {
    const NAME: &'static str = "expect_column_values_to_not_be_in_set";

    fn validate(&self) -> Result<()> {
        lookup_set(&self.value_set, self.parse_strings_as_datetimes).map(|_| ())
    }

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        let set = lookup_set(&self.value_set, self.parse_strings_as_datetimes)?;
        Ok(membership(values, &set, self.parse_strings_as_datetimes)
            .into_iter()
            .map(|member| !member)
            .collect())
    }
}
