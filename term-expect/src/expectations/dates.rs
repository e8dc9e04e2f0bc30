use crate::core::Value;
use crate::datetime::{matches_strftime_format, parse_datetime, validate_strftime_format};
use crate::prelude::*;
use crate::protocols::ColumnMapPredicate;
use serde::{Deserialize, Serialize};

fn require_str(value: &Value) -> Result<&str> {
    value
        .as_str()
        .ok_or_else(|| TermError::type_mismatch("string", value.type_name()))
}

/// Expects every value to be a string in the given strftime layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesToMatchStrftimeFormat {
    pub strftime_format: String,
}

impl ValuesToMatchStrftimeFormat {
    pub fn new(strftime_format: impl Into<String>) -> Self {
        Self {
            strftime_format: strftime_format.into(),
        }
    }
}

impl ColumnMapPredicate for ValuesToMatchStrftimeFormat {
    const NAME: &'static str = "expect_column_values_to_match_strftime_format";

    fn validate(&self) -> Result<()> {
        validate_strftime_format(&self.strftime_format)
    }

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        values
            .iter()
            .map(|v| Ok(matches_strftime_format(require_str(v)?, &self.strftime_format)))
            .collect()
    }
}

/// Expects every value to be a string holding a recognizable date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesToBeDateutilParseable {}

impl ColumnMapPredicate for ValuesToBeDateutilParseable {
    const NAME: &'static str = "expect_column_values_to_be_dateutil_parseable";

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        values
            .iter()
            .map(|v| Ok(parse_datetime(require_str(v)?).is_ok()))
            .collect()
    }
}
