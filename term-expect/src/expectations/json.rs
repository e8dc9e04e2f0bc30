use crate::core::Value;
use crate::prelude::*;
use crate::protocols::ColumnMapPredicate;
use serde::{Deserialize, Serialize};

/// Expects every value to be a string holding valid JSON.
///
/// Non-string values are unexpected rather than errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesToBeJsonParseable {}

impl ColumnMapPredicate for ValuesToBeJsonParseable {
    const NAME: &'static str = "expect_column_values_to_be_json_parseable";

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        Ok(values
            .iter()
            .map(|v| {
                v.as_str()
                    .is_some_and(|s| serde_json::from_str::<serde_json::Value>(s).is_ok())
            })
            .collect())
    }
}

/// Expects every value to be a JSON document valid under `json_schema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesToMatchJsonSchema {
    pub json_schema: serde_json::Value,
}

impl ValuesToMatchJsonSchema {
    pub fn new(json_schema: serde_json::Value) -> Self {
        Self { json_schema }
    }

    fn validator(&self) -> Result<jsonschema::Validator> {
        jsonschema::options()
            .build(&self.json_schema)
            .map_err(|e| TermError::invalid_argument("json_schema", format!("invalid schema: {e}")))
    }
}

impl ColumnMapPredicate for ValuesToMatchJsonSchema {
    const NAME: &'static str = "expect_column_values_to_match_json_schema";

    fn validate(&self) -> Result<()> {
        self.validator().map(|_| ())
    }

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        let validator = self.validator()?;
        values
            .iter()
            .map(|v| {
                let text = v
                    .as_str()
                    .ok_or_else(|| TermError::type_mismatch("string", v.type_name()))?;
                let document: serde_json::Value = serde_json::from_str(text)
                    .map_err(|e| TermError::Parse(format!("'{text}' is not valid JSON: {e}")))?;
                Ok(validator.is_valid(&document))
            })
            .collect()
    }
}
