use crate::core::Value;
use crate::prelude::*;
use crate::protocols::ColumnMapPredicate;
use serde::{Deserialize, Serialize};

const TYPE_NAMES: &[&str] = &[
    "null", "boolean", "int", "long", "float", "double", "bytes", "string",
];

fn check_type_name(argument: &str, name: &str) -> Result<()> {
    if TYPE_NAMES.contains(&name) {
        Ok(())
    } else {
        Err(TermError::invalid_argument(
            argument,
            format!(
                "unrecognized type '{name}', expected one of: {}",
                TYPE_NAMES.join(", ")
            ),
        ))
    }
}

/// Whether `value` is an instance of the named type.
///
/// Booleans count as integers.
fn is_instance(value: &Value, type_name: &str) -> bool {
    match type_name {
        "null" => value.is_null(),
        "boolean" => matches!(value, Value::Bool(_)),
        "int" | "long" => matches!(value, Value::Int(_) | Value::Bool(_)),
        "float" | "double" => matches!(value, Value::Float(_)),
        "bytes" => matches!(value, Value::Bytes(_)),
        "string" => matches!(value, Value::Str(_)),
        _ => false,
    }
}

/// Expects every value to be of one type.
///
/// Type names are `null`, `boolean`, `int`, `long`, `float`, `double`,
/// `bytes` and `string`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesToBeOfType {
    #[serde(rename = "type_")]
    pub type_name: String,
}

impl ValuesToBeOfType {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

impl ColumnMapPredicate for ValuesToBeOfType {
    const NAME: &'static str = "expect_column_values_to_be_of_type";

    fn validate(&self) -> Result<()> {
        check_type_name("type_", &self.type_name)
    }

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        Ok(values
            .iter()
            .map(|v| is_instance(v, &self.type_name))
            .collect())
    }
}

/// Expects every value to be of one of several types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesToBeInTypeList {
    pub type_list: Vec<String>,
}

impl ValuesToBeInTypeList {
    pub fn new<I, S>(type_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_list: type_list.into_iter().map(Into::into).collect(),
        }
    }
}

impl ColumnMapPredicate for ValuesToBeInTypeList {
    const NAME: &'static str = "expect_column_values_to_be_in_type_list";

    fn validate(&self) -> Result<()> {
        self.type_list
            .iter()
            .try_for_each(|name| check_type_name("type_list", name))
    }

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        Ok(values
            .iter()
            .map(|v| self.type_list.iter().any(|t| is_instance(v, t)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_is_an_int() {
        let values = vec![Value::Int(1), Value::Bool(true), Value::Float(1.0)];
        assert_eq!(
            ValuesToBeOfType::new("int").map(&values).unwrap(),
            vec![true, true, false]
        );
        assert_eq!(
            ValuesToBeOfType::new("boolean").map(&values).unwrap(),
            vec![false, true, false]
        );
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(matches!(
            ValuesToBeOfType::new("decimal").validate(),
            Err(TermError::InvalidArgument { .. })
        ));
        assert!(ValuesToBeInTypeList::new(["string", "varchar"]).validate().is_err());
    }

    #[test]
    fn test_type_list() {
        let values = vec![Value::from("a"), Value::Float(2.5), Value::Bytes(vec![1])];
        assert_eq!(
            ValuesToBeInTypeList::new(["string", "double"]).map(&values).unwrap(),
            vec![true, true, false]
        );
    }

    #[test]
    fn test_kwarg_name() {
        let p: ValuesToBeOfType = serde_json::from_str(r#"{"type_": "string"}"#).unwrap();
        assert_eq!(p.type_name, "string");
    }
}
