use crate::core::Value;
use crate::prelude::*;
use crate::protocols::ColumnMapPredicate;
use serde::{Deserialize, Serialize};

/// Expects no value to be null (or NaN).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesToNotBeNull {}

impl ColumnMapPredicate for ValuesToNotBeNull {
    const NAME: &'static str = "expect_column_values_to_not_be_null";

    fn null_focused(&self) -> bool {
        true
    }

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        Ok(values.iter().map(|v| !v.is_null()).collect())
    }
}

/// Expects every value to be null (or NaN).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesToBeNull {}

impl ColumnMapPredicate for ValuesToBeNull {
    const NAME: &'static str = "expect_column_values_to_be_null";

    fn null_focused(&self) -> bool {
        true
    }

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        Ok(values.iter().map(Value::is_null).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, ResultFormat};
    use crate::protocols::run_column_map;

    #[test]
    fn test_not_null_counts_every_row() {
        let col = Column::new(
            "c",
            vec![Value::Int(1), Value::Null, Value::Float(f64::NAN), Value::from("")],
        );
        let result =
            run_column_map(&col, &ValuesToNotBeNull {}, None, &[], &ResultFormat::complete())
                .unwrap();
        assert!(!result.success);
        let details = result.result.unwrap();
        assert_eq!(details.missing_count, Some(0));
        assert_eq!(details.unexpected_count, Some(2));
        assert_eq!(details.unexpected_percent, Some(50.0));
        assert_eq!(details.unexpected_index_list, Some(vec![1, 2]));
        assert!(details.partial_unexpected_list.is_none());
    }

    #[test]
    fn test_be_null_with_mostly() {
        let col = Column::new("c", vec![Value::Null, Value::Null, Value::Null, Value::Int(0)]);
        let result =
            run_column_map(&col, &ValuesToBeNull {}, Some(0.75), &[], &ResultFormat::basic())
                .unwrap();
        assert!(result.success);
    }
}
