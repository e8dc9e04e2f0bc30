use crate::core::{Table, Value};
use crate::prelude::*;
use crate::protocols::MulticolumnMapPredicate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Expects the values within each row to be distinct from one another.
///
/// NaN and null count as the same value, so two missing cells in one row
/// make it unexpected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MulticolumnValuesToBeUnique {}

impl MulticolumnMapPredicate for MulticolumnValuesToBeUnique {
    const NAME: &'static str = "expect_multicolumn_values_to_be_unique";

    fn map(&self, table: &Table) -> Result<Vec<bool>> {
        Ok(table
            .rows()
            .map(|row| {
                let mut seen = HashSet::with_capacity(row.len());
                row.iter().all(|v| seen.insert(Value::normalized(v)))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Dataset, MultiIgnorePolicy, ResultFormat};
    use crate::protocols::run_multicolumn_map;

    #[test]
    fn test_row_uniqueness() {
        let ds = Dataset::from_columns([
            ("a", vec![Value::Int(1), Value::Int(1), Value::Null, Value::Null]),
            ("b", vec![Value::Int(2), Value::Float(1.0), Value::Float(f64::NAN), Value::Int(3)]),
            ("c", vec![Value::Int(3), Value::Int(4), Value::Int(5), Value::Int(4)]),
        ])
        .unwrap();
        let table = ds.table(&["a", "b", "c"]).unwrap();
        assert_eq!(
            MulticolumnValuesToBeUnique {}.map(&table).unwrap(),
            vec![true, false, false, true]
        );

        let result = run_multicolumn_map(
            &table,
            &MulticolumnValuesToBeUnique {},
            MultiIgnorePolicy::AnyValueIsMissing,
            None,
            &ResultFormat::summary(),
        )
        .unwrap();
        let details = result.result.unwrap();
        assert_eq!(details.missing_count, Some(2));
        assert_eq!(details.unexpected_index_list, Some(vec![1]));
    }
}
