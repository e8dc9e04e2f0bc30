use crate::core::Value;
use crate::prelude::*;
use crate::protocols::ColumnMapPredicate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Expects every non-missing value to occur exactly once.
///
/// All occurrences of a duplicated value are unexpected, not only the
/// repeats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesToBeUnique {}

impl ColumnMapPredicate for ValuesToBeUnique {
    const NAME: &'static str = "expect_column_values_to_be_unique";

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        let mut counts: HashMap<&Value, usize> = HashMap::with_capacity(values.len());
        for value in values {
            *counts.entry(value).or_default() += 1;
        }
        Ok(values.iter().map(|v| counts[v] == 1).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_duplicates_fail() {
        let values = vec![Value::Int(1), Value::Int(2), Value::Float(1.0), Value::from("x")];
        assert_eq!(
            ValuesToBeUnique {}.map(&values).unwrap(),
            vec![false, true, false, true]
        );
    }
}
