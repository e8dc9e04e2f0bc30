//! Missingness classification for columns and rows.
//!
//! A missing element is excluded from pass/fail accounting: the predicate of
//! an expectation never sees it, and it only contributes to `missing_count`.

use super::{Column, Table, Value};
use crate::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Boolean sequence marking missing positions with `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMask(Vec<bool>);

impl MissingMask {
    pub fn new(mask: Vec<bool>) -> Self {
        Self(mask)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.0.iter().filter(|m| **m).count()
    }

    pub fn nonmissing_count(&self) -> usize {
        self.len() - self.missing_count()
    }

    /// The complement of the mask: `true` where the element is kept.
    pub fn keep(&self) -> Vec<bool> {
        self.0.iter().map(|m| !m).collect()
    }
}

/// The set of values treated as missing in a single column.
///
/// By default this is the null markers (`Null` and NaN). Sentinel values such
/// as `""` or `-1` can be added with [`IgnoreSet::with_values`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoreSet {
    include_nulls: bool,
    values: Vec<Value>,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::nulls()
    }
}

impl IgnoreSet {
    /// Null markers only.
    pub fn nulls() -> Self {
        Self {
            include_nulls: true,
            values: Vec::new(),
        }
    }

    /// Nothing is missing.
    pub fn empty() -> Self {
        Self {
            include_nulls: false,
            values: Vec::new(),
        }
    }

    /// Adds sentinel values that count as missing.
    pub fn with_values<I: IntoIterator<Item = Value>>(mut self, values: I) -> Self {
        self.values.extend(values);
        self
    }

    pub fn includes_nulls(&self) -> bool {
        self.include_nulls
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn is_missing(&self, value: &Value) -> bool {
        (self.include_nulls && value.is_null()) || self.values.iter().any(|v| v == value)
    }

    /// Classifies every element of `column`.
    pub fn mask(&self, column: &Column) -> MissingMask {
        MissingMask(column.values().iter().map(|v| self.is_missing(v)).collect())
    }
}

/// Which rows of a column pair are excluded from evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PairIgnorePolicy {
    /// Exclude a row when both values are null.
    #[default]
    BothValuesAreMissing,
    /// Exclude a row when at least one value is null.
    EitherValueIsMissing,
    /// Never exclude a row.
    Never,
}

impl PairIgnorePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BothValuesAreMissing => "both_values_are_missing",
            Self::EitherValueIsMissing => "either_value_is_missing",
            Self::Never => "never",
        }
    }

    /// Computes the row mask for two aligned columns.
    ///
    /// Fails with [`TermError::LengthMismatch`] when the columns differ in
    /// length.
    pub fn mask(&self, a: &Column, b: &Column) -> Result<MissingMask> {
        if a.len() != b.len() {
            return Err(TermError::length_mismatch(
                format!("column '{}'", a.name()),
                a.len(),
                format!("column '{}'", b.name()),
                b.len(),
            ));
        }
        let mask = a
            .values()
            .iter()
            .zip(b.values())
            .map(|(x, y)| match self {
                Self::BothValuesAreMissing => x.is_null() && y.is_null(),
                Self::EitherValueIsMissing => x.is_null() || y.is_null(),
                Self::Never => false,
            })
            .collect();
        Ok(MissingMask(mask))
    }
}

/// Which rows of a multi-column table are excluded from evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MultiIgnorePolicy {
    /// Exclude a row when every value is null.
    #[default]
    AllValuesAreMissing,
    /// Exclude a row when any value is null.
    AnyValueIsMissing,
    /// Never exclude a row.
    Never,
}

impl MultiIgnorePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllValuesAreMissing => "all_values_are_missing",
            Self::AnyValueIsMissing => "any_value_is_missing",
            Self::Never => "never",
        }
    }

    /// Computes the row mask for a table.
    pub fn mask(&self, table: &Table) -> MissingMask {
        let mask = table
            .rows()
            .map(|row| match self {
                Self::AllValuesAreMissing => row.iter().all(|v| v.is_null()),
                Self::AnyValueIsMissing => row.iter().any(|v| v.is_null()),
                Self::Never => false,
            })
            .collect();
        MissingMask(mask)
    }
}

macro_rules! string_policy {
    ($policy:ty, [$($variant:ident),+]) => {
        impl FromStr for $policy {
            type Err = TermError;

            fn from_str(s: &str) -> Result<Self> {
                $(
                    if s == <$policy>::$variant.as_str() {
                        return Ok(<$policy>::$variant);
                    }
                )+
                Err(TermError::invalid_argument(
                    "ignore_row_if",
                    format!(
                        "unknown value '{s}', expected one of: {}",
                        [$(<$policy>::$variant.as_str()),+].join(", ")
                    ),
                ))
            }
        }

        impl fmt::Display for $policy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $policy {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $policy {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_policy!(PairIgnorePolicy, [BothValuesAreMissing, EitherValueIsMissing, Never]);
string_policy!(MultiIgnorePolicy, [AllValuesAreMissing, AnyValueIsMissing, Never]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Dataset;

    #[test]
    fn test_default_ignore_set_masks_nulls() {
        let column = Column::new(
            "a",
            vec![Value::Int(1), Value::Null, Value::Float(f64::NAN), Value::from("")],
        );
        let mask = IgnoreSet::default().mask(&column);
        assert_eq!(mask.as_slice(), &[false, true, true, false]);
        assert_eq!(mask.missing_count(), 2);
        assert_eq!(mask.nonmissing_count(), 2);

        let mask = IgnoreSet::nulls()
            .with_values([Value::from("")])
            .mask(&column);
        assert_eq!(mask.missing_count(), 3);

        assert_eq!(IgnoreSet::empty().mask(&column).missing_count(), 0);
    }

    #[test]
    fn test_pair_policy_masks() {
        let a = Column::new("a", vec![Value::Int(1), Value::Null, Value::Int(2)]);
        let b = Column::new("b", vec![Value::Null, Value::Null, Value::Int(3)]);

        let both = PairIgnorePolicy::BothValuesAreMissing.mask(&a, &b).unwrap();
        assert_eq!(both.as_slice(), &[false, true, false]);
        assert_eq!(both.nonmissing_count(), 2);

        let either = PairIgnorePolicy::EitherValueIsMissing.mask(&a, &b).unwrap();
        assert_eq!(either.as_slice(), &[true, true, false]);

        let never = PairIgnorePolicy::Never.mask(&a, &b).unwrap();
        assert_eq!(never.missing_count(), 0);
    }

    #[test]
    fn test_pair_policy_length_mismatch() {
        let a = Column::new("a", vec![Value::Int(1); 5]);
        let b = Column::new("b", vec![Value::Int(1); 6]);
        let err = PairIgnorePolicy::default().mask(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            TermError::LengthMismatch {
                left_len: 5,
                right_len: 6,
                ..
            }
        ));
    }

    #[test]
    fn test_multi_policy_masks() {
        let ds = Dataset::from_columns([
            ("a", vec![Value::Null, Value::Int(1), Value::Null]),
            ("b", vec![Value::Null, Value::Null, Value::Int(2)]),
        ])
        .unwrap();
        let table = ds.table(&["a", "b"]).unwrap();
        assert_eq!(
            MultiIgnorePolicy::AllValuesAreMissing.mask(&table).as_slice(),
            &[true, false, false]
        );
        assert_eq!(
            MultiIgnorePolicy::AnyValueIsMissing.mask(&table).as_slice(),
            &[true, true, true]
        );
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "either_value_is_missing".parse::<PairIgnorePolicy>().unwrap(),
            PairIgnorePolicy::EitherValueIsMissing
        );
        assert_eq!(
            "any_value_is_missing".parse::<MultiIgnorePolicy>().unwrap(),
            MultiIgnorePolicy::AnyValueIsMissing
        );
        let err = "sometimes".parse::<PairIgnorePolicy>().unwrap_err();
        assert!(matches!(err, TermError::InvalidArgument { .. }));
        assert!("any_value_is_missing".parse::<PairIgnorePolicy>().is_err());

        let policy: PairIgnorePolicy = serde_json::from_str("\"never\"").unwrap();
        assert_eq!(policy, PairIgnorePolicy::Never);
        assert!(serde_json::from_str::<MultiIgnorePolicy>("\"both\"").is_err());
    }
}
