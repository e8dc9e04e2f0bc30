//! Column metrics computed over the non-null values of a [`Dataset`].
//!
//! Numeric metrics treat booleans as 0 and 1 and fail with
//! [`TermError::TypeMismatch`] on any other non-numeric value. Empty
//! columns give `None` where the metric is undefined.

use super::{most_common, Column, Dataset, Value};
use crate::datetime::value_to_datetime;
use crate::prelude::*;
use crate::stats::histogram;
use std::cmp::Ordering;

fn non_null(column: &Column) -> impl Iterator<Item = &Value> + '_ {
    column.values().iter().filter(|v| !v.is_null())
}

fn numeric(column: &Column) -> Result<Vec<f64>> {
    non_null(column)
        .map(|value| match value {
            Value::Bool(b) => Ok(f64::from(u8::from(*b))),
            other => other.as_f64().ok_or_else(|| {
                TermError::type_mismatch(
                    "numeric",
                    format!("{} in column '{}'", other.type_name(), column.name()),
                )
            }),
        })
        .collect()
}

fn extreme(
    column: &Column,
    parse_strings_as_datetimes: bool,
    wanted: Ordering,
) -> Result<Option<Value>> {
    let mut best: Option<Value> = None;
    for value in non_null(column) {
        let value = if parse_strings_as_datetimes {
            value_to_datetime(value)?
        } else {
            value.clone()
        };
        let replace = match &best {
            Some(current) => value.try_compare(current)? == wanted,
            None => true,
        };
        if replace {
            best = Some(value);
        }
    }
    Ok(best)
}

fn sort_values(values: &mut [Value]) -> Result<()> {
    let mut failure = None;
    values.sort_by(|a, b| {
        a.try_compare(b).unwrap_or_else(|e| {
            failure.get_or_insert(e);
            Ordering::Equal
        })
    });
    failure.map_or(Ok(()), Err)
}

impl Dataset {
    /// Sum of the column; 0 for a column with no values.
    pub fn column_sum(&self, column: &str) -> Result<f64> {
        Ok(numeric(self.column(column)?)?.iter().sum())
    }

    /// Largest value, optionally parsing strings as date-times first.
    pub fn column_max(
        &self,
        column: &str,
        parse_strings_as_datetimes: bool,
    ) -> Result<Option<Value>> {
        extreme(self.column(column)?, parse_strings_as_datetimes, Ordering::Greater)
    }

    /// Smallest value, optionally parsing strings as date-times first.
    pub fn column_min(
        &self,
        column: &str,
        parse_strings_as_datetimes: bool,
    ) -> Result<Option<Value>> {
        extreme(self.column(column)?, parse_strings_as_datetimes, Ordering::Less)
    }

    pub fn column_mean(&self, column: &str) -> Result<Option<f64>> {
        let values = numeric(self.column(column)?)?;
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }

    pub fn column_nonnull_count(&self, column: &str) -> Result<usize> {
        Ok(non_null(self.column(column)?).count())
    }

    /// Distinct values with their counts, most frequent first.
    ///
    /// Ties keep the order of first occurrence.
    pub fn column_value_counts(&self, column: &str) -> Result<Vec<(Value, usize)>> {
        let values: Vec<Value> = non_null(self.column(column)?).cloned().collect();
        Ok(most_common(&values, usize::MAX))
    }

    pub fn column_unique_count(&self, column: &str) -> Result<usize> {
        Ok(self.column_value_counts(column)?.len())
    }

    /// Every value sharing the highest count, in ascending order.
    pub fn column_modes(&self, column: &str) -> Result<Vec<Value>> {
        let counts = self.column_value_counts(column)?;
        let Some(top) = counts.first().map(|(_, count)| *count) else {
            return Ok(Vec::new());
        };
        let mut modes: Vec<Value> = counts
            .into_iter()
            .take_while(|(_, count)| *count == top)
            .map(|(value, _)| value)
            .collect();
        sort_values(&mut modes)?;
        Ok(modes)
    }

    /// Median, averaging the middle pair for an even count.
    pub fn column_median(&self, column: &str) -> Result<Option<f64>> {
        let mut values = numeric(self.column(column)?)?;
        if values.is_empty() {
            return Ok(None);
        }
        values.sort_by(f64::total_cmp);
        let mid = values.len() / 2;
        Ok(Some(if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        }))
    }

    /// Sample standard deviation; `None` with fewer than two values.
    pub fn column_stdev(&self, column: &str) -> Result<Option<f64>> {
        let values = numeric(self.column(column)?)?;
        if values.len() < 2 {
            return Ok(None);
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let squares: f64 = values.iter().map(|x| (x - mean).powi(2)).sum();
        Ok(Some((squares / (n - 1.0)).sqrt()))
    }

    /// Counts per bin between consecutive `edges`; the last bin is closed.
    pub fn column_hist(&self, column: &str, edges: &[f64]) -> Result<Vec<usize>> {
        let increasing = edges
            .windows(2)
            .all(|w| w[0].partial_cmp(&w[1]) == Some(Ordering::Less));
        if edges.len() < 2 || !increasing {
            return Err(TermError::invalid_argument(
                "bins",
                "at least two strictly increasing edges are required",
            ));
        }
        Ok(histogram(&numeric(self.column(column)?)?, edges))
    }

    /// Number of values within the given bounds.
    ///
    /// At least one bound is required, and `min_value` may not exceed
    /// `max_value`.
    pub fn column_count_in_range(
        &self,
        column: &str,
        min_value: Option<&Value>,
        max_value: Option<&Value>,
        min_strictly: bool,
        max_strictly: bool,
    ) -> Result<usize> {
        if let (Some(min), Some(max)) = (min_value, max_value) {
            if min.try_compare(max)? == Ordering::Greater {
                return Err(TermError::invalid_argument(
                    "min_value",
                    "min_value must be less than or equal to max_value",
                ));
            }
        } else if min_value.is_none() && max_value.is_none() {
            return Err(TermError::invalid_argument(
                "min_value",
                "either min_value or max_value must be provided",
            ));
        }

        let mut count = 0;
        for value in non_null(self.column(column)?) {
            let above = match min_value {
                Some(min) => match value.try_compare(min)? {
                    Ordering::Greater => true,
                    Ordering::Equal => !min_strictly,
                    Ordering::Less => false,
                },
                None => true,
            };
            let below = match max_value {
                Some(max) => match value.try_compare(max)? {
                    Ordering::Less => true,
                    Ordering::Equal => !max_strictly,
                    Ordering::Greater => false,
                },
                None => true,
            };
            if above && below {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        Dataset::from_columns([
            (
                "x",
                vec![
                    Value::Int(4),
                    Value::Float(1.5),
                    Value::Null,
                    Value::Int(4),
                    Value::Float(f64::NAN),
                    Value::Int(10),
                ],
            ),
            (
                "when",
                vec![
                    Value::from("2024-03-01"),
                    Value::from("2023-12-31"),
                    Value::Null,
                    Value::from("2024-01-15"),
                    Value::Null,
                    Value::from("2024-02-29"),
                ],
            ),
            ("empty", vec![Value::Null; 6]),
        ])
        .unwrap()
    }

    #[test]
    fn test_numeric_summaries_skip_nulls() {
        let ds = dataset();
        assert_eq!(ds.column_sum("x").unwrap(), 19.5);
        assert_eq!(ds.column_mean("x").unwrap(), Some(4.875));
        assert_eq!(ds.column_median("x").unwrap(), Some(4.0));
        assert_eq!(ds.column_nonnull_count("x").unwrap(), 4);

        let stdev = ds.column_stdev("x").unwrap().unwrap();
        assert!((stdev - 3.6142).abs() < 1e-4);
    }

    #[test]
    fn test_empty_column_metrics() {
        let ds = dataset();
        assert_eq!(ds.column_sum("empty").unwrap(), 0.0);
        assert_eq!(ds.column_mean("empty").unwrap(), None);
        assert_eq!(ds.column_median("empty").unwrap(), None);
        assert_eq!(ds.column_stdev("empty").unwrap(), None);
        assert_eq!(ds.column_max("empty", false).unwrap(), None);
        assert!(ds.column_modes("empty").unwrap().is_empty());
    }

    #[test]
    fn test_non_numeric_column_is_rejected() {
        let ds = dataset();
        assert!(matches!(
            ds.column_mean("when"),
            Err(TermError::TypeMismatch { .. })
        ));
        assert!(matches!(
            ds.column_sum("missing"),
            Err(TermError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_min_max_with_datetime_parsing() {
        let ds = dataset();
        assert_eq!(ds.column_max("x", false).unwrap(), Some(Value::Int(10)));
        assert_eq!(ds.column_min("x", false).unwrap(), Some(Value::Float(1.5)));
        assert_eq!(
            ds.column_max("when", false).unwrap(),
            Some(Value::from("2024-03-01"))
        );

        let earliest = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            ds.column_min("when", true).unwrap(),
            Some(Value::DateTime(earliest))
        );
        assert!(matches!(
            ds.column_max("x", true),
            Err(TermError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_value_counts_and_modes() {
        let ds = Dataset::from_columns([(
            "s",
            vec![
                Value::from("b"),
                Value::from("a"),
                Value::from("b"),
                Value::Null,
                Value::from("a"),
                Value::from("c"),
            ],
        )])
        .unwrap();
        assert_eq!(
            ds.column_value_counts("s").unwrap(),
            vec![(Value::from("b"), 2), (Value::from("a"), 2), (Value::from("c"), 1)]
        );
        assert_eq!(ds.column_unique_count("s").unwrap(), 3);
        assert_eq!(
            ds.column_modes("s").unwrap(),
            vec![Value::from("a"), Value::from("b")]
        );
    }

    #[test]
    fn test_hist() {
        let ds = dataset();
        assert_eq!(ds.column_hist("x", &[0.0, 5.0, 10.0]).unwrap(), vec![3, 1]);
        assert!(ds.column_hist("x", &[1.0]).is_err());
        assert!(ds.column_hist("x", &[5.0, 5.0]).is_err());
    }

    #[test]
    fn test_count_in_range_bounds() {
        let ds = dataset();
        let four = Value::Int(4);
        let ten = Value::Int(10);
        assert_eq!(
            ds.column_count_in_range("x", Some(&four), Some(&ten), false, true)
                .unwrap(),
            2
        );
        assert_eq!(
            ds.column_count_in_range("x", Some(&four), Some(&ten), true, false)
                .unwrap(),
            1
        );
        assert_eq!(
            ds.column_count_in_range("x", None, Some(&four), false, false)
                .unwrap(),
            3
        );
        assert!(matches!(
            ds.column_count_in_range("x", None, None, false, true),
            Err(TermError::InvalidArgument { .. })
        ));
        assert!(matches!(
            ds.column_count_in_range("x", Some(&ten), Some(&four), false, true),
            Err(TermError::InvalidArgument { .. })
        ));
    }
}
