//! Result verbosity levels and the `result_format` option.

use crate::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default size of the partial unexpected sample.
pub const DEFAULT_PARTIAL_UNEXPECTED_COUNT: usize = 20;

/// How much detail an expectation result carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultFormatLevel {
    /// Only `success`.
    BooleanOnly,
    /// Counts, percentages and bounded samples.
    #[default]
    Basic,
    /// Adds the full list of unexpected row ids.
    Summary,
    /// Adds the full list of unexpected values.
    Complete,
}

impl ResultFormatLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BooleanOnly => "BOOLEAN_ONLY",
            Self::Basic => "BASIC",
            Self::Summary => "SUMMARY",
            Self::Complete => "COMPLETE",
        }
    }
}

impl FromStr for ResultFormatLevel {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BOOLEAN_ONLY" => Ok(Self::BooleanOnly),
            "BASIC" => Ok(Self::Basic),
            "SUMMARY" => Ok(Self::Summary),
            "COMPLETE" => Ok(Self::Complete),
            other => Err(TermError::invalid_argument(
                "result_format",
                format!(
                    "unknown result format '{other}', expected BOOLEAN_ONLY, BASIC, SUMMARY or COMPLETE"
                ),
            )),
        }
    }
}

impl fmt::Display for ResultFormatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verbosity options for an expectation result.
///
/// Accepted either as a bare level string (`"SUMMARY"`) or as an object:
///
/// ```rust
/// use term_expect::core::{ResultFormat, ResultFormatLevel};
///
/// let format: ResultFormat = serde_json::from_str(
///     r#"{"result_format": "COMPLETE", "partial_unexpected_count": 5}"#,
/// ).unwrap();
/// assert_eq!(format.level, ResultFormatLevel::Complete);
/// assert_eq!(format.partial_unexpected_count, 5);
///
/// let format: ResultFormat = serde_json::from_str(r#""BOOLEAN_ONLY""#).unwrap();
/// assert_eq!(format.level, ResultFormatLevel::BooleanOnly);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResultFormat {
    #[serde(rename = "result_format")]
    pub level: ResultFormatLevel,
    pub partial_unexpected_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_unexpected_counts_limit: Option<usize>,
}

impl Default for ResultFormat {
    fn default() -> Self {
        Self::new(ResultFormatLevel::Basic)
    }
}

impl From<ResultFormatLevel> for ResultFormat {
    fn from(level: ResultFormatLevel) -> Self {
        Self::new(level)
    }
}

impl ResultFormat {
    pub fn new(level: ResultFormatLevel) -> Self {
        Self {
            level,
            partial_unexpected_count: DEFAULT_PARTIAL_UNEXPECTED_COUNT,
            partial_unexpected_counts_limit: None,
        }
    }

    pub fn boolean_only() -> Self {
        Self::new(ResultFormatLevel::BooleanOnly)
    }

    pub fn basic() -> Self {
        Self::new(ResultFormatLevel::Basic)
    }

    pub fn summary() -> Self {
        Self::new(ResultFormatLevel::Summary)
    }

    pub fn complete() -> Self {
        Self::new(ResultFormatLevel::Complete)
    }

    /// Sets the size of the partial unexpected sample.
    pub fn with_partial_unexpected_count(mut self, count: usize) -> Self {
        self.partial_unexpected_count = count;
        self
    }

    /// Caps the number of `(value, count)` pairs in `partial_unexpected_counts`.
    pub fn with_partial_unexpected_counts_limit(mut self, limit: usize) -> Self {
        self.partial_unexpected_counts_limit = Some(limit);
        self
    }

    /// The effective cap on `partial_unexpected_counts`.
    pub fn counts_limit(&self) -> usize {
        self.partial_unexpected_counts_limit
            .unwrap_or(self.partial_unexpected_count)
    }

    /// Parses a bare level string or a structured JSON object.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(level) => Ok(Self::new(level.parse()?)),
            serde_json::Value::Object(map) => {
                let level = match map.get("result_format") {
                    Some(serde_json::Value::String(level)) => level.parse()?,
                    Some(other) => {
                        return Err(TermError::invalid_argument(
                            "result_format",
                            format!("expected a level string, got {other}"),
                        ))
                    }
                    None => ResultFormatLevel::default(),
                };
                let mut format = Self::new(level);
                if let Some(count) = map.get("partial_unexpected_count") {
                    format.partial_unexpected_count = parse_count("partial_unexpected_count", count)?;
                }
                if let Some(limit) = map.get("partial_unexpected_counts_limit") {
                    if !limit.is_null() {
                        format.partial_unexpected_counts_limit =
                            Some(parse_count("partial_unexpected_counts_limit", limit)?);
                    }
                }
                Ok(format)
            }
            other => Err(TermError::invalid_argument(
                "result_format",
                format!("expected a string or an object, got {other}"),
            )),
        }
    }
}

fn parse_count(argument: &str, value: &serde_json::Value) -> Result<usize> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            TermError::invalid_argument(argument, format!("expected a non-negative integer, got {value}"))
        })
}

impl FromStr for ResultFormat {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::new(s.parse()?))
    }
}

impl<'de> Deserialize<'de> for ResultFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_string_levels() {
        assert_eq!(
            "SUMMARY".parse::<ResultFormat>().unwrap().level,
            ResultFormatLevel::Summary
        );
        let err = "VERBOSE".parse::<ResultFormat>().unwrap_err();
        assert!(matches!(err, TermError::InvalidArgument { .. }));
    }

    #[test]
    fn test_parse_object() {
        let format = ResultFormat::from_json(&json!({
            "result_format": "BASIC",
            "partial_unexpected_count": 2
        }))
        .unwrap();
        assert_eq!(format.level, ResultFormatLevel::Basic);
        assert_eq!(format.partial_unexpected_count, 2);
        assert_eq!(format.counts_limit(), 2);

        let err = ResultFormat::from_json(&json!({"result_format": "NOPE"})).unwrap_err();
        assert!(matches!(err, TermError::InvalidArgument { .. }));
        assert!(ResultFormat::from_json(&json!({"partial_unexpected_count": -1})).is_err());
    }

    #[test]
    fn test_defaults() {
        let format = ResultFormat::default();
        assert_eq!(format.level, ResultFormatLevel::Basic);
        assert_eq!(format.partial_unexpected_count, DEFAULT_PARTIAL_UNEXPECTED_COUNT);
        assert_eq!(
            ResultFormat::basic().with_partial_unexpected_counts_limit(3).counts_limit(),
            3
        );
    }

    #[test]
    fn test_serializes_as_object() {
        let value = serde_json::to_value(ResultFormat::complete()).unwrap();
        assert_eq!(
            value,
            json!({"result_format": "COMPLETE", "partial_unexpected_count": 20})
        );
        let back: ResultFormat = serde_json::from_value(value).unwrap();
        assert_eq!(back, ResultFormat::complete());
    }
}
