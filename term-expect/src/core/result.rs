//! Structured results of expectation evaluation.

use super::{ExpectationConfig, RowId, Value};
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value that failed its expectation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnexpectedValue {
    /// An element of a single column.
    Single(Value),
    /// The `(A, B)` values of a column pair row.
    Pair(Value, Value),
    /// A multi-column row keyed by column name.
    Row(BTreeMap<String, Value>),
}

impl From<Value> for UnexpectedValue {
    fn from(value: Value) -> Self {
        UnexpectedValue::Single(value)
    }
}

impl std::fmt::Display for UnexpectedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnexpectedValue::Single(v) => write!(f, "{v}"),
            UnexpectedValue::Pair(a, b) => write!(f, "({a}, {b})"),
            UnexpectedValue::Row(row) => {
                let fields: Vec<String> = row.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", fields.join(", "))
            }
        }
    }
}

/// An unexpected value and how often it occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnexpectedCount {
    pub value: UnexpectedValue,
    pub count: usize,
}

/// Diagnostic detail of an expectation result.
///
/// Which fields are present depends on the expectation kind and the result
/// format level. Absent fields are omitted from the JSON rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unexpected_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unexpected_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unexpected_percent_nonmissing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_unexpected_list: Option<Vec<UnexpectedValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_unexpected_index_list: Option<Vec<RowId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_unexpected_counts: Option<Vec<UnexpectedCount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unexpected_index_list: Option<Vec<RowId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unexpected_list: Option<Vec<UnexpectedValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Captured runtime failure of an expectation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    pub raised_exception: bool,
    pub exception_kind: String,
    pub exception_message: String,
}

impl From<&TermError> for ExceptionInfo {
    fn from(error: &TermError) -> Self {
        Self {
            raised_exception: true,
            exception_kind: error.kind().to_string(),
            exception_message: error.to_string(),
        }
    }
}

/// The outcome of evaluating one expectation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_info: Option<ExceptionInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expectation_config: Option<ExpectationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl ExpectationResult {
    /// A result carrying only the verdict.
    pub fn new(success: bool) -> Self {
        Self {
            success,
            result: None,
            exception_info: None,
            expectation_config: None,
            meta: None,
        }
    }

    /// A result carrying the verdict and its details.
    pub fn with_details(success: bool, details: ResultDetails) -> Self {
        Self {
            result: Some(details),
            ..Self::new(success)
        }
    }

    /// A failed result describing a captured error.
    pub fn from_exception(error: &TermError) -> Self {
        Self {
            exception_info: Some(ExceptionInfo::from(error)),
            ..Self::new(false)
        }
    }

    /// Returns the details, if any.
    pub fn details(&self) -> Option<&ResultDetails> {
        self.result.as_ref()
    }

    /// Returns true if the expectation raised a captured error.
    pub fn raised_exception(&self) -> bool {
        self.exception_info
            .as_ref()
            .is_some_and(|info| info.raised_exception)
    }
}
