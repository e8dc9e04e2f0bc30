//! Error types for the Term expectation engine.
//!
//! All fallible operations in the crate return [`TermError`]. The variants are
//! split into two channels:
//!
//! - **Caller misuse** (`InvalidArgument`, `LengthMismatch`, `ColumnNotFound`, ...)
//!   is reported before any data is scanned and always propagates.
//! - **Runtime predicate failure** (`PredicateFailure`) is raised while an
//!   expectation's predicate runs. It is the only kind that
//!   `catch_exceptions` turns into a failed result instead of an error.

use thiserror::Error;

/// The main error type for the Term expectation engine.
#[derive(Error, Debug)]
pub enum TermError {
    /// An argument had an unsupported value.
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument {
        /// Name of the offending argument
        argument: String,
        /// Human-readable description of the problem
        message: String,
    },

    /// Two sequences that must be aligned had different lengths.
    #[error("Length mismatch: {left} has {left_len} elements but {right} has {right_len}")]
    LengthMismatch {
        left: String,
        left_len: usize,
        right: String,
        right_len: usize,
    },

    /// Values of incompatible types were compared or converted.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// The predicate of an expectation failed while evaluating data.
    #[error("Predicate of '{expectation}' failed: {message}")]
    PredicateFailure {
        /// Expectation type whose predicate failed
        expectation: String,
        /// Detailed error message
        message: String,
        /// Underlying error raised by the predicate
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error when a required column is not found in the dataset.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from data source operations.
    #[error("Data source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "Parquet")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error when parsing a value.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, TermError>`.
pub type Result<T> = std::result::Result<T, TermError>;

impl TermError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a length mismatch error between two named sequences.
    pub fn length_mismatch(
        left: impl Into<String>,
        left_len: usize,
        right: impl Into<String>,
        right_len: usize,
    ) -> Self {
        Self::LengthMismatch {
            left: left.into(),
            left_len,
            right: right.into(),
            right_len,
        }
    }

    /// Wraps an error raised by an expectation's predicate.
    ///
    /// An error that already is a predicate failure is returned unchanged.
    pub fn predicate_failure(expectation: impl Into<String>, error: TermError) -> Self {
        match error {
            e @ TermError::PredicateFailure { .. } => e,
            other => Self::PredicateFailure {
                expectation: expectation.into(),
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }

    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Returns true if `catch_exceptions` may capture this error.
    pub fn is_catchable(&self) -> bool {
        matches!(self, TermError::PredicateFailure { .. })
    }

    /// Short name of the error kind, used in exception info records.
    pub fn kind(&self) -> &'static str {
        match self {
            TermError::InvalidArgument { .. } => "InvalidArgument",
            TermError::LengthMismatch { .. } => "LengthMismatch",
            TermError::TypeMismatch { .. } => "TypeMismatch",
            TermError::PredicateFailure { .. } => "PredicateFailure",
            TermError::ColumnNotFound { .. } => "ColumnNotFound",
            TermError::DataFusion(_) => "DataFusion",
            TermError::Arrow(_) => "Arrow",
            TermError::DataSource { .. } => "DataSource",
            TermError::Io(_) => "Io",
            TermError::Parse(_) => "Parse",
            TermError::Configuration(_) => "Configuration",
            TermError::Serialization(_) => "Serialization",
            TermError::Internal(_) => "Internal",
        }
    }
}

impl From<serde_json::Error> for TermError {
    fn from(e: serde_json::Error) -> Self {
        TermError::Serialization(e.to_string())
    }
}

impl From<std::fmt::Error> for TermError {
    fn from(e: std::fmt::Error) -> Self {
        TermError::Internal(format!("formatting failed: {e}"))
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<TermError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let base_error = e.into();
            match base_error {
                TermError::Internal(inner) => TermError::Internal(format!("{msg}: {inner}")),
                other => TermError::Internal(format!("{msg}: {other}")),
            }
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let msg = f();
            let base_error = e.into();
            match base_error {
                TermError::Internal(inner) => TermError::Internal(format!("{msg}: {inner}")),
                other => TermError::Internal(format!("{msg}: {other}")),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_invalid_argument_names_argument() {
        let err = TermError::invalid_argument("ignore_row_if", "unknown value 'sometimes'");
        assert_eq!(
            err.to_string(),
            "Invalid argument 'ignore_row_if': unknown value 'sometimes'"
        );
        assert!(!err.is_catchable());
    }

    #[test]
    fn test_length_mismatch_message() {
        let err = TermError::length_mismatch("a", 5, "b", 6);
        assert_eq!(
            err.to_string(),
            "Length mismatch: a has 5 elements but b has 6"
        );
    }

    #[test]
    fn test_predicate_failure_keeps_source() {
        let inner = TermError::type_mismatch("string", "int");
        let err = TermError::predicate_failure("expect_column_values_to_be_between", inner);
        assert!(err.is_catchable());
        assert!(err.source().is_some());
        assert!(err.to_string().contains("expected string, found int"));
    }

    #[test]
    fn test_predicate_failure_is_not_double_wrapped() {
        let inner = TermError::predicate_failure("a", TermError::Parse("bad".to_string()));
        let err = TermError::predicate_failure("b", inner);
        match err {
            TermError::PredicateFailure { expectation, .. } => assert_eq!(expectation, "a"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_column_not_found() {
        let err = TermError::ColumnNotFound {
            column: "user_id".to_string(),
        };
        assert_eq!(err.to_string(), "Column 'user_id' not found in dataset");
        assert_eq!(err.kind(), "ColumnNotFound");
    }

    #[test]
    fn test_error_context() {
        fn failing_operation() -> Result<()> {
            Err(TermError::Internal("Something went wrong".to_string()))
        }

        let result = failing_operation().context("During expectation evaluation");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("During expectation evaluation"));
    }
}
