//! Prelude for commonly used types and traits in term-expect.

pub use crate::core::{
    Dataset, DefaultExpectationArgs, Expectation, ExpectationConfig, ExpectationOptions,
    ExpectationRegistry, ExpectationResult, ExpectationSuite, ResultFormat, ValidationContext,
    ValidationReport, Value,
};
pub use crate::error::{ErrorContext, Result, TermError};
pub use crate::formatters::{FormatterConfig, ResultFormatter};
pub use crate::logging::LogConfig;
