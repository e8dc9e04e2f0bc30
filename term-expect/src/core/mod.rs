//! Core types of the Term expectation engine.
//!
//! This module provides the data model, the expectation contract and the
//! building blocks every execution protocol is assembled from.
//!
//! ## Overview
//!
//! - **[`Dataset`]**, **[`Column`]**, **[`Table`]**: immutable, row-identified columnar data
//! - **[`Dataset::column_mean`]** and friends: column metrics over non-null values
//! - **[`IgnoreSet`]**, **[`PairIgnorePolicy`]**, **[`MultiIgnorePolicy`]**: which elements are missing
//! - **[`calc_map_expectation_success`]**: the `mostly` threshold
//! - **[`format_map_output`]**: counts, percentages and unexpected samples per [`ResultFormat`]
//! - **[`Expectation`]**: the uniform evaluation contract
//! - **[`ExpectationRegistry`]**: expectation type name to protocol and factory
//! - **[`ValidationContext`]** and **[`ExpectationSuite`]**: running many expectations
//!
//! ## Architecture
//!
//! ```text
//! ValidationContext
//!     ├── Arc<Dataset>
//!     ├── ContextConfig (defaults, logging)
//!     └── ExpectationSuite
//!         ├── ExpectationConfig ──(registry)──> Box<dyn Expectation>
//!         └── ExpectationConfig ──(registry)──> Box<dyn Expectation>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use term_expect::core::{Dataset, ValidationContext, Value};
//! use term_expect::expectations::ValuesToBeUnique;
//! use term_expect::protocols::ColumnMapExpectation;
//!
//! # fn main() -> term_expect::prelude::Result<()> {
//! let dataset = Dataset::from_columns([
//!     ("id", vec![Value::Int(1), Value::Int(2), Value::Int(2)]),
//! ])?;
//! let mut ctx = ValidationContext::new(dataset);
//!
//! let result = ctx.expect(&ColumnMapExpectation::new("id", ValuesToBeUnique {}))?;
//! assert!(!result.success);
//!
//! let report = ctx.validate()?;
//! assert_eq!(report.statistics.evaluated_expectations, 1);
//! # Ok(())
//! # }
//! ```

mod aggregate;
mod dataset;
mod expectation;
pub mod format;
mod metrics;
mod missing;
mod registry;
mod result;
mod result_format;
mod suite;
pub mod validation_context;
mod value;

pub use aggregate::{calc_map_expectation_success, validate_mostly, SuccessVerdict};
pub use dataset::{Column, Dataset, DatasetBuilder, RowId, Table};
pub use expectation::{
    evaluate_expectation, BoxedExpectation, DefaultExpectationArgs, Expectation,
    ExpectationConfig, ExpectationKind, ExpectationOptions, ResolvedOptions,
};
pub use format::{format_map_output, most_common, MapOutput};
pub use missing::{IgnoreSet, MissingMask, MultiIgnorePolicy, PairIgnorePolicy};
pub use registry::{ExpectationFactory, ExpectationRegistry, RegisteredExpectation};
pub use result::{ExceptionInfo, ExpectationResult, ResultDetails, UnexpectedCount, UnexpectedValue};
pub use result_format::{ResultFormat, ResultFormatLevel, DEFAULT_PARTIAL_UNEXPECTED_COUNT};
pub use suite::{ExpectationSuite, ValidationReport, ValidationStatistics};
pub use validation_context::{derive_suite, ContextConfig, DerivationKind, ValidationContext};
pub use value::Value;
