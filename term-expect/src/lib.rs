//! # term-expect - Column Expectations for Rust
//!
//! term-expect evaluates declarative *expectations* against in-memory tabular
//! data. An expectation is an assertion about one column, a pair of columns or
//! a set of columns, such as "values are unique" or "A is greater than B". It
//! produces a structured result describing how many rows conformed and which
//! values did not.
//!
//! ## Overview
//!
//! Most expectations are *map expectations*: a predicate is evaluated per row,
//! missing rows (nulls and configured sentinel values) are set aside, and the
//! fraction of conforming rows is compared against an optional `mostly`
//! threshold. The remaining expectations aggregate a whole column into a
//! single statistic, such as a Kolmogorov-Smirnov p-value.
//!
//! ## Quick Start
//!
//! ```rust
//! use term_expect::prelude::*;
//! use term_expect::expectations::{ValuesToBeInSet, ValuesToNotBeNull};
//! use term_expect::formatters::HumanFormatter;
//! use term_expect::protocols::ColumnMapExpectation;
//!
//! # fn example() -> Result<()> {
//! let dataset = Dataset::from_columns([(
//!     "status",
//!     vec![Value::from("active"), Value::from("closed"), Value::Null],
//! )])?;
//! let mut context = ValidationContext::new(dataset);
//!
//! // Two of three rows are present
//! let result = context.expect(
//!     &ColumnMapExpectation::new("status", ValuesToNotBeNull {}).with_mostly(0.6),
//! )?;
//! assert!(result.success);
//!
//! // Nulls are ignored; "closed" is unexpected
//! let result = context.expect(&ColumnMapExpectation::new(
//!     "status",
//!     ValuesToBeInSet::new([Value::from("active")]),
//! ))?;
//! assert!(!result.success);
//!
//! // Re-run everything recorded so far
//! let report = context.validate()?;
//! println!("{}", HumanFormatter::new().format(&report)?);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Core Concepts
//!
//! - **[`Dataset`](core::Dataset)**: named columns of [`Value`](core::Value)s
//!   sharing one row index
//! - **Protocols** ([`protocols`]): the evaluation pipelines for single-column,
//!   column-pair, multi-column and aggregate expectations
//! - **[`ResultFormat`](core::ResultFormat)**: how much detail a result carries,
//!   from `BOOLEAN_ONLY` to `COMPLETE`
//! - **Suites** ([`ExpectationSuite`](core::ExpectationSuite)): named lists of
//!   expectation configurations, serializable as JSON and rebuilt through an
//!   [`ExpectationRegistry`](core::ExpectationRegistry)
//! - **[`ValidationContext`](core::ValidationContext)**: a dataset with its
//!   suite, deciding which expectations survive when the dataset is filtered,
//!   sampled or combined
//!
//! ## Loading Data
//!
//! The [`sources`] module reads CSV, Parquet and NDJSON files through
//! DataFusion:
//!
//! ```rust,no_run
//! use term_expect::sources::{CsvSource, DataSource};
//!
//! # async fn example() -> term_expect::prelude::Result<()> {
//! let dataset = CsvSource::from_glob("data/orders-*.csv")?.load().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events. Install a subscriber with
//! [`logging::setup::init_logging`] or your own `tracing-subscriber` stack,
//! and tune verbosity per context with [`LogConfig`](logging::LogConfig).

pub mod core;
pub mod datetime;
pub mod error;
pub mod expectations;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod protocols;
pub mod sources;
pub mod stats;
