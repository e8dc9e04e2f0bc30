//! Execution protocols that turn per-element predicates into expectation results.
//!
//! Each protocol follows the same flow:
//!
//! ```text
//! column(s) -> missingness mask -> non-missing subset -> predicate -> verdicts
//!           -> success aggregation (mostly) -> formatted result
//! ```
//!
//! A predicate only ever sees non-missing data, and it must return exactly
//! one verdict per element (or row) it was given. Protocols are stateless: a
//! repeated evaluation of the same expectation on the same dataset yields the
//! same result.

pub mod column_aggregate;
pub mod column_map;
pub mod column_pair_map;
pub mod multicolumn_map;

pub use column_aggregate::{AggregateOutcome, ColumnAggregateExpectation, ColumnAggregateFn};
pub use column_map::{run_column_map, ColumnMapExpectation, ColumnMapPredicate};
pub use column_pair_map::{run_column_pair_map, ColumnPairMapExpectation, ColumnPairMapPredicate};
pub use multicolumn_map::{run_multicolumn_map, MulticolumnMapExpectation, MulticolumnMapPredicate};

use crate::core::ExpectationConfig;
use crate::prelude::*;
use serde::Serialize;
use tracing::warn;

/// The configuration an expectation wrapper records in a suite.
///
/// Arguments that fail to serialize are logged and recorded as empty kwargs.
pub(crate) fn recorded_config<T: Serialize>(
    expectation: &'static str,
    arguments: &T,
) -> ExpectationConfig {
    ExpectationConfig::from_serializable(expectation, arguments).unwrap_or_else(|e| {
        warn!(
            expectation.name = expectation,
            error = %e,
            "Expectation arguments did not serialize; recording empty kwargs"
        );
        ExpectationConfig::new(expectation, Default::default())
    })
}

/// Wraps a predicate error as a predicate failure of `expectation`.
pub(crate) fn predicate_error(expectation: &'static str) -> impl Fn(TermError) -> TermError {
    move |e| TermError::predicate_failure(expectation, e)
}

/// Checks that a predicate returned one verdict per input element.
pub(crate) fn check_verdicts(
    expectation: &'static str,
    verdicts: &[bool],
    expected: usize,
) -> Result<()> {
    if verdicts.len() != expected {
        return Err(TermError::predicate_failure(
            expectation,
            TermError::length_mismatch("predicate verdicts", verdicts.len(), "non-missing input", expected),
        ));
    }
    Ok(())
}

/// Adds the option setters shared by every expectation wrapper.
macro_rules! impl_option_setters {
    ($wrapper:ident < $param:ident : $bound:path >) => {
        impl<$param: $bound> $wrapper<$param> {
            /// Replaces all trailing options.
            pub fn with_options(mut self, options: $crate::core::ExpectationOptions) -> Self {
                self.options = options;
                self
            }

            pub fn with_result_format(
                mut self,
                result_format: impl Into<$crate::core::ResultFormat>,
            ) -> Self {
                self.options.result_format = Some(result_format.into());
                self
            }

            pub fn with_include_config(mut self, include_config: bool) -> Self {
                self.options.include_config = Some(include_config);
                self
            }

            pub fn with_catch_exceptions(mut self, catch_exceptions: bool) -> Self {
                self.options.catch_exceptions = Some(catch_exceptions);
                self
            }

            pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
                self.options.meta = Some(meta);
                self
            }
        }
    };
}

pub(crate) use impl_option_setters;
