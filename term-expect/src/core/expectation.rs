//! The expectation contract and its common options.

use super::{Dataset, ExpectationResult, ResultFormat};
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, instrument, warn};

/// The execution protocol an expectation runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectationKind {
    /// Per-element predicate over one column.
    ColumnMap,
    /// Per-row predicate over two aligned columns.
    ColumnPairMap,
    /// Per-row predicate over an ordered list of columns.
    MulticolumnMap,
    /// Single statistic over the non-null values of one column.
    ColumnAggregate,
}

/// The declarative form of an expectation: its type name and arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationConfig {
    pub expectation_type: String,
    #[serde(default)]
    pub kwargs: serde_json::Map<String, serde_json::Value>,
}

impl ExpectationConfig {
    pub fn new(
        expectation_type: impl Into<String>,
        kwargs: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            expectation_type: expectation_type.into(),
            kwargs,
        }
    }

    /// Builds a config from any serializable argument struct.
    pub fn from_serializable<T: Serialize>(
        expectation_type: impl Into<String>,
        arguments: &T,
    ) -> Result<Self> {
        match serde_json::to_value(arguments)? {
            serde_json::Value::Object(kwargs) => Ok(Self::new(expectation_type, kwargs)),
            other => Err(TermError::Serialization(format!(
                "expectation arguments must serialize to an object, got {other}"
            ))),
        }
    }

    /// The column arguments identifying which data the expectation targets.
    ///
    /// Two configs with the same type and the same column arguments describe
    /// the same expectation slot in a suite.
    pub fn column_kwargs(&self) -> Vec<(&str, &serde_json::Value)> {
        ["column", "column_A", "column_B", "column_list"]
            .into_iter()
            .filter_map(|key| self.kwargs.get(key).map(|value| (key, value)))
            .collect()
    }

    /// Returns true if `other` targets the same expectation slot.
    pub fn is_equivalent(&self, other: &ExpectationConfig) -> bool {
        self.expectation_type == other.expectation_type
            && self.column_kwargs() == other.column_kwargs()
    }
}

/// Trailing options accepted by every expectation.
///
/// Unset options fall back to the [`DefaultExpectationArgs`] of the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_format: Option<ResultFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_config: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catch_exceptions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl ExpectationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result_format(mut self, result_format: impl Into<ResultFormat>) -> Self {
        self.result_format = Some(result_format.into());
        self
    }

    pub fn with_include_config(mut self, include_config: bool) -> Self {
        self.include_config = Some(include_config);
        self
    }

    pub fn with_catch_exceptions(mut self, catch_exceptions: bool) -> Self {
        self.catch_exceptions = Some(catch_exceptions);
        self
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Defaults applied to options an expectation leaves unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultExpectationArgs {
    pub result_format: ResultFormat,
    pub include_config: bool,
    pub catch_exceptions: bool,
}

impl Default for DefaultExpectationArgs {
    fn default() -> Self {
        Self {
            result_format: ResultFormat::basic(),
            include_config: false,
            catch_exceptions: false,
        }
    }
}

impl DefaultExpectationArgs {
    pub fn with_result_format(mut self, result_format: impl Into<ResultFormat>) -> Self {
        self.result_format = result_format.into();
        self
    }

    pub fn with_include_config(mut self, include_config: bool) -> Self {
        self.include_config = include_config;
        self
    }

    pub fn with_catch_exceptions(mut self, catch_exceptions: bool) -> Self {
        self.catch_exceptions = catch_exceptions;
        self
    }

    /// Merges per-expectation options over these defaults.
    pub fn resolve(&self, options: &ExpectationOptions) -> ResolvedOptions {
        ResolvedOptions {
            result_format: options.result_format.unwrap_or(self.result_format),
            include_config: options.include_config.unwrap_or(self.include_config),
            catch_exceptions: options.catch_exceptions.unwrap_or(self.catch_exceptions),
            meta: options.meta.clone(),
        }
    }
}

/// Options after defaults have been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub result_format: ResultFormat,
    pub include_config: bool,
    pub catch_exceptions: bool,
    pub meta: Option<serde_json::Value>,
}

/// An assertion about a dataset that evaluates to a structured result.
///
/// Implementations validate their arguments before touching any data, so a
/// misconfigured expectation always fails the same way regardless of the
/// dataset. Errors raised while the predicate inspects data are reported as
/// [`TermError::PredicateFailure`].
///
/// # Examples
///
/// ```rust
/// use term_expect::prelude::*;
/// use term_expect::core::{Dataset, DefaultExpectationArgs, Expectation, Value};
/// use term_expect::expectations::ValuesToNotBeNull;
/// use term_expect::protocols::ColumnMapExpectation;
///
/// let dataset = Dataset::from_columns([("id", vec![Value::Int(1), Value::Null])])?;
/// let expectation = ColumnMapExpectation::new("id", ValuesToNotBeNull {});
/// let result = expectation.evaluate(&dataset, &DefaultExpectationArgs::default())?;
/// assert!(!result.success);
/// # Ok::<(), TermError>(())
/// ```
pub trait Expectation: Debug + Send + Sync {
    /// The registered type name, e.g. `expect_column_values_to_be_unique`.
    fn expectation_type(&self) -> &'static str;

    /// The protocol this expectation runs under.
    fn kind(&self) -> ExpectationKind;

    /// Per-expectation options.
    fn options(&self) -> &ExpectationOptions;

    /// The declarative configuration that rebuilds this expectation.
    fn config(&self) -> ExpectationConfig;

    /// Runs the protocol and formats the result, without option handling.
    fn run(&self, dataset: &Dataset, result_format: &ResultFormat) -> Result<ExpectationResult>;

    /// Evaluates the expectation, applying `catch_exceptions`,
    /// `include_config` and `meta`.
    fn evaluate(
        &self,
        dataset: &Dataset,
        defaults: &DefaultExpectationArgs,
    ) -> Result<ExpectationResult> {
        evaluate_expectation(self, dataset, defaults)
    }
}

/// A type-erased expectation.
pub type BoxedExpectation = Box<dyn Expectation>;

/// Evaluates `expectation` against `dataset` with option handling.
///
/// Argument errors always propagate. A predicate failure becomes a failed
/// result with exception info when `catch_exceptions` resolves to true.
#[instrument(skip_all, fields(
    expectation.name = expectation.expectation_type(),
    expectation.kind = ?expectation.kind(),
    dataset.rows = dataset.row_count()
))]
pub fn evaluate_expectation<E: Expectation + ?Sized>(
    expectation: &E,
    dataset: &Dataset,
    defaults: &DefaultExpectationArgs,
) -> Result<ExpectationResult> {
    let options = defaults.resolve(expectation.options());

    let mut result = match expectation.run(dataset, &options.result_format) {
        Ok(result) => result,
        Err(e) if options.catch_exceptions && e.is_catchable() => {
            warn!(
                expectation.name = expectation.expectation_type(),
                error = %e,
                "Expectation raised an error, reporting it as a failed result"
            );
            ExpectationResult::from_exception(&e)
        }
        Err(e) => return Err(e),
    };

    if options.include_config {
        result.expectation_config = Some(expectation.config());
    }
    result.meta = options.meta;

    debug!(
        expectation.name = expectation.expectation_type(),
        expectation.success = result.success,
        "Expectation evaluated"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResultFormatLevel;
    use serde_json::json;

    #[derive(Debug)]
    struct Failing {
        options: ExpectationOptions,
        error: fn() -> TermError,
    }

    impl Expectation for Failing {
        fn expectation_type(&self) -> &'static str {
            "expect_failure"
        }

        fn kind(&self) -> ExpectationKind {
            ExpectationKind::ColumnMap
        }

        fn options(&self) -> &ExpectationOptions {
            &self.options
        }

        fn config(&self) -> ExpectationConfig {
            ExpectationConfig::new("expect_failure", serde_json::Map::new())
        }

        fn run(&self, _: &Dataset, _: &ResultFormat) -> Result<ExpectationResult> {
            Err((self.error)())
        }
    }

    fn predicate_error() -> TermError {
        TermError::predicate_failure("expect_failure", TermError::Parse("boom".to_string()))
    }

    fn argument_error() -> TermError {
        TermError::invalid_argument("mostly", "out of range")
    }

    #[test]
    fn test_resolve_prefers_options() {
        let defaults = DefaultExpectationArgs::default().with_include_config(true);
        let options = ExpectationOptions::new()
            .with_result_format(ResultFormatLevel::Complete)
            .with_meta(json!({"owner": "data-eng"}));
        let resolved = defaults.resolve(&options);
        assert_eq!(resolved.result_format.level, ResultFormatLevel::Complete);
        assert!(resolved.include_config);
        assert!(!resolved.catch_exceptions);
        assert_eq!(resolved.meta, Some(json!({"owner": "data-eng"})));
    }

    #[test]
    fn test_catch_exceptions_captures_predicate_failures() {
        let expectation = Failing {
            options: ExpectationOptions::new().with_catch_exceptions(true),
            error: predicate_error,
        };
        let result = expectation
            .evaluate(&Dataset::new(), &DefaultExpectationArgs::default())
            .unwrap();
        assert!(!result.success);
        assert!(result.raised_exception());

        let uncaught = Failing {
            options: ExpectationOptions::new(),
            error: predicate_error,
        };
        assert!(uncaught
            .evaluate(&Dataset::new(), &DefaultExpectationArgs::default())
            .is_err());
    }

    #[test]
    fn test_argument_errors_always_propagate() {
        let expectation = Failing {
            options: ExpectationOptions::new().with_catch_exceptions(true),
            error: argument_error,
        };
        let err = expectation
            .evaluate(&Dataset::new(), &DefaultExpectationArgs::default())
            .unwrap_err();
        assert!(matches!(err, TermError::InvalidArgument { .. }));
    }

    #[test]
    fn test_include_config_and_meta() {
        let expectation = Failing {
            options: ExpectationOptions::new()
                .with_catch_exceptions(true)
                .with_include_config(true)
                .with_meta(json!({"note": 1})),
            error: predicate_error,
        };
        let result = expectation
            .evaluate(&Dataset::new(), &DefaultExpectationArgs::default())
            .unwrap();
        assert_eq!(
            result.expectation_config.map(|c| c.expectation_type),
            Some("expect_failure".to_string())
        );
        assert_eq!(result.meta, Some(json!({"note": 1})));
    }

    #[test]
    fn test_config_equivalence() {
        let a = ExpectationConfig::new(
            "expect_column_values_to_be_unique",
            json!({"column": "id", "mostly": 0.9}).as_object().cloned().unwrap(),
        );
        let b = ExpectationConfig::new(
            "expect_column_values_to_be_unique",
            json!({"column": "id"}).as_object().cloned().unwrap(),
        );
        let c = ExpectationConfig::new(
            "expect_column_values_to_be_unique",
            json!({"column": "name"}).as_object().cloned().unwrap(),
        );
        assert!(a.is_equivalent(&b));
        assert!(!a.is_equivalent(&c));
    }
}
