//! A dataset bundled with the expectations recorded against it.
//!
//! [`ValidationContext`] composes an immutable, shared [`Dataset`] with an
//! in-memory [`ExpectationSuite`]. Each call to
//! [`ValidationContext::expect`] evaluates one expectation immediately and
//! records its configuration, so the suite can later be re-run with
//! [`ValidationContext::validate`] or carried to derived datasets.

use super::{
    evaluate_expectation, Dataset, DefaultExpectationArgs, Expectation, ExpectationRegistry,
    ExpectationResult, ExpectationSuite, ValidationReport,
};
use crate::logging::LogConfig;
use crate::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// How a child dataset was produced from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationKind {
    Filter,
    Sample,
    Slice,
    Copy,
    Join,
    Concat,
    Merge,
}

impl DerivationKind {
    /// Row subsets and copies keep the parent's expectations; combinations
    /// with other data start from an empty suite.
    pub fn propagates_suite(&self) -> bool {
        matches!(self, Self::Filter | Self::Sample | Self::Slice | Self::Copy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Sample => "sample",
            Self::Slice => "slice",
            Self::Copy => "copy",
            Self::Join => "join",
            Self::Concat => "concat",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for DerivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The suite a child dataset inherits from `parent`.
pub fn derive_suite(kind: DerivationKind, parent: &ExpectationSuite) -> ExpectationSuite {
    if kind.propagates_suite() {
        parent.clone()
    } else {
        ExpectationSuite::new(parent.name.clone())
    }
}

/// Settings of a [`ValidationContext`].
///
/// # Examples
///
/// ```rust
/// use term_expect::core::{ContextConfig, DefaultExpectationArgs, ResultFormat};
///
/// let config = ContextConfig::default()
///     .with_defaults(DefaultExpectationArgs::default().with_result_format(ResultFormat::summary()))
///     .with_discard_subset_failing_expectations(true);
/// assert!(config.discard_subset_failing_expectations);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Defaults for options an expectation leaves unset.
    pub defaults: DefaultExpectationArgs,
    /// Drop inherited expectations that fail on a derived dataset.
    pub discard_subset_failing_expectations: bool,
    /// Record failures while re-running the suite instead of aborting.
    pub catch_exceptions: bool,
    pub log: LogConfig,
}

impl ContextConfig {
    /// Summary results, caught failures and verbose logging.
    pub fn exploratory() -> Self {
        Self {
            defaults: DefaultExpectationArgs::default()
                .with_result_format(super::ResultFormat::summary())
                .with_catch_exceptions(true),
            discard_subset_failing_expectations: false,
            catch_exceptions: true,
            log: LogConfig::verbose(),
        }
    }

    pub fn with_defaults(mut self, defaults: DefaultExpectationArgs) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_discard_subset_failing_expectations(mut self, discard: bool) -> Self {
        self.discard_subset_failing_expectations = discard;
        self
    }

    pub fn with_catch_exceptions(mut self, catch_exceptions: bool) -> Self {
        self.catch_exceptions = catch_exceptions;
        self
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

/// A dataset plus the expectations recorded against it.
///
/// Recorded configurations are rebuilt from the context's registry when the
/// suite is re-run or checked against a derived dataset.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    dataset: Arc<Dataset>,
    config: ContextConfig,
    suite: ExpectationSuite,
    registry: Arc<ExpectationRegistry>,
}

impl ValidationContext {
    pub fn new(dataset: Dataset) -> Self {
        Self::from_shared(Arc::new(dataset))
    }

    /// Wraps a dataset shared with other contexts or threads.
    pub fn from_shared(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            config: ContextConfig::default(),
            suite: ExpectationSuite::new("default"),
            registry: ExpectationRegistry::shared_builtin(),
        }
    }

    /// Builds recorded expectations from `registry` instead of the built-ins.
    pub fn with_registry(mut self, registry: Arc<ExpectationRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_suite(mut self, suite: ExpectationSuite) -> Self {
        self.suite = suite;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn shared_dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn registry(&self) -> &ExpectationRegistry {
        &self.registry
    }

    pub fn suite(&self) -> &ExpectationSuite {
        &self.suite
    }

    pub fn suite_mut(&mut self) -> &mut ExpectationSuite {
        &mut self.suite
    }

    /// Evaluates `expectation` now and records its configuration.
    ///
    /// An equivalent entry already in the suite is replaced. Errors that are
    /// not caught leave the suite unchanged.
    pub fn expect(&mut self, expectation: &dyn Expectation) -> Result<ExpectationResult> {
        let result = evaluate_expectation(expectation, &self.dataset, &self.config.defaults)?;
        crate::log_expectation!(
            self.config.log,
            expectation.name = expectation.expectation_type(),
            expectation.success = result.success,
            suite.size = self.suite.len(),
            "Recording expectation"
        );
        self.suite.add(expectation.config());
        Ok(result)
    }

    /// Creates the context of a dataset derived from this one.
    ///
    /// The child inherits the suite per [`derive_suite`]. With
    /// `discard_subset_failing_expectations`, inherited entries that fail
    /// (or cannot run) on the child are dropped.
    #[instrument(skip(self, dataset), fields(derivation = %kind, rows = dataset.row_count()))]
    pub fn derive(&self, kind: DerivationKind, dataset: Dataset) -> Result<ValidationContext> {
        let mut suite = derive_suite(kind, &self.suite);
        if kind.propagates_suite() && self.config.discard_subset_failing_expectations {
            crate::perf_debug!(
                self.config.log,
                inherited = suite.len(),
                rows = dataset.row_count(),
                "Checking inherited expectations on the derived dataset"
            );
            let report = suite.run(&dataset, &self.registry, &self.config.defaults, true)?;
            let before = suite.len();
            suite.expectations = suite
                .expectations
                .into_iter()
                .zip(&report.results)
                .filter(|(_, result)| result.success)
                .map(|(config, _)| config)
                .collect();
            info!(
                discarded = before - suite.len(),
                kept = suite.len(),
                "Discarded expectations failing on the derived dataset"
            );
        }
        Ok(ValidationContext {
            dataset: Arc::new(dataset),
            config: self.config.clone(),
            suite,
            registry: Arc::clone(&self.registry),
        })
    }

    /// Rows where `keep` is true.
    pub fn filter_rows(&self, keep: &[bool]) -> Result<ValidationContext> {
        self.derive(DerivationKind::Filter, self.dataset.filter_rows(keep)?)
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Result<ValidationContext> {
        self.derive(DerivationKind::Slice, self.dataset.head(n))
    }

    /// `n` rows drawn without replacement, in their original order.
    pub fn sample(&self, n: usize, seed: u64) -> Result<ValidationContext> {
        let rows = self.dataset.row_count();
        if n > rows {
            return Err(TermError::invalid_argument(
                "n",
                format!("cannot sample {n} rows from a dataset of {rows}"),
            ));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let mut keep = vec![false; rows];
        for position in rand::seq::index::sample(&mut rng, rows, n).into_vec() {
            keep[position] = true;
        }
        self.derive(DerivationKind::Sample, self.dataset.filter_rows(&keep)?)
    }

    /// An independent copy sharing nothing but the data.
    pub fn copy(&self) -> Result<ValidationContext> {
        self.derive(DerivationKind::Copy, (*self.dataset).clone())
    }

    /// This dataset's rows followed by `other`'s.
    pub fn concat(&self, other: &Dataset) -> Result<ValidationContext> {
        self.derive(DerivationKind::Concat, self.dataset.concat(other)?)
    }

    /// Re-runs the recorded suite with the context's registry.
    pub fn validate(&self) -> Result<ValidationReport> {
        self.validate_with(&self.registry)
    }

    /// Re-runs the recorded suite, building expectations from `registry`.
    pub fn validate_with(&self, registry: &ExpectationRegistry) -> Result<ValidationReport> {
        self.suite.run(
            &self.dataset,
            registry,
            &self.config.defaults,
            self.config.catch_exceptions,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::expectations::{ValuesToBeBetween, ValuesToBeUnique, ValuesToNotBeNull};
    use crate::protocols::ColumnMapExpectation;

    fn context() -> ValidationContext {
        let dataset = Dataset::from_columns([
            ("id", vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(3)]),
            ("score", vec![Value::Int(10), Value::Int(20), Value::Null, Value::Int(90)]),
        ])
        .unwrap();
        ValidationContext::new(dataset)
    }

    #[test]
    fn test_expect_records_configuration() {
        let mut ctx = context();
        let result = ctx
            .expect(&ColumnMapExpectation::new("id", ValuesToBeUnique {}))
            .unwrap();
        assert!(!result.success);
        ctx.expect(&ColumnMapExpectation::new("id", ValuesToBeUnique {}).with_mostly(0.5))
            .unwrap();
        assert_eq!(ctx.suite().len(), 1);
        assert_eq!(ctx.suite().expectations[0].kwargs["mostly"], 0.5);
    }

    #[test]
    fn test_derivation_rules() {
        let mut parent = ExpectationSuite::new("p");
        parent.add(ColumnMapExpectation::new("id", ValuesToNotBeNull {}).config());
        for kind in [
            DerivationKind::Filter,
            DerivationKind::Sample,
            DerivationKind::Slice,
            DerivationKind::Copy,
        ] {
            assert_eq!(derive_suite(kind, &parent).len(), 1, "{kind}");
        }
        for kind in [DerivationKind::Join, DerivationKind::Concat, DerivationKind::Merge] {
            assert!(derive_suite(kind, &parent).is_empty(), "{kind}");
        }
    }

    #[test]
    fn test_subset_keeps_or_discards_failing() {
        let mut ctx = context();
        ctx.expect(&ColumnMapExpectation::new("id", ValuesToBeUnique {}))
            .unwrap();
        ctx.expect(&ColumnMapExpectation::new(
            "score",
            ValuesToBeBetween::new(Some(Value::Int(0)), Some(Value::Int(50))),
        ))
        .unwrap();

        let child = ctx.head(3).unwrap();
        assert_eq!(child.suite().len(), 2);
        assert_eq!(child.dataset().row_count(), 3);

        let strict = context()
            .with_suite(ctx.suite().clone())
            .with_config(ContextConfig::default().with_discard_subset_failing_expectations(true));
        let child = strict.filter_rows(&[false, true, true, true]).unwrap();
        assert_eq!(child.suite().len(), 0);
        let child = strict.head(2).unwrap();
        assert_eq!(child.suite().len(), 2);
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Positive {}

    impl crate::protocols::ColumnMapPredicate for Positive {
        const NAME: &'static str = "expect_column_values_to_be_positive";

        fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
            Ok(values
                .iter()
                .map(|v| v.as_f64().is_some_and(|x| x > 0.0))
                .collect())
        }
    }

    #[test]
    fn test_custom_registry_survives_derivation() {
        let mut registry = ExpectationRegistry::builtin().clone();
        registry.register_column_map::<Positive>();
        let mut ctx = context()
            .with_registry(Arc::new(registry))
            .with_config(ContextConfig::default().with_discard_subset_failing_expectations(true));
        assert!(ctx
            .expect(&ColumnMapExpectation::new("score", Positive {}))
            .unwrap()
            .success);
        assert!(ctx.validate().unwrap().success);

        let head = ctx.head(2).unwrap();
        assert_eq!(head.suite().len(), 1);
        assert!(head.registry().contains("expect_column_values_to_be_positive"));
        let filtered = ctx.filter_rows(&[true, false, true, true]).unwrap();
        assert_eq!(filtered.suite().len(), 1);
        assert!(filtered.validate().unwrap().success);
    }

    #[test]
    fn test_builtin_registry_drops_unknown_types_on_discard() {
        let mut ctx = context()
            .with_config(ContextConfig::default().with_discard_subset_failing_expectations(true));
        ctx.expect(&ColumnMapExpectation::new("score", Positive {}))
            .unwrap();
        assert!(ctx.head(2).unwrap().suite().is_empty());
    }

    #[test]
    fn test_concat_starts_empty() {
        let mut ctx = context();
        ctx.expect(&ColumnMapExpectation::new("id", ValuesToNotBeNull {}))
            .unwrap();
        let other = ctx.dataset().clone();
        let combined = ctx.concat(&other).unwrap();
        assert!(combined.suite().is_empty());
        assert_eq!(combined.dataset().row_count(), 8);
    }

    #[test]
    fn test_sample_is_seeded() {
        let ctx = context();
        let a = ctx.sample(2, 42).unwrap();
        let b = ctx.sample(2, 42).unwrap();
        assert_eq!(a.dataset().index(), b.dataset().index());
        assert_eq!(a.dataset().row_count(), 2);
        assert!(ctx.sample(5, 1).is_err());
    }

    #[test]
    fn test_validate_replays_suite() {
        let mut ctx = context();
        ctx.expect(&ColumnMapExpectation::new("id", ValuesToBeUnique {}))
            .unwrap();
        ctx.expect(&ColumnMapExpectation::new("score", ValuesToNotBeNull {}).with_mostly(0.7))
            .unwrap();
        let report = ctx.validate().unwrap();
        assert_eq!(report.statistics.evaluated_expectations, 2);
        assert_eq!(report.statistics.successful_expectations, 1);
        assert!(!report.success);
    }
}
