//! Expectation suites and the reports produced by running them.

use super::{
    evaluate_expectation, Dataset, DefaultExpectationArgs, ExpectationConfig, ExpectationRegistry,
    ExpectationResult,
};
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// An ordered, named collection of expectation configurations.
///
/// Suites hold configurations rather than live expectations, so they can be
/// stored as JSON and rebuilt through an [`ExpectationRegistry`].
///
/// # Examples
///
/// ```rust
/// use term_expect::core::{ExpectationConfig, ExpectationSuite};
/// use serde_json::json;
///
/// let mut suite = ExpectationSuite::new("orders");
/// let config: ExpectationConfig = serde_json::from_value(json!({
///     "expectation_type": "expect_column_values_to_not_be_null",
///     "kwargs": {"column": "order_id"}
/// })).unwrap();
/// suite.add(config.clone());
/// suite.add(config);
/// assert_eq!(suite.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectationSuite {
    pub name: String,
    #[serde(default)]
    pub expectations: Vec<ExpectationConfig>,
}

impl ExpectationSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expectations: Vec::new(),
        }
    }

    /// Adds `config`, replacing an equivalent entry in place.
    ///
    /// Entries are equivalent when they share the expectation type and the
    /// column arguments.
    pub fn add(&mut self, config: ExpectationConfig) {
        match self
            .expectations
            .iter_mut()
            .find(|existing| existing.is_equivalent(&config))
        {
            Some(existing) => *existing = config,
            None => self.expectations.push(config),
        }
    }

    /// Removes every entry equivalent to `config`, returning how many were removed.
    pub fn remove(&mut self, config: &ExpectationConfig) -> usize {
        let before = self.expectations.len();
        self.expectations.retain(|existing| !existing.is_equivalent(config));
        before - self.expectations.len()
    }

    /// Entries of the given expectation type.
    pub fn find<'a>(&'a self, expectation_type: &'a str) -> impl Iterator<Item = &'a ExpectationConfig> {
        self.expectations
            .iter()
            .filter(move |c| c.expectation_type == expectation_type)
    }

    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    /// Builds and evaluates every entry against `dataset`.
    ///
    /// Results always carry their configuration. With `catch_exceptions`,
    /// an entry that fails to build or evaluate becomes a failed result with
    /// exception info; otherwise the first such error aborts the run.
    #[instrument(skip(self, dataset, registry, defaults), fields(
        suite.name = %self.name,
        suite.expectations = self.expectations.len(),
        dataset.rows = dataset.row_count()
    ))]
    pub fn run(
        &self,
        dataset: &Dataset,
        registry: &ExpectationRegistry,
        defaults: &DefaultExpectationArgs,
        catch_exceptions: bool,
    ) -> Result<ValidationReport> {
        info!(
            suite.name = %self.name,
            suite.expectations = self.expectations.len(),
            "Starting expectation suite"
        );
        let start = Instant::now();
        let defaults = defaults.clone().with_include_config(true);

        let mut results = Vec::with_capacity(self.expectations.len());
        for config in &self.expectations {
            let outcome = registry
                .build(config)
                .and_then(|expectation| evaluate_expectation(expectation.as_ref(), dataset, &defaults));
            let result = match outcome {
                Ok(result) => result,
                Err(e) if catch_exceptions => {
                    warn!(
                        expectation.name = %config.expectation_type,
                        error = %e,
                        "Expectation failed to run, recording it as a failed result"
                    );
                    let mut result = ExpectationResult::from_exception(&e);
                    result.expectation_config = Some(config.clone());
                    result
                }
                Err(e) => return Err(e),
            };
            debug!(
                expectation.name = %config.expectation_type,
                expectation.success = result.success,
                "Suite entry evaluated"
            );
            results.push(result);
        }

        let report = ValidationReport::new(self.name.clone(), results);
        info!(
            suite.name = %self.name,
            statistics.evaluated = report.statistics.evaluated_expectations,
            statistics.successful = report.statistics.successful_expectations,
            statistics.unsuccessful = report.statistics.unsuccessful_expectations,
            duration_ms = start.elapsed().as_millis() as u64,
            suite.result = %if report.success { "passed" } else { "failed" },
            "Expectation suite completed"
        );
        Ok(report)
    }
}

/// Aggregate counts over a suite run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationStatistics {
    pub evaluated_expectations: usize,
    pub successful_expectations: usize,
    pub unsuccessful_expectations: usize,
    /// `None` when nothing was evaluated.
    pub success_percent: Option<f64>,
}

impl ValidationStatistics {
    pub fn from_results(results: &[ExpectationResult]) -> Self {
        let evaluated = results.len();
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            evaluated_expectations: evaluated,
            successful_expectations: successful,
            unsuccessful_expectations: evaluated - successful,
            success_percent: super::format::percent(successful, evaluated),
        }
    }
}

/// The outcome of running an [`ExpectationSuite`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub suite_name: String,
    /// RFC 3339 time at which the report was assembled.
    pub timestamp: String,
    pub success: bool,
    pub statistics: ValidationStatistics,
    pub results: Vec<ExpectationResult>,
}

impl ValidationReport {
    pub fn new(suite_name: impl Into<String>, results: Vec<ExpectationResult>) -> Self {
        let statistics = ValidationStatistics::from_results(&results);
        Self {
            suite_name: suite_name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            success: statistics.unsuccessful_expectations == 0,
            statistics,
            results,
        }
    }

    pub fn failed_results(&self) -> impl Iterator<Item = &ExpectationResult> {
        self.results.iter().filter(|r| !r.success)
    }
}
