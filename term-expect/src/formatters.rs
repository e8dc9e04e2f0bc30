//! Rendering of validation reports.
//!
//! Formatters turn a [`ValidationReport`] into JSON for tooling, colorized
//! text for terminals, or Markdown for documents.
//!
//! # Examples
//!
//! ```rust
//! use term_expect::core::ValidationReport;
//! use term_expect::formatters::{HumanFormatter, ResultFormatter};
//!
//! let report = ValidationReport::new("empty", Vec::new());
//! let output = HumanFormatter::new().format(&report).unwrap();
//! assert!(output.contains("Validation PASSED"));
//! ```

use crate::core::{ExpectationResult, ValidationReport};
use crate::logging::truncate_field;
use crate::prelude::*;
use std::fmt::Write;

/// Configuration options for formatting reports.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatterConfig {
    /// Include the aggregate statistics block
    pub include_statistics: bool,
    /// Include details of failing expectations
    pub include_failures: bool,
    /// Include successful expectations (JSON and Markdown)
    pub include_successes: bool,
    /// Maximum number of failures to display (`None` for all)
    pub max_failures: Option<usize>,
    /// Maximum number of unexpected values shown per failure
    pub max_sample_values: usize,
    /// Maximum rendered length of a single value
    pub max_value_length: usize,
    /// Whether to use colorized output (human formatter)
    pub use_colors: bool,
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_statistics: true,
            include_failures: true,
            include_successes: true,
            max_failures: None,
            max_sample_values: 5,
            max_value_length: 64,
            use_colors: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Only the verdict and statistics.
    pub fn minimal() -> Self {
        Self {
            include_statistics: true,
            include_failures: false,
            include_successes: false,
            max_failures: Some(0),
            max_sample_values: 0,
            max_value_length: 32,
            use_colors: false,
            include_timestamps: false,
        }
    }

    pub fn detailed() -> Self {
        Self {
            max_sample_values: 20,
            max_value_length: 256,
            ..Self::default()
        }
    }

    /// Bounded, uncolored output for CI logs.
    pub fn ci() -> Self {
        Self {
            include_successes: false,
            max_failures: Some(50),
            use_colors: false,
            ..Self::default()
        }
    }

    pub fn with_statistics(mut self, include: bool) -> Self {
        self.include_statistics = include;
        self
    }

    pub fn with_failures(mut self, include: bool) -> Self {
        self.include_failures = include;
        self
    }

    pub fn with_successes(mut self, include: bool) -> Self {
        self.include_successes = include;
        self
    }

    pub fn with_max_failures(mut self, max: usize) -> Self {
        self.max_failures = Some(max);
        self
    }

    pub fn with_max_sample_values(mut self, max: usize) -> Self {
        self.max_sample_values = max;
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn with_timestamps(mut self, include: bool) -> Self {
        self.include_timestamps = include;
        self
    }

    fn failures<'a>(&self, report: &'a ValidationReport) -> (Vec<&'a ExpectationResult>, usize) {
        let all: Vec<_> = report.failed_results().collect();
        let total = all.len();
        let shown = match self.max_failures {
            Some(max) => all.into_iter().take(max).collect(),
            None => all,
        };
        (shown, total)
    }
}

/// Formats a [`ValidationReport`] into a string.
///
/// ```rust
/// use term_expect::core::ValidationReport;
/// use term_expect::formatters::ResultFormatter;
///
/// struct Verdict;
///
/// impl ResultFormatter for Verdict {
///     fn format(&self, report: &ValidationReport) -> term_expect::prelude::Result<String> {
///         Ok(if report.success { "ok".into() } else { "failed".into() })
///     }
/// }
/// ```
pub trait ResultFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String>;

    /// Formats with explicit options; the default ignores them.
    fn format_with_config(
        &self,
        report: &ValidationReport,
        _config: &FormatterConfig,
    ) -> Result<String> {
        self.format(report)
    }
}

/// `type(column=..., ...)` label of a result's configuration.
fn expectation_label(result: &ExpectationResult) -> String {
    match &result.expectation_config {
        Some(config) => {
            let columns: Vec<String> = config
                .column_kwargs()
                .into_iter()
                .map(|(key, value)| match value.as_str() {
                    Some(s) => format!("{key}={s}"),
                    None => format!("{key}={value}"),
                })
                .collect();
            format!("{}({})", config.expectation_type, columns.join(", "))
        }
        None => "<unnamed expectation>".to_string(),
    }
}

/// Up to `max` unexpected values, rendered and truncated.
fn unexpected_sample(result: &ExpectationResult, config: &FormatterConfig) -> Vec<String> {
    result
        .details()
        .and_then(|d| d.partial_unexpected_list.as_ref())
        .map(|values| {
            values
                .iter()
                .take(config.max_sample_values)
                .map(|v| truncate_field(&v.to_string(), config.max_value_length))
                .collect()
        })
        .unwrap_or_default()
}

fn failure_summary(result: &ExpectationResult) -> Option<String> {
    if let Some(info) = &result.exception_info {
        return Some(format!("raised: {}", info.exception_message));
    }
    let details = result.details()?;
    match (details.unexpected_count, details.unexpected_percent) {
        (Some(count), Some(pct)) => Some(format!("{count} unexpected ({pct:.1}%)")),
        (Some(count), None) => Some(format!("{count} unexpected")),
        _ => details
            .observed_value
            .as_ref()
            .map(|observed| format!("observed value {observed}")),
    }
}

/// Formats reports as structured JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFormatter for JsonFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &ValidationReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let filtered = filter_report(report, config);
        let json = if self.pretty {
            serde_json::to_string_pretty(&filtered)?
        } else {
            serde_json::to_string(&filtered)?
        };
        Ok(json)
    }
}

/// Formats reports for terminals.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFormatter for HumanFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &ValidationReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        let paint = |code: &str, text: String| {
            if config.use_colors {
                format!("\x1b[{code}m{text}\x1b[0m")
            } else {
                text
            }
        };

        writeln!(output)?;
        if report.success {
            writeln!(output, "✅ {}", paint("32", "Validation PASSED".to_string()))?;
        } else {
            writeln!(output, "❌ {}", paint("31", "Validation FAILED".to_string()))?;
        }
        writeln!(output)?;
        writeln!(output, "Suite: {}", report.suite_name)?;
        if config.include_timestamps {
            writeln!(output, "Timestamp: {}", report.timestamp)?;
        }

        if config.include_statistics {
            let stats = &report.statistics;
            writeln!(output)?;
            writeln!(output, "📊 Summary Statistics:")?;
            writeln!(output, "   Evaluated: {}", stats.evaluated_expectations)?;
            writeln!(
                output,
                "   ✅ Successful: {}",
                paint("32", stats.successful_expectations.to_string())
            )?;
            writeln!(
                output,
                "   ❌ Unsuccessful: {}",
                paint("31", stats.unsuccessful_expectations.to_string())
            )?;
            if let Some(pct) = stats.success_percent {
                writeln!(output, "   Success Rate: {pct:.1}%")?;
            }
        }

        let (failures, total) = config.failures(report);
        if config.include_failures && total > 0 {
            writeln!(output)?;
            writeln!(output, "🔍 Failed Expectations:")?;
            for (i, result) in failures.iter().enumerate() {
                writeln!(output)?;
                writeln!(
                    output,
                    "   {} #{}: {}",
                    paint("31", "✗".to_string()),
                    i + 1,
                    expectation_label(result)
                )?;
                if let Some(summary) = failure_summary(result) {
                    writeln!(output, "      {summary}")?;
                }
                let sample = unexpected_sample(result, config);
                if !sample.is_empty() {
                    writeln!(output, "      Sample: [{}]", sample.join(", "))?;
                }
            }
            if total > failures.len() {
                writeln!(output)?;
                writeln!(
                    output,
                    "   ... and {} more failed expectations",
                    total - failures.len()
                )?;
            }
        }

        writeln!(output)?;
        Ok(output)
    }
}

/// Formats reports as Markdown.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 2,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the base heading level, clamped to 1..=6.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 6);
        self
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFormatter for MarkdownFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &ValidationReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        let h = "#".repeat(self.heading_level as usize);

        let verdict = if report.success {
            "✅ Validation Report - PASSED"
        } else {
            "❌ Validation Report - FAILED"
        };
        writeln!(output, "{h} {verdict}")?;
        writeln!(output)?;
        writeln!(output, "**Suite:** {}", report.suite_name)?;
        if config.include_timestamps {
            writeln!(output, "**Timestamp:** {}", report.timestamp)?;
        }

        if config.include_statistics {
            let stats = &report.statistics;
            writeln!(output)?;
            writeln!(output, "{h}# Summary")?;
            writeln!(output)?;
            writeln!(output, "| Statistic | Value |")?;
            writeln!(output, "|-----------|-------|")?;
            writeln!(output, "| Evaluated | {} |", stats.evaluated_expectations)?;
            writeln!(output, "| Successful | {} |", stats.successful_expectations)?;
            writeln!(output, "| Unsuccessful | {} |", stats.unsuccessful_expectations)?;
            if let Some(pct) = stats.success_percent {
                writeln!(output, "| Success Rate | {pct:.1}% |")?;
            }
        }

        if config.include_successes || config.include_failures {
            let rows: Vec<&ExpectationResult> = report
                .results
                .iter()
                .filter(|r| {
                    if r.success {
                        config.include_successes
                    } else {
                        config.include_failures
                    }
                })
                .collect();
            if !rows.is_empty() {
                writeln!(output)?;
                writeln!(output, "{h}# Expectations")?;
                writeln!(output)?;
                writeln!(output, "| Status | Expectation | Details |")?;
                writeln!(output, "|--------|-------------|---------|")?;
                for result in rows {
                    let status = if result.success { "✅" } else { "❌" };
                    let details = if result.success {
                        String::new()
                    } else {
                        failure_summary(result).unwrap_or_default()
                    };
                    writeln!(
                        output,
                        "| {status} | `{}` | {} |",
                        expectation_label(result),
                        details.replace('|', "\\|")
                    )?;
                }
            }
        }

        Ok(output)
    }
}

/// Applies `config` to a copy of `report` for structured output.
fn filter_report(report: &ValidationReport, config: &FormatterConfig) -> ValidationReport {
    let mut filtered = report.clone();
    let mut failures_kept = 0usize;
    filtered.results.retain(|result| {
        if result.success {
            return config.include_successes;
        }
        if !config.include_failures {
            return false;
        }
        failures_kept += 1;
        config.max_failures.map_or(true, |max| failures_kept <= max)
    });
    if !config.include_timestamps {
        filtered.timestamp = String::new();
    }
    filtered
}
