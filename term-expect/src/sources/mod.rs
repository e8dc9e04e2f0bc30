//! File data sources.
//!
//! Sources read CSV, Parquet and NDJSON files through DataFusion and convert
//! the collected record batches into a [`Dataset`]. Every file source accepts
//! one path, several paths, or glob patterns.

use crate::core::Dataset;
use crate::logging::LogConfig;
use crate::prelude::*;
use async_trait::async_trait;
use datafusion::prelude::{DataFrame, SessionContext};
use std::fmt::Debug;
use std::time::Instant;
use tracing::instrument;

mod convert;
mod csv;
mod json;
mod parquet;

pub use convert::record_batches_to_dataset;
pub use csv::{CsvOptions, CsvSource};
pub use json::{JsonOptions, JsonSource};
pub use parquet::ParquetSource;

/// A source of tabular data that can be validated.
///
/// # Examples
///
/// ```rust,no_run
/// use term_expect::sources::{CsvSource, DataSource};
///
/// # async fn example() -> term_expect::prelude::Result<()> {
/// let source = CsvSource::new("data/users.csv")?;
/// let dataset = source.load().await?;
/// println!("{} rows from {}", dataset.row_count(), source.description());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DataSource: Debug + Send + Sync {
    /// Reads the source into a DataFusion data frame.
    async fn read(&self, ctx: &SessionContext) -> Result<DataFrame>;

    /// Short label of the source kind, such as `"csv"`.
    fn source_type(&self) -> &'static str;

    /// Returns a human-readable description of this data source.
    fn description(&self) -> String;

    /// Loads the whole source into memory.
    async fn load(&self) -> Result<Dataset> {
        self.load_with_config(&LogConfig::default()).await
    }

    /// Loads the whole source into memory, logging per `log`.
    #[instrument(skip(self, log), fields(source.kind = self.source_type()))]
    async fn load_with_config(&self, log: &LogConfig) -> Result<Dataset> {
        let start = Instant::now();
        crate::log_data_op!(
            log,
            source.kind = self.source_type(),
            source.description = %log.truncate(&self.description()),
            "Loading data source"
        );
        let ctx = SessionContext::new();
        let batches = self.read(&ctx).await?.collect().await?;
        crate::perf_debug!(
            log,
            batches = batches.len(),
            batch_rows = ?batches.iter().map(|b| b.num_rows()).collect::<Vec<_>>(),
            "Collected record batches"
        );
        let dataset = record_batches_to_dataset(&batches)?;
        crate::log_data_op!(
            log,
            source.kind = self.source_type(),
            dataset.rows = dataset.row_count(),
            dataset.columns = dataset.columns().len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Data source loaded"
        );
        Ok(dataset)
    }
}

/// Expands glob patterns into the matching file paths.
pub(crate) fn expand_globs(patterns: &[String]) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let matches = glob::glob(pattern).map_err(|e| {
            TermError::Configuration(format!("Invalid glob pattern '{pattern}': {e}"))
        })?;

        for entry in matches {
            let path = entry.map_err(|e| TermError::Io(e.into_error()))?;
            if path.is_file() {
                if let Some(path_str) = path.to_str() {
                    paths.push(path_str.to_string());
                }
            }
        }
    }

    if paths.is_empty() {
        return Err(TermError::data_source(
            "file",
            "No files found matching glob patterns",
        ));
    }
    paths.sort();
    Ok(paths)
}

/// Validates a list of source paths.
pub(crate) fn check_paths(paths: Vec<String>) -> Result<Vec<String>> {
    if paths.is_empty() {
        return Err(TermError::Configuration(
            "At least one path must be provided".to_string(),
        ));
    }
    Ok(paths)
}

/// The `.ext` suffix DataFusion should accept for `path`.
pub(crate) fn file_extension(path: &str, default: &str) -> String {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| default.to_string())
}

pub(crate) fn describe(kind: &str, paths: &[String]) -> String {
    match paths {
        [path] => format!("{kind} file: {path}"),
        _ => format!("{kind} files: {} files", paths.len()),
    }
}
