//! Line-delimited JSON file source implementation.

use super::{check_paths, describe, file_extension, DataSource};
use crate::prelude::*;
use arrow::datatypes::Schema;
use async_trait::async_trait;
use datafusion::prelude::{DataFrame, NdJsonReadOptions, SessionContext};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Options for configuring NDJSON file reading.
#[derive(Debug, Clone)]
pub struct JsonOptions {
    /// Schema to use (if None, will be inferred)
    pub schema: Option<Arc<Schema>>,
    /// Maximum records to read for schema inference
    pub schema_infer_max_records: usize,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            schema: None,
            schema_infer_max_records: 1000,
        }
    }
}

/// An NDJSON (one object per line) file data source.
///
/// # Examples
///
/// ```rust,no_run
/// use term_expect::sources::{DataSource, JsonSource};
///
/// # async fn example() -> term_expect::prelude::Result<()> {
/// let dataset = JsonSource::new("data/events.ndjson")?.load().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JsonSource {
    paths: Vec<String>,
    options: JsonOptions,
}

impl JsonSource {
    pub fn new(path: impl Into<String>) -> Result<Self> {
        Self::with_options(path, JsonOptions::default())
    }

    pub fn with_options(path: impl Into<String>, options: JsonOptions) -> Result<Self> {
        Ok(Self {
            paths: vec![path.into()],
            options,
        })
    }

    pub fn from_paths(paths: Vec<String>) -> Result<Self> {
        Ok(Self {
            paths: check_paths(paths)?,
            options: JsonOptions::default(),
        })
    }

    pub fn from_glob(pattern: impl Into<String>) -> Result<Self> {
        Self::from_paths(super::expand_globs(&[pattern.into()])?)
    }

    pub fn with_custom_options(mut self, options: JsonOptions) -> Self {
        self.options = options;
        self
    }
}

#[async_trait]
impl DataSource for JsonSource {
    #[instrument(skip(self, ctx), fields(source.kind = "json", source.files = self.paths.len()))]
    async fn read(&self, ctx: &SessionContext) -> Result<DataFrame> {
        let extension = file_extension(&self.paths[0], ".json");
        let options = NdJsonReadOptions {
            file_extension: &extension,
            schema: self.options.schema.as_deref(),
            schema_infer_max_records: self.options.schema_infer_max_records,
            ..Default::default()
        };
        let frame = ctx.read_json(self.paths.clone(), options).await?;
        debug!(
            source.kind = "json",
            source.files = self.paths.len(),
            "NDJSON data source read"
        );
        Ok(frame)
    }

    fn source_type(&self) -> &'static str {
        "json"
    }

    fn description(&self) -> String {
        describe("NDJSON", &self.paths)
    }
}
