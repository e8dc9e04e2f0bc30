//! Parquet file source implementation.

use super::{check_paths, describe, file_extension, DataSource};
use crate::prelude::*;
use async_trait::async_trait;
use datafusion::prelude::{DataFrame, ParquetReadOptions, SessionContext};
use tracing::{debug, instrument};

/// A Parquet file data source; the schema comes from file metadata.
///
/// # Examples
///
/// ```rust,no_run
/// use term_expect::sources::{DataSource, ParquetSource};
///
/// # async fn example() -> term_expect::prelude::Result<()> {
/// let source = ParquetSource::from_glob("data/year=2023/*.parquet")?;
/// let dataset = source.load().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ParquetSource {
    paths: Vec<String>,
}

impl ParquetSource {
    pub fn new(path: impl Into<String>) -> Result<Self> {
        Ok(Self {
            paths: vec![path.into()],
        })
    }

    pub fn from_paths(paths: Vec<String>) -> Result<Self> {
        Ok(Self {
            paths: check_paths(paths)?,
        })
    }

    pub fn from_glob(pattern: impl Into<String>) -> Result<Self> {
        Self::from_globs(vec![pattern.into()])
    }

    pub fn from_globs(patterns: Vec<String>) -> Result<Self> {
        Self::from_paths(super::expand_globs(&patterns)?)
    }
}

#[async_trait]
impl DataSource for ParquetSource {
    #[instrument(skip(self, ctx), fields(source.kind = "parquet", source.files = self.paths.len()))]
    async fn read(&self, ctx: &SessionContext) -> Result<DataFrame> {
        let extension = file_extension(&self.paths[0], ".parquet");
        let options = ParquetReadOptions {
            file_extension: &extension,
            ..Default::default()
        };
        let frame = ctx.read_parquet(self.paths.clone(), options).await?;
        debug!(
            source.kind = "parquet",
            source.files = self.paths.len(),
            "Parquet data source read"
        );
        Ok(frame)
    }

    fn source_type(&self) -> &'static str {
        "parquet"
    }

    fn description(&self) -> String {
        describe("Parquet", &self.paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use arrow::array::{Float64Array, Int32Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use ::parquet::arrow::ArrowWriter;
    use std::fs::File;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn create_test_parquet() -> NamedTempFile {
        let file = NamedTempFile::with_suffix(".parquet").unwrap();
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("name", DataType::Utf8, false),
            Field::new("score", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(vec![1, 2, 3])),
                Arc::new(StringArray::from(vec!["Alice", "Bob", "Charlie"])),
                Arc::new(Float64Array::from(vec![Some(0.5), None, Some(2.0)])),
            ],
        )
        .unwrap();

        let file_handle = File::create(file.path()).unwrap();
        let mut writer = ArrowWriter::try_new(file_handle, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    #[tokio::test]
    async fn test_parquet_load() {
        let file = create_test_parquet();
        let source = ParquetSource::new(file.path().to_str().unwrap()).unwrap();
        assert!(source.description().contains("Parquet file"));

        let dataset = source.load().await.unwrap();
        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.column("id").unwrap().values()[2], Value::Int(3));
        assert_eq!(dataset.column("name").unwrap().values()[1], Value::from("Bob"));
        assert_eq!(
            dataset.column("score").unwrap().values(),
            &[Value::Float(0.5), Value::Null, Value::Float(2.0)]
        );
    }

    #[test]
    fn test_parquet_empty_paths() {
        assert!(ParquetSource::from_paths(vec![]).is_err());
    }
}
