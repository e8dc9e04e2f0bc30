//! CSV file source implementation.

use super::{check_paths, describe, file_extension, DataSource};
use crate::prelude::*;
use async_trait::async_trait;
use datafusion::prelude::{CsvReadOptions, DataFrame, SessionContext};
use tracing::{debug, instrument};

/// Options for configuring CSV file reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Maximum records to read for schema inference
    pub schema_infer_max_records: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            schema_infer_max_records: 1000,
        }
    }
}

impl CsvOptions {
    /// Tab-separated values with a header row.
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }
}

/// A CSV file data source with schema inference.
///
/// # Examples
///
/// ```rust,no_run
/// use term_expect::sources::{CsvOptions, CsvSource};
///
/// # async fn example() -> term_expect::prelude::Result<()> {
/// let source = CsvSource::new("data/users.csv")?;
///
/// let options = CsvOptions {
///     delimiter: b'\t',
///     has_header: false,
///     ..Default::default()
/// };
/// let source = CsvSource::with_options("data/users.tsv", options)?;
///
/// let source = CsvSource::from_glob("data/*.csv")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    paths: Vec<String>,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a new CSV source from a single file path.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        Self::with_options(path, CsvOptions::default())
    }

    pub fn with_options(path: impl Into<String>, options: CsvOptions) -> Result<Self> {
        Ok(Self {
            paths: vec![path.into()],
            options,
        })
    }

    /// Creates a CSV source from multiple file paths sharing one schema.
    pub fn from_paths(paths: Vec<String>) -> Result<Self> {
        Ok(Self {
            paths: check_paths(paths)?,
            options: CsvOptions::default(),
        })
    }

    pub fn from_glob(pattern: impl Into<String>) -> Result<Self> {
        Self::from_globs(vec![pattern.into()])
    }

    pub fn from_globs(patterns: Vec<String>) -> Result<Self> {
        Self::from_paths(super::expand_globs(&patterns)?)
    }

    pub fn with_custom_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }
}

#[async_trait]
impl DataSource for CsvSource {
    #[instrument(skip(self, ctx), fields(
        source.kind = "csv",
        source.files = self.paths.len(),
        csv.delimiter = %self.options.delimiter as char,
        csv.has_header = self.options.has_header
    ))]
    async fn read(&self, ctx: &SessionContext) -> Result<DataFrame> {
        let extension = file_extension(&self.paths[0], ".csv");
        let csv_options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(&extension);

        let frame = ctx.read_csv(self.paths.clone(), csv_options).await?;
        debug!(
            source.kind = "csv",
            source.files = self.paths.len(),
            "CSV data source read"
        );
        Ok(frame)
    }

    fn source_type(&self) -> &'static str {
        "csv"
    }

    fn description(&self) -> String {
        describe("CSV", &self.paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "id,name,age").unwrap();
        writeln!(file, "1,Alice,30").unwrap();
        writeln!(file, "2,Bob,").unwrap();
        writeln!(file, "3,Charlie,35").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_csv_source_with_options() {
        let source = CsvSource::with_options("users.tsv", CsvOptions::tsv()).unwrap();
        assert_eq!(source.options().delimiter, b'\t');
        assert!(source.options().has_header);
        assert!(source.description().contains("CSV file"));
        assert!(CsvSource::from_paths(vec![]).is_err());
    }

    #[tokio::test]
    async fn test_csv_load() {
        let file = create_test_csv();
        let source = CsvSource::new(file.path().to_str().unwrap()).unwrap();
        let dataset = source.load().await.unwrap();

        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.column_names(), vec!["id", "name", "age"]);
        assert_eq!(dataset.column("id").unwrap().values()[0], Value::Int(1));
        assert_eq!(dataset.column("name").unwrap().values()[2], Value::from("Charlie"));
        assert_eq!(dataset.column("age").unwrap().values()[1], Value::Null);
    }

    #[tokio::test]
    async fn test_csv_multiple_files() {
        let file1 = create_test_csv();
        let file2 = create_test_csv();
        let source = CsvSource::from_paths(vec![
            file1.path().to_str().unwrap().to_string(),
            file2.path().to_str().unwrap().to_string(),
        ])
        .unwrap();
        assert!(source.description().contains("2 files"));

        let dataset = source.load().await.unwrap();
        assert_eq!(dataset.row_count(), 6);
        assert_eq!(dataset.index().last(), Some(&5));
    }
}
