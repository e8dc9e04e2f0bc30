//! Integration tests for data sources.

use std::fs::File;
use std::io::Write;
use tempfile::TempDir;
use term_expect::core::{ExpectationSuite, Value};
use term_expect::logging::LogConfig;
use term_expect::prelude::*;
use term_expect::sources::{CsvOptions, CsvSource, DataSource, JsonSource};

/// Creates a test directory with two CSV files sharing a schema.
fn create_csv_test_data() -> TempDir {
    let dir = TempDir::new().unwrap();

    let mut file1 = File::create(dir.path().join("data1.csv")).unwrap();
    writeln!(file1, "id,name,value").unwrap();
    writeln!(file1, "1,Alice,100").unwrap();
    writeln!(file1, "2,Bob,200").unwrap();
    file1.flush().unwrap();

    let mut file2 = File::create(dir.path().join("data2.csv")).unwrap();
    writeln!(file2, "id,name,value").unwrap();
    writeln!(file2, "3,Charlie,").unwrap();
    writeln!(file2, "4,Dana,400").unwrap();
    file2.flush().unwrap();

    dir
}

#[tokio::test]
async fn test_csv_glob_then_validate() {
    let dir = create_csv_test_data();
    let pattern = format!("{}/*.csv", dir.path().display());
    let source = CsvSource::from_glob(pattern).unwrap();
    assert!(source.description().contains("2 files"));

    let dataset = source
        .load_with_config(&LogConfig::production())
        .await
        .unwrap();
    assert_eq!(dataset.row_count(), 4);

    let suite: ExpectationSuite = serde_json::from_value(serde_json::json!({
        "name": "people",
        "expectations": [
            {"expectation_type": "expect_column_values_to_be_unique", "kwargs": {"column": "id"}},
            {"expectation_type": "expect_column_values_to_not_be_null", "kwargs": {"column": "value"}},
            {"expectation_type": "expect_column_values_to_be_of_type", "kwargs": {"column": "value", "type_": "int"}}
        ]
    }))
    .unwrap();
    let report = suite
        .run(
            &dataset,
            ExpectationRegistry::builtin(),
            &DefaultExpectationArgs::default(),
            false,
        )
        .unwrap();
    let verdicts: Vec<bool> = report.results.iter().map(|r| r.success).collect();
    assert_eq!(verdicts, vec![true, false, true]);
}

#[tokio::test]
async fn test_tsv_with_options() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.tsv");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "1\tAlice").unwrap();
    writeln!(file, "2\tBob").unwrap();
    file.flush().unwrap();

    let options = CsvOptions {
        has_header: false,
        ..CsvOptions::tsv()
    };
    let source = CsvSource::with_options(path.to_str().unwrap(), options).unwrap();
    let dataset = source.load().await.unwrap();
    assert_eq!(dataset.row_count(), 2);
    assert_eq!(dataset.columns()[1].values()[1], Value::from("Bob"));
}

#[tokio::test]
async fn test_ndjson_inferred_schema() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.json");
    let mut file = File::create(&path).unwrap();
    writeln!(file, r#"{{"event": "click", "count": 3}}"#).unwrap();
    writeln!(file, r#"{{"event": "view", "count": 7}}"#).unwrap();
    file.flush().unwrap();

    let dataset = JsonSource::new(path.to_str().unwrap())
        .unwrap()
        .load()
        .await
        .unwrap();
    assert_eq!(dataset.row_count(), 2);
    assert_eq!(dataset.column("count").unwrap().values()[1], Value::Int(7));
    assert_eq!(dataset.column("event").unwrap().values()[0], Value::from("click"));
}

#[test]
fn test_missing_glob_is_a_data_source_error() {
    let dir = TempDir::new().unwrap();
    let pattern = format!("{}/*.csv", dir.path().display());
    let err = CsvSource::from_glob(pattern).unwrap_err();
    assert!(matches!(err, TermError::DataSource { .. }));
}
