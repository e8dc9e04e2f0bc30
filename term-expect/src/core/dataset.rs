//! In-memory columnar storage: columns, datasets and row-aligned tables.
//!
//! Every column carries its values together with the row identifiers of the
//! dataset it came from, so filtered subsets can still report the original
//! rows of unexpected values.

use super::Value;
use crate::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Identifier of a row in the dataset a column was taken from.
pub type RowId = usize;

/// An ordered sequence of values with a parallel sequence of row identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    name: String,
    values: Vec<Value>,
    index: Vec<RowId>,
}

impl Column {
    /// Creates a column whose row identifiers are the positions `0..len`.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let index = (0..values.len()).collect();
        Self {
            name: name.into(),
            values,
            index,
        }
    }

    /// Creates a column with explicit row identifiers.
    pub fn with_index(name: impl Into<String>, values: Vec<Value>, index: Vec<RowId>) -> Result<Self> {
        let name = name.into();
        if values.len() != index.len() {
            return Err(TermError::length_mismatch(
                format!("values of column '{name}'"),
                values.len(),
                "row index",
                index.len(),
            ));
        }
        Ok(Self {
            name,
            values,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn index(&self) -> &[RowId] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(row id, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &Value)> {
        self.index.iter().copied().zip(self.values.iter())
    }

    /// Keeps the positions where `keep` is true, preserving order and row ids.
    pub fn filter(&self, keep: &[bool]) -> Result<Column> {
        if keep.len() != self.len() {
            return Err(TermError::length_mismatch(
                format!("column '{}'", self.name),
                self.len(),
                "row mask",
                keep.len(),
            ));
        }
        let (values, index) = self
            .iter()
            .zip(keep)
            .filter(|(_, keep)| **keep)
            .map(|((row, value), _)| (value.clone(), row))
            .unzip();
        Ok(Column {
            name: self.name.clone(),
            values,
            index,
        })
    }
}

/// A row-aligned group of columns sharing one row index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
    index: Vec<RowId>,
}

impl Table {
    /// Builds a table from columns that must share the same row index.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let index = columns
            .first()
            .map(|c| c.index().to_vec())
            .unwrap_or_default();
        for column in &columns {
            if column.index() != index.as_slice() {
                return Err(TermError::length_mismatch(
                    format!("column '{}'", column.name()),
                    column.len(),
                    "table row index",
                    index.len(),
                ));
            }
        }
        Ok(Self { columns, index })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn index(&self) -> &[RowId] {
        &self.index
    }

    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the values of row `position` in column order.
    pub fn row(&self, position: usize) -> Vec<&Value> {
        self.columns.iter().map(|c| &c.values()[position]).collect()
    }

    /// Iterates over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.num_rows()).map(|position| self.row(position))
    }

    /// Returns row `position` as a mapping from column name to value.
    pub fn row_record(&self, position: usize) -> BTreeMap<String, Value> {
        self.columns
            .iter()
            .map(|c| (c.name().to_string(), c.values()[position].clone()))
            .collect()
    }

    /// Keeps the rows where `keep` is true.
    pub fn filter(&self, keep: &[bool]) -> Result<Table> {
        let columns = self
            .columns
            .iter()
            .map(|c| c.filter(keep))
            .collect::<Result<Vec<_>>>()?;
        let index = self
            .index
            .iter()
            .zip(keep)
            .filter(|(_, keep)| **keep)
            .map(|(row, _)| *row)
            .collect();
        Ok(Table { columns, index })
    }
}

/// A named collection of equally long columns with one shared row index.
///
/// The dataset is read-only during evaluation; every derived view is a new
/// dataset.
///
/// # Examples
///
/// ```rust
/// use term_expect::core::{Dataset, Value};
///
/// let dataset = Dataset::builder()
///     .column("id", vec![Value::Int(1), Value::Int(2)])
///     .column("name", vec![Value::from("a"), Value::Null])
///     .build()
///     .unwrap();
/// assert_eq!(dataset.row_count(), 2);
/// assert_eq!(dataset.column("name").unwrap().values()[1], Value::Null);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    columns: Vec<Column>,
    index: Vec<RowId>,
}

impl Dataset {
    /// Creates an empty dataset without columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a dataset column by column.
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    /// Creates a dataset from named value vectors, indexed `0..len`.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let mut builder = Self::builder();
        for (name, values) in columns {
            builder = builder.column(name, values);
        }
        builder.build()
    }

    /// Replaces the row identifiers of every column.
    pub fn with_index(self, index: Vec<RowId>) -> Result<Self> {
        if index.len() != self.row_count() && !self.columns.is_empty() {
            return Err(TermError::length_mismatch(
                "dataset rows",
                self.row_count(),
                "row index",
                index.len(),
            ));
        }
        let columns = self
            .columns
            .into_iter()
            .map(|c| Column::with_index(c.name, c.values, index.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns, index })
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn index(&self) -> &[RowId] {
        &self.index
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| TermError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    /// Assembles the named columns, in the given order, into a row-aligned table.
    pub fn table<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let columns = names
            .iter()
            .map(|name| self.column(name.as_ref()).cloned())
            .collect::<Result<Vec<_>>>()?;
        Table::new(columns)
    }

    /// Keeps the rows where `keep` is true.
    pub fn filter_rows(&self, keep: &[bool]) -> Result<Dataset> {
        if keep.len() != self.row_count() {
            return Err(TermError::length_mismatch(
                "dataset rows",
                self.row_count(),
                "row mask",
                keep.len(),
            ));
        }
        let columns = self
            .columns
            .iter()
            .map(|c| c.filter(keep))
            .collect::<Result<Vec<_>>>()?;
        let index = self
            .index
            .iter()
            .zip(keep)
            .filter(|(_, keep)| **keep)
            .map(|(row, _)| *row)
            .collect();
        Ok(Dataset { columns, index })
    }

    /// Keeps the first `n` rows.
    pub fn head(&self, n: usize) -> Dataset {
        let keep: Vec<bool> = (0..self.row_count()).map(|i| i < n).collect();
        // The mask always has the dataset's length.
        self.filter_rows(&keep).unwrap_or_default()
    }

    /// Appends the rows of `other`, which must have the same column names.
    ///
    /// Row identifiers are renumbered `0..len` in the result.
    pub fn concat(&self, other: &Dataset) -> Result<Dataset> {
        if self.column_names() != other.column_names() {
            return Err(TermError::invalid_argument(
                "other",
                format!(
                    "cannot concatenate datasets with columns {:?} and {:?}",
                    self.column_names(),
                    other.column_names()
                ),
            ));
        }
        let mut builder = Dataset::builder();
        for (left, right) in self.columns.iter().zip(&other.columns) {
            let values = left
                .values()
                .iter()
                .chain(right.values())
                .cloned()
                .collect();
            builder = builder.column(left.name(), values);
        }
        builder.build()
    }
}

/// Builder for [`Dataset`].
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    columns: Vec<(String, Vec<Value>)>,
    index: Option<Vec<RowId>>,
}

impl DatasetBuilder {
    /// Adds a column.
    pub fn column(mut self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.columns.push((name.into(), values));
        self
    }

    /// Sets explicit row identifiers.
    pub fn index(mut self, index: Vec<RowId>) -> Self {
        self.index = Some(index);
        self
    }

    /// Builds the dataset, checking that all columns have the same length.
    pub fn build(self) -> Result<Dataset> {
        let row_count = self.columns.first().map_or(0, |(_, values)| values.len());
        for (name, values) in &self.columns {
            if values.len() != row_count {
                return Err(TermError::length_mismatch(
                    format!("column '{name}'"),
                    values.len(),
                    format!("column '{}'", self.columns[0].0),
                    row_count,
                ));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for (name, _) in &self.columns {
            if !seen.insert(name.as_str()) {
                return Err(TermError::invalid_argument(
                    "column",
                    format!("duplicate column name '{name}'"),
                ));
            }
        }

        let index = self.index.unwrap_or_else(|| (0..row_count).collect());
        let columns = self
            .columns
            .into_iter()
            .map(|(name, values)| Column::with_index(name, values, index.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Dataset { columns, index })
    }
}
