//! Multi-column map expectations.

use super::{check_verdicts, impl_option_setters, predicate_error, recorded_config};
use crate::core::{
    calc_map_expectation_success, format_map_output, validate_mostly, Dataset, Expectation,
    ExpectationConfig, ExpectationKind, ExpectationOptions, ExpectationResult, MapOutput,
    MultiIgnorePolicy, ResultFormat, Table, UnexpectedValue,
};
use crate::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, instrument};

/// A per-row predicate over a row-aligned table of columns.
pub trait MulticolumnMapPredicate:
    Debug + Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Registered expectation type name.
    const NAME: &'static str;

    /// Checks the predicate arguments before any data is read.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Returns one verdict per row of `table`.
    fn map(&self, table: &Table) -> Result<Vec<bool>>;
}

/// Runs the multi-column map protocol on `table`.
///
/// Unexpected rows are reported as column name to value mappings together
/// with their original row ids.
#[instrument(skip_all, fields(
    expectation.name = P::NAME,
    columns = table.num_columns(),
    ignore_row_if = %ignore_row_if
))]
pub fn run_multicolumn_map<P: MulticolumnMapPredicate>(
    table: &Table,
    predicate: &P,
    ignore_row_if: MultiIgnorePolicy,
    mostly: Option<f64>,
    result_format: &ResultFormat,
) -> Result<ExpectationResult> {
    validate_mostly(mostly)?;
    predicate.validate()?;

    let mask = ignore_row_if.mask(table);
    let kept = table.filter(&mask.keep())?;

    let verdicts = predicate.map(&kept).map_err(predicate_error(P::NAME))?;
    check_verdicts(P::NAME, &verdicts, kept.num_rows())?;

    let success_count = verdicts.iter().filter(|ok| **ok).count();
    let verdict = calc_map_expectation_success(success_count, kept.num_rows(), mostly)?;

    let (unexpected_list, unexpected_index_list): (Vec<_>, Vec<_>) = verdicts
        .iter()
        .enumerate()
        .filter(|(_, ok)| !**ok)
        .map(|(position, _)| {
            (
                UnexpectedValue::Row(kept.row_record(position)),
                kept.index()[position],
            )
        })
        .unzip();

    debug!(
        element_count = table.num_rows(),
        missing_count = mask.missing_count(),
        unexpected_count = unexpected_list.len(),
        success = verdict.success,
        "Multicolumn map evaluated"
    );

    Ok(format_map_output(
        result_format,
        MapOutput {
            success: verdict.success,
            element_count: table.num_rows(),
            nonmissing_count: kept.num_rows(),
            unexpected_list,
            unexpected_index_list,
        },
        false,
    ))
}

/// An expectation applying a [`MulticolumnMapPredicate`] to an ordered column list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MulticolumnMapExpectation<P> {
    pub column_list: Vec<String>,
    #[serde(default)]
    pub ignore_row_if: MultiIgnorePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mostly: Option<f64>,
    #[serde(flatten)]
    pub predicate: P,
    #[serde(flatten)]
    pub options: ExpectationOptions,
}

impl<P: MulticolumnMapPredicate> MulticolumnMapExpectation<P> {
    pub fn new<I, S>(column_list: I, predicate: P) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column_list: column_list.into_iter().map(Into::into).collect(),
            ignore_row_if: MultiIgnorePolicy::default(),
            mostly: None,
            predicate,
            options: ExpectationOptions::default(),
        }
    }

    pub fn with_ignore_row_if(mut self, policy: MultiIgnorePolicy) -> Self {
        self.ignore_row_if = policy;
        self
    }

    pub fn with_mostly(mut self, mostly: f64) -> Self {
        self.mostly = Some(mostly);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.column_list.is_empty() {
            return Err(TermError::invalid_argument(
                "column_list",
                "at least one column is required",
            ));
        }
        validate_mostly(self.mostly)?;
        self.predicate.validate()
    }
}

impl_option_setters!(MulticolumnMapExpectation<P: MulticolumnMapPredicate>);

impl<P: MulticolumnMapPredicate> Expectation for MulticolumnMapExpectation<P> {
    fn expectation_type(&self) -> &'static str {
        P::NAME
    }

    fn kind(&self) -> ExpectationKind {
        ExpectationKind::MulticolumnMap
    }

    fn options(&self) -> &ExpectationOptions {
        &self.options
    }

    fn config(&self) -> ExpectationConfig {
        recorded_config(P::NAME, self)
    }

    fn run(&self, dataset: &Dataset, result_format: &ResultFormat) -> Result<ExpectationResult> {
        self.validate()?;
        let table = dataset.table(&self.column_list)?;
        run_multicolumn_map(
            &table,
            &self.predicate,
            self.ignore_row_if,
            self.mostly,
            result_format,
        )
    }
}
