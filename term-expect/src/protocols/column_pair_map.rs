//! Column-pair map expectations.

use super::{check_verdicts, impl_option_setters, predicate_error, recorded_config};
use crate::core::{
    calc_map_expectation_success, format_map_output, validate_mostly, Column, Dataset, Expectation,
    ExpectationConfig, ExpectationKind, ExpectationOptions, ExpectationResult, MapOutput,
    PairIgnorePolicy, ResultFormat, UnexpectedValue, Value,
};
use crate::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, instrument};

/// A per-row predicate over two aligned columns.
///
/// `a` and `b` have equal length and are positionally aligned; the predicate
/// returns one verdict per row.
pub trait ColumnPairMapPredicate:
    Debug + Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Registered expectation type name.
    const NAME: &'static str;

    /// Checks the predicate arguments before any data is read.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Returns one verdict per row.
    fn map(&self, a: &[Value], b: &[Value]) -> Result<Vec<bool>>;
}

/// Runs the column-pair map protocol on columns `a` and `b`.
///
/// Fails with [`TermError::LengthMismatch`] before comparing any row when the
/// columns differ in length.
#[instrument(skip_all, fields(
    expectation.name = P::NAME,
    column_a = %a.name(),
    column_b = %b.name(),
    ignore_row_if = %ignore_row_if
))]
pub fn run_column_pair_map<P: ColumnPairMapPredicate>(
    a: &Column,
    b: &Column,
    predicate: &P,
    ignore_row_if: PairIgnorePolicy,
    mostly: Option<f64>,
    result_format: &ResultFormat,
) -> Result<ExpectationResult> {
    validate_mostly(mostly)?;
    predicate.validate()?;

    let mask = ignore_row_if.mask(a, b)?;
    let keep = mask.keep();
    let a_kept = a.filter(&keep)?;
    let b_kept = b.filter(&keep)?;

    let verdicts = predicate
        .map(a_kept.values(), b_kept.values())
        .map_err(predicate_error(P::NAME))?;
    check_verdicts(P::NAME, &verdicts, a_kept.len())?;

    let success_count = verdicts.iter().filter(|ok| **ok).count();
    let verdict = calc_map_expectation_success(success_count, a_kept.len(), mostly)?;

    let (unexpected_list, unexpected_index_list): (Vec<_>, Vec<_>) = a_kept
        .iter()
        .zip(b_kept.values())
        .zip(&verdicts)
        .filter(|(_, ok)| !**ok)
        .map(|(((row, x), y), _)| (UnexpectedValue::Pair(x.clone(), y.clone()), row))
        .unzip();

    debug!(
        element_count = a.len(),
        missing_count = mask.missing_count(),
        unexpected_count = unexpected_list.len(),
        success = verdict.success,
        "Column pair map evaluated"
    );

    Ok(format_map_output(
        result_format,
        MapOutput {
            success: verdict.success,
            element_count: a.len(),
            nonmissing_count: a_kept.len(),
            unexpected_list,
            unexpected_index_list,
        },
        false,
    ))
}

/// An expectation applying a [`ColumnPairMapPredicate`] to two columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnPairMapExpectation<P> {
    #[serde(rename = "column_A")]
    pub column_a: String,
    #[serde(rename = "column_B")]
    pub column_b: String,
    #[serde(default)]
    pub ignore_row_if: PairIgnorePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mostly: Option<f64>,
    #[serde(flatten)]
    pub predicate: P,
    #[serde(flatten)]
    pub options: ExpectationOptions,
}

impl<P: ColumnPairMapPredicate> ColumnPairMapExpectation<P> {
    pub fn new(column_a: impl Into<String>, column_b: impl Into<String>, predicate: P) -> Self {
        Self {
            column_a: column_a.into(),
            column_b: column_b.into(),
            ignore_row_if: PairIgnorePolicy::default(),
            mostly: None,
            predicate,
            options: ExpectationOptions::default(),
        }
    }

    pub fn with_ignore_row_if(mut self, policy: PairIgnorePolicy) -> Self {
        self.ignore_row_if = policy;
        self
    }

    pub fn with_mostly(mut self, mostly: f64) -> Self {
        self.mostly = Some(mostly);
        self
    }
}

impl_option_setters!(ColumnPairMapExpectation<P: ColumnPairMapPredicate>);

impl<P: ColumnPairMapPredicate> Expectation for ColumnPairMapExpectation<P> {
    fn expectation_type(&self) -> &'static str {
        P::NAME
    }

    fn kind(&self) -> ExpectationKind {
        ExpectationKind::ColumnPairMap
    }

    fn options(&self) -> &ExpectationOptions {
        &self.options
    }

    fn config(&self) -> ExpectationConfig {
        recorded_config(P::NAME, self)
    }

    fn run(&self, dataset: &Dataset, result_format: &ResultFormat) -> Result<ExpectationResult> {
        validate_mostly(self.mostly)?;
        self.predicate.validate()?;
        let a = dataset.column(&self.column_a)?;
        let b = dataset.column(&self.column_b)?;
        run_column_pair_map(
            a,
            b,
            &self.predicate,
            self.ignore_row_if,
            self.mostly,
            result_format,
        )
    }
}
