//! Lookup table from expectation type names to protocols and factories.

use super::{BoxedExpectation, ExpectationConfig, ExpectationKind};
use crate::prelude::*;
use crate::protocols::{
    ColumnAggregateExpectation, ColumnAggregateFn, ColumnMapExpectation, ColumnMapPredicate,
    ColumnPairMapExpectation, ColumnPairMapPredicate, MulticolumnMapExpectation,
    MulticolumnMapPredicate,
};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Builds an expectation from its keyword arguments.
pub type ExpectationFactory =
    fn(serde_json::Map<String, serde_json::Value>) -> Result<BoxedExpectation>;

/// A registered expectation type.
#[derive(Debug, Clone, Copy)]
pub struct RegisteredExpectation {
    pub kind: ExpectationKind,
    pub factory: ExpectationFactory,
}

/// Maps expectation type names to their protocol and factory.
///
/// # Examples
///
/// ```rust
/// use term_expect::core::{ExpectationConfig, ExpectationKind, ExpectationRegistry};
/// use serde_json::json;
///
/// let registry = ExpectationRegistry::builtin();
/// let entry = registry.get("expect_column_pair_values_to_be_equal").unwrap();
/// assert_eq!(entry.kind, ExpectationKind::ColumnPairMap);
///
/// let config: ExpectationConfig = serde_json::from_value(json!({
///     "expectation_type": "expect_column_values_to_be_in_set",
///     "kwargs": {"column": "status", "value_set": ["active", "inactive"], "mostly": 0.9}
/// })).unwrap();
/// let expectation = registry.build(&config).unwrap();
/// assert_eq!(expectation.expectation_type(), "expect_column_values_to_be_in_set");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExpectationRegistry {
    entries: HashMap<&'static str, RegisteredExpectation>,
}

static BUILTIN: Lazy<Arc<ExpectationRegistry>> = Lazy::new(|| {
    let mut registry = ExpectationRegistry::new();
    crate::expectations::register_builtins(&mut registry);
    debug!(expectations = registry.len(), "Built-in expectation registry initialized");
    Arc::new(registry)
});

fn build_typed<E>(kwargs: serde_json::Map<String, serde_json::Value>) -> Result<BoxedExpectation>
where
    E: super::Expectation + DeserializeOwned + 'static,
{
    let expectation: E = serde_json::from_value(serde_json::Value::Object(kwargs))?;
    Ok(Box::new(expectation))
}

impl ExpectationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry of every built-in expectation.
    pub fn builtin() -> &'static ExpectationRegistry {
        &BUILTIN
    }

    /// The built-in registry as a shared handle.
    pub fn shared_builtin() -> Arc<ExpectationRegistry> {
        Arc::clone(&BUILTIN)
    }

    /// Registers a factory under `name`, replacing any previous entry.
    pub fn register(
        &mut self,
        name: &'static str,
        kind: ExpectationKind,
        factory: ExpectationFactory,
    ) -> &mut Self {
        self.entries
            .insert(name, RegisteredExpectation { kind, factory });
        self
    }

    pub fn register_column_map<P: ColumnMapPredicate>(&mut self) -> &mut Self {
        self.register(
            P::NAME,
            ExpectationKind::ColumnMap,
            build_typed::<ColumnMapExpectation<P>>,
        )
    }

    pub fn register_column_pair_map<P: ColumnPairMapPredicate>(&mut self) -> &mut Self {
        self.register(
            P::NAME,
            ExpectationKind::ColumnPairMap,
            build_typed::<ColumnPairMapExpectation<P>>,
        )
    }

    pub fn register_multicolumn_map<P: MulticolumnMapPredicate>(&mut self) -> &mut Self {
        self.register(
            P::NAME,
            ExpectationKind::MulticolumnMap,
            build_typed::<MulticolumnMapExpectation<P>>,
        )
    }

    pub fn register_column_aggregate<F: ColumnAggregateFn>(&mut self) -> &mut Self {
        self.register(
            F::NAME,
            ExpectationKind::ColumnAggregate,
            build_typed::<ColumnAggregateExpectation<F>>,
        )
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredExpectation> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names in alphabetical order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Builds the expectation described by `config`.
    ///
    /// Unknown type names and malformed keyword arguments fail with
    /// [`TermError::InvalidArgument`].
    pub fn build(&self, config: &ExpectationConfig) -> Result<BoxedExpectation> {
        let entry = self.get(&config.expectation_type).ok_or_else(|| {
            TermError::invalid_argument(
                "expectation_type",
                format!("unknown expectation type '{}'", config.expectation_type),
            )
        })?;
        (entry.factory)(config.kwargs.clone()).map_err(|e| {
            TermError::invalid_argument(
                config.expectation_type.clone(),
                format!("invalid arguments: {e}"),
            )
        })
    }
}
