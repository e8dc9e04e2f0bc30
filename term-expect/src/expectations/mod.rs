//! Built-in expectations.
//!
//! Every built-in is a small parameter struct implementing one of the
//! protocol traits in [`crate::protocols`]. The struct's serde form is its
//! keyword arguments, so configurations stored in a suite rebuild the same
//! expectation through [`ExpectationRegistry`].
//!
//! | Protocol | Expectations |
//! |----------|--------------|
//! | column map | uniqueness, nullness, types, sets, ranges, ordering, lengths, regexes, dates, JSON |
//! | column pair map | equality, ordering, pair sets |
//! | multicolumn map | row-wise uniqueness |
//! | column aggregate | Kolmogorov-Smirnov tests |

mod dates;
mod distribution;
mod json;
mod lengths;
mod multicolumn;
mod nulls;
mod pairs;
mod patterns;
mod ranges;
mod sets;
mod types;
mod uniqueness;

pub use dates::{ValuesToBeDateutilParseable, ValuesToMatchStrftimeFormat};
pub use distribution::{
    BootstrappedKsTest, ParameterizedDistributionKsTest, PartitionObject, DEFAULT_BOOTSTRAP_SEED,
};
pub use json::{ValuesToBeJsonParseable, ValuesToMatchJsonSchema};
pub use lengths::{ValueLengthsToBeBetween, ValueLengthsToEqual};
pub use multicolumn::MulticolumnValuesToBeUnique;
pub use nulls::{ValuesToBeNull, ValuesToNotBeNull};
pub use pairs::{PairValuesAToBeGreaterThanB, PairValuesToBeEqual, PairValuesToBeInSet};
pub use patterns::{
    MatchOn, ValuesToMatchRegex, ValuesToMatchRegexList, ValuesToNotMatchRegex,
    ValuesToNotMatchRegexList,
};
pub use ranges::{ValuesToBeBetween, ValuesToBeDecreasing, ValuesToBeIncreasing};
pub use sets::{ValuesToBeInSet, ValuesToNotBeInSet};
pub use types::{ValuesToBeInTypeList, ValuesToBeOfType};
pub use uniqueness::ValuesToBeUnique;

use crate::core::{ExpectationRegistry, Value};
use crate::datetime::value_to_datetime;
use crate::prelude::*;

/// Registers every built-in expectation on `registry`.
pub fn register_builtins(registry: &mut ExpectationRegistry) {
    registry
        .register_column_map::<ValuesToBeUnique>()
        .register_column_map::<ValuesToNotBeNull>()
        .register_column_map::<ValuesToBeNull>()
        .register_column_map::<ValuesToBeOfType>()
        .register_column_map::<ValuesToBeInTypeList>()
        .register_column_map::<ValuesToBeInSet>()
        .register_column_map::<ValuesToNotBeInSet>()
        .register_column_map::<ValuesToBeBetween>()
        .register_column_map::<ValuesToBeIncreasing>()
        .register_column_map::<ValuesToBeDecreasing>()
        .register_column_map::<ValueLengthsToBeBetween>()
        .register_column_map::<ValueLengthsToEqual>()
        .register_column_map::<ValuesToMatchRegex>()
        .register_column_map::<ValuesToNotMatchRegex>()
        .register_column_map::<ValuesToMatchRegexList>()
        .register_column_map::<ValuesToNotMatchRegexList>()
        .register_column_map::<ValuesToMatchStrftimeFormat>()
        .register_column_map::<ValuesToBeDateutilParseable>()
        .register_column_map::<ValuesToBeJsonParseable>()
        .register_column_map::<ValuesToMatchJsonSchema>()
        .register_column_pair_map::<PairValuesToBeEqual>()
        .register_column_pair_map::<PairValuesAToBeGreaterThanB>()
        .register_column_pair_map::<PairValuesToBeInSet>()
        .register_multicolumn_map::<MulticolumnValuesToBeUnique>()
        .register_column_aggregate::<ParameterizedDistributionKsTest>()
        .register_column_aggregate::<BootstrappedKsTest>();
}

/// Parses string values as date-times when `enabled`, passing others through.
pub(crate) fn maybe_parse_datetimes(values: &[Value], enabled: bool) -> Result<Vec<Value>> {
    if !enabled {
        return Ok(values.to_vec());
    }
    values
        .iter()
        .map(|v| match v {
            Value::Str(_) => value_to_datetime(v),
            other => Ok(other.clone()),
        })
        .collect()
}
