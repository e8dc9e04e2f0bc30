//! Assembly of map expectation results from verdict counts and unexpected samples.

use super::{
    ExpectationResult, ResultDetails, ResultFormat, ResultFormatLevel, RowId, UnexpectedCount,
    UnexpectedValue,
};
use std::collections::HashMap;
use std::hash::Hash;

/// Raw outcome of a map protocol, before verbosity filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOutput {
    pub success: bool,
    pub element_count: usize,
    pub nonmissing_count: usize,
    /// Unexpected values in original order.
    pub unexpected_list: Vec<UnexpectedValue>,
    /// Row ids of `unexpected_list`, position for position.
    pub unexpected_index_list: Vec<RowId>,
}

impl MapOutput {
    pub fn missing_count(&self) -> usize {
        self.element_count - self.nonmissing_count
    }

    pub fn unexpected_count(&self) -> usize {
        self.unexpected_list.len()
    }
}

/// `100 * count / denominator`, or `None` when the denominator is zero.
pub fn percent(count: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| 100.0 * count as f64 / denominator as f64)
}

/// Ranks values by frequency, most frequent first.
///
/// Ties keep the order in which the values first occur. At most `limit`
/// entries are returned.
///
/// ```rust
/// use term_expect::core::most_common;
///
/// let ranked = most_common(&[3, 1, 3, 2, 3, 1], 2);
/// assert_eq!(ranked, vec![(3, 3), (1, 2)]);
/// ```
pub fn most_common<T: Clone + Eq + Hash>(values: &[T], limit: usize) -> Vec<(T, usize)> {
    let mut counts: HashMap<&T, (usize, usize)> = HashMap::new();
    for (position, value) in values.iter().enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }
    let mut ranked: Vec<(&T, usize, usize)> = counts
        .into_iter()
        .map(|(value, (count, first))| (value, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(value, count, _)| (value.clone(), count))
        .collect()
}

/// Builds the structured result of a map expectation at the requested verbosity.
///
/// `null_focused` results omit `unexpected_percent_nonmissing` and the
/// partial unexpected breakdown.
pub fn format_map_output(
    result_format: &ResultFormat,
    output: MapOutput,
    null_focused: bool,
) -> ExpectationResult {
    if result_format.level == ResultFormatLevel::BooleanOnly {
        return ExpectationResult::new(output.success);
    }

    let sample_size = if null_focused {
        0
    } else {
        result_format.partial_unexpected_count
    };
    let unexpected_count = output.unexpected_count();
    let missing_count = output.missing_count();

    let mut details = ResultDetails {
        element_count: Some(output.element_count),
        missing_count: Some(missing_count),
        missing_percent: percent(missing_count, output.element_count),
        unexpected_count: Some(unexpected_count),
        unexpected_percent: percent(unexpected_count, output.element_count),
        unexpected_percent_nonmissing: percent(unexpected_count, output.nonmissing_count),
        partial_unexpected_list: Some(
            output
                .unexpected_list
                .iter()
                .take(sample_size)
                .cloned()
                .collect(),
        ),
        partial_unexpected_index_list: Some(
            output
                .unexpected_index_list
                .iter()
                .take(sample_size)
                .copied()
                .collect(),
        ),
        partial_unexpected_counts: Some(if sample_size == 0 {
            Vec::new()
        } else {
            most_common(&output.unexpected_list, result_format.counts_limit())
                .into_iter()
                .map(|(value, count)| UnexpectedCount { value, count })
                .collect()
        }),
        ..Default::default()
    };

    if result_format.level >= ResultFormatLevel::Summary {
        details.unexpected_index_list = Some(output.unexpected_index_list);
    }
    if result_format.level >= ResultFormatLevel::Complete {
        details.unexpected_list = Some(output.unexpected_list);
    }
    if null_focused {
        details.unexpected_percent_nonmissing = None;
        details.partial_unexpected_list = None;
        details.partial_unexpected_counts = None;
    }

    ExpectationResult::with_details(output.success, details)
}
