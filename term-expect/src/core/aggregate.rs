//! Success aggregation with the `mostly` threshold.

use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// Overall verdict of a map expectation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuccessVerdict {
    /// Whether the expectation holds.
    pub success: bool,
    /// Fraction of non-missing elements that satisfied the predicate, unset
    /// when there were no non-missing elements.
    pub percent_success: Option<f64>,
}

/// Checks that `mostly`, if given, is a fraction in `[0, 1]`.
pub fn validate_mostly(mostly: Option<f64>) -> Result<()> {
    match mostly {
        Some(m) if !(0.0..=1.0).contains(&m) => Err(TermError::invalid_argument(
            "mostly",
            format!("must be a number between 0 and 1, got {m}"),
        )),
        _ => Ok(()),
    }
}

/// Turns element verdict counts into an overall verdict.
///
/// With no non-missing elements the expectation holds vacuously. Otherwise an
/// unset `mostly` requires every element to succeed, and a set `mostly`
/// requires `success_count / nonmissing_count >= mostly`.
///
/// # Examples
///
/// ```rust
/// use term_expect::core::calc_map_expectation_success;
///
/// let verdict = calc_map_expectation_success(8, 10, Some(0.8)).unwrap();
/// assert!(verdict.success);
/// assert!(!calc_map_expectation_success(8, 10, Some(0.81)).unwrap().success);
/// assert!(calc_map_expectation_success(0, 0, None).unwrap().success);
/// ```
pub fn calc_map_expectation_success(
    success_count: usize,
    nonmissing_count: usize,
    mostly: Option<f64>,
) -> Result<SuccessVerdict> {
    validate_mostly(mostly)?;
    if nonmissing_count == 0 {
        return Ok(SuccessVerdict {
            success: true,
            percent_success: None,
        });
    }

    let percent = success_count as f64 / nonmissing_count as f64;
    let success = match mostly {
        Some(mostly) => percent >= mostly,
        None => success_count == nonmissing_count,
    };
    Ok(SuccessVerdict {
        success,
        percent_success: Some(percent),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mostly_boundary() {
        assert!(calc_map_expectation_success(8, 10, Some(0.8)).unwrap().success);
        assert!(!calc_map_expectation_success(8, 10, Some(0.81)).unwrap().success);
    }

    #[test]
    fn test_strict_without_mostly() {
        let verdict = calc_map_expectation_success(9, 10, None).unwrap();
        assert!(!verdict.success);
        assert_eq!(verdict.percent_success, Some(0.9));
        assert!(calc_map_expectation_success(10, 10, None).unwrap().success);
    }

    #[test]
    fn test_vacuous_truth() {
        let verdict = calc_map_expectation_success(0, 0, Some(1.0)).unwrap();
        assert!(verdict.success);
        assert_eq!(verdict.percent_success, None);
    }

    #[test]
    fn test_mostly_out_of_range() {
        for mostly in [-0.1, 1.5, f64::NAN] {
            let err = calc_map_expectation_success(1, 1, Some(mostly)).unwrap_err();
            assert!(matches!(err, TermError::InvalidArgument { ref argument, .. } if argument == "mostly"));
        }
        assert!(validate_mostly(Some(0.0)).is_ok());
        assert!(validate_mostly(Some(1.0)).is_ok());
    }
}
