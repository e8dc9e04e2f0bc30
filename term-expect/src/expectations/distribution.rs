//! Goodness-of-fit expectations based on the Kolmogorov-Smirnov test.

use crate::prelude::*;
use crate::protocols::{AggregateOutcome, ColumnAggregateFn};
use crate::stats::{histogram, interp, ks_test, Distribution, DistributionFamily, DistributionParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Seed used by the bootstrapped test when none is configured.
pub const DEFAULT_BOOTSTRAP_SEED: u64 = 0x7e57_5eed;

const DEFAULT_P_VALUE: f64 = 0.05;
const DEFAULT_BOOTSTRAP_SAMPLES: usize = 1000;
const WEIGHT_TOLERANCE: f64 = 1e-6;

fn default_p_value() -> f64 {
    DEFAULT_P_VALUE
}

fn check_probability(argument: &str, p: f64) -> Result<()> {
    if p > 0.0 && p < 1.0 {
        Ok(())
    } else {
        Err(TermError::invalid_argument(
            argument,
            format!("must be strictly between 0 and 1, got {p}"),
        ))
    }
}

/// Expects a column to be consistent with a parameterized distribution.
///
/// Succeeds when the KS test p-value is at least `p_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterizedDistributionKsTest {
    pub distribution: DistributionFamily,
    #[serde(default = "default_p_value")]
    pub p_value: f64,
    #[serde(default)]
    pub params: DistributionParams,
}

impl ParameterizedDistributionKsTest {
    pub fn new(distribution: DistributionFamily, params: DistributionParams) -> Self {
        Self {
            distribution,
            p_value: DEFAULT_P_VALUE,
            params,
        }
    }

    pub fn with_p_value(mut self, p_value: f64) -> Self {
        self.p_value = p_value;
        self
    }
}

impl ColumnAggregateFn for ParameterizedDistributionKsTest {
    const NAME: &'static str =
        "expect_column_parameterized_distribution_ks_test_p_value_to_be_greater_than";

    fn validate(&self) -> Result<()> {
        check_probability("p_value", self.p_value)?;
        Distribution::from_params(self.distribution, &self.params).map(|_| ())
    }

    fn aggregate(&self, values: &[f64]) -> Result<AggregateOutcome> {
        let distribution = Distribution::from_params(self.distribution, &self.params)?;
        let ks = ks_test(values, |x| distribution.cdf(x))?;
        debug!(
            distribution = %self.distribution,
            statistic = ks.statistic,
            p_value = ks.p_value,
            "KS test computed"
        );
        Ok(AggregateOutcome {
            success: ks.p_value >= self.p_value,
            observed_value: json!(ks.p_value),
            details: json!({
                "expected_params": distribution,
                "observed_ks_result": ks,
            }),
        })
    }
}

/// A histogram-style description of a distribution.
///
/// `bins` are the `n + 1` edges of `n` bins and `weights` the probability
/// mass of each bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionObject {
    pub bins: Vec<f64>,
    pub weights: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail_weights: Option<Vec<f64>>,
}

impl PartitionObject {
    pub fn new(bins: Vec<f64>, weights: Vec<f64>) -> Self {
        Self {
            bins,
            weights,
            tail_weights: None,
        }
    }

    /// Checks the partition describes a proper finite distribution.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| TermError::invalid_argument("partition_object", message);
        if self.weights.is_empty() || self.bins.len() != self.weights.len() + 1 {
            return Err(invalid(format!(
                "expected one more bin edge than weights, got {} edges and {} weights",
                self.bins.len(),
                self.weights.len()
            )));
        }
        if self.bins.iter().any(|b| !b.is_finite()) {
            return Err(invalid("bin edges must be finite".to_string()));
        }
        if self.bins.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid("bin edges must be strictly increasing".to_string()));
        }
        if self.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(invalid("weights must be non-negative".to_string()));
        }
        let total: f64 = self.weights.iter().sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(invalid(format!("weights must sum to 1, got {total}")));
        }
        if let Some(tails) = &self.tail_weights {
            if tails.iter().sum::<f64>() > 0.0 {
                return Err(invalid(
                    "the bootstrapped KS test requires a partition without tail weights"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Cumulative weights at each bin edge, starting at 0.
    pub fn cumulative_weights(&self) -> Vec<f64> {
        std::iter::once(0.0)
            .chain(self.weights.iter().scan(0.0, |acc, w| {
                *acc += w;
                Some(*acc)
            }))
            .collect()
    }
}

/// Expects a column to be consistent with a partition, via a bootstrapped
/// KS test.
///
/// The column is resampled `bootstrap_samples` times; the observed value is
/// the smoothed fraction of resamples whose KS p-value is at least `p`. The
/// draw is seeded, so repeated evaluations agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrappedKsTest {
    pub partition_object: PartitionObject,
    #[serde(default = "default_p_value")]
    pub p: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap_samples: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap_sample_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
}

impl BootstrappedKsTest {
    pub fn new(partition_object: PartitionObject) -> Self {
        Self {
            partition_object,
            p: DEFAULT_P_VALUE,
            bootstrap_samples: None,
            bootstrap_sample_size: None,
            random_seed: None,
        }
    }

    pub fn with_p(mut self, p: f64) -> Self {
        self.p = p;
        self
    }

    pub fn with_bootstrap_samples(mut self, samples: usize) -> Self {
        self.bootstrap_samples = Some(samples);
        self
    }

    pub fn with_bootstrap_sample_size(mut self, size: usize) -> Self {
        self.bootstrap_sample_size = Some(size);
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    fn samples(&self) -> usize {
        self.bootstrap_samples.unwrap_or(DEFAULT_BOOTSTRAP_SAMPLES)
    }

    fn sample_size(&self) -> usize {
        self.bootstrap_sample_size
            .unwrap_or(2 * self.partition_object.weights.len())
    }

    /// Histogram of `values` over the expected bins, widened with one extra
    /// bin on each side when values fall outside them.
    fn observed_partition(&self, values: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let bins = &self.partition_object.bins;
        let counts = histogram(values, bins);
        let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
            return (Vec::new(), Vec::new());
        };
        let below = values.iter().filter(|v| **v < *first).count();
        let above = values.iter().filter(|v| **v > *last).count();
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });

        let mut observed_bins = Vec::with_capacity(bins.len() + 2);
        let mut observed_counts = Vec::with_capacity(counts.len() + 2);
        if below > 0 {
            observed_bins.push(min);
            observed_counts.push(below);
        }
        observed_bins.extend_from_slice(bins);
        observed_counts.extend_from_slice(&counts);
        if above > 0 {
            observed_bins.push(max);
            observed_counts.push(above);
        }

        let total = values.len().max(1) as f64;
        let weights = observed_counts.iter().map(|c| *c as f64 / total).collect();
        (observed_bins, weights)
    }
}

impl ColumnAggregateFn for BootstrappedKsTest {
    const NAME: &'static str = "expect_column_bootstrapped_ks_test_p_value_to_be_greater_than";

    fn validate(&self) -> Result<()> {
        self.partition_object.validate()?;
        check_probability("p", self.p)?;
        if self.samples() == 0 {
            return Err(TermError::invalid_argument(
                "bootstrap_samples",
                "must be at least 1",
            ));
        }
        if self.sample_size() == 0 {
            return Err(TermError::invalid_argument(
                "bootstrap_sample_size",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    fn aggregate(&self, values: &[f64]) -> Result<AggregateOutcome> {
        self.validate()?;
        if values.is_empty() {
            return Err(TermError::invalid_argument(
                "column",
                "the bootstrapped KS test needs at least one non-null value",
            ));
        }

        let bins = &self.partition_object.bins;
        let expected_cdf = self.partition_object.cumulative_weights();
        let cdf = |x: f64| interp(x, bins, &expected_cdf);

        let samples = self.samples();
        let sample_size = self.sample_size();
        let seed = self.random_seed.unwrap_or(DEFAULT_BOOTSTRAP_SEED);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut sample = vec![0.0; sample_size];
        let mut passing = 0usize;
        for _ in 0..samples {
            for slot in sample.iter_mut() {
                *slot = values[rng.random_range(0..values.len())];
            }
            if ks_test(&sample, cdf)?.p_value >= self.p {
                passing += 1;
            }
        }
        let observed = (1 + passing) as f64 / (samples + 1) as f64;

        debug!(
            samples,
            sample_size,
            seed,
            passing,
            observed,
            "Bootstrapped KS test computed"
        );

        let (observed_bins, observed_weights) = self.observed_partition(values);
        let observed_cdf = PartitionObject::new(observed_bins.clone(), observed_weights.clone())
            .cumulative_weights();

        Ok(AggregateOutcome {
            success: observed > self.p,
            observed_value: json!(observed),
            details: json!({
                "bootstrap_samples": samples,
                "bootstrap_sample_size": sample_size,
                "observed_partition": {"bins": observed_bins, "weights": observed_weights},
                "expected_partition": {"bins": bins, "weights": self.partition_object.weights},
                "observed_cdf": {"x": observed_bins, "cdf_values": observed_cdf},
                "expected_cdf": {"x": bins, "cdf_values": expected_cdf},
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_partition() -> PartitionObject {
        PartitionObject::new(vec![0.0, 0.25, 0.5, 0.75, 1.0], vec![0.25; 4])
    }

    fn spread(n: usize) -> Vec<f64> {
        (0..n).map(|i| (i as f64 + 0.5) / n as f64).collect()
    }

    #[test]
    fn test_parameterized_uniform() {
        let test = ParameterizedDistributionKsTest::new(
            DistributionFamily::Uniform,
            DistributionParams::default(),
        );
        let outcome = test.aggregate(&spread(100)).unwrap();
        assert!(outcome.success);
        assert!(outcome.details["observed_ks_result"]["statistic"].as_f64().unwrap() < 0.01);

        let shifted: Vec<f64> = spread(100).iter().map(|x| x + 0.5).collect();
        assert!(!test.aggregate(&shifted).unwrap().success);
    }

    #[test]
    fn test_parameterized_arguments() {
        let base = ParameterizedDistributionKsTest::new(
            DistributionFamily::Norm,
            DistributionParams::default(),
        );
        assert!(base.validate().is_ok());
        assert!(base.clone().with_p_value(1.0).validate().is_err());
        assert!(base.with_p_value(0.0).validate().is_err());
        let gamma =
            ParameterizedDistributionKsTest::new(DistributionFamily::Gamma, DistributionParams::default());
        assert!(matches!(gamma.validate(), Err(TermError::InvalidArgument { .. })));
    }

    #[test]
    fn test_partition_validation() {
        assert!(uniform_partition().validate().is_ok());
        assert!(PartitionObject::new(vec![0.0, 1.0], vec![0.5, 0.5]).validate().is_err());
        assert!(PartitionObject::new(vec![0.0, 0.0, 1.0], vec![0.5, 0.5]).validate().is_err());
        assert!(PartitionObject::new(vec![0.0, 0.5, 1.0], vec![0.5, 0.6]).validate().is_err());
        let with_tails = PartitionObject {
            tail_weights: Some(vec![0.1, 0.0]),
            ..uniform_partition()
        };
        assert!(with_tails.validate().is_err());
    }

    #[test]
    fn test_cumulative_weights() {
        assert_eq!(
            uniform_partition().cumulative_weights(),
            vec![0.0, 0.25, 0.5, 0.75, 1.0]
        );
    }

    #[test]
    fn test_bootstrap_is_deterministic_per_seed() {
        let test = BootstrappedKsTest::new(uniform_partition())
            .with_bootstrap_samples(50)
            .with_random_seed(7);
        let values = spread(40);
        let first = test.aggregate(&values).unwrap();
        let second = test.aggregate(&values).unwrap();
        assert_eq!(first, second);
        assert!(first.success);
        assert_eq!(first.details["bootstrap_sample_size"], 8);
    }

    #[test]
    fn test_bootstrap_detects_shift() {
        let test = BootstrappedKsTest::new(uniform_partition())
            .with_bootstrap_samples(50)
            .with_bootstrap_sample_size(200);
        let values: Vec<f64> = spread(40).iter().map(|x| x * 0.2).collect();
        let outcome = test.aggregate(&values).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.observed_value, json!(1.0 / 51.0));
    }

    #[test]
    fn test_observed_partition_adds_tails() {
        let test = BootstrappedKsTest::new(uniform_partition());
        let (bins, weights) = test.observed_partition(&[-1.0, 0.1, 0.6, 2.0]);
        assert_eq!(bins, vec![-1.0, 0.0, 0.25, 0.5, 0.75, 1.0, 2.0]);
        assert_eq!(weights, vec![0.25, 0.25, 0.0, 0.25, 0.0, 0.25]);
    }
}
