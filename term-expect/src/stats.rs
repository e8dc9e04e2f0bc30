//! Statistical helpers for the distributional expectations.
//!
//! Covers the one-sample Kolmogorov-Smirnov test, the cumulative distribution
//! functions of the supported parametric families, histogram binning and
//! piecewise-linear interpolation.

use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error function, Abramowitz and Stegun formula 7.1.26.
pub fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

/// Standard normal cumulative distribution function.
pub fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Natural logarithm of the gamma function (Lanczos approximation, g = 7).
pub fn ln_gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection formula.
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, c) in COEFFICIENTS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    let t = x + 7.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

const MAX_ITERATIONS: usize = 500;
const EPSILON: f64 = 1e-14;
const TINY: f64 = 1e-300;

/// Regularized lower incomplete gamma function `P(a, x)`.
pub fn regularized_gamma_p(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x < a + 1.0 {
        // Series expansion.
        let mut term = 1.0 / a;
        let mut sum = term;
        let mut n = a;
        for _ in 0..MAX_ITERATIONS {
            n += 1.0;
            term *= x / n;
            sum += term;
            if term.abs() < sum.abs() * EPSILON {
                break;
            }
        }
        (sum.ln() - x + a * x.ln() - ln_gamma(a)).exp().clamp(0.0, 1.0)
    } else {
        // Continued fraction for Q(a, x).
        let mut b = x + 1.0 - a;
        let mut c = 1.0 / TINY;
        let mut d = 1.0 / b;
        let mut h = d;
        for i in 1..=MAX_ITERATIONS {
            let an = -(i as f64) * (i as f64 - a);
            b += 2.0;
            d = an * d + b;
            if d.abs() < TINY {
                d = TINY;
            }
            c = b + an / c;
            if c.abs() < TINY {
                c = TINY;
            }
            d = 1.0 / d;
            let delta = d * c;
            h *= delta;
            if (delta - 1.0).abs() < EPSILON {
                break;
            }
        }
        let q = (-x + a * x.ln() - ln_gamma(a)).exp() * h;
        (1.0 - q).clamp(0.0, 1.0)
    }
}

/// Regularized incomplete beta function `I_x(a, b)`.
pub fn regularized_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let front =
        (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        (front * beta_continued_fraction(a, b, x) / a).clamp(0.0, 1.0)
    } else {
        (1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b).clamp(0.0, 1.0)
    }
}

fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;
    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    h
}

/// Survival function of the Kolmogorov distribution, `P(K > z)`.
pub fn kolmogorov_sf(z: f64) -> f64 {
    // Below 0.27 the series converges too slowly and the value is 1 to
    // within 1e-5 anyway.
    if z < 0.27 {
        return 1.0;
    }
    if z > 3.0 {
        return 0.0;
    }

    let mut p = 0.0;
    let z_sq = z * z;
    for k in 1..=100 {
        let k_f = f64::from(k);
        let term = (-1.0_f64).powi(k - 1) * (-2.0 * k_f * k_f * z_sq).exp();
        p += term;
        if term.abs() < 1e-12 {
            break;
        }
    }
    (2.0 * p).clamp(0.0, 1.0)
}

/// Result of a one-sample Kolmogorov-Smirnov test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KsResult {
    pub statistic: f64,
    pub p_value: f64,
}

/// Kolmogorov-Smirnov statistic of `sample` against `cdf`.
pub fn ks_statistic<F: Fn(f64) -> f64>(sample: &[f64], cdf: F) -> f64 {
    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .map(|(i, x)| {
            let f = cdf(*x);
            let above = (i as f64 + 1.0) / n - f;
            let below = f - i as f64 / n;
            above.max(below)
        })
        .fold(0.0, f64::max)
}

/// One-sample Kolmogorov-Smirnov test of `sample` against `cdf`.
///
/// The p-value uses the Kolmogorov limiting distribution with Stephens'
/// small-sample correction.
pub fn ks_test<F: Fn(f64) -> f64>(sample: &[f64], cdf: F) -> Result<KsResult> {
    if sample.is_empty() {
        return Err(TermError::invalid_argument(
            "column",
            "the Kolmogorov-Smirnov test needs at least one non-null value",
        ));
    }
    if sample.iter().any(|x| !x.is_finite()) {
        return Err(TermError::invalid_argument(
            "column",
            "the Kolmogorov-Smirnov test needs finite values",
        ));
    }
    let statistic = ks_statistic(sample, cdf);
    let sqrt_n = (sample.len() as f64).sqrt();
    let p_value = kolmogorov_sf((sqrt_n + 0.12 + 0.11 / sqrt_n) * statistic);
    Ok(KsResult { statistic, p_value })
}

/// Counts values per bin.
///
/// Bins are half-open `[edge_i, edge_i+1)` except the last, which also
/// includes its right edge. Values outside the edges are not counted.
pub fn histogram(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let mut counts = vec![0; edges.len().saturating_sub(1)];
    let (Some(first), Some(last)) = (edges.first(), edges.last()) else {
        return counts;
    };
    if counts.is_empty() {
        return counts;
    }
    for &value in values {
        if value < *first || value > *last || value.is_nan() {
            continue;
        }
        let bin = if value == *last {
            counts.len() - 1
        } else {
            // Index of the last edge <= value.
            edges.partition_point(|edge| *edge <= value) - 1
        };
        counts[bin] += 1;
    }
    counts
}

/// Piecewise-linear interpolation of `(xp, fp)` at `x`.
///
/// Values left of `xp[0]` map to `fp[0]` and values right of the last point
/// map to the last `fp`. `xp` must be increasing.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    let upper = xp[..n].partition_point(|edge| *edge <= x);
    let lower = upper - 1;
    let span = xp[upper] - xp[lower];
    if span == 0.0 {
        return fp[upper];
    }
    fp[lower] + (fp[upper] - fp[lower]) * (x - xp[lower]) / span
}

/// Supported parametric distribution families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionFamily {
    Norm,
    Uniform,
    Expon,
    Gamma,
    Beta,
    Chi2,
}

impl DistributionFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Norm => "norm",
            Self::Uniform => "uniform",
            Self::Expon => "expon",
            Self::Gamma => "gamma",
            Self::Beta => "beta",
            Self::Chi2 => "chi2",
        }
    }
}

impl FromStr for DistributionFamily {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "norm" => Ok(Self::Norm),
            "uniform" => Ok(Self::Uniform),
            "expon" => Ok(Self::Expon),
            "gamma" => Ok(Self::Gamma),
            "beta" => Ok(Self::Beta),
            "chi2" => Ok(Self::Chi2),
            other => Err(TermError::invalid_argument(
                "distribution",
                format!(
                    "unsupported distribution '{other}', expected one of: norm, uniform, expon, gamma, beta, chi2"
                ),
            )),
        }
    }
}

impl fmt::Display for DistributionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named parameters of a distribution, as given in expectation arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub df: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

/// A fully parameterized distribution with a cumulative distribution function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "distribution", rename_all = "lowercase")]
pub enum Distribution {
    Norm { mean: f64, std_dev: f64 },
    Uniform { min: f64, max: f64 },
    Expon { loc: f64, scale: f64 },
    Gamma { alpha: f64, loc: f64, scale: f64 },
    Beta { alpha: f64, beta: f64, loc: f64, scale: f64 },
    Chi2 { df: f64, loc: f64, scale: f64 },
}

fn positive(argument: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TermError::invalid_argument(
            argument,
            format!("must be a positive number, got {value}"),
        ))
    }
}

fn finite(argument: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TermError::invalid_argument(
            argument,
            format!("must be a finite number, got {value}"),
        ))
    }
}

fn required(argument: &str, value: Option<f64>, family: DistributionFamily) -> Result<f64> {
    value.ok_or_else(|| {
        TermError::invalid_argument(
            argument,
            format!("the {family} distribution requires the '{argument}' parameter"),
        )
    })
}

impl Distribution {
    /// Validates `params` for `family` and builds the distribution.
    ///
    /// Location defaults to 0 and scale to 1. `norm` defaults to the
    /// standard normal and `uniform` to `[0, 1]`. Shape parameters (`alpha`,
    /// `beta`, `df`) are required where the family has them.
    pub fn from_params(family: DistributionFamily, params: &DistributionParams) -> Result<Self> {
        let loc = finite("loc", params.loc.unwrap_or(0.0))?;
        let scale = positive("scale", params.scale.unwrap_or(1.0))?;
        match family {
            DistributionFamily::Norm => Ok(Distribution::Norm {
                mean: finite("mean", params.mean.unwrap_or(0.0))?,
                std_dev: positive("std_dev", params.std_dev.unwrap_or(1.0))?,
            }),
            DistributionFamily::Uniform => {
                let min = finite("min", params.min.unwrap_or(0.0))?;
                let max = finite("max", params.max.unwrap_or(1.0))?;
                if min >= max {
                    return Err(TermError::invalid_argument(
                        "min",
                        format!("min ({min}) must be less than max ({max})"),
                    ));
                }
                Ok(Distribution::Uniform { min, max })
            }
            DistributionFamily::Expon => Ok(Distribution::Expon { loc, scale }),
            DistributionFamily::Gamma => Ok(Distribution::Gamma {
                alpha: positive("alpha", required("alpha", params.alpha, family)?)?,
                loc,
                scale,
            }),
            DistributionFamily::Beta => Ok(Distribution::Beta {
                alpha: positive("alpha", required("alpha", params.alpha, family)?)?,
                beta: positive("beta", required("beta", params.beta, family)?)?,
                loc,
                scale,
            }),
            DistributionFamily::Chi2 => Ok(Distribution::Chi2 {
                df: positive("df", required("df", params.df, family)?)?,
                loc,
                scale,
            }),
        }
    }

    pub fn family(&self) -> DistributionFamily {
        match self {
            Distribution::Norm { .. } => DistributionFamily::Norm,
            Distribution::Uniform { .. } => DistributionFamily::Uniform,
            Distribution::Expon { .. } => DistributionFamily::Expon,
            Distribution::Gamma { .. } => DistributionFamily::Gamma,
            Distribution::Beta { .. } => DistributionFamily::Beta,
            Distribution::Chi2 { .. } => DistributionFamily::Chi2,
        }
    }

    /// Cumulative distribution function.
    pub fn cdf(&self, x: f64) -> f64 {
        match *self {
            Distribution::Norm { mean, std_dev } => standard_normal_cdf((x - mean) / std_dev),
            Distribution::Uniform { min, max } => ((x - min) / (max - min)).clamp(0.0, 1.0),
            Distribution::Expon { loc, scale } => {
                let z = (x - loc) / scale;
                if z <= 0.0 {
                    0.0
                } else {
                    1.0 - (-z).exp()
                }
            }
            Distribution::Gamma { alpha, loc, scale } => {
                regularized_gamma_p(alpha, (x - loc) / scale)
            }
            Distribution::Beta {
                alpha,
                beta,
                loc,
                scale,
            } => regularized_beta(alpha, beta, (x - loc) / scale),
            Distribution::Chi2 { df, loc, scale } => {
                regularized_gamma_p(df / 2.0, (x - loc) / scale / 2.0)
            }
        }
    }
}
