//! stats::delta
//!
//! Significance tests deciding whether two sample sets differ.
//!
//! - [`DeltaTest::UTest`]: Mann-Whitney U test. Makes no assumption about
//!   the shape of the distributions, which suits timing data with long
//!   tails. The p-value uses the normal approximation with tie and
//!   continuity correction.
//! - [`DeltaTest::TTest`]: Welch's two-sample t-test (unequal variances).
//! - [`DeltaTest::None`]: report every change without testing.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::metrics::{mean, Metrics};

/// Reasons a test cannot produce a p-value.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeltaTestError {
    #[error("too few samples")]
    SamplesTooSmall,

    #[error("zero variance")]
    ZeroVariance,

    #[error("all equal")]
    AllEqual,
}

/// The significance test applied to each pair of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaTest {
    #[default]
    UTest,
    TTest,
    None,
}

impl DeltaTest {
    /// Valid names for configuration and flags.
    pub const NAMES: [&'static str; 3] = ["utest", "ttest", "none"];

    /// Compute the two-sided p-value for `old` versus `new`.
    ///
    /// Returns `Ok(None)` for [`DeltaTest::None`].
    pub fn p_value(&self, old: &Metrics, new: &Metrics) -> Result<Option<f64>, DeltaTestError> {
        match self {
            DeltaTest::UTest => mann_whitney_u(&old.rvalues, &new.rvalues).map(Some),
            DeltaTest::TTest => welch_t_test(&old.rvalues, &new.rvalues).map(Some),
            DeltaTest::None => Ok(None),
        }
    }
}

impl FromStr for DeltaTest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utest" | "u-test" | "u" => Ok(DeltaTest::UTest),
            "ttest" | "t-test" | "t" => Ok(DeltaTest::TTest),
            "none" => Ok(DeltaTest::None),
            other => Err(format!(
                "unknown delta test '{}', must be one of: {}",
                other,
                Self::NAMES.join(", ")
            )),
        }
    }
}

impl std::fmt::Display for DeltaTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DeltaTest::UTest => "utest",
            DeltaTest::TTest => "ttest",
            DeltaTest::None => "none",
        })
    }
}

/// Two-sided Mann-Whitney U test.
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<f64, DeltaTestError> {
    let n1 = x.len();
    let n2 = y.len();
    if n1 == 0 || n2 == 0 {
        return Err(DeltaTestError::SamplesTooSmall);
    }

    let mut combined: Vec<(f64, bool)> = x
        .iter()
        .map(|&v| (v, true))
        .chain(y.iter().map(|&v| (v, false)))
        .collect();
    combined.sort_by(|a, b| a.0.total_cmp(&b.0));

    // Average ranks over ties, accumulating the tie correction term
    let n = combined.len();
    let mut rank_sum_x = 0.0;
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && combined[j].0 == combined[i].0 {
            j += 1;
        }
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let ties = (j - i) as f64;
        tie_term += ties * ties * ties - ties;
        rank_sum_x += combined[i..j]
            .iter()
            .filter(|(_, from_x)| *from_x)
            .count() as f64
            * avg_rank;
        i = j;
    }

    let (n1f, n2f, nf) = (n1 as f64, n2 as f64, n as f64);
    let u = rank_sum_x - n1f * (n1f + 1.0) / 2.0;
    let mu = n1f * n2f / 2.0;
    let variance = n1f * n2f / 12.0 * ((nf + 1.0) - tie_term / (nf * (nf - 1.0)));
    if variance <= 0.0 || !variance.is_finite() {
        return Err(DeltaTestError::AllEqual);
    }

    let z = ((u - mu).abs() - 0.5).max(0.0) / variance.sqrt();
    Ok((2.0 * (1.0 - normal_cdf(z))).clamp(0.0, 1.0))
}

/// Two-sided Welch's t-test.
pub fn welch_t_test(x: &[f64], y: &[f64]) -> Result<f64, DeltaTestError> {
    if x.len() < 2 || y.len() < 2 {
        return Err(DeltaTestError::SamplesTooSmall);
    }
    let (n1, n2) = (x.len() as f64, y.len() as f64);
    let (m1, m2) = (mean(x), mean(y));
    let v1 = sample_variance(x, m1);
    let v2 = sample_variance(y, m2);
    if v1 == 0.0 && v2 == 0.0 {
        return Err(DeltaTestError::ZeroVariance);
    }

    let se1 = v1 / n1;
    let se2 = v2 / n2;
    let t = (m1 - m2) / (se1 + se2).sqrt();
    let df = (se1 + se2).powi(2) / (se1 * se1 / (n1 - 1.0) + se2 * se2 / (n2 - 1.0));

    Ok(student_t_two_sided(t, df))
}

fn sample_variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0)
}

/// Two-sided tail probability of Student's t distribution.
fn student_t_two_sided(t: f64, df: f64) -> f64 {
    let x = df / (df + t * t);
    regularized_incomplete_beta(x, df / 2.0, 0.5).clamp(0.0, 1.0)
}

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Error function approximation (Abramowitz and Stegun 7.1.26).
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x >= 0.0 { 1.0 } else { -1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

/// Natural log of the gamma function (Lanczos, g = 7).
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 9] = [
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
        // Reflection formula
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut a = COEFFS[0];
    let t = x + 7.5;
    for (i, c) in COEFFS.iter().enumerate().skip(1) {
        a += c / (x + i as f64);
    }
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
}

/// Regularized incomplete beta function I_x(a, b).
fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    // The continued fraction converges fastest on this side of the mean
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

/// Continued fraction for the incomplete beta function (modified Lentz).
fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    const MAX_ITERATIONS: usize = 300;
    const EPSILON: f64 = 1e-14;
    const TINY: f64 = 1e-300;

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
