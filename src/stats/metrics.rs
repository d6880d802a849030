//! stats::metrics
//!
//! Summary of one benchmark's samples under one configuration.
//!
//! Outliers are dropped with the IQR rule (outside `[Q1 - 1.5*IQR,
//! Q3 + 1.5*IQR]`) before computing the mean and range, so a single
//! scheduler hiccup does not swing the reported value. The raw samples
//! are kept alongside for the record.

use serde::Serialize;

/// Samples and summary statistics for one (configuration, benchmark, unit).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub unit: String,
    /// Every sample as read
    pub values: Vec<f64>,
    /// Samples with outliers removed
    pub rvalues: Vec<f64>,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl Metrics {
    /// Summarize `values` measured in `unit`.
    pub fn new(unit: impl Into<String>, values: Vec<f64>) -> Self {
        let rvalues = remove_outliers(&values);
        let (min, mean, max) = if rvalues.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let min = rvalues.iter().copied().fold(f64::INFINITY, f64::min);
            let max = rvalues.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (min, mean(&rvalues), max)
        };

        Self {
            unit: unit.into(),
            values,
            rvalues,
            min,
            mean,
            max,
        }
    }

    /// Largest relative distance from the mean to either extreme.
    pub fn relative_range(&self) -> f64 {
        if self.mean == 0.0 {
            return 0.0;
        }
        let high = self.max / self.mean - 1.0;
        let low = 1.0 - self.min / self.mean;
        high.max(low)
    }

    /// Range rendered as `±N%`, or an empty string when there is no
    /// meaningful range (mean of zero or no samples).
    pub fn format_diff(&self) -> String {
        if self.mean == 0.0 || self.rvalues.is_empty() {
            return String::new();
        }
        format!("±{:.0}%", self.relative_range() * 100.0)
    }
}

/// Arithmetic mean. Zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Quantile by linear interpolation between closest ranks.
///
/// `sorted` must be sorted ascending and non-empty; `q` is in `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Drop samples outside the 1.5×IQR fences, keeping input order.
pub fn remove_outliers(values: &[f64]) -> Vec<f64> {
    if values.len() < 4 {
        return values.to_vec();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lo = q1 - 1.5 * iqr;
    let hi = q3 + 1.5 * iqr;

    values
        .iter()
        .copied()
        .filter(|v| *v >= lo && *v <= hi)
        .collect()
}
