//! stats::table
//!
//! Builds comparison tables from benchmark output of several configurations.
//!
//! # Layout
//!
//! One [`Table`] per metric (time/op, alloc/op, ...), in order of first
//! appearance. Each table has one [`Row`] per (group, benchmark) and one
//! [`Metrics`] cell per configuration. With exactly two configurations
//! each row also carries the percentage change and the outcome of the
//! configured [`DeltaTest`].

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::delta::DeltaTest;
use super::metrics::Metrics;
use super::parse::{self, BenchResult};
use super::scaler::Scaler;

/// Default significance cutoff.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Display name of the geometric mean row.
pub const GEOMEAN_NAME: &str = "[Geo mean]";

/// Row ordering within a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Order in which benchmarks first appear in the input
    #[default]
    Input,
    /// Lexicographic by group, then benchmark name
    Name,
    /// By percentage change, smallest first; rows without one go last
    Delta,
}

impl Order {
    /// Valid names for configuration and flags.
    pub const NAMES: [&'static str; 3] = ["input", "name", "delta"];
}

impl FromStr for Order {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "input" | "none" | "" => Ok(Order::Input),
            "name" => Ok(Order::Name),
            "delta" => Ok(Order::Delta),
            other => Err(format!(
                "unknown sort order '{}', must be one of: {}",
                other,
                Self::NAMES.join(", ")
            )),
        }
    }
}

/// Direction of a significant change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    Better,
    Worse,
    #[default]
    Unchanged,
}

/// One benchmark's metrics across configurations.
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    pub benchmark: String,
    /// Split-by label values, e.g. `pkg:example.com/widget`; may be empty
    pub group: String,
    /// One entry per configuration, `None` if it has no samples there
    pub metrics: Vec<Option<Metrics>>,
    /// Percentage change from the first to the second configuration
    pub pct_delta: Option<f64>,
    /// `+1.23%`, `~` when not significant, or empty when not comparable
    pub delta: String,
    /// Test details such as `(p=0.008 n=5+5)`
    pub note: String,
    pub change: Change,
    #[serde(skip)]
    pub scaler: Scaler,
}

impl Row {
    /// Render the cell for configuration `index` as `value ± range`.
    pub fn format_metric(&self, index: usize) -> String {
        match self.metrics.get(index).and_then(Option::as_ref) {
            None => String::new(),
            Some(m) => {
                let value = self.scaler.format(m.mean);
                let diff = m.format_diff();
                if diff.is_empty() {
                    value
                } else {
                    format!("{} {}", value, diff)
                }
            }
        }
    }

    /// Whether this row is comparable but showed no significant change.
    pub fn is_insignificant(&self) -> bool {
        self.delta == "~"
    }
}

/// A comparison table for one metric.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    /// Display name of the metric, e.g. `time/op`
    pub metric: String,
    /// Unit the raw values are measured in, e.g. `ns/op`
    pub unit: String,
    pub configs: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Whether the table compares exactly two configurations and so has
    /// delta columns.
    pub fn has_delta(&self) -> bool {
        self.configs.len() == 2
    }
}

/// Display name of the metric measured in `unit`.
pub fn metric_name(unit: &str) -> &str {
    match unit {
        "ns/op" => "time/op",
        "B/op" => "alloc/op",
        "allocs/op" => "allocs/op",
        "MB/s" => "speed",
        other => other,
    }
}

/// Whether larger values of `unit` are an improvement.
fn higher_is_better(unit: &str) -> bool {
    unit.ends_with("/s")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RowKey {
    group: String,
    benchmark: String,
}

/// Accumulates benchmark output per configuration and builds tables.
///
/// # Example
///
/// ```
/// use benchdiff::stats::Collection;
///
/// let mut c = Collection::default();
/// c.add_config("old", "BenchmarkX 1 100 ns/op\nBenchmarkX 1 101 ns/op\n");
/// c.add_config("new", "BenchmarkX 1 50 ns/op\nBenchmarkX 1 51 ns/op\n");
/// let tables = c.tables();
/// assert_eq!(tables[0].metric, "time/op");
/// assert_eq!(tables[0].rows[0].benchmark, "X");
/// ```
#[derive(Debug, Clone)]
pub struct Collection {
    /// p-value cutoff for reporting a change
    pub alpha: f64,
    pub delta_test: DeltaTest,
    /// Append a geometric mean row to each table
    pub add_geomean: bool,
    /// Labels that split rows into groups
    pub split_by: Vec<String>,
    pub order: Order,
    pub reverse: bool,

    configs: Vec<String>,
    units: Vec<String>,
    keys: Vec<RowKey>,
    samples: HashMap<(usize, RowKey, String), Vec<f64>>,
}

impl Default for Collection {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            delta_test: DeltaTest::default(),
            add_geomean: false,
            split_by: vec!["pkg".to_string()],
            order: Order::default(),
            reverse: false,
            configs: Vec::new(),
            units: Vec::new(),
            keys: Vec::new(),
            samples: HashMap::new(),
        }
    }
}

impl Collection {
    /// Add a configuration from benchmark output text.
    ///
    /// Adding the same configuration name twice appends to its samples.
    pub fn add_config(&mut self, name: &str, text: &str) {
        self.add_results(name, parse::parse(text));
    }

    /// Add already-parsed results under configuration `name`.
    pub fn add_results(&mut self, name: &str, results: Vec<BenchResult>) {
        let config = match self.configs.iter().position(|c| c == name) {
            Some(i) => i,
            None => {
                self.configs.push(name.to_string());
                self.configs.len() - 1
            }
        };

        for result in results {
            let key = RowKey {
                group: self.group_of(&result.labels),
                benchmark: result.name,
            };
            if !self.keys.contains(&key) {
                self.keys.push(key.clone());
            }
            for m in result.measurements {
                if !self.units.contains(&m.unit) {
                    self.units.push(m.unit.clone());
                }
                self.samples
                    .entry((config, key.clone(), m.unit))
                    .or_default()
                    .push(m.value);
            }
        }
    }

    /// Configuration names in the order they were added.
    pub fn configs(&self) -> &[String] {
        &self.configs
    }

    fn group_of(&self, labels: &BTreeMap<String, String>) -> String {
        self.split_by
            .iter()
            .filter_map(|key| labels.get(key).map(|v| format!("{}:{}", key, v)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build one table per metric.
    pub fn tables(&self) -> Vec<Table> {
        self.units
            .iter()
            .map(|unit| self.table_for(unit))
            .filter(|t| !t.rows.is_empty())
            .collect()
    }

    fn table_for(&self, unit: &str) -> Table {
        let mut rows: Vec<Row> = self
            .keys
            .iter()
            .filter_map(|key| self.row_for(key, unit))
            .collect();

        self.sort_rows(&mut rows);

        if self.add_geomean && self.configs.len() == 2 {
            if let Some(row) = self.geomean_row(&rows, unit) {
                rows.push(row);
            }
        }

        Table {
            metric: metric_name(unit).to_string(),
            unit: unit.to_string(),
            configs: self.configs.clone(),
            rows,
        }
    }

    fn row_for(&self, key: &RowKey, unit: &str) -> Option<Row> {
        let metrics: Vec<Option<Metrics>> = (0..self.configs.len())
            .map(|config| {
                self.samples
                    .get(&(config, key.clone(), unit.to_string()))
                    .map(|values| Metrics::new(unit, values.clone()))
            })
            .collect();

        let first_mean = metrics.iter().flatten().next()?.mean;

        let mut row = Row {
            benchmark: key.benchmark.clone(),
            group: key.group.clone(),
            metrics,
            pct_delta: None,
            delta: String::new(),
            note: String::new(),
            change: Change::Unchanged,
            scaler: Scaler::new(first_mean, unit),
        };

        if self.configs.len() == 2 {
            self.fill_delta(&mut row, unit);
        }

        Some(row)
    }

    fn fill_delta(&self, row: &mut Row, unit: &str) {
        let (Some(old), Some(new)) = (&row.metrics[0], &row.metrics[1]) else {
            return;
        };
        if old.rvalues.is_empty() || new.rvalues.is_empty() {
            return;
        }

        let pct = if old.mean == 0.0 {
            None
        } else {
            Some((new.mean / old.mean - 1.0) * 100.0)
        };

        let (significant, note) = match self.delta_test.p_value(old, new) {
            Ok(Some(p)) => (
                p < self.alpha,
                format!("(p={:.3} n={}+{})", p, old.rvalues.len(), new.rvalues.len()),
            ),
            Ok(None) => (true, format!("(n={}+{})", old.rvalues.len(), new.rvalues.len())),
            Err(e) => (false, format!("({})", e)),
        };

        row.pct_delta = pct;
        row.note = note;
        match pct {
            Some(pct) if significant => {
                row.delta = format!("{:+.2}%", pct);
                row.change = change_for(pct, unit);
            }
            _ => row.delta = "~".to_string(),
        }
    }

    fn sort_rows(&self, rows: &mut [Row]) {
        match self.order {
            Order::Input => {}
            Order::Name => rows.sort_by(|a, b| {
                (a.group.as_str(), a.benchmark.as_str()).cmp(&(b.group.as_str(), b.benchmark.as_str()))
            }),
            Order::Delta => rows.sort_by(|a, b| match (a.pct_delta, b.pct_delta) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }),
        }
        if self.reverse {
            rows.reverse();
        }
    }

    /// Geometric mean of the means of rows present in both configurations.
    fn geomean_row(&self, rows: &[Row], unit: &str) -> Option<Row> {
        let pairs: Vec<(f64, f64)> = rows
            .iter()
            .filter_map(|row| match (&row.metrics[0], &row.metrics[1]) {
                (Some(a), Some(b)) if a.mean > 0.0 && b.mean > 0.0 => Some((a.mean, b.mean)),
                _ => None,
            })
            .collect();
        if pairs.is_empty() {
            return None;
        }

        let n = pairs.len() as f64;
        let old = (pairs.iter().map(|(a, _)| a.ln()).sum::<f64>() / n).exp();
        let new = (pairs.iter().map(|(_, b)| b.ln()).sum::<f64>() / n).exp();
        let pct = (new / old - 1.0) * 100.0;

        let summary = |mean: f64| Metrics {
            unit: unit.to_string(),
            values: Vec::new(),
            rvalues: Vec::new(),
            min: mean,
            mean,
            max: mean,
        };

        Some(Row {
            benchmark: GEOMEAN_NAME.to_string(),
            group: String::new(),
            metrics: vec![Some(summary(old)), Some(summary(new))],
            pct_delta: Some(pct),
            delta: format!("{:+.2}%", pct),
            note: String::new(),
            change: Change::Unchanged,
            scaler: Scaler::new(old, unit),
        })
    }
}

fn change_for(pct: f64, unit: &str) -> Change {
    let improved = if higher_is_better(unit) { pct > 0.0 } else { pct < 0.0 };
    if pct == 0.0 {
        Change::Unchanged
    } else if improved {
        Change::Better
    } else {
        Change::Worse
    }
}
