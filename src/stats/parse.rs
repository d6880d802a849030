//! stats::parse
//!
//! Reader for the plain-text benchmark format written by `go test -bench`.
//!
//! ```text
//! goos: linux
//! pkg: example.com/widget
//! BenchmarkEncode-8    1000000    1234 ns/op    256 B/op    3 allocs/op
//! PASS
//! ```
//!
//! Configuration lines (`key: value`) attach labels to every benchmark
//! line that follows them until the key is set again. Benchmark lines are
//! a name starting with `Benchmark`, an iteration count, then one or more
//! `value unit` pairs. Anything else (`PASS`, `ok ...`, test log output)
//! is ignored, and a benchmark line that does not have that shape is
//! skipped rather than failing the whole file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from reading benchmark output.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read benchmark results '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One measured value of a benchmark line.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub unit: String,
}

/// A single benchmark result line.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchResult {
    /// Name without the `Benchmark` prefix, including any `-N` GOMAXPROCS suffix
    pub name: String,
    pub iterations: u64,
    pub measurements: Vec<Measurement>,
    /// Configuration labels in effect when the line was read
    pub labels: BTreeMap<String, String>,
}

/// Parse benchmark output text.
pub fn parse(text: &str) -> Vec<BenchResult> {
    let mut labels = BTreeMap::new();
    let mut results = Vec::new();

    for line in text.lines() {
        if let Some((key, value)) = parse_config_line(line) {
            labels.insert(key.to_string(), value.to_string());
            continue;
        }
        if let Some(mut result) = parse_bench_line(line) {
            result.labels = labels.clone();
            results.push(result);
        }
    }

    results
}

/// Read and parse a benchmark output file.
pub fn parse_file(path: &Path) -> Result<Vec<BenchResult>, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse(&text))
}

/// A configuration line is `key: value` where the key starts with a
/// lowercase letter and contains no whitespace or uppercase letters.
fn parse_config_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let first = key.chars().next()?;
    if !first.is_ascii_lowercase() {
        return None;
    }
    if key
        .chars()
        .any(|c| c.is_whitespace() || c.is_uppercase())
    {
        return None;
    }
    Some((key, value.trim()))
}

fn parse_bench_line(line: &str) -> Option<BenchResult> {
    let mut fields = line.split_whitespace();
    let full_name = fields.next()?;
    let name = full_name.strip_prefix("Benchmark")?;
    // `Benchmarking` is prose, `Benchmark` alone or `BenchmarkFoo` is a name
    if name.chars().next().is_some_and(|c| c.is_lowercase()) {
        return None;
    }

    let iterations: u64 = fields.next()?.parse().ok()?;
    let rest: Vec<&str> = fields.collect();
    if rest.is_empty() || rest.len() % 2 != 0 {
        return None;
    }

    let measurements = rest
        .chunks(2)
        .map(|pair| {
            pair[0].parse::<f64>().ok().map(|value| Measurement {
                value,
                unit: pair[1].to_string(),
            })
        })
        .collect::<Option<Vec<_>>>()?;

    Some(BenchResult {
        name: name.to_string(),
        iterations,
        measurements,
        labels: BTreeMap::new(),
    })
}
