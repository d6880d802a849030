//! stats
//!
//! Statistical comparison of benchmark runs.
//!
//! # Modules
//!
//! - [`parse`] - Reader for `go test -bench` output
//! - [`metrics`] - Per-benchmark summary with outlier removal
//! - [`delta`] - Significance tests (Mann-Whitney U, Welch's t)
//! - [`scaler`] - Human-readable unit prefixes
//! - [`table`] - Collections of runs turned into comparison tables
//!
//! # Example
//!
//! ```
//! use benchdiff::stats::{Collection, DeltaTest};
//!
//! let mut collection = Collection::default();
//! collection.delta_test = DeltaTest::TTest;
//! collection.add_config("old", "BenchmarkX 10 100 ns/op\nBenchmarkX 10 102 ns/op\n");
//! collection.add_config("new", "BenchmarkX 10 80 ns/op\nBenchmarkX 10 81 ns/op\n");
//!
//! for table in collection.tables() {
//!     println!("{}: {} rows", table.metric, table.rows.len());
//! }
//! ```

pub mod delta;
pub mod metrics;
pub mod parse;
pub mod scaler;
pub mod table;

pub use delta::{DeltaTest, DeltaTestError};
pub use metrics::Metrics;
pub use parse::{parse, parse_file, BenchResult, Measurement, ParseError};
pub use scaler::Scaler;
pub use table::{Change, Collection, Order, Row, Table, DEFAULT_ALPHA, GEOMEAN_NAME};
