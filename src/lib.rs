//! benchdiff - Compare Go benchmark results between git revisions
//!
//! benchdiff runs a package's benchmarks on the worktree and again at a
//! base revision, then reports the statistically significant changes.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates a comparison run
//! - [`git`] - Temporary checkouts ([`git::RefRunner`]) and read-only queries
//! - [`bench`] - Runs `go test -bench`
//! - [`stats`] - Parses results and builds comparison tables
//! - [`report`] - Renders tables as text, CSV, Markdown, HTML or JSON
//! - [`core`] - Domain types and configuration
//! - [`ui`] - Diagnostics on stderr
//!
//! # Correctness Invariants
//!
//! 1. A benchmark run at another revision always leaves the worktree,
//!    index, untracked files and checked-out branch as it found them;
//!    untracked files are never moved, so the run sees them too
//! 2. No branch pointer is ever moved
//! 3. A failed run writes no report

pub mod bench;
pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod report;
pub mod stats;
pub mod ui;
