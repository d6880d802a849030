//! engine::diff
//!
//! Benchmark the worktree against a base revision and report the change.

use std::io::Write;
use std::path::Path;

use thiserror::Error;

use super::Context;
use crate::bench::{BenchCommand, BenchError};
use crate::core::config::Config;
use crate::git::{Git, GitError, RefRunner, RunAtRefError};
use crate::report::{formatter_for, FormatError, FormatOptions, OutputFormat, Report, Revisions};
use crate::stats::{parse_file, Change, Collection, DeltaTest, Order, ParseError};
use crate::ui::output;

/// Configuration name of the base revision's results.
pub const BASE_CONFIG: &str = "base";

/// Configuration name of the worktree's results.
pub const HEAD_CONFIG: &str = "head";

/// Errors from a comparison run.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error("cannot determine the working directory: {0}")]
    Cwd(#[source] std::io::Error),

    #[error("failed to create a directory for benchmark output: {0}")]
    TempDir(#[source] std::io::Error),

    #[error("benchmarks failed on the worktree: {0}")]
    Head(#[source] BenchError),

    #[error(transparent)]
    Base(#[from] RunAtRefError<BenchError>),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Everything a comparison run needs, after config and flags are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffOptions {
    pub git_cmd: String,
    pub base_ref: String,
    pub bench: BenchCommand,
    pub format: OutputFormat,
    pub format_options: FormatOptions,
    pub alpha: f64,
    pub delta_test: DeltaTest,
    pub geomean: bool,
    pub sort: Order,
    pub reverse: bool,
    /// Fail when a significant regression exceeds this many percent
    pub tolerance: Option<f64>,
}

impl DiffOptions {
    /// Options from loaded configuration, before any flags are applied.
    pub fn from_config(config: &Config) -> Self {
        Self {
            git_cmd: config.git_cmd().to_string(),
            base_ref: config.base_ref().to_string(),
            bench: config.bench_command(),
            format: config.format(),
            format_options: config.format_options(),
            alpha: config.alpha(),
            delta_test: config.delta_test(),
            geomean: config.geomean(),
            sort: config.sort(),
            reverse: false,
            tolerance: None,
        }
    }

    /// A collection configured from these options.
    pub fn collection(&self) -> Collection {
        let mut c = Collection::default();
        c.alpha = self.alpha;
        c.delta_test = self.delta_test;
        c.add_geomean = self.geomean;
        c.order = self.sort;
        c.reverse = self.reverse;
        c
    }
}

/// A significant slowdown beyond the tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct Regression {
    pub metric: String,
    pub benchmark: String,
    pub group: String,
    pub pct_delta: f64,
}

impl std::fmt::Display for Regression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.group.is_empty() {
            write!(f, "{} {}: {:+.2}%", self.benchmark, self.metric, self.pct_delta)
        } else {
            write!(
                f,
                "{} {} ({}): {:+.2}%",
                self.benchmark, self.metric, self.group, self.pct_delta
            )
        }
    }
}

/// What a completed run found.
#[derive(Debug, Clone)]
pub struct DiffOutcome {
    pub report: Report,
    /// Empty unless a tolerance was set and exceeded
    pub regressions: Vec<Regression>,
}

/// Benchmark `options.base_ref` and the worktree, then write the report.
///
/// The worktree is benchmarked first, as is. The base revision is then
/// benchmarked with local changes stashed; they are restored before this
/// returns, whether or not the run succeeded.
///
/// # Errors
///
/// Any failure before the report is written aborts with nothing written.
pub fn run_diff(ctx: &Context, options: &DiffOptions, w: &mut dyn Write) -> Result<DiffOutcome, DiffError> {
    let verbosity = ctx.verbosity();
    let cwd = ctx.workdir().map_err(DiffError::Cwd)?;

    let git = Git::open(&cwd)?;
    let root = git.info()?.work_dir;
    let base = git.resolve_revision(&options.base_ref)?;
    let head = git.head_oid()?;
    let worktree_dirty = !git.worktree_status(true)?.is_clean();
    output::debug(
        format_args!(
            "base {} = {}, head = {}{}",
            options.base_ref,
            base,
            head,
            if worktree_dirty { " (dirty)" } else { "" }
        ),
        verbosity,
    );

    let dir = tempfile::Builder::new()
        .prefix("benchdiff-")
        .tempdir()
        .map_err(DiffError::TempDir)?;
    let head_out = dir.path().join("head.out");
    let base_out = dir.path().join("base.out");

    output::progress(
        format_args!("running benchmarks on worktree: {}", options.bench.display()),
        verbosity,
    );
    options
        .bench
        .run(&root, &head_out, verbosity)
        .map_err(DiffError::Head)?;

    output::progress(
        format_args!("running benchmarks at {} ({})", options.base_ref, base.short(10)),
        verbosity,
    );
    let runner = RefRunner::with_program(options.git_cmd.as_str(), root.as_path(), verbosity);
    runner.run_at_ref(&options.base_ref, || {
        options.bench.run(&root, &base_out, verbosity)
    })?;

    let report = build_report(options, &base_out, &head_out)?.with_revisions(Revisions {
        base_ref: options.base_ref.clone(),
        base,
        head,
        worktree_dirty,
    });

    formatter_for(options.format, &options.format_options).format(w, &report)?;

    let regressions = match options.tolerance {
        Some(tolerance) => regressions(&report, tolerance),
        None => Vec::new(),
    };

    Ok(DiffOutcome {
        report,
        regressions,
    })
}

/// Compare two existing result files.
pub fn build_report(options: &DiffOptions, base: &Path, head: &Path) -> Result<Report, DiffError> {
    let mut collection = options.collection();
    collection.add_results(BASE_CONFIG, parse_file(base)?);
    collection.add_results(HEAD_CONFIG, parse_file(head)?);
    Ok(Report::new(collection.tables()))
}

/// Significant slowdowns larger than `tolerance` percent.
pub fn regressions(report: &Report, tolerance: f64) -> Vec<Regression> {
    report
        .tables
        .iter()
        .flat_map(|table| {
            table.rows.iter().filter_map(move |row| match row.pct_delta {
                Some(pct) if row.change == Change::Worse && pct.abs() > tolerance => Some(Regression {
                    metric: table.metric.clone(),
                    benchmark: row.benchmark.clone(),
                    group: row.group.clone(),
                    pct_delta: pct,
                }),
                _ => None,
            })
        })
        .collect()
}
