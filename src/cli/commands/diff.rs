//! diff command - Benchmark the worktree against a base revision

use std::io::Write;

use super::{apply_report_args, load_config, open_output, Outcome};
use crate::cli::args::{BenchArgs, DiffArgs};
use crate::engine::{self, Context, DiffOptions};
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Run the comparison and write the report.
pub fn diff(ctx: &Context, args: DiffArgs) -> Result<Outcome> {
    let config = load_config(ctx)?;
    let mut options = DiffOptions::from_config(&config);

    if let Some(base_ref) = args.base_ref {
        options.base_ref = base_ref;
    }
    if let Some(git_cmd) = args.git_cmd {
        options.git_cmd = git_cmd;
    }
    options.tolerance = args.tolerance;
    apply_bench_args(&mut options, args.bench);
    apply_report_args(&mut options, args.report)?;

    let mut rendered = Vec::new();
    let outcome = engine::run_diff(ctx, &options, &mut rendered).context("Benchmark comparison failed")?;

    let mut out = open_output(args.output.as_ref())?;
    out.write_all(&rendered)
        .and_then(|()| out.flush())
        .context("Failed to write report")?;

    if outcome.regressions.is_empty() {
        return Ok(Outcome::Success);
    }

    for regression in &outcome.regressions {
        output::error(format_args!(
            "regression beyond {}%: {}",
            options.tolerance.unwrap_or_default(),
            regression
        ));
    }
    Ok(Outcome::CheckFailed)
}

fn apply_bench_args(options: &mut DiffOptions, args: BenchArgs) {
    let bench = &mut options.bench;
    if let Some(pattern) = args.pattern {
        bench.pattern = pattern;
    }
    if let Some(packages) = args.packages {
        bench.packages = packages;
    }
    if let Some(count) = args.count {
        bench.count = count;
    }
    if args.benchtime.is_some() {
        bench.benchtime = args.benchtime;
    }
    if args.cpu.is_some() {
        bench.cpu = args.cpu;
    }
    if args.benchmem {
        bench.benchmem = true;
    }
    if args.tags.is_some() {
        bench.tags = args.tags;
    }
    if let Some(go_cmd) = args.go_cmd {
        bench.go_cmd = go_cmd;
    }
}
