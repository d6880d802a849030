//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration and applies its flags on top
//! 2. Calls the engine to do the work
//! 3. Reports the outcome
//!
//! Handlers return [`anyhow::Result`]; library errors get context attached
//! here and are printed by `main`.

mod completion;
mod config_cmd;
mod diff;
mod stat;

pub use completion::completion;
pub use config_cmd::config;
pub use diff::diff;
pub use stat::stat;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::args::{Command, ReportArgs};
use crate::core::config::Config;
use crate::engine::{Context, DiffOptions};
use crate::git::Git;
use crate::ui::output;

/// What the process should exit with after a command that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The command completed but its check failed (exit status 1)
    CheckFailed,
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<Outcome> {
    match command {
        Command::Diff(args) => diff(ctx, args),
        Command::Stat(args) => stat(ctx, args).map(|()| Outcome::Success),
        Command::Config { paths } => config(ctx, paths).map(|()| Outcome::Success),
        Command::Completion { shell } => completion(shell).map(|()| Outcome::Success),
    }
}

/// Load configuration, including the repo file when `ctx` is inside a
/// repository.
fn load_config(ctx: &Context) -> Result<Config> {
    let cwd = ctx.workdir().context("Failed to determine working directory")?;
    let root = Git::open(&cwd)
        .ok()
        .and_then(|git| git.info().ok())
        .map(|info| info.work_dir);

    let result = Config::load(root.as_deref()).context("Failed to load config")?;
    for warning in &result.warnings {
        output::warn(
            format_args!("{} ({})", warning.message, warning.path.display()),
            ctx.verbosity(),
        );
    }
    Ok(result.config)
}

/// Apply report flags over config-derived options.
fn apply_report_args(options: &mut DiffOptions, args: ReportArgs) -> Result<()> {
    if let Some(format) = args.format {
        options.format = format;
    }
    if args.csv_norange {
        options.format_options.no_range = true;
    }
    if let Some(path) = args.html_header {
        options.format_options.html_header = Some(read_text(&path)?);
    }
    if let Some(path) = args.html_footer {
        options.format_options.html_footer = Some(read_text(&path)?);
    }
    if let Some(alpha) = args.alpha {
        options.alpha = alpha;
    }
    if let Some(delta_test) = args.delta_test {
        options.delta_test = delta_test;
    }
    if args.geomean {
        options.geomean = true;
    }
    if let Some(sort) = args.sort {
        options.sort = sort;
    }
    options.reverse = args.reverse;
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Stdout, or a file when `path` is given.
fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}
