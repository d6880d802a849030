//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Echo every git and go invocation
//! - `--quiet` / `-q`: Errors only
//!
//! Flags left unset fall back to the config files, then to defaults.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::report::OutputFormat;
use crate::stats::{DeltaTest, Order};

/// benchdiff - Compare benchmark results between a git ref and the current worktree
#[derive(Parser, Debug)]
#[command(name = "benchdiff")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if benchdiff was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Benchmark the worktree against a base revision
    #[command(
        name = "diff",
        long_about = "Benchmark the worktree against a base revision.\n\n\
            Runs `go test -bench` on the worktree as it stands, then stashes local \
            changes, checks out the base revision, runs the same benchmarks there, \
            and restores the worktree. The two result sets are compared and the \
            report is written to stdout.",
        after_help = "\
EXAMPLES:
    # Compare uncommitted changes against HEAD
    benchdiff diff

    # Compare against main, six runs each, as markdown
    benchdiff diff --base-ref main --count 6 --format markdown

    # Fail CI when anything regresses by more than 5%
    benchdiff diff --base-ref origin/main --tolerance 5"
    )]
    Diff(DiffArgs),

    /// Compare two existing benchmark result files
    #[command(
        name = "stat",
        after_help = "\
EXAMPLES:
    go test -bench . -count 10 > old.txt
    # ... make changes ...
    go test -bench . -count 10 > new.txt
    benchdiff stat old.txt new.txt"
    )]
    Stat(StatArgs),

    /// Print the effective configuration
    Config {
        /// Print the config files that were loaded instead
        #[arg(long)]
        paths: bool,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    benchdiff completion bash > /etc/bash_completion.d/benchdiff

    # Zsh
    benchdiff completion zsh > \"${fpath[1]}/_benchdiff\"

    # Fish
    benchdiff completion fish > ~/.config/fish/completions/benchdiff.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of `benchdiff diff`.
#[derive(Args, Debug, Default)]
pub struct DiffArgs {
    /// Revision to compare against [default: HEAD]
    #[arg(long, value_name = "REF")]
    pub base_ref: Option<String>,

    /// The git executable [default: git]
    #[arg(long, value_name = "CMD")]
    pub git_cmd: Option<String>,

    /// Fail when a significant regression exceeds this percentage
    #[arg(long, value_name = "PCT")]
    pub tolerance: Option<f64>,

    /// Write the report here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub bench: BenchArgs,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// Arguments of `benchdiff stat`.
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Results of the old configuration
    pub old: PathBuf,

    /// Results of the new configuration
    pub new: PathBuf,

    /// Write the report here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// How the benchmarks are run.
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "Benchmark options")]
pub struct BenchArgs {
    /// Run benchmarks matching this regular expression [default: .]
    #[arg(long = "bench", value_name = "REGEXP")]
    pub pattern: Option<String>,

    /// Packages to benchmark [default: ./...]
    #[arg(long, value_name = "PKG", num_args = 1..)]
    pub packages: Option<Vec<String>>,

    /// Runs per benchmark [default: 10]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub count: Option<u32>,

    /// Passed to go test -benchtime
    #[arg(long, value_name = "DURATION")]
    pub benchtime: Option<String>,

    /// Passed to go test -cpu
    #[arg(long, value_name = "LIST")]
    pub cpu: Option<String>,

    /// Report allocations
    #[arg(long)]
    pub benchmem: bool,

    /// Passed to go test -tags
    #[arg(long)]
    pub tags: Option<String>,

    /// The go executable [default: go]
    #[arg(long, value_name = "CMD")]
    pub go_cmd: Option<String>,
}

/// How results are compared and rendered.
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "Report options")]
pub struct ReportArgs {
    /// Output format: text, csv, markdown, html or json [default: text]
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Omit the range columns from csv and markdown output
    #[arg(long)]
    pub csv_norange: bool,

    /// File whose contents replace the default HTML header
    #[arg(long, value_name = "FILE")]
    pub html_header: Option<PathBuf>,

    /// File whose contents replace the default HTML footer
    #[arg(long, value_name = "FILE")]
    pub html_footer: Option<PathBuf>,

    /// Significance level [default: 0.05]
    #[arg(long, value_parser = parse_alpha)]
    pub alpha: Option<f64>,

    /// Significance test: utest, ttest or none [default: utest]
    #[arg(long)]
    pub delta_test: Option<DeltaTest>,

    /// Add a geometric mean row
    #[arg(long)]
    pub geomean: bool,

    /// Row order: input, name or delta [default: input]
    #[arg(long)]
    pub sort: Option<Order>,

    /// Reverse the row order
    #[arg(long)]
    pub reverse: bool,
}

fn parse_alpha(s: &str) -> Result<f64, String> {
    let alpha: f64 = s.parse().map_err(|e| format!("{}", e))?;
    crate::core::config::schema::validate_alpha(alpha).map_err(|e| e.to_string())?;
    Ok(alpha)
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
