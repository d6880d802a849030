//! cli
//!
//! Command-line interface layer for benchdiff.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Merge flags over configuration
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! the [`crate::engine`] for execution.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};
pub use commands::Outcome;

use crate::engine;
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<Outcome> {
    let cli = Cli::parse_args();

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
