//! engine
//!
//! Orchestrates a comparison run.
//!
//! # Lifecycle
//!
//! ```text
//! Open repo -> Resolve revisions -> Bench head -> Bench base (RefRunner)
//!   -> Collect -> Format -> Tolerance check
//! ```
//!
//! The head run uses the worktree as it stands. The base run goes through
//! [`crate::git::RefRunner`], which stashes and restores local changes
//! around it. Any failure before formatting aborts without writing a
//! report.

pub mod diff;

pub use diff::{run_diff, DiffError, DiffOptions, DiffOutcome, Regression};

use std::path::PathBuf;

use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// Verbosity implied by the flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// The directory commands operate in.
    pub fn workdir(&self) -> std::io::Result<PathBuf> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_debug() {
        let ctx = Context {
            debug: true,
            quiet: true,
            ..Context::default()
        };
        assert_eq!(ctx.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn cwd_override() {
        let ctx = Context {
            cwd: Some(PathBuf::from("/tmp/x")),
            ..Context::default()
        };
        assert_eq!(ctx.workdir().unwrap(), PathBuf::from("/tmp/x"));
    }
}
