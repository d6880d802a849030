//! git
//!
//! All Git access for benchdiff.
//!
//! # Architecture
//!
//! Two doorways, split by whether the worktree changes:
//!
//! - [`interface`] wraps `git2` for read-only queries: opening the
//!   repository, resolving revisions to commit ids, status summaries
//! - [`command`] and [`run_at`] drive the git executable for everything
//!   that mutates the worktree (stash, checkout), so user configuration
//!   such as hooks, filters and sparse checkout applies exactly as it does
//!   from a shell
//!
//! No other module imports `git2` or spawns git directly.
//!
//! # Example
//!
//! ```ignore
//! use benchdiff::git::{Git, RefRunner};
//! use benchdiff::ui::output::Verbosity;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let base = git.resolve_revision("origin/main")?;
//!
//! let runner = RefRunner::with_program("git", ".", Verbosity::Normal);
//! runner.run_at_ref(base.as_str(), || run_benchmarks("base.out"))?;
//! ```

mod command;
mod interface;
mod run_at;

pub use command::{CurrentRef, GitCli, GitCommandError};
pub use interface::{Git, GitError, RepoInfo, WorktreeStatus};
pub use run_at::{RefRunner, RunAtRefError, Step, STASH_LABEL_PREFIX};
