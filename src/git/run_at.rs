//! git::run_at
//!
//! Run an operation against the worktree as it existed at another revision.
//!
//! # Sequence
//!
//! 1. Record what HEAD points at (branch name, or commit when detached)
//! 2. `git stash push` of tracked changes (staged and unstaged) under a
//!    unique label
//! 3. `git checkout --detach <ref>`
//! 4. Run the operation
//! 5. `git checkout <original>`
//! 6. `git stash pop --index` of the labelled stash, if one was created
//!
//! Steps 5 and 6 live in a drop guard that is armed before the stash is
//! taken. Every exit path after that point (a failed stash or checkout, an
//! operation error, an operation panic) runs both restore steps. Each
//! restore step is attempted even if the one before it failed, and the
//! first error encountered is the one reported.
//!
//! Untracked files are not stashed. They stay on disk for the whole run, so
//! the operation sees them alongside the committed content of the revision.
//! A checkout that would overwrite one fails and is reported as
//! [`Step::Checkout`].
//!
//! # Invariants
//!
//! - Uncommitted work is never left sitting in the stash unless popping it
//!   failed, in which case the error names the stash
//! - Untracked files are never moved or rewritten
//! - No branch pointer is moved; the temporary checkout is always detached
//! - Nothing is retried
//!
//! Callers must not run two of these against the same worktree at once.

use thiserror::Error;

use super::command::{CurrentRef, GitCli, GitCommandError};
use crate::ui::output::{self, Verbosity};

/// Prefix of the message attached to stashes created here.
pub const STASH_LABEL_PREFIX: &str = "benchdiff";

/// A step of the checkout-and-restore sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Reading HEAD before touching anything.
    ResolveOriginal,
    /// Stashing uncommitted changes to tracked files.
    Stash,
    /// Checking out the requested revision.
    Checkout,
    /// Checking the original branch or commit back out.
    RestoreRef,
    /// Popping the stash taken in [`Step::Stash`].
    Unstash,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Step::ResolveOriginal => "resolve HEAD",
            Step::Stash => "stash",
            Step::Checkout => "checkout",
            Step::RestoreRef => "restore checkout",
            Step::Unstash => "stash pop",
        };
        f.write_str(s)
    }
}

/// Errors from [`RefRunner::run_at_ref`].
///
/// Git failures and failures of the operation itself are kept apart so the
/// caller can tell "the benchmarks failed" from "the worktree could not be
/// switched".
#[derive(Debug, Error)]
pub enum RunAtRefError<E> {
    /// A git step failed.
    #[error("git {step} failed: {source}")]
    Git {
        /// The step that failed
        step: Step,
        /// The command error
        #[source]
        source: GitCommandError,
    },

    /// The operation returned an error. The worktree was restored.
    #[error("operation at {refname} failed: {source}")]
    Operation {
        /// The revision the operation ran against
        refname: String,
        /// The operation's error
        #[source]
        source: E,
    },
}

impl<E> RunAtRefError<E> {
    /// The git step that failed, if this is a git failure.
    pub fn step(&self) -> Option<Step> {
        match self {
            RunAtRefError::Git { step, .. } => Some(*step),
            RunAtRefError::Operation { .. } => None,
        }
    }
}

type StepError = (Step, GitCommandError);

/// Runs operations against historical revisions of one worktree.
#[derive(Debug, Clone)]
pub struct RefRunner {
    git: GitCli,
}

impl RefRunner {
    /// Create a runner that drives `git`.
    pub fn new(git: GitCli) -> Self {
        Self { git }
    }

    /// Create a runner for `program` (the git executable) in `workdir`.
    pub fn with_program(
        program: impl Into<String>,
        workdir: impl Into<std::path::PathBuf>,
        verbosity: Verbosity,
    ) -> Self {
        Self::new(GitCli::new(program, workdir, verbosity))
    }

    /// The git handle this runner drives.
    pub fn git(&self) -> &GitCli {
        &self.git
    }

    /// Run `f` with the worktree's tracked files checked out at `refname`,
    /// then put the worktree back the way it was.
    ///
    /// Uncommitted edits to tracked files are stashed for the duration, so
    /// `f` sees the committed content of `refname` for every tracked file.
    /// Untracked files stay where they are and are visible to `f`.
    ///
    /// # Errors
    ///
    /// - [`RunAtRefError::Git`] naming the first git step that failed
    /// - [`RunAtRefError::Operation`] if `f` failed; restore still ran, and
    ///   any restore failure is logged as a warning
    ///
    /// # Example
    ///
    /// ```ignore
    /// let runner = RefRunner::with_program("git", repo_dir, Verbosity::Normal);
    /// let old = runner.run_at_ref("main~3", || std::fs::read_to_string(repo_dir.join("VERSION")))?;
    /// ```
    pub fn run_at_ref<T, E, F>(&self, refname: &str, f: F) -> Result<T, RunAtRefError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let original = self
            .git
            .current_ref()
            .map_err(|source| RunAtRefError::Git {
                step: Step::ResolveOriginal,
                source,
            })?;
        let label = format!("{}-{}", STASH_LABEL_PREFIX, uuid::Uuid::new_v4());
        output::debug(
            format_args!("running at {} (currently on {}), stash label {}", refname, original, label),
            self.git.verbosity(),
        );

        let mut guard = RestoreGuard::new(&self.git, &original, &label);

        if let Err(source) = self.git.run(&["stash", "push", "--quiet", "--message", &label]) {
            guard.finish_and_warn();
            return Err(RunAtRefError::Git {
                step: Step::Stash,
                source,
            });
        }

        guard.checkout_attempted = true;
        if let Err(source) = self.git.run(&["checkout", "--quiet", "--detach", refname]) {
            guard.finish_and_warn();
            return Err(RunAtRefError::Git {
                step: Step::Checkout,
                source,
            });
        }

        let result = f();
        let restored = guard.finish();

        match result {
            Ok(value) => {
                restored.map_err(|(step, source)| RunAtRefError::Git { step, source })?;
                Ok(value)
            }
            Err(source) => {
                if let Err((step, err)) = restored {
                    output::warn(
                        format_args!("git {} failed after operation error: {}", step, err),
                        self.git.verbosity(),
                    );
                }
                Err(RunAtRefError::Operation {
                    refname: refname.to_string(),
                    source,
                })
            }
        }
    }
}

/// Restores HEAD and pops the labelled stash when finished or dropped.
struct RestoreGuard<'a> {
    git: &'a GitCli,
    original: &'a CurrentRef,
    label: &'a str,
    checkout_attempted: bool,
    armed: bool,
}

impl<'a> RestoreGuard<'a> {
    fn new(git: &'a GitCli, original: &'a CurrentRef, label: &'a str) -> Self {
        Self {
            git,
            original,
            label,
            checkout_attempted: false,
            armed: true,
        }
    }

    /// Restore now and report the first failure.
    fn finish(mut self) -> Result<(), StepError> {
        self.armed = false;
        self.restore()
    }

    /// Restore now, logging any failure. Used when an earlier error is the
    /// one being reported.
    fn finish_and_warn(self) {
        let verbosity = self.git.verbosity();
        if let Err((step, err)) = self.finish() {
            output::warn(format_args!("git {} failed during cleanup: {}", step, err), verbosity);
        }
    }

    fn restore(&self) -> Result<(), StepError> {
        let mut first: Option<StepError> = None;

        if self.checkout_attempted {
            if let Err(e) = self.git.run(&self.original.checkout_args()) {
                first.get_or_insert((Step::RestoreRef, e));
            }
        }

        if let Err(e) = self.pop_stash() {
            first.get_or_insert((Step::Unstash, e));
        }

        match first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Pop the stash carrying our label. A missing entry means there was
    /// nothing to stash.
    fn pop_stash(&self) -> Result<(), GitCommandError> {
        let Some(entry) = find_stash(self.git, self.label)? else {
            output::debug("nothing was stashed", self.git.verbosity());
            return Ok(());
        };
        self.git.run(&["stash", "pop", "--index", "--quiet", &entry])?;
        Ok(())
    }
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;
        if let Err((step, err)) = self.restore() {
            output::warn(
                format_args!("git {} failed while unwinding: {}", step, err),
                self.git.verbosity(),
            );
        }
    }
}

/// Find the stash entry (`stash@{n}`) whose message ends with `label`.
fn find_stash(git: &GitCli, label: &str) -> Result<Option<String>, GitCommandError> {
    let list = git.run(&["stash", "list", "--format=%gd%x09%gs"])?;
    Ok(parse_stash_list(&list, label))
}

fn parse_stash_list(list: &str, label: &str) -> Option<String> {
    list.lines().find_map(|line| {
        let (selector, subject) = line.split_once('\t')?;
        subject.ends_with(label).then(|| selector.to_string())
    })
}
