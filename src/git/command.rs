//! git::command
//!
//! Subprocess access to the git command-line tool.
//!
//! Worktree mutations (stash, checkout) are performed by the git executable
//! itself rather than through libgit2, so that they honor the user's hooks,
//! attributes, filters and sparse-checkout settings exactly as an
//! interactive `git checkout` would.
//!
//! Every invocation runs with `current_dir` set to the worktree, is echoed
//! at debug verbosity, and turns a non-zero exit status into an error that
//! carries the command line and its stderr.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::ui::output::{self, Verbosity};

/// Errors from invoking the git executable.
#[derive(Debug, Error)]
pub enum GitCommandError {
    /// The executable could not be started.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// The rendered command line
        command: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// The command exited with a non-zero status.
    #[error("`{command}` exited with {}: {stderr}", exit_code_display(.code))]
    Failed {
        /// The rendered command line
        command: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Trimmed stderr output
        stderr: String,
    },
}

fn exit_code_display(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

/// A handle on the git executable bound to one working directory.
///
/// # Example
///
/// ```ignore
/// use benchdiff::git::GitCli;
/// use benchdiff::ui::output::Verbosity;
///
/// let git = GitCli::new("git", "/path/to/repo", Verbosity::Debug);
/// let head = git.run(&["rev-parse", "HEAD"])?;
/// ```
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    workdir: PathBuf,
    verbosity: Verbosity,
}

impl GitCli {
    /// Create a handle running `program` (a name looked up on `PATH` or a
    /// path) inside `workdir`.
    pub fn new(program: impl Into<String>, workdir: impl Into<PathBuf>, verbosity: Verbosity) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
            verbosity,
        }
    }

    /// The working directory commands run in.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// The verbosity this handle logs at.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Run git with `args` and return its trimmed stdout.
    ///
    /// # Errors
    ///
    /// - [`GitCommandError::Spawn`] if the executable cannot be started
    /// - [`GitCommandError::Failed`] if it exits non-zero
    pub fn run(&self, args: &[&str]) -> Result<String, GitCommandError> {
        let command = output::format_command(&self.program, args);
        output::debug(format_args!("({}) {}", self.workdir.display(), command), self.verbosity);

        let out = Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| GitCommandError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !out.status.success() {
            return Err(GitCommandError::Failed {
                command,
                code: out.status.code(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }

    /// Name the revision HEAD currently points at.
    ///
    /// Returns the short branch name when a branch is checked out, or the
    /// full commit id when HEAD is detached.
    pub fn current_ref(&self) -> Result<CurrentRef, GitCommandError> {
        match self.run(&["symbolic-ref", "--quiet", "--short", "HEAD"]) {
            Ok(branch) if !branch.is_empty() => Ok(CurrentRef::Branch(branch)),
            // `symbolic-ref --quiet` exits 1 without output on a detached HEAD
            Ok(_) | Err(GitCommandError::Failed { code: Some(1), .. }) => {
                let commit = self.run(&["rev-parse", "--verify", "HEAD"])?;
                Ok(CurrentRef::Detached(commit))
            }
            Err(e) => Err(e),
        }
    }
}

/// What HEAD pointed at before a temporary checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentRef {
    /// A branch was checked out.
    Branch(String),
    /// HEAD was detached at this commit.
    Detached(String),
}

impl CurrentRef {
    /// Arguments for `git checkout` that return HEAD to this state.
    pub fn checkout_args(&self) -> Vec<&str> {
        match self {
            CurrentRef::Branch(name) => vec!["checkout", "--quiet", name.as_str()],
            CurrentRef::Detached(commit) => vec!["checkout", "--quiet", "--detach", commit.as_str()],
        }
    }
}

impl std::fmt::Display for CurrentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurrentRef::Branch(name) => write!(f, "{}", name),
            CurrentRef::Detached(commit) => write!(f, "{} (detached)", commit),
        }
    }
}
