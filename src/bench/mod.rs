//! bench
//!
//! Runs `go test -bench` and captures its output.
//!
//! The command's stdout is streamed straight into a result file; stderr is
//! collected and attached to the error if the run fails.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ui::output::{self, Verbosity};

/// Errors from running benchmarks.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` failed ({status}):\n{stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("failed to write benchmark output to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// How to invoke the benchmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchCommand {
    /// The go executable
    pub go_cmd: String,
    /// Regular expression passed to `-bench`
    pub pattern: String,
    /// Package patterns to benchmark
    pub packages: Vec<String>,
    /// Runs per benchmark (`-count`)
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    pub benchmem: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Appended verbatim before the package list
    pub extra_args: Vec<String>,
}

impl Default for BenchCommand {
    fn default() -> Self {
        Self {
            go_cmd: "go".to_string(),
            pattern: ".".to_string(),
            packages: vec!["./...".to_string()],
            count: 10,
            benchtime: None,
            cpu: None,
            benchmem: false,
            tags: None,
            extra_args: Vec::new(),
        }
    }
}

impl BenchCommand {
    /// Arguments passed to the go executable.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "test".to_string(),
            "-run".to_string(),
            "^$".to_string(),
            "-bench".to_string(),
            self.pattern.clone(),
            "-count".to_string(),
            self.count.to_string(),
        ];
        if let Some(benchtime) = &self.benchtime {
            args.push("-benchtime".to_string());
            args.push(benchtime.clone());
        }
        if let Some(cpu) = &self.cpu {
            args.push("-cpu".to_string());
            args.push(cpu.clone());
        }
        if self.benchmem {
            args.push("-benchmem".to_string());
        }
        if let Some(tags) = &self.tags {
            args.push("-tags".to_string());
            args.push(tags.clone());
        }
        args.extend(self.extra_args.iter().cloned());
        args.extend(self.packages.iter().cloned());
        args
    }

    /// The command line as it would be typed.
    pub fn display(&self) -> String {
        let args = self.args();
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        output::format_command(&self.go_cmd, &refs)
    }

    /// Run the benchmarks in `workdir`, writing stdout to `out_path`.
    pub fn run(&self, workdir: &Path, out_path: &Path, verbosity: Verbosity) -> Result<(), BenchError> {
        let command = self.display();
        output::debug(format_args!("({}) {}", workdir.display(), command), verbosity);

        let file = File::create(out_path).map_err(|source| BenchError::Io {
            path: out_path.to_path_buf(),
            source,
        })?;

        let out = Command::new(&self.go_cmd)
            .args(self.args())
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(file))
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| BenchError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !out.status.success() {
            return Err(BenchError::Failed {
                command,
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim_end().to_string(),
            });
        }
        Ok(())
    }
}
