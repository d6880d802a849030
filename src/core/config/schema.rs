//! core::config::schema
//!
//! Configuration schema types.
//!
//! The global and repo files share one schema. Every key is optional so
//! a file only needs to name what it overrides.
//!
//! # Validation
//!
//! Config values are validated after parsing: `alpha` must lie strictly
//! between 0 and 1, `count` must be positive, and command names must not
//! be empty. Format, test and sort names are checked by deserialization.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::report::OutputFormat;
use crate::stats::{DeltaTest, Order};

/// One configuration file.
///
/// # Example
///
/// ```toml
/// base_ref = "origin/main"
/// format = "markdown"
/// alpha = 0.01
/// geomean = true
///
/// [bench]
/// pattern = "Encode"
/// packages = ["./codec/..."]
/// count = 6
/// benchmem = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// The git executable (default: "git")
    pub git_cmd: Option<String>,

    /// Revision to compare against (default: "HEAD")
    pub base_ref: Option<String>,

    pub format: Option<OutputFormat>,

    /// Significance level (default: 0.05)
    pub alpha: Option<f64>,

    pub delta_test: Option<DeltaTest>,

    /// Add a geometric mean row
    pub geomean: Option<bool>,

    /// Row order
    pub sort: Option<Order>,

    /// Drop range columns from CSV and Markdown output
    pub csv_norange: Option<bool>,

    /// Replacement HTML document head
    pub html_header: Option<String>,

    /// Replacement HTML document tail
    pub html_footer: Option<String>,

    /// Benchmark invocation
    pub bench: Option<BenchConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(git_cmd) = &self.git_cmd {
            if git_cmd.trim().is_empty() {
                return Err(ConfigError::InvalidValue("git_cmd cannot be empty".to_string()));
            }
        }

        if let Some(base_ref) = &self.base_ref {
            if base_ref.trim().is_empty() {
                return Err(ConfigError::InvalidValue("base_ref cannot be empty".to_string()));
            }
        }

        if let Some(alpha) = self.alpha {
            validate_alpha(alpha)?;
        }

        if let Some(bench) = &self.bench {
            bench.validate()?;
        }

        Ok(())
    }

    /// Overlay `other` on top of `self`; keys set in `other` win.
    pub fn merge(&mut self, other: &FileConfig) {
        fn pick<T: Clone>(slot: &mut Option<T>, other: &Option<T>) {
            if other.is_some() {
                slot.clone_from(other);
            }
        }

        pick(&mut self.git_cmd, &other.git_cmd);
        pick(&mut self.base_ref, &other.base_ref);
        pick(&mut self.format, &other.format);
        pick(&mut self.alpha, &other.alpha);
        pick(&mut self.delta_test, &other.delta_test);
        pick(&mut self.geomean, &other.geomean);
        pick(&mut self.sort, &other.sort);
        pick(&mut self.csv_norange, &other.csv_norange);
        pick(&mut self.html_header, &other.html_header);
        pick(&mut self.html_footer, &other.html_footer);

        match (&mut self.bench, &other.bench) {
            (Some(mine), Some(theirs)) => mine.merge(theirs),
            (None, Some(theirs)) => self.bench = Some(theirs.clone()),
            _ => {}
        }
    }
}

/// Check a significance level.
pub fn validate_alpha(alpha: f64) -> Result<(), ConfigError> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "alpha must be between 0 and 1 (exclusive), got {}",
            alpha
        )))
    }
}

/// The `[bench]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// The go executable (default: "go")
    pub go_cmd: Option<String>,

    /// `-bench` regular expression (default: ".")
    pub pattern: Option<String>,

    /// Packages to benchmark (default: ["./..."])
    pub packages: Option<Vec<String>>,

    /// `-count` (default: 10)
    pub count: Option<u32>,

    pub benchtime: Option<String>,

    pub cpu: Option<String>,

    pub benchmem: Option<bool>,

    pub tags: Option<String>,

    /// Extra arguments for `go test`
    pub extra_args: Option<Vec<String>>,
}

impl BenchConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(go_cmd) = &self.go_cmd {
            if go_cmd.trim().is_empty() {
                return Err(ConfigError::InvalidValue("bench.go_cmd cannot be empty".to_string()));
            }
        }

        if self.count == Some(0) {
            return Err(ConfigError::InvalidValue(
                "bench.count must be at least 1".to_string(),
            ));
        }

        if let Some(packages) = &self.packages {
            if packages.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "bench.packages cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Overlay `other` on top of `self`; keys set in `other` win.
    pub fn merge(&mut self, other: &BenchConfig) {
        macro_rules! pick {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field.clone_from(&other.$field);
                })*
            };
        }
        pick!(go_cmd, pattern, packages, count, benchtime, cpu, benchmem, tags, extra_args);
    }
}
