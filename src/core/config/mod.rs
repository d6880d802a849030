//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! benchdiff has two configuration scopes sharing one schema:
//! - **Global**: User-level settings
//! - **Repo**: Checked-in project settings
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$BENCHDIFF_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/benchdiff/config.toml`
//! 3. `~/.benchdiff/config.toml`
//!
//! # Repo Config Location
//!
//! `.benchdiff.toml` at the repository root.
//!
//! # Example
//!
//! ```no_run
//! use benchdiff::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/repo"))).unwrap();
//! let config = result.config;
//!
//! println!("Base ref: {}", config.base_ref());
//! println!("Alpha: {}", config.alpha());
//! ```

pub mod schema;

pub use schema::{BenchConfig, FileConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::bench::BenchCommand;
use crate::report::{FormatOptions, OutputFormat};
use crate::stats::{DeltaTest, Order, DEFAULT_ALPHA};

/// File name of the repo config at the repository root.
pub const REPO_CONFIG_FILE: &str = ".benchdiff.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence and defaults. Repo config overrides global
/// config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: FileConfig,
    /// Repository configuration (if present)
    pub repo: Option<FileConfig>,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
    merged: FileConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `repo_root` is provided, also loads `.benchdiff.toml` from it.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or hold
    /// invalid values. Missing config files are not an error.
    pub fn load(repo_root: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();
        let global_path = Self::find_global(&mut warnings);
        Self::load_from(global_path.as_deref(), repo_root, warnings)
    }

    /// Load from an explicit global config path.
    pub fn load_from(
        global_path: Option<&Path>,
        repo_root: Option<&Path>,
        warnings: Vec<ConfigWarning>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let global = match global_path {
            Some(path) => Self::read_config(path)?,
            None => FileConfig::default(),
        };

        let repo_path = repo_root
            .map(|root| root.join(REPO_CONFIG_FILE))
            .filter(|path| path.is_file());
        let repo = match &repo_path {
            Some(path) => Some(Self::read_config(path)?),
            None => None,
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        let mut merged = global.clone();
        if let Some(ref r) = repo {
            merged.merge(r);
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                repo,
                global_path: global_path.map(Path::to_path_buf),
                repo_path,
                merged,
            },
            warnings,
        })
    }

    /// Locate the global config file.
    fn find_global(warnings: &mut Vec<ConfigWarning>) -> Option<PathBuf> {
        // 1. $BENCHDIFF_CONFIG
        if let Ok(path) = std::env::var("BENCHDIFF_CONFIG") {
            let path = PathBuf::from(path);
            if path.is_file() {
                return Some(path);
            }
            warnings.push(ConfigWarning {
                message: "BENCHDIFF_CONFIG names a file that does not exist".to_string(),
                path,
            });
        }

        // 2. $XDG_CONFIG_HOME/benchdiff/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("benchdiff/config.toml");
            if path.is_file() {
                return Some(path);
            }
        }

        // 3. ~/.benchdiff/config.toml
        dirs::home_dir()
            .map(|home| home.join(".benchdiff/config.toml"))
            .filter(|path| path.is_file())
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The merged configuration.
    pub fn effective(&self) -> &FileConfig {
        &self.merged
    }

    /// Render the merged configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self.merged)?)
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// The git executable. Defaults to "git".
    pub fn git_cmd(&self) -> &str {
        self.merged.git_cmd.as_deref().unwrap_or("git")
    }

    /// The revision to compare against. Defaults to "HEAD".
    pub fn base_ref(&self) -> &str {
        self.merged.base_ref.as_deref().unwrap_or("HEAD")
    }

    /// Defaults to text.
    pub fn format(&self) -> OutputFormat {
        self.merged.format.unwrap_or_default()
    }

    /// Significance level. Defaults to 0.05.
    pub fn alpha(&self) -> f64 {
        self.merged.alpha.unwrap_or(DEFAULT_ALPHA)
    }

    /// Defaults to the U-test.
    pub fn delta_test(&self) -> DeltaTest {
        self.merged.delta_test.unwrap_or_default()
    }

    pub fn geomean(&self) -> bool {
        self.merged.geomean.unwrap_or(false)
    }

    /// Defaults to input order.
    pub fn sort(&self) -> Order {
        self.merged.sort.unwrap_or_default()
    }

    /// Formatter options from config.
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            no_range: self.merged.csv_norange.unwrap_or(false),
            html_header: self.merged.html_header.clone(),
            html_footer: self.merged.html_footer.clone(),
        }
    }

    /// The benchmark command with config applied over its defaults.
    pub fn bench_command(&self) -> BenchCommand {
        let mut cmd = BenchCommand::default();
        let Some(bench) = &self.merged.bench else {
            return cmd;
        };
        if let Some(go_cmd) = &bench.go_cmd {
            cmd.go_cmd.clone_from(go_cmd);
        }
        if let Some(pattern) = &bench.pattern {
            cmd.pattern.clone_from(pattern);
        }
        if let Some(packages) = &bench.packages {
            cmd.packages.clone_from(packages);
        }
        if let Some(count) = bench.count {
            cmd.count = count;
        }
        cmd.benchtime.clone_from(&bench.benchtime);
        cmd.cpu.clone_from(&bench.cpu);
        cmd.benchmem = bench.benchmem.unwrap_or(false);
        cmd.tags.clone_from(&bench.tags);
        if let Some(extra) = &bench.extra_args {
            cmd.extra_args.clone_from(extra);
        }
        cmd
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}
