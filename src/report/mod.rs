//! report
//!
//! Serializes comparison tables into the supported output encodings.
//!
//! # Formats
//!
//! - [`text`] - Aligned columns for terminals
//! - [`csv`] - RFC 4180 rows, one block per metric
//! - [`markdown`] - Pipe tables derived from the CSV output
//! - [`html`] - A standalone document with a styled `<table>`
//! - [`json`] - The full [`Report`] for other tools to consume
//!
//! Every format implements [`Formatter`]. Write errors surface
//! immediately; there is no partial-output cleanup since nothing outside
//! the writer is touched.

pub mod csv;
pub mod html;
pub mod json;
pub mod markdown;
pub mod text;

use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::Oid;
use crate::stats::Table;

pub use self::csv::CsvFormatter;
pub use self::html::{HtmlFormatter, DEFAULT_HTML_FOOTER, DEFAULT_HTML_HEADER};
pub use self::json::JsonFormatter;
pub use self::markdown::{csv_to_markdown, normalize_float, MarkdownFormatter};
pub use self::text::TextFormatter;

/// Errors from writing a report.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("report is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Which revisions a report compares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Revisions {
    /// The base revision as the user named it
    pub base_ref: String,
    pub base: Oid,
    pub head: Oid,
    /// Whether the head run included uncommitted changes
    pub worktree_dirty: bool,
}

/// Tables plus optional provenance.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revisions: Option<Revisions>,
    pub tables: Vec<Table>,
}

impl Report {
    /// A report over `tables` with no revision information.
    pub fn new(tables: Vec<Table>) -> Self {
        Self {
            revisions: None,
            tables,
        }
    }

    /// Attach the compared revisions.
    pub fn with_revisions(mut self, revisions: Revisions) -> Self {
        self.revisions = Some(revisions);
        self
    }
}

/// Writes a [`Report`] in one encoding.
pub trait Formatter {
    fn format(&self, w: &mut dyn Write, report: &Report) -> Result<(), FormatError>;
}

/// Supported output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
    Markdown,
    Html,
    Json,
}

impl OutputFormat {
    /// Valid names for configuration and flags.
    pub const NAMES: [&'static str; 5] = ["text", "csv", "markdown", "html", "json"];
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown format '{}', must be one of: {}",
                other,
                Self::NAMES.join(", ")
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Csv => "csv",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        })
    }
}

/// Options shared by the formatters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatOptions {
    /// Drop the `±` range columns from CSV and Markdown
    pub no_range: bool,
    /// Replaces the default HTML document head when set
    pub html_header: Option<String>,
    /// Replaces the default HTML document tail when set
    pub html_footer: Option<String>,
}

/// Build the formatter for `format`.
pub fn formatter_for(format: OutputFormat, options: &FormatOptions) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter {
            no_range: options.no_range,
        }),
        OutputFormat::Markdown => Box::new(MarkdownFormatter {
            no_range: options.no_range,
        }),
        OutputFormat::Html => Box::new(HtmlFormatter::new(
            options.html_header.clone(),
            options.html_footer.clone(),
        )),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
