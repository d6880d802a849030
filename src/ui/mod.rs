//! ui
//!
//! User-facing diagnostics.
//!
//! # Modules
//!
//! - [`output`] - Verbosity levels and stderr messages
//!
//! # Design
//!
//! Reports go to stdout or a file; everything else a user sees goes
//! through this module to stderr, so piping a report stays clean.

pub mod output;
