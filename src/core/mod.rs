//! core
//!
//! Core domain types and configuration for benchdiff.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid
//! - [`config`] - Configuration schema and loading

pub mod config;
pub mod types;
