//! Shared types for the dose viewer.
//!
//! Holds the data model passed between ingestion, aggregation and display,
//! the per-file error taxonomy, scan configuration, CLI settings, and the
//! time and number helpers used across the workspace.

pub mod config;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
