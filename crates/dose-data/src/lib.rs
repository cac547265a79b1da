//! Data ingestion layer for the dose viewer.
//!
//! Discovers and admits CSV files, parses each into a labelled dose series,
//! and merges the series into one time-indexed table.

pub mod aggregator;
pub mod columns;
pub mod ingest;
pub mod reader;
pub mod scan;
pub mod table;

pub use dose_core as core;
