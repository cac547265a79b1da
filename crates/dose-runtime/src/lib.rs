//! Runtime orchestration layer for the dose viewer.
//!
//! Drives scans of the configured data source in the background and hands
//! finished reports to the UI layer over a channel.

pub mod orchestrator;

pub use dose_core as core;
pub use dose_data as data;
