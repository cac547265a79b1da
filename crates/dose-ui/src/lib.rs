//! Terminal UI layer for the dose viewer.
//!
//! Provides themes, the header, status and warning components, the chart and
//! table views, and the main application event loop built on top of
//! [`ratatui`] for browsing merged dose series in the terminal.

pub mod app;
pub mod chart_view;
pub mod components;
pub mod table_view;
pub mod themes;

pub use dose_core as core;
