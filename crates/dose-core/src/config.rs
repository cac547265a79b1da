//! Explicit per-run configuration for ingestion and admission.

use chrono::NaiveDateTime;
use regex::Regex;

use crate::error::{DoseError, Result};
use crate::time_utils;

/// Start instant used when no `--start-time` is given.
pub const DEFAULT_START_TIME: &str = "2025-04-01 21:53:33";

/// Admission pattern used when no `--pattern` is given.
pub const DEFAULT_NAME_PATTERN: &str = r"^phantom_p\d+_visibility_and_dose\.csv$";

/// Values shared by every file of one scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Origin for elapsed-seconds time columns.
    pub start_time: NaiveDateTime,
    /// Pattern as given by the user.
    pub name_pattern: Regex,
    /// `name_pattern` wrapped in `^(?:...)$`.
    anchored: Regex,
}

impl ScanConfig {
    pub fn new(start_time: NaiveDateTime, name_pattern: Regex) -> Result<Self> {
        let anchored = Regex::new(&format!("^(?:{})$", name_pattern.as_str()))
            .map_err(|e| DoseError::Config(format!("invalid name pattern: {}", e)))?;
        Ok(Self {
            start_time,
            name_pattern,
            anchored,
        })
    }

    /// Build a config from the textual forms accepted on the command line.
    pub fn from_strings(start_time: &str, pattern: &str) -> Result<Self> {
        let start = time_utils::parse_datetime(start_time).ok_or_else(|| {
            DoseError::Config(format!("invalid start time \"{}\"", start_time))
        })?;
        let regex = Regex::new(pattern)
            .map_err(|e| DoseError::Config(format!("invalid name pattern: {}", e)))?;
        Self::new(start, regex)
    }

    /// Whether `file_name` matches the admission pattern end to end.
    ///
    /// A match that covers only part of the name is rejected even when the
    /// pattern itself carries no anchors.
    pub fn admits(&self, file_name: &str) -> bool {
        self.anchored.is_match(file_name)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from_strings(DEFAULT_START_TIME, DEFAULT_NAME_PATTERN)
            .expect("built-in start time and pattern are valid")
    }
}
