use thiserror::Error;

/// Why a single file could not be turned into a [`TimeSeries`].
///
/// Every variant is scoped to one file. The ingestion boundary converts these
/// into [`Failure`] entries; none of them abort a scan.
///
/// [`TimeSeries`]: crate::models::TimeSeries
/// [`Failure`]: crate::models::Failure
#[derive(Error, Debug)]
pub enum IngestError {
    /// The file name was rejected by the admission pattern before parsing.
    #[error("filename does not match pattern")]
    PatternMismatch,

    /// The bytes are not well-formed delimited text with a header row.
    #[error("Failed to parse CSV: {0}")]
    Parse(String),

    /// Only one column exists, so time and dose would be the same column.
    #[error("Only one column found; cannot separate time and dose")]
    SingleColumn,

    /// The time column is neither fully numeric nor fully parseable as
    /// absolute timestamps.
    #[error("Invalid time value {value:?} in row {row}")]
    TimeParse { row: usize, value: String },

    /// A dose cell is not a real number.
    #[error("Invalid dose value {value:?} in row {row}")]
    ValueParse { row: usize, value: String },

    /// The file could not be read from disk.
    #[error("Failed to read file: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
}

/// Application-level errors raised outside the per-file ingestion boundary.
#[derive(Error, Debug)]
pub enum DoseError {
    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the dose crates.
pub type Result<T> = std::result::Result<T, DoseError>;
