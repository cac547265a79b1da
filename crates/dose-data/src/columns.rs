//! Column role detection by header name.

use dose_core::error::IngestError;
use dose_core::models::ColumnRoles;

/// Pick the time and dose columns from `headers`.
///
/// Time is the first header containing `"time"` (case-insensitive), else the
/// first column. Dose is the first header containing `"dose"`, else the
/// second column. A table with a single column has no separate dose column
/// and is rejected with [`IngestError::SingleColumn`].
pub fn detect_columns(headers: &[String]) -> Result<ColumnRoles, IngestError> {
    match headers.len() {
        0 => return Err(IngestError::Parse("No columns to parse from file".to_string())),
        1 => return Err(IngestError::SingleColumn),
        _ => {}
    }

    let time = find_containing(headers, "time").unwrap_or(0);
    let dose = find_containing(headers, "dose").unwrap_or(1);

    Ok(ColumnRoles { time, dose })
}

fn find_containing(headers: &[String], needle: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.to_lowercase().contains(needle))
}
