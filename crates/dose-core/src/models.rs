use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A named byte buffer believed to be a CSV file.
///
/// Owned by the caller; ingestion reads it but never retains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    /// Base file name, used for admission and label derivation.
    pub name: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// A column-labelled table of trimmed string cells.
///
/// Cells are stored column-major so that role detection and whole-column
/// inference can walk one column without touching the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    /// Header names in file order.
    pub headers: Vec<String>,
    /// One vector of cells per header, each of length [`Self::row_count`].
    pub columns: Vec<Vec<String>>,
}

impl ParsedTable {
    /// Number of data rows (the header row is not counted).
    pub fn row_count(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    /// Cells of the column at `index`, or `None` when out of range.
    pub fn column(&self, index: usize) -> Option<&[String]> {
        self.columns.get(index).map(Vec::as_slice)
    }
}

/// Indices of the columns chosen for the time and dose roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRoles {
    pub time: usize,
    pub dose: usize,
}

/// How the time column of a file was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeEncoding {
    /// Seconds since the configured start instant.
    ElapsedSeconds,
    /// Human-readable absolute date-time strings.
    Absolute,
}

impl std::fmt::Display for TimeEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeEncoding::ElapsedSeconds => write!(f, "elapsed seconds"),
            TimeEncoding::Absolute => write!(f, "absolute timestamps"),
        }
    }
}

/// One `(timestamp, cumulative dose)` sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// A labelled series of dose samples taken from a single file.
///
/// Points follow the row order of the source file and are not sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Subject label such as `"P3"`, or the file name when none is found.
    pub label: String,
    /// File name the series was read from.
    pub source: String,
    /// Interpretation chosen for the time column.
    pub encoding: TimeEncoding,
    pub points: Vec<SeriesPoint>,
}

/// A file that could not be ingested, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub file_name: String,
    pub message: String,
}

impl Failure {
    pub fn new(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file_name, self.message)
    }
}

/// Result of ingesting one file. Exactly one is produced per input file.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Success(TimeSeries),
    Failure(Failure),
}

/// One timestamp row of a [`MergedSeriesTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub timestamp: NaiveDateTime,
    /// One cell per label, in [`MergedSeriesTable::labels`] order.
    pub values: Vec<Option<f64>>,
}

/// Per-label `(timestamp, value)` sequence ready for a chart sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub label: String,
    pub points: Vec<(NaiveDateTime, f64)>,
}

/// Outer join of every successful series on the time axis.
///
/// Rows are sorted ascending by timestamp; a cell is `None` when that
/// subject has no sample at that instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedSeriesTable {
    pub labels: Vec<String>,
    pub rows: Vec<MergedRow>,
}

impl MergedSeriesTable {
    /// An explicitly empty table: no columns, no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.labels.len()
    }

    fn column_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Value of `label` at `timestamp`, if that cell is present.
    pub fn value(&self, timestamp: NaiveDateTime, label: &str) -> Option<f64> {
        let col = self.column_index(label)?;
        let idx = self
            .rows
            .binary_search_by(|row| row.timestamp.cmp(&timestamp))
            .ok()?;
        self.rows[idx].values.get(col).copied().flatten()
    }

    /// Present cells of one column in timestamp order.
    pub fn column(&self, label: &str) -> Vec<(NaiveDateTime, f64)> {
        let Some(col) = self.column_index(label) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| {
                row.values
                    .get(col)
                    .copied()
                    .flatten()
                    .map(|v| (row.timestamp, v))
            })
            .collect()
    }

    /// One trace per column, in column order.
    pub fn traces(&self) -> Vec<Trace> {
        self.labels
            .iter()
            .map(|label| Trace {
                label: label.clone(),
                points: self.column(label),
            })
            .collect()
    }

    /// Earliest and latest row timestamps.
    pub fn time_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.rows.first()?.timestamp, self.rows.last()?.timestamp))
    }

    /// Smallest and largest finite value present anywhere in the table.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .flat_map(|row| row.values.iter().flatten().copied())
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Bookkeeping produced alongside a scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanMetadata {
    /// RFC 3339 timestamp when the report was generated.
    pub generated_at: String,
    /// Files offered to the scan, admitted or not.
    pub files_seen: usize,
    /// Files that passed the admission pattern.
    pub files_admitted: usize,
    /// Successful series folded into the table.
    pub series_count: usize,
    pub failure_count: usize,
    /// Wall-clock seconds spent ingesting and merging.
    pub elapsed_seconds: f64,
}

/// Complete output of one scan: the merged table plus every failure.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub table: MergedSeriesTable,
    /// Failures in input order.
    pub failures: Vec<Failure>,
    pub metadata: ScanMetadata,
}

impl ScanReport {
    /// `true` when files were offered but none passed admission.
    pub fn no_admitted_files(&self) -> bool {
        self.metadata.files_admitted == 0
    }
}
