//! Single-file ingestion: CSV bytes to a labelled dose [`TimeSeries`].
//!
//! Steps, in order:
//! 1. parse the bytes into a [`ParsedTable`](dose_core::models::ParsedTable),
//! 2. detect the time and dose columns by header name,
//! 3. infer the time encoding for the whole column,
//! 4. parse the dose column,
//! 5. derive the subject label from the file name.
//!
//! [`ingest`] never fails outright; every problem becomes an
//! [`IngestOutcome::Failure`] naming the file.

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::{debug, warn};

use dose_core::config::ScanConfig;
use dose_core::error::IngestError;
use dose_core::models::{Failure, IngestOutcome, RawFile, SeriesPoint, TimeEncoding, TimeSeries};
use dose_core::time_utils;

use crate::columns::detect_columns;
use crate::table::parse_table;

// ── Public API ────────────────────────────────────────────────────────────────

/// Ingest one file against `config.start_time`.
pub fn ingest(file: &RawFile, config: &ScanConfig) -> IngestOutcome {
    match try_ingest(file, config.start_time) {
        Ok(series) => {
            debug!(
                "File {}: {} points as {} ({})",
                file.name,
                series.points.len(),
                series.label,
                series.encoding
            );
            IngestOutcome::Success(series)
        }
        Err(e) => {
            warn!("Skipping {}: {}", file.name, e);
            IngestOutcome::Failure(Failure::new(&file.name, e.to_string()))
        }
    }
}

/// Subject label for `file_name`: `"P"` plus the digits of the first
/// `p<digits>` run (case-insensitive), or the file name itself.
pub fn derive_label(file_name: &str) -> String {
    let re = Regex::new(r"(?i)p(\d+)").expect("regex is valid");
    match re.captures(file_name).and_then(|c| c.get(1)) {
        Some(digits) => format!("P{}", digits.as_str()),
        None => file_name.to_string(),
    }
}

/// Convert a time column to absolute timestamps.
///
/// If every cell is a finite number the column is elapsed seconds added to
/// `start`. Otherwise every cell must be an absolute date-time string; the
/// two interpretations are never mixed within one column.
pub fn infer_timestamps(
    cells: &[String],
    start: NaiveDateTime,
) -> Result<(Vec<NaiveDateTime>, TimeEncoding), IngestError> {
    let elapsed: Option<Vec<f64>> = cells
        .iter()
        .map(|c| time_utils::parse_elapsed_seconds(c))
        .collect();

    if let Some(seconds) = elapsed {
        let timestamps = seconds
            .iter()
            .zip(cells)
            .enumerate()
            .map(|(i, (&secs, cell))| {
                time_utils::offset_by_seconds(start, secs).ok_or_else(|| IngestError::TimeParse {
                    row: i + 1,
                    value: cell.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok((timestamps, TimeEncoding::ElapsedSeconds));
    }

    let timestamps = cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            time_utils::parse_datetime(cell).ok_or_else(|| IngestError::TimeParse {
                row: i + 1,
                value: cell.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((timestamps, TimeEncoding::Absolute))
}

/// Parse every dose cell as a real number. Values are passed through as
/// already cumulative.
pub fn parse_doses(cells: &[String]) -> Result<Vec<f64>, IngestError> {
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            cell.trim()
                .parse::<f64>()
                .map_err(|_| IngestError::ValueParse {
                    row: i + 1,
                    value: cell.clone(),
                })
        })
        .collect()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn try_ingest(file: &RawFile, start: NaiveDateTime) -> Result<TimeSeries, IngestError> {
    let table = parse_table(&file.bytes)?;
    let roles = detect_columns(&table.headers)?;

    // Both indices come from the header list and every column has one cell
    // per row, so these lookups only fail on a malformed table.
    let time_cells = table
        .column(roles.time)
        .ok_or_else(|| IngestError::Parse("time column missing".to_string()))?;
    let dose_cells = table
        .column(roles.dose)
        .ok_or_else(|| IngestError::Parse("dose column missing".to_string()))?;

    debug!(
        "File {}: time column {:?}, dose column {:?}",
        file.name, table.headers[roles.time], table.headers[roles.dose]
    );

    let (timestamps, encoding) = infer_timestamps(time_cells, start)?;
    let doses = parse_doses(dose_cells)?;

    let points = timestamps
        .into_iter()
        .zip(doses)
        .map(|(timestamp, value)| SeriesPoint { timestamp, value })
        .collect();

    Ok(TimeSeries {
        label: derive_label(&file.name),
        source: file.name.clone(),
        encoding,
        points,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn expect_failure(outcome: IngestOutcome) -> Failure {
        match outcome {
            IngestOutcome::Failure(f) => f,
            IngestOutcome::Success(s) => panic!("expected failure, got {:?}", s),
        }
    }

    fn expect_success(outcome: IngestOutcome) -> TimeSeries {
        match outcome {
            IngestOutcome::Success(s) => s,
            IngestOutcome::Failure(f) => panic!("expected success, got {}", f),
        }
    }

    // ── ingest ────────────────────────────────────────────────────────────────

    #[test]
    fn test_ingest_elapsed_seconds() {
        let file = RawFile::new(
            "phantom_p2_visibility_and_dose.csv",
            "elapsed_time,dose\n0,1.0\n60,2.5\n120,4.0\n",
        );
        let series = expect_success(ingest(&file, &ScanConfig::default()));

        assert_eq!(series.label, "P2");
        assert_eq!(series.source, "phantom_p2_visibility_and_dose.csv");
        assert_eq!(series.encoding, TimeEncoding::ElapsedSeconds);
        let stamps: Vec<_> = series.points.iter().map(|p| p.timestamp).collect();
        assert_eq!(stamps, vec![at(21, 53, 33), at(21, 54, 33), at(21, 55, 33)]);
        let values: Vec<_> = series.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.5, 4.0]);
    }

    #[test]
    fn test_ingest_absolute_timestamps() {
        let file = RawFile::new(
            "p5.csv",
            "timestamp,dose\n2025-04-01 22:00:00,0.5\n2025-04-01 22:05:00,0.9\n",
        );
        let series = expect_success(ingest(&file, &ScanConfig::default()));

        assert_eq!(series.encoding, TimeEncoding::Absolute);
        assert_eq!(series.points[0].timestamp, at(22, 0, 0));
        assert_eq!(series.points[1].timestamp, at(22, 5, 0));
    }

    #[test]
    fn test_ingest_slash_dates_are_month_first() {
        let file = RawFile::new("p5.csv", "timestamp,dose\n04/01/2025 21:53:33,1.0\n");
        let series = expect_success(ingest(&file, &ScanConfig::default()));
        assert_eq!(series.points[0].timestamp, at(21, 53, 33));
    }

    #[test]
    fn test_ingest_stray_quote_in_note_column() {
        let file = RawFile::new("p1.csv", "time,dose,note\n0,1.0,5\" tall\n60,2.0,x\n");
        let series = expect_success(ingest(&file, &ScanConfig::default()));

        let points: Vec<_> = series.points.iter().map(|p| (p.timestamp, p.value)).collect();
        assert_eq!(points, vec![(at(21, 53, 33), 1.0), (at(21, 54, 33), 2.0)]);
    }

    #[test]
    fn test_ingest_skips_whitespace_only_line() {
        let file = RawFile::new("p1.csv", "time,dose\n0,1\n   \n60,2\n");
        let series = expect_success(ingest(&file, &ScanConfig::default()));
        assert_eq!(series.points.len(), 2);
    }

    #[test]
    fn test_ingest_keeps_row_order() {
        let file = RawFile::new("p1.csv", "time,dose\n120,3\n0,1\n60,2\n");
        let series = expect_success(ingest(&file, &ScanConfig::default()));

        let stamps: Vec<_> = series.points.iter().map(|p| p.timestamp).collect();
        assert_eq!(stamps, vec![at(21, 55, 33), at(21, 53, 33), at(21, 54, 33)]);
    }

    #[test]
    fn test_ingest_keeps_duplicate_rows() {
        let file = RawFile::new("p1.csv", "time,dose\n0,1\n0,1\n");
        let series = expect_success(ingest(&file, &ScanConfig::default()));
        assert_eq!(series.points.len(), 2);
    }

    #[test]
    fn test_ingest_uses_configured_start_time() {
        let config = ScanConfig::from_strings("2025-01-01 00:00:00", ".*").unwrap();
        let file = RawFile::new("p1.csv", "time,dose\n90,1\n");
        let series = expect_success(ingest(&file, &config));

        let expected = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 1, 30)
            .unwrap();
        assert_eq!(series.points[0].timestamp, expected);
    }

    #[test]
    fn test_ingest_positional_columns() {
        let file = RawFile::new("p3.csv", "t,value,note\n0,1.5,a\n30,2.0,b\n");
        let series = expect_success(ingest(&file, &ScanConfig::default()));
        assert_eq!(series.points[1].value, 2.0);
    }

    #[test]
    fn test_ingest_header_only_gives_empty_series() {
        let file = RawFile::new("p4.csv", "time,dose\n");
        let series = expect_success(ingest(&file, &ScanConfig::default()));
        assert!(series.points.is_empty());
    }

    #[test]
    fn test_ingest_mixed_time_column_fails() {
        let file = RawFile::new("p1.csv", "time,dose\n0,1.0\nlater,2.0\n");
        let failure = expect_failure(ingest(&file, &ScanConfig::default()));

        assert_eq!(failure.file_name, "p1.csv");
        assert!(failure.message.contains("Invalid time value"), "{}", failure.message);
    }

    #[test]
    fn test_ingest_numeric_and_datetime_mix_fails() {
        let file = RawFile::new("p1.csv", "time,dose\n0,1.0\n2025-04-01 22:00:00,2.0\n");
        let failure = expect_failure(ingest(&file, &ScanConfig::default()));
        assert!(failure.message.contains("\"0\""), "{}", failure.message);
    }

    #[test]
    fn test_ingest_bad_dose_fails_with_file_name() {
        let file = RawFile::new(
            "phantom_p9_visibility_and_dose.csv",
            "time,dose\n0,1.0\n60,high\n",
        );
        let failure = expect_failure(ingest(&file, &ScanConfig::default()));

        assert_eq!(failure.file_name, "phantom_p9_visibility_and_dose.csv");
        assert!(failure.message.contains("Invalid dose value"));
        assert!(failure.message.contains("row 2"));
        assert!(failure.message.contains("high"));
    }

    #[test]
    fn test_ingest_empty_file_fails() {
        let failure = expect_failure(ingest(&RawFile::new("p1.csv", ""), &ScanConfig::default()));
        assert!(failure.message.contains("Failed to parse CSV"));
    }

    #[test]
    fn test_ingest_single_column_fails() {
        let file = RawFile::new("p1.csv", "time\n0\n60\n");
        let failure = expect_failure(ingest(&file, &ScanConfig::default()));
        assert!(failure.message.contains("one column"));
    }

    // ── derive_label ──────────────────────────────────────────────────────────

    #[test]
    fn test_derive_label_phantom_name() {
        assert_eq!(derive_label("phantom_p7_visibility_and_dose.csv"), "P7");
    }

    #[test]
    fn test_derive_label_case_insensitive() {
        assert_eq!(derive_label("SUBJECT_P12.csv"), "P12");
    }

    #[test]
    fn test_derive_label_keeps_leading_zeros() {
        assert_eq!(derive_label("p007.csv"), "P007");
    }

    #[test]
    fn test_derive_label_first_match() {
        assert_eq!(derive_label("p1_p2.csv"), "P1");
    }

    #[test]
    fn test_derive_label_falls_back_to_name() {
        assert_eq!(derive_label("subject_a.csv"), "subject_a.csv");
    }

    // ── infer_timestamps ──────────────────────────────────────────────────────

    #[test]
    fn test_infer_numeric_column() {
        let (stamps, encoding) = infer_timestamps(&cells(&["0", "60.5"]), at(21, 53, 33)).unwrap();
        assert_eq!(encoding, TimeEncoding::ElapsedSeconds);
        assert_eq!(stamps[0], at(21, 53, 33));
        assert_eq!(stamps[1].and_utc().timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_infer_empty_column_is_elapsed() {
        let (stamps, encoding) = infer_timestamps(&[], at(0, 0, 0)).unwrap();
        assert!(stamps.is_empty());
        assert_eq!(encoding, TimeEncoding::ElapsedSeconds);
    }

    #[test]
    fn test_infer_empty_cell_fails() {
        let err = infer_timestamps(&cells(&["0", ""]), at(0, 0, 0)).unwrap_err();
        assert!(matches!(err, IngestError::TimeParse { row: 1, .. }));
    }

    #[test]
    fn test_infer_reports_first_bad_row() {
        let err = infer_timestamps(
            &cells(&["2025-04-01 22:00:00", "2025-04-01 22:01:00", "oops"]),
            at(0, 0, 0),
        )
        .unwrap_err();
        match err {
            IngestError::TimeParse { row, value } => {
                assert_eq!(row, 3);
                assert_eq!(value, "oops");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    // ── parse_doses ───────────────────────────────────────────────────────────

    #[test]
    fn test_parse_doses_accepts_real_numbers() {
        let doses = parse_doses(&cells(&["0", "1.5", "-2", "3e-2"])).unwrap();
        assert_eq!(doses, vec![0.0, 1.5, -2.0, 0.03]);
    }

    #[test]
    fn test_parse_doses_rejects_empty_cell() {
        let err = parse_doses(&cells(&["1", ""])).unwrap_err();
        assert!(matches!(err, IngestError::ValueParse { row: 2, .. }));
    }
}
