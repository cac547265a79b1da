//! Outer join of per-subject series on the time axis.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use tracing::warn;

use dose_core::models::{
    Failure, IngestOutcome, MergedRow, MergedSeriesTable, ScanMetadata, ScanReport, TimeSeries,
};

// ── SeriesAggregator ──────────────────────────────────────────────────────────

/// Stateless helper that folds ingestion outcomes into a [`ScanReport`].
pub struct SeriesAggregator;

impl SeriesAggregator {
    /// Partition `outcomes` and merge the successes into one table.
    ///
    /// Successes and failures both keep their input order. With no
    /// successes the table is [`MergedSeriesTable::empty`].
    pub fn aggregate(outcomes: &[IngestOutcome]) -> ScanReport {
        let mut series: Vec<&TimeSeries> = Vec::new();
        let mut failures: Vec<Failure> = Vec::new();

        for outcome in outcomes {
            match outcome {
                IngestOutcome::Success(s) => series.push(s),
                IngestOutcome::Failure(f) => failures.push(f.clone()),
            }
        }

        let table = Self::merge(&series);

        let metadata = ScanMetadata {
            files_seen: outcomes.len(),
            files_admitted: outcomes.len(),
            series_count: series.len(),
            failure_count: failures.len(),
            ..ScanMetadata::default()
        };

        ScanReport {
            table,
            failures,
            metadata,
        }
    }

    /// Build the merged table from `series`.
    ///
    /// Row keys are the union of every timestamp; a cell is filled only where
    /// its own series has a sample. Columns appear in order of first label
    /// occurrence. When a label repeats, the later series replaces the
    /// earlier column's contents entirely. Within one series a repeated
    /// timestamp keeps the later row's value.
    pub fn merge(series: &[&TimeSeries]) -> MergedSeriesTable {
        if series.is_empty() {
            return MergedSeriesTable::empty();
        }

        let mut labels: Vec<String> = Vec::new();
        let mut columns: Vec<BTreeMap<NaiveDateTime, f64>> = Vec::new();

        for s in series {
            let idx = match labels.iter().position(|l| l == &s.label) {
                Some(i) => {
                    warn!(
                        "Label {} from {} replaces an earlier series with the same label",
                        s.label, s.source
                    );
                    columns[i].clear();
                    i
                }
                None => {
                    labels.push(s.label.clone());
                    columns.push(BTreeMap::new());
                    columns.len() - 1
                }
            };

            let column = &mut columns[idx];
            for point in &s.points {
                column.insert(point.timestamp, point.value);
            }
        }

        let keys: BTreeSet<NaiveDateTime> = columns
            .iter()
            .flat_map(|c| c.keys().copied())
            .collect();

        let rows = keys
            .into_iter()
            .map(|timestamp| MergedRow {
                timestamp,
                values: columns.iter().map(|c| c.get(&timestamp).copied()).collect(),
            })
            .collect();

        MergedSeriesTable { labels, rows }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dose_core::models::{SeriesPoint, TimeEncoding};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn series(label: &str, points: &[(NaiveDateTime, f64)]) -> TimeSeries {
        TimeSeries {
            label: label.to_string(),
            source: format!("{}.csv", label.to_lowercase()),
            encoding: TimeEncoding::ElapsedSeconds,
            points: points
                .iter()
                .map(|&(timestamp, value)| SeriesPoint { timestamp, value })
                .collect(),
        }
    }

    fn success(label: &str, points: &[(NaiveDateTime, f64)]) -> IngestOutcome {
        IngestOutcome::Success(series(label, points))
    }

    fn failure(name: &str) -> IngestOutcome {
        IngestOutcome::Failure(Failure::new(name, "broken"))
    }

    #[test]
    fn test_three_single_point_series_outer_join() {
        let outcomes = vec![
            success("P1", &[(at(21, 53, 33), 1.0)]),
            success("P2", &[(at(21, 54, 33), 2.0)]),
            success("P3", &[(at(21, 55, 33), 3.0)]),
        ];
        let report = SeriesAggregator::aggregate(&outcomes);
        let table = &report.table;

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.labels, vec!["P1", "P2", "P3"]);
        assert_eq!(table.rows[0].values, vec![Some(1.0), None, None]);
        assert_eq!(table.rows[1].values, vec![None, Some(2.0), None]);
        assert_eq!(table.rows[2].values, vec![None, None, Some(3.0)]);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_shared_timestamps_share_a_row() {
        let outcomes = vec![
            success("P1", &[(at(21, 53, 33), 1.0), (at(21, 54, 33), 2.0)]),
            success("P2", &[(at(21, 54, 33), 5.0)]),
        ];
        let table = SeriesAggregator::aggregate(&outcomes).table;

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value(at(21, 54, 33), "P1"), Some(2.0));
        assert_eq!(table.value(at(21, 54, 33), "P2"), Some(5.0));
        assert_eq!(table.value(at(21, 53, 33), "P2"), None);
    }

    #[test]
    fn test_unsorted_points_produce_sorted_rows() {
        let outcomes = vec![success(
            "P1",
            &[(at(22, 0, 0), 3.0), (at(21, 0, 0), 1.0), (at(21, 30, 0), 2.0)],
        )];
        let table = SeriesAggregator::aggregate(&outcomes).table;

        let stamps: Vec<_> = table.rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(stamps, vec![at(21, 0, 0), at(21, 30, 0), at(22, 0, 0)]);
        assert_eq!(table.column("P1").iter().map(|p| p.1).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_failures_collected_in_order() {
        let outcomes = vec![
            failure("b.csv"),
            success("P1", &[(at(21, 53, 33), 1.0)]),
            failure("a.csv"),
        ];
        let report = SeriesAggregator::aggregate(&outcomes);

        let names: Vec<_> = report.failures.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["b.csv", "a.csv"]);
        assert_eq!(report.metadata.series_count, 1);
        assert_eq!(report.metadata.failure_count, 2);
    }

    #[test]
    fn test_all_failures_gives_empty_table() {
        let outcomes = vec![failure("a.csv"), failure("b.csv")];
        let report = SeriesAggregator::aggregate(&outcomes);

        assert!(report.table.is_empty());
        assert_eq!(report.table.row_count(), 0);
        assert_eq!(report.failures.len(), 2);
    }

    #[test]
    fn test_no_outcomes_gives_empty_report() {
        let report = SeriesAggregator::aggregate(&[]);
        assert!(report.table.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_empty_series_still_gets_a_column() {
        let outcomes = vec![success("P1", &[]), success("P2", &[(at(21, 53, 33), 1.0)])];
        let table = SeriesAggregator::aggregate(&outcomes).table;

        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0].values, vec![None, Some(1.0)]);
    }

    #[test]
    fn test_duplicate_label_last_write_wins() {
        let outcomes = vec![
            success("P1", &[(at(21, 53, 33), 1.0)]),
            success("P2", &[(at(21, 54, 33), 2.0)]),
            success("P1", &[(at(21, 55, 33), 9.0)]),
        ];
        let table = SeriesAggregator::aggregate(&outcomes).table;

        assert_eq!(table.labels, vec!["P1", "P2"]);
        assert_eq!(table.value(at(21, 53, 33), "P1"), None);
        assert_eq!(table.value(at(21, 55, 33), "P1"), Some(9.0));
        // The replaced series' timestamp no longer has any values.
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_duplicate_timestamp_within_series_keeps_later_value() {
        let outcomes = vec![success("P1", &[(at(21, 53, 33), 1.0), (at(21, 53, 33), 1.5)])];
        let table = SeriesAggregator::aggregate(&outcomes).table;

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.value(at(21, 53, 33), "P1"), Some(1.5));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let outcomes = vec![
            success("P1", &[(at(21, 53, 33), 1.0), (at(21, 54, 33), 2.0)]),
            failure("x.csv"),
            success("P2", &[(at(21, 54, 0), 0.5)]),
        ];
        let first = SeriesAggregator::aggregate(&outcomes);
        let second = SeriesAggregator::aggregate(&outcomes);

        assert_eq!(first.table, second.table);
        assert_eq!(first.failures, second.failures);
    }
}
