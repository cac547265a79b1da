//! Plain-text rendering of a scan report for `--view summary`.

use std::fmt::Write;

use dose_core::formatting::format_dose;
use dose_core::models::ScanReport;
use dose_core::time_utils::format_timestamp;

/// Render `report` as a human-readable block of text.
///
/// One line per subject with its sample count, time span and final dose,
/// followed by any skipped files.
pub fn render_summary(report: &ScanReport, source: &str) -> String {
    let mut out = String::new();
    let table = &report.table;

    let _ = writeln!(out, "Cumulative dose summary for {}", source);

    if report.no_admitted_files() {
        let _ = writeln!(out, "No CSV files matching the pattern were found.");
        return out;
    }

    let _ = writeln!(
        out,
        "{} series, {} timestamps, {} skipped",
        table.column_count(),
        table.row_count(),
        report.failures.len()
    );

    if table.is_empty() {
        let _ = writeln!(out, "No data");
    }

    for trace in table.traces() {
        match (trace.points.first(), trace.points.last()) {
            (Some(first), Some(last)) => {
                let _ = writeln!(
                    out,
                    "  {:<8} {:>5} points  {} .. {}  final {}",
                    trace.label,
                    trace.points.len(),
                    format_timestamp(first.0),
                    format_timestamp(last.0),
                    format_dose(last.1)
                );
            }
            _ => {
                let _ = writeln!(out, "  {:<8} {:>5} points", trace.label, 0);
            }
        }
    }

    if !report.failures.is_empty() {
        let _ = writeln!(out, "Some files were skipped:");
        for failure in &report.failures {
            let _ = writeln!(out, "  {}", failure);
        }
    }

    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
