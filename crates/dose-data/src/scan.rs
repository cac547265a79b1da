//! End-to-end scan pipeline.
//!
//! Runs admission, ingestion and aggregation over a [`ScanSource`] (or a
//! set of already-loaded [`RawFile`]s) and returns a [`ScanReport`] ready
//! for the UI layer.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use dose_core::config::ScanConfig;
use dose_core::error::IngestError;
use dose_core::models::{Failure, IngestOutcome, RawFile, ScanReport};

use crate::aggregator::SeriesAggregator;
use crate::ingest::ingest;
use crate::reader::{file_name_of, is_admissible, load_raw_file, ScanSource};

// ── Public types ──────────────────────────────────────────────────────────────

/// Outcome for one offered file, plus whether it passed admission.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub outcome: IngestOutcome,
    pub admitted: bool,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Scan every file offered by `source`.
pub fn run_scan(source: &ScanSource, config: &ScanConfig) -> ScanReport {
    let started = Instant::now();
    let results: Vec<FileOutcome> = source
        .paths()
        .iter()
        .map(|path| process_path(path, config))
        .collect();
    build_report(results, started)
}

/// Scan files already held in memory, e.g. from an upload.
pub fn scan_raw_files(files: &[RawFile], config: &ScanConfig) -> ScanReport {
    let started = Instant::now();
    let results: Vec<FileOutcome> = files
        .iter()
        .map(|file| process_raw_file(file, config))
        .collect();
    build_report(results, started)
}

/// Admit, read and ingest a single path.
///
/// A rejected name is recorded without its bytes ever being read.
pub fn process_path(path: &Path, config: &ScanConfig) -> FileOutcome {
    let name = file_name_of(path);
    if !is_admissible(&name, config) {
        return rejected(name);
    }

    let outcome = match load_raw_file(path) {
        Ok(file) => ingest(&file, config),
        Err(e) => IngestOutcome::Failure(Failure::new(name, e.to_string())),
    };
    FileOutcome {
        outcome,
        admitted: true,
    }
}

/// Admit and ingest an in-memory file.
pub fn process_raw_file(file: &RawFile, config: &ScanConfig) -> FileOutcome {
    if !is_admissible(&file.name, config) {
        return rejected(file.name.clone());
    }
    FileOutcome {
        outcome: ingest(file, config),
        admitted: true,
    }
}

/// Aggregate per-file results (in input order) and fill in run metadata.
pub fn build_report(results: Vec<FileOutcome>, started: Instant) -> ScanReport {
    let files_seen = results.len();
    let files_admitted = results.iter().filter(|r| r.admitted).count();
    let outcomes: Vec<IngestOutcome> = results.into_iter().map(|r| r.outcome).collect();

    let mut report = SeriesAggregator::aggregate(&outcomes);
    report.metadata.generated_at = Utc::now().to_rfc3339();
    report.metadata.files_seen = files_seen;
    report.metadata.files_admitted = files_admitted;
    report.metadata.elapsed_seconds = started.elapsed().as_secs_f64();

    info!(
        "Scan finished: {} seen, {} admitted, {} series, {} skipped",
        files_seen,
        files_admitted,
        report.metadata.series_count,
        report.metadata.failure_count
    );

    report
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn rejected(name: String) -> FileOutcome {
    debug!("Not admitted: {}", name);
    FileOutcome {
        outcome: IngestOutcome::Failure(Failure::new(
            name,
            IngestError::PatternMismatch.to_string(),
        )),
        admitted: false,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
