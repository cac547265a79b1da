//! CSV file discovery and loading.
//!
//! Turns a [`ScanSource`] into a list of candidate paths and reads admitted
//! paths into [`RawFile`] buffers for the ingestor.

use std::path::{Path, PathBuf};

use dose_core::config::ScanConfig;
use dose_core::error::IngestError;
use dose_core::models::RawFile;
use tracing::{debug, warn};

// ── ScanSource ────────────────────────────────────────────────────────────────

/// Where the files for a scan come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanSource {
    /// Every `*.csv` directly inside this directory.
    Directory(PathBuf),
    /// An explicit selection of files, in the order given.
    Files(Vec<PathBuf>),
}

impl ScanSource {
    /// Expand the source into the paths offered to admission.
    pub fn paths(&self) -> Vec<PathBuf> {
        collect_sources(self)
    }

    /// Short description for headers and log lines.
    pub fn describe(&self) -> String {
        match self {
            ScanSource::Directory(dir) => dir.display().to_string(),
            ScanSource::Files(files) => format!("{} selected file(s)", files.len()),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Candidate paths for `source`: a directory listing, or the explicit
/// selection unchanged.
pub fn collect_sources(source: &ScanSource) -> Vec<PathBuf> {
    match source {
        ScanSource::Directory(dir) => find_csv_files(dir),
        ScanSource::Files(files) => files.clone(),
    }
}

/// Whether `name` passes admission. The whole name must match.
pub fn is_admissible(name: &str, config: &ScanConfig) -> bool {
    config.admits(name)
}

/// Find the `.csv` files directly inside `dir`, sorted by path.
///
/// Subdirectories are not descended into.
pub fn find_csv_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Data directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "csv")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    debug!("Found {} CSV files in {}", files.len(), dir.display());
    files
}

/// Base name of `path` as used for admission and labelling.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read `path` into a [`RawFile`] named after its base name.
pub fn load_raw_file(path: &Path) -> Result<RawFile, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io { source })?;
    Ok(RawFile::new(file_name_of(path), bytes))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
