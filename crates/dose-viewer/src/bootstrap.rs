use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use dose_core::settings::Settings;
use dose_data::reader::ScanSource;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Name of the per-user state directory under `$HOME`.
pub const APP_DIR_NAME: &str = ".dose-viewer";

/// Ensure `~/.dose-viewer/` and `~/.dose-viewer/logs/` exist and return the
/// former.
pub fn ensure_directories() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    ensure_directories_in(&home)
}

/// [`ensure_directories`] rooted at an explicit home directory.
pub fn ensure_directories_in(home: &Path) -> anyhow::Result<PathBuf> {
    let app_dir = home.join(APP_DIR_NAME);
    std::fs::create_dir_all(app_dir.join("logs"))
        .with_context(|| format!("failed to create {}", app_dir.display()))?;
    Ok(app_dir)
}

/// Log file used by the TUI when `--log-file` is not given, so log lines
/// never land on the alternate screen.
pub fn default_log_file(app_dir: &Path) -> PathBuf {
    app_dir.join("logs").join("dose-viewer.log")
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a level name such as `WARNING` or `CRITICAL` to a `tracing` filter
/// directive.
///
/// Unrecognised names pass through lower-cased so that full `EnvFilter`
/// directives still work.
pub fn normalise_level(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to `log_file` (appending, no ANSI colours) when given and to
/// stderr otherwise. Falls back to `"info"` if the level is not a valid
/// filter.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(normalise_level(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (stderr_layer, file_layer) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (None, Some(layer))
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            (Some(layer), None)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}

// ── Source selection ───────────────────────────────────────────────────────────

/// Explicit files win; otherwise scan `--data-dir`.
pub fn scan_source(settings: &Settings) -> ScanSource {
    if settings.files.is_empty() {
        ScanSource::Directory(settings.data_dir.clone())
    } else {
        ScanSource::Files(settings.files.clone())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directories_in() {
        let tmp = TempDir::new().expect("tempdir");

        let app_dir = ensure_directories_in(tmp.path()).expect("ensure_directories_in");

        assert_eq!(app_dir, tmp.path().join(APP_DIR_NAME));
        assert!(app_dir.is_dir(), ".dose-viewer dir must exist");
        assert!(app_dir.join("logs").is_dir(), "logs subdir must exist");
    }

    #[test]
    fn test_ensure_directories_in_is_idempotent() {
        let tmp = TempDir::new().expect("tempdir");
        ensure_directories_in(tmp.path()).expect("first");
        ensure_directories_in(tmp.path()).expect("second");
    }

    #[test]
    fn test_default_log_file_under_logs() {
        let path = default_log_file(Path::new("/home/u/.dose-viewer"));
        assert_eq!(path, PathBuf::from("/home/u/.dose-viewer/logs/dose-viewer.log"));
    }

    #[test]
    fn test_normalise_level() {
        assert_eq!(normalise_level("DEBUG"), "debug");
        assert_eq!(normalise_level("info"), "info");
        assert_eq!(normalise_level("WARNING"), "warn");
        assert_eq!(normalise_level("CRITICAL"), "error");
        assert_eq!(normalise_level("dose_data=trace"), "dose_data=trace");
    }

    #[test]
    fn test_scan_source_defaults_to_data_dir() {
        let settings = Settings::parse_from(["dose-viewer", "--data-dir", "/runs/a"]);
        assert_eq!(
            scan_source(&settings),
            ScanSource::Directory(PathBuf::from("/runs/a"))
        );
    }

    #[test]
    fn test_scan_source_prefers_explicit_files() {
        let settings = Settings::parse_from(["dose-viewer", "a.csv", "b.csv"]);
        assert_eq!(
            scan_source(&settings),
            ScanSource::Files(vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")])
        );
    }
}
