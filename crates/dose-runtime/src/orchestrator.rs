//! Async scan orchestrator.
//!
//! Runs scans in a tokio task and forwards each [`ScanReport`] through an
//! `mpsc` channel, so the TUI event loop can consume them without any shared
//! mutable state. A scan runs once at startup, then again on every
//! [`ScanHandle::rescan`] request and, when configured, on a fixed interval.

use std::time::{Duration, Instant};

use dose_core::config::ScanConfig;
use dose_core::models::{Failure, IngestOutcome, ScanReport};
use dose_data::reader::{file_name_of, ScanSource};
use dose_data::scan::{build_report, process_path, FileOutcome};
use tokio::sync::mpsc;
use tokio::time;

// ── Public types ──────────────────────────────────────────────────────────────

/// Requests accepted by the background scan task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCommand {
    /// Discard the current report and scan the source again.
    Rescan,
}

// ── ScanOrchestrator ──────────────────────────────────────────────────────────

/// Background scan coordinator.
///
/// Call [`ScanOrchestrator::start`] to spin up the scan loop in a dedicated
/// tokio task and receive a channel endpoint for [`ScanReport`] updates.
pub struct ScanOrchestrator {
    source: ScanSource,
    config: ScanConfig,
    /// Automatic rescan period; `None` scans only on request.
    watch_interval: Option<Duration>,
}

impl ScanOrchestrator {
    pub fn new(source: ScanSource, config: ScanConfig, watch_interval_secs: Option<u64>) -> Self {
        Self {
            source,
            config,
            watch_interval: watch_interval_secs.map(Duration::from_secs),
        }
    }

    /// Start the scan loop.
    ///
    /// Returns the report receiver and a [`ScanHandle`] used to request
    /// rescans or abort the loop.
    pub fn start(self) -> (mpsc::Receiver<ScanReport>, ScanHandle) {
        let (tx, rx) = mpsc::channel(4);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);

        let handle = tokio::spawn(async move {
            self.scan_loop(tx, cmd_rx).await;
        });

        (
            rx,
            ScanHandle {
                handle,
                commands: cmd_tx,
            },
        )
    }

    // ── Private implementation ────────────────────────────────────────────

    /// Scan immediately, then wait for a command or a watch tick.
    ///
    /// Exits when either channel closes.
    async fn scan_loop(
        self,
        tx: mpsc::Sender<ScanReport>,
        mut commands: mpsc::Receiver<ScanCommand>,
    ) {
        if !self.scan_and_send(&tx).await {
            return;
        }

        let mut ticker = self.watch_interval.map(time::interval);
        if let Some(t) = ticker.as_mut() {
            // The first tick fires immediately; the initial scan covered it.
            t.tick().await;
        }

        loop {
            let tick = async {
                match ticker.as_mut() {
                    Some(t) => {
                        t.tick().await;
                    }
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(ScanCommand::Rescan) => tracing::debug!("rescan requested"),
                    None => {
                        tracing::debug!("command channel closed; exiting scan loop");
                        break;
                    }
                },
                _ = tick => tracing::debug!("watch interval elapsed; rescanning"),
            }

            if !self.scan_and_send(&tx).await {
                break;
            }
        }
    }

    /// Run one scan and forward the report. Returns `false` once the
    /// receiver has gone away.
    async fn scan_and_send(&self, tx: &mpsc::Sender<ScanReport>) -> bool {
        if tx.is_closed() {
            return false;
        }
        let report = scan_concurrently(&self.source, &self.config).await;
        if let Err(e) = tx.send(report).await {
            tracing::warn!(error = %e, "failed to send scan report; receiver dropped");
            return false;
        }
        true
    }
}

// ── ScanHandle ────────────────────────────────────────────────────────────────

/// A handle to the background scan task.
pub struct ScanHandle {
    handle: tokio::task::JoinHandle<()>,
    commands: mpsc::Sender<ScanCommand>,
}

impl ScanHandle {
    /// Ask for a fresh scan. Returns `false` if the request could not be
    /// queued (loop stopped or already saturated with requests).
    pub fn rescan(&self) -> bool {
        self.commands.try_send(ScanCommand::Rescan).is_ok()
    }

    /// Immediately abort the scan loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Concurrent scan ───────────────────────────────────────────────────────────

/// Scan `source`, ingesting each file on the blocking pool.
///
/// Results are collected back in input order, so the report is identical to
/// the sequential [`dose_data::scan::run_scan`]. A task that dies is recorded
/// as a failure for its own file only.
pub async fn scan_concurrently(source: &ScanSource, config: &ScanConfig) -> ScanReport {
    let started = Instant::now();

    let listing = {
        let source = source.clone();
        tokio::task::spawn_blocking(move || source.paths()).await
    };
    let paths = match listing {
        Ok(paths) => paths,
        Err(e) => {
            tracing::warn!(error = %e, "file discovery task failed");
            Vec::new()
        }
    };

    let tasks: Vec<_> = paths
        .into_iter()
        .map(|path| {
            let config = config.clone();
            let name = file_name_of(&path);
            let task = tokio::task::spawn_blocking(move || process_path(&path, &config));
            (name, task)
        })
        .collect();

    let mut results = Vec::with_capacity(tasks.len());
    for (name, task) in tasks {
        let result = match task.await {
            Ok(result) => result,
            Err(e) => FileOutcome {
                outcome: IngestOutcome::Failure(Failure::new(
                    name,
                    format!("ingestion task failed: {}", e),
                )),
                admitted: true,
            },
        };
        results.push(result);
    }

    build_report(results, started)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
