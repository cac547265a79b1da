mod bootstrap;
mod summary;

use anyhow::{Context, Result};
use dose_core::settings::Settings;
use dose_data::scan::run_scan;
use dose_runtime::orchestrator::ScanOrchestrator;
use dose_ui::app::{App, ViewMode};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    let app_dir = bootstrap::ensure_directories()?;
    let headless = settings.view == "summary";
    let log_file = settings
        .log_file
        .clone()
        .or_else(|| (!headless).then(|| bootstrap::default_log_file(&app_dir)));
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("Dose viewer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Pattern: {}, Start: {}",
        settings.view,
        settings.theme,
        settings.pattern,
        settings.start_time
    );

    let config = settings
        .scan_config()
        .context("invalid --start-time or --pattern")?;
    let source = bootstrap::scan_source(&settings);

    if headless {
        let report = tokio::task::spawn_blocking({
            let source = source.clone();
            move || run_scan(&source, &config)
        })
        .await?;
        print!("{}", summary::render_summary(&report, &source.describe()));
        return Ok(());
    }

    tracing::info!("Scanning {}", source.describe());
    let app = App::new(
        &settings.theme,
        ViewMode::from_name(&settings.view),
        settings.pattern.clone(),
        settings.start_time.clone(),
        source.describe(),
    );

    let orchestrator = ScanOrchestrator::new(source, config, settings.watch);
    let (rx, handle) = orchestrator.start();

    // The TUI handles 'q' / Ctrl+C itself while the terminal is in raw mode;
    // the OS-level signal covers the moments before and after.
    tokio::select! {
        result = app.run(rx, &handle) => {
            handle.abort();
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down scan task");
            handle.abort();
        }
    }

    Ok(())
}
