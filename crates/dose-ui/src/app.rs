//! Main application state and TUI event loop for the dose viewer.
//!
//! [`App`] owns the theme, view mode, and the last received [`ScanReport`].
//! It drives a single event loop that redraws on every tick, reacts to key
//! presses, and drains new reports from the scan orchestrator.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use dose_core::models::ScanReport;
use dose_runtime::orchestrator::ScanHandle;

use crate::chart_view;
use crate::components::header::Header;
use crate::components::status::StatusLine;
use crate::components::warnings::Warnings;
use crate::table_view;
use crate::themes::Theme;

/// Most warning lines shown before the panel stops growing.
const MAX_WARNING_LINES: u16 = 8;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Cumulative dose line chart.
    Chart,
    /// Merged timestamp × subject table.
    Table,
}

impl ViewMode {
    /// Parse a `--view` value. Anything other than `"table"` is the chart.
    pub fn from_name(name: &str) -> Self {
        match name {
            "table" => ViewMode::Table,
            _ => ViewMode::Chart,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Chart => ViewMode::Table,
            ViewMode::Table => ViewMode::Chart,
        }
    }
}

// ── KeyAction ─────────────────────────────────────────────────────────────────

/// What a key press asks the event loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Rescan,
    None,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dose viewer TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Current view mode.
    pub view_mode: ViewMode,
    /// Admission pattern, shown in the header.
    pub pattern: String,
    /// Elapsed-seconds origin, shown in the header.
    pub start_time: String,
    /// Where files come from, used in the "no files" warning.
    pub source: String,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// First visible row in the table view.
    pub scroll: usize,
    /// Most recent scan report, `None` until the first scan finishes.
    pub report: Option<ScanReport>,
}

impl App {
    /// Construct a new application with the given configuration.
    pub fn new(
        theme_name: &str,
        view_mode: ViewMode,
        pattern: String,
        start_time: String,
        source: String,
    ) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view_mode,
            pattern,
            start_time,
            source,
            should_quit: false,
            scroll: 0,
            report: None,
        }
    }

    // ── Public event loop ─────────────────────────────────────────────────────

    /// Run the TUI, receiving scan reports from `rx`.
    ///
    /// Uses `crossterm::event::poll` (synchronous, with a 250 ms timeout) so
    /// that the terminal event loop stays on the current thread while new
    /// reports arrive on the async channel via `try_recv`.
    ///
    /// The loop exits on `q`, `Q`, or `Ctrl+C`, or once the scan loop has
    /// gone away.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<ScanReport>,
        handle: &ScanHandle,
    ) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => match self.handle_key(key) {
                        KeyAction::Quit => break Ok(()),
                        KeyAction::Rescan => {
                            if !handle.rescan() {
                                tracing::debug!("rescan request dropped; one is already pending");
                            }
                        }
                        KeyAction::None => {}
                    },
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            // Drain any pending reports (non-blocking).
            loop {
                match rx.try_recv() {
                    Ok(report) => self.update_from_report(report),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── State updates ─────────────────────────────────────────────────────────

    /// Translate a key press into state changes and a loop action.
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyAction {
        if key.kind == KeyEventKind::Release {
            return KeyAction::None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
            KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Rescan,
            KeyCode::Tab | KeyCode::Char('v') => {
                self.view_mode = self.view_mode.toggled();
                KeyAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_by(1);
                KeyAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                KeyAction::None
            }
            KeyCode::PageDown => {
                self.scroll_by(10);
                KeyAction::None
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                KeyAction::None
            }
            KeyCode::Home => {
                self.scroll = 0;
                KeyAction::None
            }
            _ => KeyAction::None,
        }
    }

    /// Replace the current report with `report`.
    ///
    /// The scroll position is kept but clamped to the new row count.
    pub fn update_from_report(&mut self, report: ScanReport) {
        let rows = report.table.row_count();
        self.scroll = self.scroll.min(rows.saturating_sub(1));
        self.report = Some(report);
    }

    fn scroll_by(&mut self, n: usize) {
        let rows = self
            .report
            .as_ref()
            .map(|r| r.table.row_count())
            .unwrap_or(0);
        self.scroll = (self.scroll + n).min(rows.saturating_sub(1));
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let warning_lines = self
            .report
            .as_ref()
            .map(|r| Warnings::new(r, &self.source, &self.theme).to_lines())
            .unwrap_or_default();
        let warnings_height = if warning_lines.is_empty() {
            0
        } else {
            (warning_lines.len() as u16).min(MAX_WARNING_LINES) + 2
        };

        let [header_area, body_area, warnings_area, status_area] = Layout::vertical([
            Constraint::Length(Header::HEIGHT),
            Constraint::Min(5),
            Constraint::Length(warnings_height),
            Constraint::Length(1),
        ])
        .areas(area);

        let header = Header::new(&self.pattern, &self.start_time, &self.theme);
        frame.render_widget(Paragraph::new(header.to_lines()), header_area);

        self.render_body(frame, body_area);

        if !warning_lines.is_empty() {
            frame.render_widget(
                Paragraph::new(warning_lines)
                    .wrap(Wrap { trim: false })
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(self.theme.warning)
                            .title(" Warnings "),
                    ),
                warnings_area,
            );
        }

        let status = StatusLine::new(self.report.as_ref(), &self.theme);
        frame.render_widget(Paragraph::new(status.to_line()), status_area);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        let Some(report) = self.report.as_ref() else {
            frame.render_widget(
                Paragraph::new("Scanning for files…")
                    .style(self.theme.dim)
                    .block(Block::default().borders(Borders::ALL)),
                area,
            );
            return;
        };

        match self.view_mode {
            ViewMode::Chart => chart_view::render_chart_view(frame, area, &report.table, &self.theme),
            ViewMode::Table => {
                table_view::render_table_view(frame, area, &report.table, self.scroll, &self.theme)
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
