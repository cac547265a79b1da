use crate::themes::Theme;
use dose_core::models::ScanReport;
use ratatui::text::{Line, Span};

/// Shown when the scan offered nothing that passed admission.
pub const NO_MATCHING_FILES: &str = "No CSV files matching the pattern were found";

/// Heading above the per-file failure list.
pub const SOME_SKIPPED: &str = "Some files were skipped:";

/// Warning block listing every file the last scan could not use.
///
/// When no file was admitted at all, only [`NO_MATCHING_FILES`] is shown.
/// Otherwise each failure gets its own `file: message` line under
/// [`SOME_SKIPPED`]. A clean scan renders no lines.
pub struct Warnings<'a> {
    pub report: &'a ScanReport,
    /// Human-readable description of where files came from.
    pub source: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Warnings<'a> {
    pub fn new(report: &'a ScanReport, source: &'a str, theme: &'a Theme) -> Self {
        Self {
            report,
            source,
            theme,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.report.no_admitted_files() && self.report.failures.is_empty()
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        if self.report.no_admitted_files() {
            return vec![Line::from(vec![
                Span::styled("❗ ", self.theme.warning),
                Span::styled(
                    format!("{} in {}.", NO_MATCHING_FILES, self.source),
                    self.theme.warning,
                ),
            ])];
        }

        if self.report.failures.is_empty() {
            return Vec::new();
        }

        let mut lines = Vec::with_capacity(self.report.failures.len() + 1);
        lines.push(Line::from(vec![
            Span::styled("⚠ ", self.theme.warning),
            Span::styled(SOME_SKIPPED, self.theme.warning),
        ]));
        for failure in &self.report.failures {
            lines.push(Line::from(vec![
                Span::styled("  ", self.theme.dim),
                Span::styled(failure.file_name.clone(), self.theme.bold),
                Span::styled(": ", self.theme.dim),
                Span::styled(failure.message.clone(), self.theme.error),
            ]));
        }
        lines
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
