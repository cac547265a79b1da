use crate::themes::Theme;
use chrono::DateTime;
use dose_core::formatting::format_number;
use dose_core::models::ScanReport;
use ratatui::text::{Line, Span};

/// Key bindings hint appended to the status line.
pub const KEY_HINTS: &str = "r rescan · Tab switch view · q quit";

/// One-line summary of the last scan plus key hints.
///
/// Before the first report arrives it reads `Scanning…`.
pub struct StatusLine<'a> {
    pub report: Option<&'a ScanReport>,
    pub theme: &'a Theme,
}

impl<'a> StatusLine<'a> {
    pub fn new(report: Option<&'a ScanReport>, theme: &'a Theme) -> Self {
        Self { report, theme }
    }

    pub fn to_line(&self) -> Line<'a> {
        let Some(report) = self.report else {
            return Line::from(vec![
                Span::styled("Scanning…", self.theme.info),
                Span::styled("  │  ", self.theme.separator),
                Span::styled(KEY_HINTS, self.theme.dim),
            ]);
        };

        let meta = &report.metadata;
        let skipped_style = if meta.failure_count > 0 {
            self.theme.warning
        } else {
            self.theme.value
        };

        let mut spans = vec![
            Span::styled("Series: ", self.theme.label),
            Span::styled(report.table.column_count().to_string(), self.theme.value),
            Span::styled("  │  ", self.theme.separator),
            Span::styled("Rows: ", self.theme.label),
            Span::styled(report.table.row_count().to_string(), self.theme.value),
            Span::styled("  │  ", self.theme.separator),
            Span::styled("Skipped: ", self.theme.label),
            Span::styled(meta.failure_count.to_string(), skipped_style),
        ];

        if let Ok(generated) = DateTime::parse_from_rfc3339(&meta.generated_at) {
            spans.push(Span::styled("  │  ", self.theme.separator));
            spans.push(Span::styled(
                format!(
                    "Scanned {} in {}s",
                    generated.format("%H:%M:%S"),
                    format_number(meta.elapsed_seconds, 2)
                ),
                self.theme.dim,
            ));
        }

        spans.push(Span::styled("  │  ", self.theme.separator));
        spans.push(Span::styled(KEY_HINTS, self.theme.dim));
        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
