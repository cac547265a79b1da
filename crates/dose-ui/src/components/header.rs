use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decorative marks placed either side of the application title.
pub const ACCENT: &str = "◆ ◇ ◆";

/// Application title shown in the header.
pub const TITLE: &str = "CUMULATIVE DOSE VS TIME VIEWER";

/// Viewer header rendering four lines:
///
/// 1. Application title with accent decorations (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. Admission pattern and elapsed-seconds origin in `[ pattern | start ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    /// Filename admission pattern as typed by the user.
    pub pattern: &'a str,
    /// Start time that elapsed seconds are offset from.
    pub start_time: &'a str,
    /// Theme providing colour styles for each part of the header.
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(pattern: &'a str, start_time: &'a str, theme: &'a Theme) -> Self {
        Self {
            pattern,
            start_time,
            theme,
        }
    }

    /// Number of terminal rows the header occupies.
    pub const HEIGHT: u16 = 4;

    /// Render the header as a `Vec<Line>` containing exactly four lines.
    ///
    /// The pattern is shown verbatim; regexes are case-sensitive.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        vec![
            Line::from(vec![
                Span::styled(ACCENT, self.theme.header_accent),
                Span::styled(format!(" {} ", TITLE), self.theme.header),
                Span::styled(ACCENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.pattern, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.start_time, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
