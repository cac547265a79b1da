//! Merged series table view for the dose viewer TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per timestamp
//! and one column per subject label. Cells with no sample show [`MISSING`].

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use dose_core::formatting::format_dose;
use dose_core::models::{MergedRow, MergedSeriesTable};
use dose_core::time_utils::format_timestamp;

use crate::themes::Theme;

/// Placeholder for an absent cell.
pub const MISSING: &str = "-";

const TIMESTAMP_WIDTH: u16 = 21;
const VALUE_WIDTH: u16 = 12;

/// Display strings for one table row: timestamp first, then one per label.
pub fn row_cells(row: &MergedRow) -> Vec<String> {
    std::iter::once(format_timestamp(row.timestamp))
        .chain(row.values.iter().map(|v| match v {
            Some(value) => format_dose(*value),
            None => MISSING.to_string(),
        }))
        .collect()
}

/// Render `table` into `area`, starting `offset` rows down.
///
/// `offset` is clamped so the last page stays full.
pub fn render_table_view(
    frame: &mut Frame,
    area: Rect,
    table: &MergedSeriesTable,
    offset: usize,
    theme: &Theme,
) {
    if table.is_empty() {
        render_no_data(frame, area, theme);
        return;
    }

    let header_cells = std::iter::once("Timestamp")
        .chain(table.labels.iter().map(String::as_str))
        .map(|h| Cell::from(h.to_string()).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    // Borders and header take three rows.
    let visible = area.height.saturating_sub(3) as usize;
    let offset = clamp_offset(offset, table.row_count(), visible);

    let data_rows: Vec<Row> = table
        .rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            let cells = row_cells(row).into_iter().map(|text| {
                if text == MISSING {
                    Cell::from(text).style(theme.table_missing)
                } else {
                    Cell::from(text)
                }
            });
            Row::new(cells).style(style)
        })
        .collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(TIMESTAMP_WIDTH))
        .chain(table.labels.iter().map(|_| Constraint::Length(VALUE_WIDTH)))
        .collect();

    let title = format!(
        " Merged Series ({} rows × {} subjects) ",
        table.row_count(),
        table.column_count()
    );

    let view = Table::new(data_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(title),
        )
        .style(theme.text);

    frame.render_widget(view, area);
}

/// Largest useful scroll offset for `total` rows in a window of `visible`.
pub fn clamp_offset(offset: usize, total: usize, visible: usize) -> usize {
    offset.min(total.saturating_sub(visible))
}

/// Render a "no data" placeholder when there is nothing to show.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No data", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "No file produced a usable series. Press 'r' to rescan.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Dose Viewer "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
