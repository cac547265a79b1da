//! Line chart of cumulative dose against timestamp.
//!
//! Timestamps are plotted as seconds since the earliest row so the chart
//! works on a numeric axis; the axis labels translate back to wall-clock
//! time.

use ratatui::{
    layout::{Constraint, Rect},
    style::Modifier,
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition},
    Frame,
};

use chrono::NaiveDateTime;
use dose_core::formatting::format_dose;
use dose_core::models::MergedSeriesTable;
use dose_core::time_utils::{format_clock, format_timestamp, offset_by_seconds, seconds_since};

use crate::themes::Theme;

pub const CHART_TITLE: &str = "Cumulative Dose vs Timestamp";
pub const X_AXIS_TITLE: &str = "Timestamp";
pub const Y_AXIS_TITLE: &str = "Cumulative Dose";

const SECONDS_PER_DAY: f64 = 86_400.0;

// ── Plot data ─────────────────────────────────────────────────────────────────

/// One plotted line: label plus `(seconds since origin, dose)` points.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Everything the chart widget needs, computed from a merged table.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    pub series: Vec<PlotSeries>,
    /// Earliest timestamp; x = 0 on the axis.
    pub origin: NaiveDateTime,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl PlotData {
    /// Project `table` onto numeric axes. `None` when there is nothing to plot.
    pub fn from_table(table: &MergedSeriesTable) -> Option<Self> {
        let (first, last) = table.time_bounds()?;
        let (lo, hi) = table.value_bounds()?;

        let series = table
            .traces()
            .into_iter()
            .map(|trace| PlotSeries {
                label: trace.label,
                points: trace
                    .points
                    .into_iter()
                    .filter(|(_, v)| v.is_finite())
                    .map(|(ts, v)| (seconds_since(first, ts), v))
                    .collect(),
            })
            .collect();

        let span = seconds_since(first, last);
        let x_bounds = if span > 0.0 { [0.0, span] } else { [0.0, 1.0] };

        Some(Self {
            series,
            origin: first,
            x_bounds,
            y_bounds: padded_bounds(lo, hi),
        })
    }

    /// Start, middle and end labels for the time axis.
    ///
    /// Runs longer than a day carry the date as well as the clock time.
    pub fn x_labels(&self) -> Vec<String> {
        let span = self.x_bounds[1] - self.x_bounds[0];
        let fmt: fn(NaiveDateTime) -> String = if span >= SECONDS_PER_DAY {
            format_timestamp
        } else {
            format_clock
        };
        [0.0, span / 2.0, span]
            .iter()
            .filter_map(|&s| offset_by_seconds(self.origin, s))
            .map(fmt)
            .collect()
    }

    /// Bottom, middle and top labels for the dose axis.
    pub fn y_labels(&self) -> Vec<String> {
        let [lo, hi] = self.y_bounds;
        vec![format_dose(lo), format_dose((lo + hi) / 2.0), format_dose(hi)]
    }
}

/// Pad the value range by 5 % each side; a flat range gets ±1.
fn padded_bounds(lo: f64, hi: f64) -> [f64; 2] {
    let range = hi - lo;
    if range <= 0.0 {
        [lo - 1.0, hi + 1.0]
    } else {
        let pad = range * 0.05;
        [lo - pad, hi + pad]
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Render the chart for `table` into `area`.
///
/// Each label gets a line plus a marker overlay in its palette colour. The
/// legend lists labels only; the marker datasets are unnamed.
pub fn render_chart_view(frame: &mut Frame, area: Rect, table: &MergedSeriesTable, theme: &Theme) {
    let Some(plot) = PlotData::from_table(table) else {
        crate::table_view::render_no_data(frame, area, theme);
        return;
    };

    let mut datasets = Vec::with_capacity(plot.series.len() * 2);
    for (i, series) in plot.series.iter().enumerate() {
        let style = theme.series_style(i);
        datasets.push(
            Dataset::default()
                .name(series.label.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(style)
                .data(&series.points),
        );
        datasets.push(
            Dataset::default()
                .marker(Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(style.add_modifier(Modifier::BOLD))
                .data(&series.points),
        );
    }

    let x_axis = Axis::default()
        .title(Span::styled(X_AXIS_TITLE, theme.axis_title))
        .style(theme.axis)
        .bounds(plot.x_bounds)
        .labels(plot.x_labels());
    let y_axis = Axis::default()
        .title(Span::styled(Y_AXIS_TITLE, theme.axis_title))
        .style(theme.axis)
        .bounds(plot.y_bounds)
        .labels(plot.y_labels());

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(Line::from(Span::styled(
                    format!(" {} ", CHART_TITLE),
                    theme.header,
                ))),
        )
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)))
        .style(theme.text);

    frame.render_widget(chart, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
