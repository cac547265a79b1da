use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};

/// Naive date-time layouts tried, in order, after RFC 3339 / RFC 2822.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Display layout for timestamps in the UI and summaries.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Absolute timestamps ───────────────────────────────────────────────────────

/// Parse a human-readable absolute date-time.
///
/// Strings carrying an offset (RFC 3339 including the `Z` suffix, or
/// RFC 2822) are converted to UTC wall-clock time. Naive strings are taken
/// as-is. A bare date means midnight. Returns `None` for empty or
/// unrecognised input.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let normalised = match s.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => s.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

// ── Elapsed seconds ───────────────────────────────────────────────────────────

/// Parse a cell as elapsed seconds. Only finite real numbers qualify.
pub fn parse_elapsed_seconds(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `start + seconds`, kept to nanosecond precision.
///
/// Returns `None` when the result falls outside the representable range.
pub fn offset_by_seconds(start: NaiveDateTime, seconds: f64) -> Option<NaiveDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.trunc();
    if whole.abs() > i64::MAX as f64 / 2.0 {
        return None;
    }
    let nanos = ((seconds - whole) * 1_000_000_000.0).round() as i64;
    let delta = TimeDelta::try_seconds(whole as i64)?.checked_add(&TimeDelta::nanoseconds(nanos))?;
    start.checked_add_signed(delta)
}

/// Seconds between `origin` and `ts`, for plotting on a numeric axis.
pub fn seconds_since(origin: NaiveDateTime, ts: NaiveDateTime) -> f64 {
    let delta = ts - origin;
    delta.num_milliseconds() as f64 / 1000.0
}

/// Format a timestamp for display.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}

/// Short `HH:MM:SS` form used for axis labels.
pub fn format_clock(ts: NaiveDateTime) -> String {
    ts.format("%H:%M:%S").to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
