//! Dashboard metrics and text rendering.
//!
//! Everything here is a pure function of the session snapshot, the loaded
//! lifetime record and the elapsed session time. Clearing and writing to the
//! terminal is left to the caller.

use crate::session::SessionSnapshot;
use crate::store::LifetimeRecord;
use std::path::Path;

/// Width of the direction bar, in cells.
pub const BAR_WIDTH: usize = 30;

/// Below this many elapsed minutes the rate is reported as zero.
const MIN_RATE_MINUTES: f64 = 0.05;

/// Derived figures shown on one dashboard frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardMetrics {
    pub session: SessionSnapshot,
    pub session_total: u64,
    pub session_elapsed_secs: f64,
    pub scrolls_per_minute: f64,
    pub alltime_up: u64,
    pub alltime_down: u64,
    pub alltime_total: u64,
    /// Completed sessions plus the one in progress.
    pub alltime_sessions: u64,
    pub alltime_elapsed_secs: f64,
}

impl DashboardMetrics {
    /// Combine the live session with the stored totals.
    ///
    /// The record does not include the current session until shutdown, so
    /// the all-time figures add it on top for display.
    pub fn compute(session: SessionSnapshot, record: &LifetimeRecord, elapsed_secs: f64) -> Self {
        let session_total = session.total();
        Self {
            session,
            session_total,
            session_elapsed_secs: elapsed_secs,
            scrolls_per_minute: scrolls_per_minute(session_total, elapsed_secs),
            alltime_up: record.total_scroll_up + session.up,
            alltime_down: record.total_scroll_down + session.down,
            alltime_total: record.total_scroll_up + record.total_scroll_down + session_total,
            alltime_sessions: record.total_sessions + 1,
            alltime_elapsed_secs: record.total_time_seconds + elapsed_secs,
        }
    }
}

/// Ticks per minute, or zero for the first three seconds of a session.
pub fn scrolls_per_minute(total: u64, elapsed_secs: f64) -> f64 {
    let minutes = elapsed_secs / 60.0;
    if minutes > MIN_RATE_MINUTES {
        total as f64 / minutes
    } else {
        0.0
    }
}

/// Format seconds as `"1h 02m 03s"`, dropping leading zero units.
///
/// Fractional seconds are truncated. Minutes are shown once there is at
/// least a minute, or whenever hours are shown.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes:02}m {secs:02}s")
    } else if minutes > 0 {
        format!("{minutes:02}m {secs:02}s")
    } else {
        format!("{secs:02}s")
    }
}

/// Bar of `width` cells split between `^` (up) and `v` (down).
///
/// The up share is rounded to the nearest cell, ties to even. With no ticks
/// the bar is blank.
pub fn scroll_bar(up: u64, down: u64, width: usize) -> String {
    let total = up + down;
    if total == 0 {
        return format!("[{}]", " ".repeat(width));
    }
    let up_cells = ((up as f64 / total as f64) * width as f64).round_ties_even() as usize;
    let up_cells = up_cells.min(width);
    format!("[{}{}]", "^".repeat(up_cells), "v".repeat(width - up_cells))
}

/// Render the full dashboard frame.
pub fn render_frame(metrics: &DashboardMetrics) -> String {
    let session = metrics.session;
    let rule = "═".repeat(52);
    let row = |label: &str, value: String| format!("  ║   {label:<13}: {value:<34}║");

    let lines = [
        String::new(),
        format!("  ╔{rule}╗"),
        format!("  ║{:^52}║", "SCROLL WHEEL TRACKER"),
        format!("  ╠{rule}╣"),
        format!("  ║  {:<50}║", "SESSION"),
        row("Scroll Up", session.up.to_string()),
        row("Scroll Down", session.down.to_string()),
        row("Total Clicks", metrics.session_total.to_string()),
        row("Duration", format_duration(metrics.session_elapsed_secs)),
        row("Scrolls/min", format!("{:.1}", metrics.scrolls_per_minute)),
        row("Direction", scroll_bar(session.up, session.down, BAR_WIDTH)),
        format!("  ╠{rule}╣"),
        format!("  ║  {:<50}║", "ALL TIME"),
        row("Scroll Up", metrics.alltime_up.to_string()),
        row("Scroll Down", metrics.alltime_down.to_string()),
        row("Total Clicks", metrics.alltime_total.to_string()),
        row("Sessions", metrics.alltime_sessions.to_string()),
        row("Total Time", format_duration(metrics.alltime_elapsed_secs)),
        format!("  ╠{rule}╣"),
        format!("  ║  {:<50}║", "Press Ctrl+C to stop and save"),
        format!("  ╚{rule}╝"),
        String::new(),
    ];
    lines.join("\n")
}

/// Render the block printed after the session has been saved.
pub fn render_summary(session: SessionSnapshot, elapsed_secs: f64, data_file: &Path) -> String {
    format!(
        "\n  Session saved!\n\
         \x20 You scrolled {} times in {}.\n\
         \x20 (Up: {}  Down: {})\n\
         \n\
         \x20 Data stored in: {}\n",
        session.total(),
        format_duration(elapsed_secs),
        session.up,
        session.down,
        data_file.display()
    )
}
