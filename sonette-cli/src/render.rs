//! Text rendering of the player display for the terminal.

use sonette_core::{DisplayState, TrackRow};
use std::fmt::Write;

const BAR_CELLS: u32 = 24;

/// Seek bar as `[=====-----]`
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn progress_bar(progress: f64, cells: u32) -> String {
    let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    let filled = (progress * f64::from(cells)).round() as u32;
    let mut bar = String::with_capacity(cells as usize + 2);
    bar.push('[');
    for cell in 0..cells {
        bar.push(if cell < filled { '=' } else { '-' });
    }
    bar.push(']');
    bar
}

/// One status line: play state, headline, artist, times and the bar
#[must_use]
pub fn status_line(display: &DisplayState) -> String {
    if display.indicator.is_some() || (display.title.is_empty() && display.artist.is_empty()) {
        let headline = display.headline();
        return if headline.is_empty() {
            "Nothing loaded".to_string()
        } else {
            headline
        };
    }

    let state = if display.is_playing { "playing" } else { "paused" };
    format!(
        "[{state}] {} - {}  {} / {}  {}",
        display.title,
        display.artist,
        display.elapsed,
        display.total,
        progress_bar(display.progress, BAR_CELLS)
    )
}

/// Numbered track list with the current track marked
#[must_use]
pub fn track_list(rows: &[TrackRow]) -> String {
    if rows.is_empty() {
        return "No tracks".to_string();
    }
    let mut out = String::new();
    for row in rows {
        let marker = if row.is_current { '>' } else { ' ' };
        let _ = writeln!(out, "{marker} {:>2}. {} - {}", row.index + 1, row.title, row.artist);
    }
    out
}
