use crate::time::format_clock;
use crate::track::Track;

/// Status message shown in place of a track
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indicator {
    /// The search returned nothing playable
    NoResults { query: String },
    /// The catalog could not be reached or answered garbage
    SearchFailed,
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoResults { query } => write!(f, "No results for \u{201c}{query}\u{201d}"),
            Self::SearchFailed => f.write_str("Search failed."),
        }
    }
}

/// Everything the view shows about the player, derived from player state
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub title: String,
    pub artist: String,
    pub cover_url: String,
    /// Elapsed time label, `M:SS`
    pub elapsed: String,
    /// Total time label, `M:SS`
    pub total: String,
    /// Seek bar fill in `[0, 1]`
    pub progress: f64,
    pub is_playing: bool,
    pub indicator: Option<Indicator>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            title: String::new(),
            artist: String::new(),
            cover_url: String::new(),
            elapsed: format_clock(0.0),
            total: format_clock(0.0),
            progress: 0.0,
            is_playing: false,
            indicator: None,
        }
    }
}

impl DisplayState {
    /// Blank display carrying only `indicator`
    #[must_use]
    pub fn cleared(indicator: Option<Indicator>) -> Self {
        Self {
            indicator,
            ..Self::default()
        }
    }

    /// Show a freshly loaded track at its start.
    ///
    /// The total label uses the catalog duration until the media element
    /// reports the real one.
    pub fn show_track(&mut self, track: &Track) {
        self.title.clone_from(&track.title);
        self.artist.clone_from(&track.artist);
        self.cover_url.clone_from(&track.cover_url);
        self.elapsed = format_clock(0.0);
        self.total = format_clock(track.duration_f64());
        self.progress = 0.0;
        self.indicator = None;
    }

    /// Update the elapsed label and fill from a live position
    pub fn show_position(&mut self, position_secs: f64, duration_secs: f64) {
        self.elapsed = format_clock(position_secs);
        self.progress = progress_fraction(position_secs, duration_secs);
    }

    /// Update the total label once the real duration is known
    pub fn show_duration(&mut self, duration_secs: f64) {
        self.total = format_clock(duration_secs);
    }

    /// Text for the title line: the track title, or the indicator message
    #[must_use]
    pub fn headline(&self) -> String {
        self.indicator
            .as_ref()
            .map_or_else(|| self.title.clone(), ToString::to_string)
    }
}

/// Fraction of the track played; 0 while the duration is unknown
#[must_use]
pub fn progress_fraction(position_secs: f64, duration_secs: f64) -> f64 {
    if duration_secs > 0.0 && position_secs.is_finite() {
        (position_secs / duration_secs).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// One entry of the rendered track list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRow {
    pub index: usize,
    pub title: String,
    pub artist: String,
    pub cover_url: String,
    pub is_current: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_fraction() {
        assert_eq!(progress_fraction(15.0, 30.0), 0.5);
        assert_eq!(progress_fraction(15.0, 0.0), 0.0);
        assert_eq!(progress_fraction(45.0, 30.0), 1.0);
        assert_eq!(progress_fraction(f64::NAN, 30.0), 0.0);
    }

    #[test]
    fn test_show_track_resets_progress() {
        let mut display = DisplayState {
            progress: 0.7,
            elapsed: "0:21".into(),
            indicator: Some(Indicator::SearchFailed),
            ..DisplayState::default()
        };
        let track = Track::new("Title", "Artist", "https://c", "https://p", 95);
        display.show_track(&track);

        assert_eq!(display.title, "Title");
        assert_eq!(display.elapsed, "0:00");
        assert_eq!(display.total, "1:35");
        assert_eq!(display.progress, 0.0);
        assert_eq!(display.indicator, None);
    }

    #[test]
    fn test_indicator_text() {
        let indicator = Indicator::NoResults {
            query: "zzzz".into(),
        };
        assert_eq!(indicator.to_string(), "No results for \u{201c}zzzz\u{201d}");
        assert_eq!(Indicator::SearchFailed.to_string(), "Search failed.");
    }

    #[test]
    fn test_headline_prefers_indicator() {
        let display = DisplayState::cleared(Some(Indicator::SearchFailed));
        assert_eq!(display.headline(), "Search failed.");
        assert_eq!(display.total, "0:00");
    }
}
