use crate::catalog::CatalogEntry;
use crate::time::millis_to_rounded_secs;

/// Thumbnail suffix used by catalog artwork URLs.
const ARTWORK_THUMB_SUFFIX: &str = "100x100bb.jpg";

/// Cover size used when none is configured.
pub const DEFAULT_ARTWORK_SIZE: u32 = 300;

/// A playable preview and its metadata.
///
/// Only built from catalog entries that carry a preview URL, so every
/// `Track` can be handed to a media element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Track title
    pub title: String,
    /// Artist name
    pub artist: String,
    /// Cover art URL (may be empty)
    pub cover_url: String,
    /// Preview audio URL
    pub preview_url: String,
    /// Catalog duration in whole seconds
    pub duration_secs: u32,
}

impl Track {
    /// Create a new track
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        cover_url: impl Into<String>,
        preview_url: impl Into<String>,
        duration_secs: u32,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            cover_url: cover_url.into(),
            preview_url: preview_url.into(),
            duration_secs,
        }
    }

    /// Convert a catalog entry, or `None` if it has no usable preview.
    ///
    /// Artwork is upscaled to `artwork_size` pixels when the URL follows the
    /// catalog's thumbnail naming; other URLs are kept as they are.
    #[must_use]
    pub fn from_catalog(entry: CatalogEntry, artwork_size: u32) -> Option<Self> {
        if !entry.has_preview() {
            return None;
        }
        let CatalogEntry {
            track_name,
            artist_name,
            artwork_url,
            preview_url,
            duration_ms,
        } = entry;

        Some(Self {
            title: track_name.unwrap_or_default(),
            artist: artist_name.unwrap_or_default(),
            cover_url: artwork_url
                .map(|url| upscale_artwork(&url, artwork_size))
                .unwrap_or_default(),
            preview_url: preview_url.unwrap_or_default(),
            duration_secs: millis_to_rounded_secs(duration_ms.unwrap_or(0)),
        })
    }

    /// Catalog duration as fractional seconds
    #[must_use]
    pub fn duration_f64(&self) -> f64 {
        f64::from(self.duration_secs)
    }
}

/// Convert catalog results into tracks, dropping entries without a preview
#[must_use]
pub fn tracks_from_catalog(entries: Vec<CatalogEntry>, artwork_size: u32) -> Vec<Track> {
    entries
        .into_iter()
        .filter_map(|entry| Track::from_catalog(entry, artwork_size))
        .collect()
}

/// Swap the thumbnail suffix of an artwork URL for a `size`×`size` one
#[must_use]
pub fn upscale_artwork(url: &str, size: u32) -> String {
    if url.contains(ARTWORK_THUMB_SUFFIX) {
        url.replacen(ARTWORK_THUMB_SUFFIX, &format!("{size}x{size}bb.jpg"), 1)
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CatalogEntry {
        CatalogEntry::new("Snowman", "WYS")
            .with_preview("https://audio.example/snowman.m4a")
            .with_artwork("https://img.example/a/100x100bb.jpg")
            .with_duration_ms(171_500)
    }

    #[test]
    fn test_from_catalog_maps_fields() {
        let track = Track::from_catalog(entry(), DEFAULT_ARTWORK_SIZE).unwrap();

        assert_eq!(track.title, "Snowman");
        assert_eq!(track.artist, "WYS");
        assert_eq!(track.cover_url, "https://img.example/a/300x300bb.jpg");
        assert_eq!(track.preview_url, "https://audio.example/snowman.m4a");
        assert_eq!(track.duration_secs, 172);
    }

    #[test]
    fn test_from_catalog_rejects_missing_preview() {
        let mut missing = entry();
        missing.preview_url = None;
        assert!(Track::from_catalog(missing, DEFAULT_ARTWORK_SIZE).is_none());

        let blank = entry().with_preview("   ");
        assert!(Track::from_catalog(blank, DEFAULT_ARTWORK_SIZE).is_none());
    }

    #[test]
    fn test_from_catalog_missing_optional_fields() {
        let bare = CatalogEntry {
            preview_url: Some("https://audio.example/x.m4a".into()),
            ..CatalogEntry::default()
        };
        let track = Track::from_catalog(bare, DEFAULT_ARTWORK_SIZE).unwrap();

        assert_eq!(track.title, "");
        assert_eq!(track.cover_url, "");
        assert_eq!(track.duration_secs, 0);
    }

    #[test]
    fn test_upscale_artwork_without_pattern_keeps_url() {
        let url = "https://img.example/cover.png";
        assert_eq!(upscale_artwork(url, 600), url);
    }

    #[test]
    fn test_upscale_artwork_custom_size() {
        assert_eq!(
            upscale_artwork("https://img.example/100x100bb.jpg", 600),
            "https://img.example/600x600bb.jpg"
        );
    }

    #[test]
    fn test_tracks_from_catalog_filters_and_keeps_order() {
        let entries = vec![
            CatalogEntry::new("a", "x").with_preview("https://p/a"),
            CatalogEntry::new("b", "x"),
            CatalogEntry::new("c", "x").with_preview("https://p/c"),
        ];

        let tracks = tracks_from_catalog(entries, DEFAULT_ARTWORK_SIZE);
        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c"]);
    }
}
