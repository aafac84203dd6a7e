use crate::error::CoreError;
use async_trait::async_trait;

/// One raw search result as a catalog returns it.
///
/// Every field is optional: catalogs are free to omit anything, and the core
/// decides what is usable when converting to a [`Track`](crate::Track).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Track name
    pub track_name: Option<String>,
    /// Artist name
    pub artist_name: Option<String>,
    /// Cover art URL at the catalog's thumbnail resolution
    pub artwork_url: Option<String>,
    /// Playable preview URL
    pub preview_url: Option<String>,
    /// Track length in milliseconds
    pub duration_ms: Option<u64>,
}

impl CatalogEntry {
    /// Create an entry with a title and artist and nothing else
    #[must_use]
    pub fn new(track_name: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            track_name: Some(track_name.into()),
            artist_name: Some(artist_name.into()),
            ..Self::default()
        }
    }

    /// Set the preview URL
    #[must_use]
    pub fn with_preview(mut self, url: impl Into<String>) -> Self {
        self.preview_url = Some(url.into());
        self
    }

    /// Set the artwork URL
    #[must_use]
    pub fn with_artwork(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    /// Set the duration
    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Whether this entry carries a preview reference that can be played
    #[must_use]
    pub fn has_preview(&self) -> bool {
        self.preview_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

/// Trait for music catalogs that can be searched by free text
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Search the catalog, returning results in catalog order
    async fn search(&self, term: &str) -> Result<Vec<CatalogEntry>, CoreError>;
}
