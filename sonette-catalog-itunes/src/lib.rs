use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;
use sonette_core::{CatalogConfig, CatalogEntry, CatalogProvider, CoreError};
use std::fmt::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "sonette::catalog::itunes";

const ITUNES_SEARCH_URL: &str = "https://itunes.apple.com/search";

/// iTunes Search API catalog
pub struct ItunesProvider {
    client: ClientWithMiddleware,
    country: Option<String>,
    limit: u32,
}

impl ItunesProvider {
    /// Create a provider with the timeout, retries and store country from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &CatalogConfig, limit: u32) -> Result<Self, CoreError> {
        let base_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("Sonette/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(base_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            country: config.country.clone(),
            limit,
        })
    }

    /// Search URL for `term`
    #[must_use]
    pub fn search_url(&self, term: &str) -> String {
        let mut url = format!(
            "{}?term={}&media=music&limit={}",
            ITUNES_SEARCH_URL,
            urlencoding::encode(term),
            self.limit
        );
        if let Some(country) = &self.country {
            let _ = write!(url, "&country={}", urlencoding::encode(country));
        }
        url
    }
}

/// Search response envelope. Only the fields the player uses are kept.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "resultCount", default)]
    result_count: usize,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    track_name: Option<String>,
    artist_name: Option<String>,
    artwork_url100: Option<String>,
    preview_url: Option<String>,
    track_time_millis: Option<u64>,
}

impl From<SearchResult> for CatalogEntry {
    fn from(result: SearchResult) -> Self {
        Self {
            track_name: result.track_name,
            artist_name: result.artist_name,
            artwork_url: result.artwork_url100,
            preview_url: result.preview_url,
            duration_ms: result.track_time_millis,
        }
    }
}

fn entries_from_response(response: SearchResponse) -> Vec<CatalogEntry> {
    if response.result_count != response.results.len() {
        debug!(
            target: LOG_TARGET,
            "resultCount {} disagrees with {} results",
            response.result_count,
            response.results.len()
        );
    }
    response.results.into_iter().map(CatalogEntry::from).collect()
}

#[async_trait]
impl CatalogProvider for ItunesProvider {
    fn name(&self) -> &'static str {
        "itunes"
    }

    async fn search(&self, term: &str) -> Result<Vec<CatalogEntry>, CoreError> {
        let url = self.search_url(term);
        info!(target: LOG_TARGET, "iTunes GET: {}", url);

        let response = self.client.get(&url).send().await?;
        debug!(target: LOG_TARGET, "iTunes response status: {}", response.status());

        if !response.status().is_success() {
            warn!(target: LOG_TARGET, "iTunes returned status: {}", response.status());
            return Err(CoreError::CatalogFailed {
                provider: self.name().to_string(),
                reason: format!("iTunes returned status: {}", response.status()),
            });
        }

        let body: SearchResponse = response.json().await?;
        let entries = entries_from_response(body);
        info!(target: LOG_TARGET, "iTunes returned {} results for {:?}", entries.len(), term);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonette_core::{tracks_from_catalog, SearchConfig, DEFAULT_ARTWORK_SIZE};

    const FIXTURE: &str = r#"{
        "resultCount": 3,
        "results": [
            {
                "wrapperType": "track",
                "kind": "song",
                "trackName": "Snowman",
                "artistName": "WYS",
                "artworkUrl100": "https://is1-ssl.mzstatic.com/image/thumb/a/100x100bb.jpg",
                "previewUrl": "https://audio-ssl.itunes.apple.com/p/1.m4a",
                "trackTimeMillis": 149512
            },
            {
                "wrapperType": "track",
                "trackName": "No Preview",
                "artistName": "Someone",
                "trackTimeMillis": 200000
            },
            {
                "wrapperType": "audiobook",
                "artistName": "Narrator",
                "previewUrl": "https://audio-ssl.itunes.apple.com/p/3.m4a"
            }
        ]
    }"#;

    fn provider(country: Option<&str>) -> ItunesProvider {
        let config = CatalogConfig {
            country: country.map(String::from),
            ..CatalogConfig::default()
        };
        ItunesProvider::new(&config, SearchConfig::default().limit).unwrap()
    }

    #[test]
    fn test_parse_fixture() {
        let response: SearchResponse = serde_json::from_str(FIXTURE).unwrap();
        let entries = entries_from_response(response);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].track_name.as_deref(), Some("Snowman"));
        assert_eq!(entries[0].duration_ms, Some(149_512));
        assert!(entries[0].has_preview());
        assert!(!entries[1].has_preview());
        assert_eq!(entries[2].track_name, None);
    }

    #[test]
    fn test_fixture_to_tracks() {
        let response: SearchResponse = serde_json::from_str(FIXTURE).unwrap();
        let tracks = tracks_from_catalog(entries_from_response(response), DEFAULT_ARTWORK_SIZE);

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].duration_secs, 150);
        assert_eq!(
            tracks[0].cover_url,
            "https://is1-ssl.mzstatic.com/image/thumb/a/300x300bb.jpg"
        );
        assert_eq!(tracks[1].title, "");
        assert_eq!(tracks[1].cover_url, "");
    }

    #[test]
    fn test_empty_response() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"resultCount": 0, "results": []}"#).unwrap();
        assert!(entries_from_response(response).is_empty());

        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(entries_from_response(response).is_empty());
    }

    #[test]
    fn test_search_url_encodes_term() {
        let url = provider(None).search_url("lo fi & chill");
        assert_eq!(
            url,
            "https://itunes.apple.com/search?term=lo%20fi%20%26%20chill&media=music&limit=25"
        );
    }

    #[test]
    fn test_search_url_with_country() {
        let url = provider(Some("GB")).search_url("jazz");
        assert!(url.ends_with("&limit=25&country=GB"));
    }
}
