use crate::error::{CoreError, Result};
use crate::input::KeyCode;
use crate::search::DEFAULT_QUERY;
use crate::track::DEFAULT_ARTWORK_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Largest result page the catalog accepts
pub const MAX_SEARCH_LIMIT: u32 = 200;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SonetteConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub artwork: ArtworkConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Query used at startup and when the search box is cleared
    #[serde(default = "default_query")]
    pub default_query: String,
    /// Quiet time after typing before a search is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Maximum number of results requested per search
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_query() -> String {
    DEFAULT_QUERY.to_string()
}

const fn default_debounce_ms() -> u64 {
    400
}

const fn default_limit() -> u32 {
    25
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_query: default_query(),
            debounce_ms: default_debounce_ms(),
            limit: default_limit(),
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogProviderType {
    #[default]
    Itunes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub provider: CatalogProviderType,
    /// Two-letter store country, catalog default when unset
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_max_retries() -> u32 {
    3
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            provider: CatalogProviderType::default(),
            country: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkConfig {
    /// Edge length in pixels that cover thumbnails are upscaled to
    #[serde(default = "default_artwork_size")]
    pub size: u32,
}

const fn default_artwork_size() -> u32 {
    DEFAULT_ARTWORK_SIZE
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            size: default_artwork_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysConfig {
    #[serde(default = "default_toggle_keys")]
    pub toggle_play: Vec<KeyCode>,
    #[serde(default = "default_previous_keys")]
    pub previous: Vec<KeyCode>,
    #[serde(default = "default_next_keys")]
    pub next: Vec<KeyCode>,
}

fn default_toggle_keys() -> Vec<KeyCode> {
    vec![KeyCode::Space]
}

fn default_previous_keys() -> Vec<KeyCode> {
    vec![KeyCode::ArrowLeft]
}

fn default_next_keys() -> Vec<KeyCode> {
    vec![KeyCode::ArrowRight]
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            toggle_play: default_toggle_keys(),
            previous: default_previous_keys(),
            next: default_next_keys(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to a file in the cache directory
    #[serde(default)]
    pub enabled: bool,
}

impl SonetteConfig {
    /// Get the config file path (~/.config/sonette/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default path, writing a template on first run.
    ///
    /// A missing file is not an error: the template is written and the
    /// defaults it describes are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written, does not
    /// parse, or holds invalid values.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Same as [`load_or_create`](Self::load_or_create) for an explicit path.
    ///
    /// # Errors
    ///
    /// See [`load_or_create`](Self::load_or_create).
    pub fn load_or_create_at(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(config_path, CONFIG_TEMPLATE)?;
            info!("Created config template at {}", config_path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)?;
        Self::from_toml_str(&content)
    }

    /// Load config from a file that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] if the file is missing, or any
    /// error [`load_or_create`](Self::load_or_create) can return.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: config_path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(config_path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or holds invalid values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns the first invalid or missing field found.
    pub fn validate(&self) -> Result<()> {
        if self.search.default_query.trim().is_empty() {
            return Err(CoreError::ConfigMissingField {
                field: "search.default_query".into(),
            });
        }
        if self.search.debounce_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "search.debounce_ms must be at least 1".into(),
            });
        }
        if self.search.limit == 0 || self.search.limit > MAX_SEARCH_LIMIT {
            return Err(CoreError::ConfigInvalid {
                message: format!("search.limit must be between 1 and {MAX_SEARCH_LIMIT}"),
            });
        }
        if self.artwork.size == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "artwork.size must be at least 1".into(),
            });
        }
        if let Some(country) = &self.catalog.country {
            if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(CoreError::ConfigInvalid {
                    message: format!("catalog.country must be a two-letter code, got {country:?}"),
                });
            }
        }
        Ok(())
    }
}

const CONFIG_TEMPLATE: &str = r#"# Sonette Configuration
# ~/.config/sonette/config.toml

[search]
# Query used at startup and whenever the search box is cleared
default_query = "lofi"
# Quiet time after the last keystroke before searching
debounce_ms = 400
# Results per search (1-200)
limit = 25

[catalog]
provider = "itunes"
# Optional two-letter store country
# country = "US"
timeout_secs = 10
max_retries = 3

[artwork]
# Cover art edge length in pixels
size = 300

[keys]
# Key codes: Space, Enter, ArrowLeft, ArrowRight, ArrowUp, ArrowDown,
# KeyJ, KeyK, KeyL, KeyN, KeyP, MediaPlayPause, MediaTrackNext, MediaTrackPrevious
toggle_play = ["Space"]
previous = ["ArrowLeft"]
next = ["ArrowRight"]

[logging]
# Also write logs to the cache directory
enabled = false
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_matches_defaults() {
        let config = SonetteConfig::from_toml_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, SonetteConfig::default());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = SonetteConfig::from_toml_str("").unwrap();
        assert_eq!(config.search.default_query, "lofi");
        assert_eq!(config.search.debounce(), Duration::from_millis(400));
        assert_eq!(config.search.limit, 25);
        assert_eq!(config.artwork.size, 300);
        assert_eq!(config.keys.toggle_play, vec![KeyCode::Space]);
        assert!(!config.logging.enabled);
    }

    #[test]
    fn test_partial_sections() {
        let config = SonetteConfig::from_toml_str(
            r#"
            [search]
            default_query = "ambient"

            [keys]
            next = ["KeyL", "MediaTrackNext"]

            [catalog]
            country = "GB"
            "#,
        )
        .unwrap();

        assert_eq!(config.search.default_query, "ambient");
        assert_eq!(config.search.debounce_ms, 400);
        assert_eq!(config.keys.next, vec![KeyCode::KeyL, KeyCode::MediaTrackNext]);
        assert_eq!(config.keys.previous, vec![KeyCode::ArrowLeft]);
        assert_eq!(config.catalog.country.as_deref(), Some("GB"));
    }

    #[test]
    fn test_rejects_blank_default_query() {
        let err = SonetteConfig::from_toml_str("[search]\ndefault_query = \"  \"\n").unwrap_err();
        assert!(matches!(err, CoreError::ConfigMissingField { .. }));
    }

    #[test]
    fn test_rejects_out_of_range_limit() {
        let err = SonetteConfig::from_toml_str("[search]\nlimit = 500\n").unwrap_err();
        assert!(matches!(err, CoreError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_rejects_zero_debounce() {
        let err = SonetteConfig::from_toml_str("[search]\ndebounce_ms = 0\n").unwrap_err();
        assert!(matches!(err, CoreError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_rejects_bad_country() {
        let err = SonetteConfig::from_toml_str("[catalog]\ncountry = \"USA\"\n").unwrap_err();
        assert!(matches!(err, CoreError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_unknown_key_code_is_parse_error() {
        let err = SonetteConfig::from_toml_str("[keys]\nnext = [\"F13\"]\n").unwrap_err();
        assert!(matches!(err, CoreError::ConfigParseError(_)));
    }

    #[test]
    fn test_load_or_create_writes_template() {
        let dir = std::env::temp_dir().join(format!("sonette-config-test-{}", std::process::id()));
        let path = dir.join("config.toml");
        let _ = fs::remove_file(&path);

        let config = SonetteConfig::load_or_create_at(&path).unwrap();
        assert_eq!(config, SonetteConfig::default());
        assert!(path.exists());

        // Second load reads the written template back
        let reloaded = SonetteConfig::load_or_create_at(&path).unwrap();
        assert_eq!(reloaded, config);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = std::env::temp_dir().join("sonette-definitely-missing/config.toml");
        let err = SonetteConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, CoreError::ConfigNotFound { .. }));
    }
}
