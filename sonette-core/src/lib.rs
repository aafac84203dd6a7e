pub mod catalog;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod display;
pub mod engine;
pub mod error;
pub mod input;
pub mod media;
pub mod paths;
pub mod search;
pub mod seek;
pub mod time;
pub mod track;
pub mod track_list;

pub use catalog::{CatalogEntry, CatalogProvider};
pub use config::{
    ArtworkConfig, CatalogConfig, CatalogProviderType, KeysConfig, LoggingConfig, SearchConfig,
    SonetteConfig, MAX_SEARCH_LIMIT,
};
pub use controller::{PlaybackState, PlayerController, PlayerEvent, PlayerInput};
pub use debounce::Debouncer;
pub use display::{progress_fraction, DisplayState, Indicator, TrackRow};
pub use engine::{EngineNotification, PlaybackEngine};

pub use error::{CoreError, MediaError};
pub use input::{Action, InputMap, InputSource, KeyCode, UserInput};
pub use media::{MediaElement, MediaEvent, MediaEventSink};
pub use paths::{
    config_dir, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME, CONFIG_PATH_ENV, LOG_FILE_NAME,
};
pub use search::{
    normalize_query, SearchDebouncer, SearchOutcome, SearchSequencer, SearchTicket,
    DEFAULT_DEBOUNCE, DEFAULT_QUERY,
};
pub use seek::{SeekBar, SeekController, SeekState};
pub use time::{floor_secs, format_clock};
pub use track::{tracks_from_catalog, upscale_artwork, Track, DEFAULT_ARTWORK_SIZE};
pub use track_list::TrackList;

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
