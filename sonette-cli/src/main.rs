mod clock;
mod commands;
mod render;

use crate::clock::ClockMedia;
use crate::commands::{Command, HELP, SEEK_BAR_WIDTH};
use sonette_catalog_itunes::ItunesProvider;
use sonette_core::config::CatalogProviderType;
use sonette_core::{
    CatalogProvider, CoreError, PlayerController, PlayerEvent, PlayerInput, SeekBar,
    SonetteConfig, TomlParseError, CONFIG_PATH_ENV,
};
use std::fs::File;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    // Check config for logging.enabled before full config load
    let file_logging_enabled = check_file_logging_enabled();
    init_tracing(file_logging_enabled);

    let config = match load_config() {
        Ok(config) => config,
        Err(CoreError::ConfigParseError(parse_error)) => {
            report_config_syntax_error(&parse_error);
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let catalog = match create_catalog(&config) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to create catalog provider: {e}");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    // Shared cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    runtime.block_on(run_player(config, catalog, cancel_token));

    // The stdin reader may still be blocked on a read
    runtime.shutdown_background();
}

/// Load the config, creating a template on first run.
///
/// An explicit `SONETTE_CONFIG` path must already exist.
fn load_config() -> Result<SonetteConfig, CoreError> {
    if std::env::var_os(CONFIG_PATH_ENV).is_some() {
        SonetteConfig::load_from(&SonetteConfig::config_path())
    } else {
        SonetteConfig::load_or_create()
    }
}

/// Log a config syntax error, pointing at the offending line when known
fn report_config_syntax_error(parse_error: &TomlParseError) {
    let path = SonetteConfig::config_path();
    let line = std::fs::read_to_string(&path)
        .ok()
        .and_then(|content| error_line(&content, parse_error));

    match line {
        Some(line) => error!(
            "Config file {} has a syntax error on line {line}: {}",
            path.display(),
            parse_error.message()
        ),
        None => error!(
            "Config file {} has a syntax error: {parse_error}",
            path.display()
        ),
    }
}

/// One-based line of `content` where parsing failed
fn error_line(content: &str, parse_error: &TomlParseError) -> Option<usize> {
    let span = parse_error.span()?;
    content
        .get(..span.start)
        .map(|prefix| prefix.matches('\n').count() + 1)
}

fn create_catalog(config: &SonetteConfig) -> Result<Arc<dyn CatalogProvider>, CoreError> {
    match config.catalog.provider {
        CatalogProviderType::Itunes => {
            info!("Initializing iTunes catalog provider");
            let provider = ItunesProvider::new(&config.catalog, config.search.limit)?;
            Ok(Arc::new(provider))
        }
    }
}

async fn run_player(
    config: SonetteConfig,
    catalog: Arc<dyn CatalogProvider>,
    cancel_token: CancellationToken,
) {
    let mut controller = PlayerController::new(&config, catalog, Box::new(ClockMedia::default()));
    controller.set_seek_bar(SeekBar::new(0.0, SEEK_BAR_WIDTH));

    tokio::spawn(log_player_events(controller.subscribe()));

    let (line_tx, mut line_rx) = mpsc::unbounded_channel();
    tokio::spawn(read_lines(line_tx));

    println!("{HELP}");
    controller.start();

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            line = line_rx.recv() => {
                let Some(line) = line else {
                    info!("Input closed, shutting down");
                    break;
                };
                if !execute(&mut controller, &line).await {
                    break;
                }
            }
            input = controller.next_input() => {
                let Some(input) = input else {
                    break;
                };
                controller.handle(input).await;
            }
        }
    }

    cancel_token.cancel();
    controller.shutdown();
}

/// Run one prompt line. Returns `false` when the user asked to quit.
async fn execute(controller: &mut PlayerController, line: &str) -> bool {
    match commands::parse(line) {
        Ok(Command::Input(input)) => controller.handle(PlayerInput::User(input)).await,
        Ok(Command::List) => print!("{}", render::track_list(&controller.track_rows())),
        Ok(Command::Status) => println!("{}", render::status_line(controller.display())),
        Ok(Command::Help) => println!("{HELP}"),
        Ok(Command::Quit) => return false,
        Err(e) => println!("{e}"),
    }
    true
}

async fn read_lines(tx: mpsc::UnboundedSender<String>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read input: {}", e);
                break;
            }
        }
    }
}

/// Log player events to the console
async fn log_player_events(mut rx: broadcast::Receiver<PlayerEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match &event {
                PlayerEvent::SearchIssued { ticket, query } => {
                    info!("Searching for {:?} ({})", query, ticket);
                }
                PlayerEvent::SearchCompleted { query, count } => {
                    info!("{} playable tracks for {:?}", count, query);
                }
                PlayerEvent::SearchFailed { query, message } => {
                    error!("Search for {:?} failed: {}", query, message);
                }
                PlayerEvent::SearchDiscarded { ticket } => {
                    info!("Dropped late response for search {}", ticket);
                }
                PlayerEvent::TrackLoaded { index, track, .. } => {
                    info!("Loaded {}. {} - {}", index + 1, track.artist, track.title);
                }
                PlayerEvent::PlayStateChanged { playing } => {
                    info!("{}", if *playing { "Playing" } else { "Paused" });
                }
                PlayerEvent::PlaybackRejected => {
                    warn!("Playback did not start");
                }
                PlayerEvent::Seeked { position_secs } => {
                    info!("Seek to {:.1}s", position_secs);
                }
                PlayerEvent::TrackEnded { index } => {
                    info!("Track {} ended", index + 1);
                }
                PlayerEvent::Cleared { indicator } => {
                    info!("{}", indicator);
                }
            },
            Err(broadcast::error::RecvError::Closed) => {
                info!("Player event channel closed");
                break;
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                info!("Missed {} player events", n);
            }
        }
    }
}

/// Check if file logging is enabled by reading the config file.
/// This is done before full config loading to set up tracing first.
/// Returns `false` if config doesn't exist or can't be parsed.
fn check_file_logging_enabled() -> bool {
    #[derive(serde::Deserialize)]
    struct PartialConfig {
        #[serde(default)]
        logging: PartialLoggingConfig,
    }
    #[derive(serde::Deserialize, Default)]
    struct PartialLoggingConfig {
        #[serde(default)]
        enabled: bool,
    }

    let Ok(content) = std::fs::read_to_string(SonetteConfig::config_path()) else {
        return false;
    };

    toml::from_str::<PartialConfig>(&content)
        .map(|c| c.logging.enabled)
        .unwrap_or(false)
}

/// Initialize tracing on stderr with optional file logging
fn init_tracing(file_logging_enabled: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest_retry=warn"));

    // stdout belongs to the prompt
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if file_logging_enabled {
        let log_path = sonette_core::log_file_path();

        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
