//! The player: owns the track list and playback state and applies the
//! orchestration policy to every input.

use crate::catalog::{CatalogEntry, CatalogProvider};
use crate::config::SonetteConfig;
use crate::display::{DisplayState, Indicator, TrackRow};
use crate::engine::{EngineNotification, PlaybackEngine};
use crate::error::CoreError;
use crate::input::{Action, InputMap, UserInput};
use crate::media::{MediaElement, MediaEvent, MediaEventSink};
use crate::search::{normalize_query, SearchDebouncer, SearchOutcome, SearchSequencer, SearchTicket};
use crate::seek::{SeekBar, SeekController, SeekState};
use crate::track::{tracks_from_catalog, Track};
use crate::track_list::TrackList;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "sonette::controller";

/// Capacity of the observer event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Everything the player loop reacts to, handled strictly one at a time
#[derive(Debug)]
pub enum PlayerInput {
    /// Button, pointer, keyboard or search box input
    User(UserInput),
    /// Report from the media element, stamped with the load it belongs to
    Media { generation: u64, event: MediaEvent },
    /// The search debouncer settled on a query
    SearchRequested(String),
    /// A catalog search issued from the loop finished
    SearchCompleted {
        ticket: SearchTicket,
        query: String,
        result: Result<Vec<CatalogEntry>, CoreError>,
    },
}

/// Notifications for observers such as renderers and animations.
///
/// The player never depends on anyone listening.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// A catalog search was sent
    SearchIssued { ticket: SearchTicket, query: String },
    /// A search replaced the track list
    SearchCompleted { query: String, count: usize },
    /// The catalog failed
    SearchFailed { query: String, message: String },
    /// A response arrived for a search that was already superseded
    SearchDiscarded { ticket: SearchTicket },
    /// A track was loaded into the media element
    TrackLoaded {
        index: usize,
        track: Track,
        autoplay: bool,
    },
    /// The play/pause indicator changed
    PlayStateChanged { playing: bool },
    /// The media element refused to start playback
    PlaybackRejected,
    /// Playback position was moved by the user
    Seeked { position_secs: f64 },
    /// The current track played to its end
    TrackEnded { index: usize },
    /// The player was reset to idle
    Cleared { indicator: Indicator },
}

/// Playback state owned by the player
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackState {
    /// Index into the track list; `None` exactly when the list is empty
    pub current_index: Option<usize>,
    pub is_playing: bool,
    pub position_secs: f64,
    /// Duration reported by the media element; 0 until known
    pub duration_secs: f64,
    pub is_seeking: bool,
}

/// Search-driven player over one media element.
///
/// Inputs arrive through the inbox (see [`inbox`](Self::inbox)) and are
/// handled to completion one at a time by [`step`](Self::step) or
/// [`run`](Self::run). Media elements report into the same inbox, so
/// position updates, track ends and search responses interleave with user
/// input in arrival order.
pub struct PlayerController {
    catalog: Arc<dyn CatalogProvider>,
    engine: PlaybackEngine,
    tracks: TrackList,
    state: PlaybackState,
    seek: SeekController,
    seek_bar: SeekBar,
    bindings: InputMap,
    searches: SearchSequencer,
    debouncer: SearchDebouncer,
    display: DisplayState,
    artwork_size: u32,
    event_tx: broadcast::Sender<PlayerEvent>,
    inbox_tx: mpsc::UnboundedSender<PlayerInput>,
    inbox_rx: mpsc::UnboundedReceiver<PlayerInput>,
}

impl PlayerController {
    /// Create an idle player. Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(
        config: &SonetteConfig,
        catalog: Arc<dyn CatalogProvider>,
        media: Box<dyn MediaElement>,
    ) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        info!(
            target: LOG_TARGET,
            "Player using catalog {} and media element {}",
            catalog.name(),
            media.name()
        );

        let search_tx = inbox_tx.clone();
        let debouncer = SearchDebouncer::new(
            config.search.debounce(),
            config.search.default_query.clone(),
            move |query| {
                let _ = search_tx.send(PlayerInput::SearchRequested(query));
            },
        );

        Self {
            catalog,
            engine: PlaybackEngine::new(media, MediaEventSink::new(inbox_tx.clone())),
            tracks: TrackList::new(),
            state: PlaybackState::default(),
            seek: SeekController::new(),
            seek_bar: SeekBar::default(),
            bindings: InputMap::from_keys(&config.keys),
            searches: SearchSequencer::new(),
            debouncer,
            display: DisplayState::default(),
            artwork_size: config.artwork.size,
            event_tx,
            inbox_tx,
            inbox_rx,
        }
    }

    /// Subscribe to player events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_tx.subscribe()
    }

    /// Sender for feeding inputs into the player loop
    #[must_use]
    pub fn inbox(&self) -> mpsc::UnboundedSender<PlayerInput> {
        self.inbox_tx.clone()
    }

    /// Set the seek bar bounds used to turn pointer x into a fraction
    pub fn set_seek_bar(&mut self, bar: SeekBar) {
        self.seek_bar = bar;
    }

    #[must_use]
    pub const fn state(&self) -> &PlaybackState {
        &self.state
    }

    #[must_use]
    pub const fn display(&self) -> &DisplayState {
        &self.display
    }

    #[must_use]
    pub const fn tracks(&self) -> &TrackList {
        &self.tracks
    }

    #[must_use]
    pub const fn seek_state(&self) -> SeekState {
        self.seek.state()
    }

    /// The loaded track, if any
    #[must_use]
    pub fn current_track(&self) -> Option<&Track> {
        self.state.current_index.and_then(|i| self.tracks.get(i))
    }

    /// One row per listed track, flagging the current one
    #[must_use]
    pub fn track_rows(&self) -> Vec<TrackRow> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(index, track)| TrackRow {
                index,
                title: track.title.clone(),
                artist: track.artist.clone(),
                cover_url: track.cover_url.clone(),
                is_current: self.state.current_index == Some(index),
            })
            .collect()
    }

    /// Issue the startup search for the default query
    pub fn start(&mut self) -> SearchTicket {
        let query = self.debouncer.default_query().to_string();
        self.dispatch_search(query)
    }

    /// Handle inputs until `cancel` fires.
    ///
    /// An input that has started being handled always runs to completion.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(target: LOG_TARGET, "Player loop started");
        loop {
            let input = tokio::select! {
                () = cancel.cancelled() => {
                    info!(target: LOG_TARGET, "Player loop shutting down");
                    break;
                }
                input = self.next_input() => input,
            };
            let Some(input) = input else {
                break;
            };
            self.handle(input).await;
        }
        self.shutdown();
    }

    /// Drop any scheduled search and stop playback
    pub fn shutdown(&mut self) {
        self.debouncer.cancel();
        self.engine.pause();
        self.set_playing(false);
    }

    /// Wait for the next input without handling it.
    ///
    /// Cancel safe, so front ends can race it against their own sources
    /// in `select!` and call [`handle`](Self::handle) with the result.
    pub async fn next_input(&mut self) -> Option<PlayerInput> {
        self.inbox_rx.recv().await
    }

    /// Wait for the next input and handle it. Returns `false` if the inbox closed.
    pub async fn step(&mut self) -> bool {
        match self.next_input().await {
            Some(input) => {
                self.handle(input).await;
                true
            }
            None => false,
        }
    }

    /// Handle one input to completion
    pub async fn handle(&mut self, input: PlayerInput) {
        match input {
            PlayerInput::User(input) => self.handle_user(input).await,
            PlayerInput::Media { generation, event } => {
                self.handle_media(generation, event).await;
            }
            PlayerInput::SearchRequested(query) => {
                self.dispatch_search(query);
            }
            PlayerInput::SearchCompleted {
                ticket,
                query,
                result,
            } => {
                self.apply_search(ticket, query, result).await;
            }
        }
    }

    /// Search inline and apply the response.
    ///
    /// Empty queries fall back to the default query.
    pub async fn search(&mut self, query: &str) -> SearchOutcome {
        let query = normalize_query(query, self.debouncer.default_query());
        let ticket = self.issue_search(&query);
        let result = self.catalog.search(&query).await;
        self.apply_search(ticket, query, result).await
    }

    /// Play or pause. Does nothing when no track is loaded.
    pub async fn toggle_play(&mut self) {
        if !self.engine.has_source() {
            debug!(target: LOG_TARGET, "Toggle ignored, no track loaded");
            return;
        }

        if self.state.is_playing {
            self.engine.pause();
            self.set_playing(false);
        } else {
            let playing = self.engine.play().await;
            if !playing {
                self.emit(PlayerEvent::PlaybackRejected);
            }
            self.set_playing(playing);
        }
    }

    /// Play the next track, wrapping to the first
    pub async fn next(&mut self) {
        let target = self
            .state
            .current_index
            .and_then(|current| self.tracks.next(current));
        if let Some(index) = target {
            self.load_track(index, true).await;
        }
    }

    /// Play the previous track, wrapping to the last
    pub async fn previous(&mut self) {
        let target = self
            .state
            .current_index
            .and_then(|current| self.tracks.previous(current));
        if let Some(index) = target {
            self.load_track(index, true).await;
        }
    }

    /// Play the track at `index`. Out-of-range indices are ignored.
    pub async fn select(&mut self, index: usize) {
        if index >= self.tracks.len() {
            warn!(
                target: LOG_TARGET,
                "Ignoring selection of track {} in a list of {}",
                index,
                self.tracks.len()
            );
            return;
        }
        self.load_track(index, true).await;
    }

    async fn handle_user(&mut self, input: UserInput) {
        let Some(action) = self.bindings.action_for(input.source()) else {
            debug!(target: LOG_TARGET, "No action bound for {:?}", input);
            return;
        };

        match (action, input) {
            (Action::TogglePlay, _) => self.toggle_play().await,
            (Action::Previous, _) => self.previous().await,
            (Action::Next, _) => self.next().await,
            (Action::SelectTrack, UserInput::TrackListItem(index)) => self.select(index).await,
            (Action::QueueSearch, UserInput::SearchText(text)) => self.debouncer.input(&text),
            (Action::SeekToClick, UserInput::SeekBarClick { x }) => {
                let fraction = self.seek_bar.fraction_at(x);
                self.commit_seek(fraction);
            }
            (Action::BeginDrag, UserInput::SeekHandleDown { x }) => {
                if !self.engine.has_source() {
                    debug!(target: LOG_TARGET, "Ignoring seek handle with no track loaded");
                    return;
                }
                let fraction = self.seek.begin(&self.seek_bar, x);
                self.state.is_seeking = true;
                self.display.progress = fraction;
            }
            (Action::Drag, UserInput::PointerMove { x }) => {
                if let Some(fraction) = self.seek.drag(&self.seek_bar, x) {
                    self.display.progress = fraction;
                }
            }
            (Action::EndDrag, UserInput::PointerUp) => {
                if let Some(fraction) = self.seek.release() {
                    self.state.is_seeking = false;
                    self.commit_seek(fraction);
                }
            }
            (action, input) => {
                debug!(target: LOG_TARGET, "Action {:?} cannot use input {:?}", action, input);
            }
        }
    }

    async fn handle_media(&mut self, generation: u64, event: MediaEvent) {
        let Some(notification) = self.engine.handle_media_event(generation, event) else {
            return;
        };

        match notification {
            EngineNotification::PositionChanged { position_secs } => {
                // The drag owns the bar until release
                if self.seek.is_dragging() {
                    return;
                }
                self.state.position_secs = position_secs;
                self.display
                    .show_position(position_secs, self.state.duration_secs);
            }
            EngineNotification::MetadataReady { duration_secs } => {
                debug!(target: LOG_TARGET, "Duration known: {:.1}s", duration_secs);
                self.state.duration_secs = duration_secs;
                self.display.show_duration(duration_secs);
                if !self.seek.is_dragging() {
                    self.display
                        .show_position(self.state.position_secs, duration_secs);
                }
            }
            EngineNotification::Ended => {
                if let Some(index) = self.state.current_index {
                    info!(target: LOG_TARGET, "Track {} ended, advancing", index);
                    self.emit(PlayerEvent::TrackEnded { index });
                }
                self.set_playing(false);
                self.next().await;
            }
        }
    }

    fn issue_search(&mut self, query: &str) -> SearchTicket {
        let ticket = self.searches.issue();
        info!(target: LOG_TARGET, "Searching catalog for {:?} ({})", query, ticket);
        self.emit(PlayerEvent::SearchIssued {
            ticket,
            query: query.to_string(),
        });
        ticket
    }

    /// Run a catalog search in the background; the response comes back
    /// through the inbox
    fn dispatch_search(&mut self, query: String) -> SearchTicket {
        let ticket = self.issue_search(&query);
        let catalog = Arc::clone(&self.catalog);
        let inbox = self.inbox_tx.clone();
        tokio::spawn(async move {
            let result = catalog.search(&query).await;
            let _ = inbox.send(PlayerInput::SearchCompleted {
                ticket,
                query,
                result,
            });
        });
        ticket
    }

    async fn apply_search(
        &mut self,
        ticket: SearchTicket,
        query: String,
        result: Result<Vec<CatalogEntry>, CoreError>,
    ) -> SearchOutcome {
        if !self.searches.is_current(ticket) {
            info!(
                target: LOG_TARGET,
                "Discarding response to superseded search {} for {:?}", ticket, query
            );
            self.emit(PlayerEvent::SearchDiscarded { ticket });
            return SearchOutcome::Superseded;
        }

        match result {
            Ok(entries) => {
                let received = entries.len();
                let tracks = tracks_from_catalog(entries, self.artwork_size);
                let count = tracks.len();
                info!(
                    target: LOG_TARGET,
                    "Search {:?} returned {} results, {} playable", query, received, count
                );

                if let Some(first) = self.tracks.replace(tracks) {
                    self.state = PlaybackState::default();
                    self.load_track(first, false).await;
                    self.emit(PlayerEvent::SearchCompleted { query, count });
                    SearchOutcome::Loaded { count }
                } else {
                    self.clear(Indicator::NoResults {
                        query: query.clone(),
                    });
                    self.emit(PlayerEvent::SearchCompleted { query, count: 0 });
                    SearchOutcome::NoResults
                }
            }
            Err(e) => {
                warn!(target: LOG_TARGET, "Search {:?} failed: {}", query, e);
                self.tracks.clear();
                self.clear(Indicator::SearchFailed);
                self.emit(PlayerEvent::SearchFailed {
                    query,
                    message: e.to_string(),
                });
                SearchOutcome::Failed
            }
        }
    }

    async fn load_track(&mut self, index: usize, autoplay: bool) {
        let Some(track) = self.tracks.get(index).cloned() else {
            warn!(target: LOG_TARGET, "No track at index {}", index);
            return;
        };

        // A drag in progress belonged to the previous track
        self.seek.cancel();
        self.state.is_seeking = false;
        self.state.current_index = Some(index);
        self.state.position_secs = 0.0;
        self.state.duration_secs = 0.0;

        self.engine.load(&track.preview_url);
        self.display.show_track(&track);
        info!(
            target: LOG_TARGET,
            "Loaded track {}: {} - {} (autoplay: {})", index, track.artist, track.title, autoplay
        );
        self.emit(PlayerEvent::TrackLoaded {
            index,
            track,
            autoplay,
        });

        if autoplay {
            let playing = self.engine.play().await;
            if !playing {
                self.emit(PlayerEvent::PlaybackRejected);
            }
            self.set_playing(playing);
        } else {
            self.set_playing(false);
        }
    }

    /// Seek to `fraction` of the track, if its duration is known
    fn commit_seek(&mut self, fraction: f64) {
        let duration = self.engine.duration_secs();
        let Some(position) = self.engine.seek_to(fraction * duration) else {
            debug!(target: LOG_TARGET, "Seek discarded, duration unknown");
            return;
        };
        self.state.position_secs = position;
        self.display.show_position(position, duration);
        self.emit(PlayerEvent::Seeked {
            position_secs: position,
        });
    }

    /// Reset to idle with `indicator` in place of a track
    fn clear(&mut self, indicator: Indicator) {
        self.engine.unload();
        self.seek.cancel();
        self.state = PlaybackState::default();
        self.display = DisplayState::cleared(Some(indicator.clone()));
        self.emit(PlayerEvent::Cleared { indicator });
    }

    fn set_playing(&mut self, playing: bool) {
        self.state.is_playing = playing;
        self.display.is_playing = playing;
        self.emit(PlayerEvent::PlayStateChanged { playing });
    }

    fn emit(&self, event: PlayerEvent) {
        let _ = self.event_tx.send(event);
    }
}
