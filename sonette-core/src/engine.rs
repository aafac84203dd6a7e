use crate::error::MediaError;
use crate::media::{MediaElement, MediaEvent, MediaEventSink};
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "sonette::engine";

/// Notifications the engine passes on after filtering raw media events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineNotification {
    /// Position moved
    PositionChanged { position_secs: f64 },
    /// Duration of the loaded source is now known
    MetadataReady { duration_secs: f64 },
    /// The loaded source finished on its own
    Ended,
}

/// Wraps one [`MediaElement`] and tracks what it is doing.
///
/// The engine is the only writer of the playback position outside of a
/// seek drag. Every `load` and `unload` starts a new generation and binds
/// a sink stamped with it. Raw media events go through
/// [`handle_media_event`], which drops events from older generations and
/// makes sure `Ended` is reported at most once per load.
///
/// [`handle_media_event`]: PlaybackEngine::handle_media_event
pub struct PlaybackEngine {
    media: Box<dyn MediaElement>,
    sink: MediaEventSink,
    generation: u64,
    source: Option<String>,
    playing: bool,
    position_secs: f64,
    duration_secs: f64,
    ended_reported: bool,
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("media", &self.media.name())
            .field("generation", &self.generation)
            .field("source", &self.source)
            .field("playing", &self.playing)
            .field("position_secs", &self.position_secs)
            .field("duration_secs", &self.duration_secs)
            .finish_non_exhaustive()
    }
}

impl PlaybackEngine {
    /// Wrap a media element and bind it to `sink`
    #[must_use]
    pub fn new(mut media: Box<dyn MediaElement>, sink: MediaEventSink) -> Self {
        media.bind(sink.clone());
        Self {
            media,
            generation: sink.generation(),
            sink,
            source: None,
            playing: false,
            position_secs: 0.0,
            duration_secs: 0.0,
            ended_reported: false,
        }
    }

    /// Bind a new source without starting playback
    pub fn load(&mut self, url: &str) {
        debug!(target: LOG_TARGET, "Loading source {}", url);
        self.media.pause();
        self.next_generation();
        self.media.set_source(Some(url));
        self.source = Some(url.to_string());
        self.reset_progress();
    }

    /// Detach the current source
    pub fn unload(&mut self) {
        if self.source.take().is_some() {
            debug!(target: LOG_TARGET, "Unloading source");
        }
        self.media.pause();
        self.next_generation();
        self.media.set_source(None);
        self.reset_progress();
    }

    /// Request playback. Returns whether playback actually started.
    ///
    /// Refusals are logged and swallowed; the engine then reports not playing.
    pub async fn play(&mut self) -> bool {
        if self.source.is_none() {
            debug!(target: LOG_TARGET, "Ignoring play with no source loaded");
            self.playing = false;
            return false;
        }

        match self.media.play().await {
            Ok(()) => {
                self.playing = true;
                true
            }
            Err(MediaError::Blocked) => {
                info!(target: LOG_TARGET, "Playback start blocked by platform policy");
                self.playing = false;
                false
            }
            Err(e) => {
                warn!(target: LOG_TARGET, "Playback failed to start: {}", e);
                self.playing = false;
                false
            }
        }
    }

    /// Stop playback
    pub fn pause(&mut self) {
        self.media.pause();
        self.playing = false;
    }

    /// Seek to `position_secs`, clamped to the track.
    ///
    /// Does nothing until the duration is known. Returns the committed
    /// position on success.
    pub fn seek_to(&mut self, position_secs: f64) -> Option<f64> {
        if !self.has_duration() {
            debug!(target: LOG_TARGET, "Ignoring seek before duration is known");
            return None;
        }
        let target = if position_secs.is_nan() {
            0.0
        } else {
            position_secs.clamp(0.0, self.duration_secs)
        };
        self.media.set_position(target);
        self.position_secs = target;
        Some(target)
    }

    /// Filter a raw media event into an engine notification.
    ///
    /// `generation` is the stamp of the sink that reported the event.
    pub fn handle_media_event(
        &mut self,
        generation: u64,
        event: MediaEvent,
    ) -> Option<EngineNotification> {
        if generation != self.generation {
            debug!(
                target: LOG_TARGET,
                "Dropping {:?} from load {} (current {})", event, generation, self.generation
            );
            return None;
        }
        if self.source.is_none() {
            debug!(target: LOG_TARGET, "Dropping {:?} with no source loaded", event);
            return None;
        }

        match event {
            MediaEvent::PositionChanged { position_secs } => {
                if !position_secs.is_finite() {
                    return None;
                }
                self.position_secs = position_secs.max(0.0);
                Some(EngineNotification::PositionChanged {
                    position_secs: self.position_secs,
                })
            }
            MediaEvent::MetadataReady { duration_secs } => {
                if !duration_secs.is_finite() || duration_secs <= 0.0 {
                    debug!(target: LOG_TARGET, "Ignoring unusable duration {}", duration_secs);
                    return None;
                }
                self.duration_secs = duration_secs;
                Some(EngineNotification::MetadataReady { duration_secs })
            }
            MediaEvent::Ended => {
                if !self.playing || self.ended_reported {
                    debug!(target: LOG_TARGET, "Dropping end of playback while not playing");
                    return None;
                }
                self.playing = false;
                self.ended_reported = true;
                Some(EngineNotification::Ended)
            }
        }
    }

    /// Stamp of the sink bound for the current source
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub const fn position_secs(&self) -> f64 {
        self.position_secs
    }

    #[must_use]
    pub const fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Whether the bound source reported a usable duration
    #[must_use]
    pub fn has_duration(&self) -> bool {
        self.duration_secs > 0.0
    }

    fn next_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.media.bind(self.sink.for_generation(self.generation));
    }

    fn reset_progress(&mut self) {
        self.playing = false;
        self.position_secs = 0.0;
        self.duration_secs = 0.0;
        self.ended_reported = false;
    }
}
