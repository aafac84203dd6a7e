//! Media playback capability and the events it reports.

use crate::controller::PlayerInput;
use crate::error::MediaError;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Raw notifications from a media element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    /// Playback position moved (fires often while playing)
    PositionChanged { position_secs: f64 },
    /// Duration of the bound source became known
    MetadataReady { duration_secs: f64 },
    /// The bound source played through to its end
    Ended,
}

/// Channel a media element uses to report [`MediaEvent`]s to the player.
///
/// Events land in the player's inbox in the order they were emitted. Each
/// sink is stamped with the load generation of one source, and the player
/// drops events whose stamp is no longer current. Tasks that outlive a
/// source can keep their sink; whatever they report afterwards is ignored.
#[derive(Debug, Clone)]
pub struct MediaEventSink {
    tx: mpsc::UnboundedSender<PlayerInput>,
    generation: u64,
}

impl MediaEventSink {
    pub(crate) const fn new(tx: mpsc::UnboundedSender<PlayerInput>) -> Self {
        Self { tx, generation: 0 }
    }

    /// Same channel, stamped for another load
    pub(crate) fn for_generation(&self, generation: u64) -> Self {
        Self {
            tx: self.tx.clone(),
            generation,
        }
    }

    /// Load generation this sink reports for
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Report an event. Returns `false` once the player has shut down.
    pub fn emit(&self, event: MediaEvent) -> bool {
        self.tx
            .send(PlayerInput::Media {
                generation: self.generation,
                event,
            })
            .is_ok()
    }
}

/// A media element that can play one audio source at a time.
///
/// Implementations do the actual fetching, decoding and output. The player
/// only binds sources and issues transport requests, and learns about
/// progress through the [`MediaEventSink`] handed over in [`bind`].
///
/// A fresh sink is bound before every [`set_source`]. Events about a
/// source must go through the sink that was bound with it.
///
/// [`bind`]: MediaElement::bind
/// [`set_source`]: MediaElement::set_source
#[async_trait]
pub trait MediaElement: Send {
    /// Returns a human-readable name for this element.
    fn name(&self) -> &'static str;

    /// Attach the sink that receives events for the next source.
    fn bind(&mut self, sink: MediaEventSink);

    /// Bind a new source, or detach the current one with `None`.
    ///
    /// Must not start playback.
    fn set_source(&mut self, url: Option<&str>);

    /// Start playback of the bound source.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses playback or the source
    /// cannot be played.
    async fn play(&mut self) -> Result<(), MediaError>;

    /// Stop playback, keeping the position.
    fn pause(&mut self);

    /// Move the playback position.
    fn set_position(&mut self, position_secs: f64);
}
