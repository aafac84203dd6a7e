//! Simulated media element that plays every preview as silence on a timer.

use async_trait::async_trait;
use sonette_core::{MediaElement, MediaError, MediaEvent, MediaEventSink};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

const LOG_TARGET: &str = "sonette::clock";

/// Length of a catalog preview clip
pub const PREVIEW_LENGTH_SECS: f64 = 30.0;

/// How often position updates are reported while playing
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Playback position shared with the ticker task, stored as `f64` bits
#[derive(Debug, Default)]
struct Position(AtomicU64);

impl Position {
    fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn set(&self, secs: f64) {
        self.0.store(secs.to_bits(), Ordering::Relaxed);
    }
}

/// Media element driven by the tokio clock.
///
/// Reports the preview length as soon as a source is bound, ticks the
/// position forward while playing and reports the end once it runs out.
#[derive(Debug)]
pub struct ClockMedia {
    sink: Option<MediaEventSink>,
    source: Option<String>,
    length_secs: f64,
    position: Arc<Position>,
    ticker: Option<JoinHandle<()>>,
}

impl Default for ClockMedia {
    fn default() -> Self {
        Self::new(PREVIEW_LENGTH_SECS)
    }
}

impl ClockMedia {
    #[must_use]
    pub fn new(length_secs: f64) -> Self {
        Self {
            sink: None,
            source: None,
            length_secs,
            position: Arc::default(),
            ticker: None,
        }
    }

    fn emit(&self, event: MediaEvent) {
        if let Some(sink) = &self.sink {
            sink.emit(event);
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    fn start_ticker(&mut self) {
        self.stop_ticker();
        let Some(sink) = self.sink.clone() else {
            return;
        };
        let position = Arc::clone(&self.position);
        let length = self.length_secs;

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            // First tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let now = (position.get() + TICK_INTERVAL.as_secs_f64()).min(length);
                position.set(now);
                if !sink.emit(MediaEvent::PositionChanged { position_secs: now }) {
                    break;
                }
                if now >= length {
                    sink.emit(MediaEvent::Ended);
                    break;
                }
            }
        }));
    }
}

impl Drop for ClockMedia {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

#[async_trait]
impl MediaElement for ClockMedia {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn bind(&mut self, sink: MediaEventSink) {
        self.sink = Some(sink);
    }

    fn set_source(&mut self, url: Option<&str>) {
        self.stop_ticker();
        self.position.set(0.0);
        self.source = url.map(String::from);
        if self.source.is_some() {
            self.emit(MediaEvent::MetadataReady {
                duration_secs: self.length_secs,
            });
        }
    }

    async fn play(&mut self) -> Result<(), MediaError> {
        let Some(source) = &self.source else {
            return Err(MediaError::NoSource);
        };
        if !source.starts_with("http://") && !source.starts_with("https://") {
            return Err(MediaError::Unsupported {
                reason: format!("not a web URL: {source}"),
            });
        }

        // Playing a finished clip starts it over
        if self.position.get() >= self.length_secs {
            self.position.set(0.0);
        }
        debug!(target: LOG_TARGET, "Ticking {} from {:.2}s", source, self.position.get());
        self.start_ticker();
        Ok(())
    }

    fn pause(&mut self) {
        self.stop_ticker();
    }

    fn set_position(&mut self, position_secs: f64) {
        self.position.set(position_secs.clamp(0.0, self.length_secs));
    }
}
