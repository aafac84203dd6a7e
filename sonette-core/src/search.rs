//! Search input handling: query normalization, debouncing and request tickets.

use crate::debounce::Debouncer;
use std::time::Duration;
use tracing::debug;

const LOG_TARGET: &str = "sonette::search";

/// Query used at startup and whenever the search box is cleared
pub const DEFAULT_QUERY: &str = "lofi";

/// Default quiet window before a typed query is sent
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// Trim `input`, falling back to `default_query` when nothing is left.
///
/// The catalog never sees an empty search.
#[must_use]
pub fn normalize_query(input: &str, default_query: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        default_query.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Identifies one issued search
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTicket(u64);

impl std::fmt::Display for SearchTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out increasing tickets and remembers the latest one.
///
/// Only the response to the latest ticket may change player state; anything
/// older has been superseded by a newer search.
#[derive(Debug, Default)]
pub struct SearchSequencer {
    latest: u64,
}

impl SearchSequencer {
    #[must_use]
    pub const fn new() -> Self {
        Self { latest: 0 }
    }

    /// Issue a ticket newer than every ticket issued before
    pub fn issue(&mut self) -> SearchTicket {
        self.latest += 1;
        SearchTicket(self.latest)
    }

    /// Whether `ticket` belongs to the most recent search
    #[must_use]
    pub const fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.latest
    }
}

/// What applying a search response did to the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Tracks were replaced; `count` usable tracks are listed
    Loaded { count: usize },
    /// The search succeeded but nothing playable came back
    NoResults,
    /// The catalog failed
    Failed,
    /// A newer search was issued in the meantime; the response was dropped
    Superseded,
}

/// Debounces search box input and normalizes the query before dispatch
#[derive(Debug)]
pub struct SearchDebouncer {
    inner: Debouncer<String>,
    default_query: String,
}

impl SearchDebouncer {
    /// `dispatch` receives the normalized query once typing pauses for `window`
    #[must_use]
    pub fn new(
        window: Duration,
        default_query: impl Into<String>,
        dispatch: impl Fn(String) + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Debouncer::new(window, dispatch),
            default_query: default_query.into(),
        }
    }

    /// Feed the current contents of the search box
    pub fn input(&mut self, text: &str) {
        let query = normalize_query(text, &self.default_query);
        debug!(target: LOG_TARGET, "Search input {:?} scheduled as {:?}", text, query);
        self.inner.call(query);
    }

    /// Drop a scheduled search
    pub fn cancel(&mut self) {
        self.inner.cancel();
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.is_pending()
    }

    #[must_use]
    pub fn default_query(&self) -> &str {
        &self.default_query
    }
}
