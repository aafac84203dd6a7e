//! User input surface and the table that routes it to player actions.
//!
//! Every input the player understands has an [`InputSource`]. The
//! [`InputMap`] maps sources to [`Action`]s; it is plain data so callers and
//! tests can list exactly what is wired to what.

use crate::config::KeysConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keyboard keys that can be bound, named after DOM `KeyboardEvent.code`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Space,
    Enter,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    KeyJ,
    KeyK,
    KeyL,
    KeyN,
    KeyP,
    MediaPlayPause,
    MediaTrackNext,
    MediaTrackPrevious,
}

impl KeyCode {
    pub const ALL: [Self; 14] = [
        Self::Space,
        Self::Enter,
        Self::ArrowLeft,
        Self::ArrowRight,
        Self::ArrowUp,
        Self::ArrowDown,
        Self::KeyJ,
        Self::KeyK,
        Self::KeyL,
        Self::KeyN,
        Self::KeyP,
        Self::MediaPlayPause,
        Self::MediaTrackNext,
        Self::MediaTrackPrevious,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Space => "Space",
            Self::Enter => "Enter",
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowRight => "ArrowRight",
            Self::ArrowUp => "ArrowUp",
            Self::ArrowDown => "ArrowDown",
            Self::KeyJ => "KeyJ",
            Self::KeyK => "KeyK",
            Self::KeyL => "KeyL",
            Self::KeyN => "KeyN",
            Self::KeyP => "KeyP",
            Self::MediaPlayPause => "MediaPlayPause",
            Self::MediaTrackNext => "MediaTrackNext",
            Self::MediaTrackPrevious => "MediaTrackPrevious",
        }
    }

    /// Look up a key by its code name, case-insensitively
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user input with its payload.
///
/// Pointer coordinates are horizontal client positions, in the same units
/// as the [`SeekBar`](crate::SeekBar) bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
    PlayPauseButton,
    PreviousButton,
    NextButton,
    /// A track list entry was clicked
    TrackListItem(usize),
    /// The search box now contains this text
    SearchText(String),
    /// Click on the seek bar itself
    SeekBarClick { x: f64 },
    /// Pointer down on the seek handle
    SeekHandleDown { x: f64 },
    /// Pointer moved anywhere in the document
    PointerMove { x: f64 },
    /// Pointer released anywhere in the document
    PointerUp,
    KeyDown(KeyCode),
}

impl UserInput {
    /// Where this input came from, without its payload
    #[must_use]
    pub const fn source(&self) -> InputSource {
        match self {
            Self::PlayPauseButton => InputSource::PlayPauseButton,
            Self::PreviousButton => InputSource::PreviousButton,
            Self::NextButton => InputSource::NextButton,
            Self::TrackListItem(_) => InputSource::TrackListItem,
            Self::SearchText(_) => InputSource::SearchBox,
            Self::SeekBarClick { .. } => InputSource::SeekBar,
            Self::SeekHandleDown { .. } => InputSource::SeekHandle,
            Self::PointerMove { .. } => InputSource::DocumentPointerMove,
            Self::PointerUp => InputSource::DocumentPointerUp,
            Self::KeyDown(key) => InputSource::Key(*key),
        }
    }
}

/// Input sources, the keys of the [`InputMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InputSource {
    PlayPauseButton,
    PreviousButton,
    NextButton,
    TrackListItem,
    SearchBox,
    SeekBar,
    SeekHandle,
    DocumentPointerMove,
    DocumentPointerUp,
    Key(KeyCode),
}

/// Orchestration actions the player performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    TogglePlay,
    Previous,
    Next,
    SelectTrack,
    QueueSearch,
    SeekToClick,
    BeginDrag,
    Drag,
    EndDrag,
}

/// Routing table from input sources to actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMap {
    bindings: BTreeMap<InputSource, Action>,
}

impl Default for InputMap {
    fn default() -> Self {
        Self::from_keys(&KeysConfig::default())
    }
}

impl InputMap {
    /// Pointer, button and search wiring shared by every configuration
    pub const SURFACE_BINDINGS: [(InputSource, Action); 9] = [
        (InputSource::PlayPauseButton, Action::TogglePlay),
        (InputSource::PreviousButton, Action::Previous),
        (InputSource::NextButton, Action::Next),
        (InputSource::TrackListItem, Action::SelectTrack),
        (InputSource::SearchBox, Action::QueueSearch),
        (InputSource::SeekBar, Action::SeekToClick),
        (InputSource::SeekHandle, Action::BeginDrag),
        (InputSource::DocumentPointerMove, Action::Drag),
        (InputSource::DocumentPointerUp, Action::EndDrag),
    ];

    /// Build the table with keyboard rows taken from `keys`.
    ///
    /// A key listed under several actions keeps the last one, in the order
    /// toggle, previous, next.
    #[must_use]
    pub fn from_keys(keys: &KeysConfig) -> Self {
        let mut bindings: BTreeMap<_, _> = Self::SURFACE_BINDINGS.into_iter().collect();

        let key_rows = [
            (&keys.toggle_play, Action::TogglePlay),
            (&keys.previous, Action::Previous),
            (&keys.next, Action::Next),
        ];
        for (codes, action) in key_rows {
            for code in codes {
                bindings.insert(InputSource::Key(*code), action);
            }
        }

        Self { bindings }
    }

    /// Action bound to `source`, if any
    #[must_use]
    pub fn action_for(&self, source: InputSource) -> Option<Action> {
        self.bindings.get(&source).copied()
    }

    /// Every binding in source order
    pub fn bindings(&self) -> impl Iterator<Item = (InputSource, Action)> + '_ {
        self.bindings.iter().map(|(source, action)| (*source, *action))
    }

    /// Keys bound to `action`
    #[must_use]
    pub fn keys_for(&self, action: Action) -> Vec<KeyCode> {
        self.bindings()
            .filter_map(|(source, bound)| match source {
                InputSource::Key(key) if bound == action => Some(key),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keyboard_bindings() {
        let map = InputMap::default();

        assert_eq!(map.action_for(InputSource::Key(KeyCode::Space)), Some(Action::TogglePlay));
        assert_eq!(map.action_for(InputSource::Key(KeyCode::ArrowLeft)), Some(Action::Previous));
        assert_eq!(map.action_for(InputSource::Key(KeyCode::ArrowRight)), Some(Action::Next));
        assert_eq!(map.action_for(InputSource::Key(KeyCode::KeyK)), None);
    }

    #[test]
    fn test_default_table_is_enumerable() {
        let map = InputMap::default();
        let rows: Vec<_> = map.bindings().collect();

        // nine surface rows plus three keys
        assert_eq!(rows.len(), 12);
        for (source, action) in InputMap::SURFACE_BINDINGS {
            assert!(rows.contains(&(source, action)));
        }
    }

    #[test]
    fn test_every_user_input_has_a_binding() {
        let map = InputMap::default();
        let inputs = [
            UserInput::PlayPauseButton,
            UserInput::PreviousButton,
            UserInput::NextButton,
            UserInput::TrackListItem(0),
            UserInput::SearchText(String::new()),
            UserInput::SeekBarClick { x: 0.0 },
            UserInput::SeekHandleDown { x: 0.0 },
            UserInput::PointerMove { x: 0.0 },
            UserInput::PointerUp,
            UserInput::KeyDown(KeyCode::Space),
        ];
        for input in inputs {
            assert!(map.action_for(input.source()).is_some(), "{input:?} is unbound");
        }
    }

    #[test]
    fn test_custom_keys() {
        let keys = KeysConfig {
            toggle_play: vec![KeyCode::KeyK, KeyCode::MediaPlayPause],
            previous: vec![KeyCode::KeyJ],
            next: vec![KeyCode::KeyL],
        };
        let map = InputMap::from_keys(&keys);

        assert_eq!(map.action_for(InputSource::Key(KeyCode::Space)), None);
        assert_eq!(map.keys_for(Action::TogglePlay), vec![KeyCode::KeyK, KeyCode::MediaPlayPause]);
        assert_eq!(map.action_for(InputSource::Key(KeyCode::KeyL)), Some(Action::Next));
    }

    #[test]
    fn test_key_parse() {
        assert_eq!(KeyCode::parse("space"), Some(KeyCode::Space));
        assert_eq!(KeyCode::parse("ArrowRight"), Some(KeyCode::ArrowRight));
        assert_eq!(KeyCode::parse("F13"), None);
    }
}
