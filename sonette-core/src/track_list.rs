use crate::track::Track;

/// Ordered tracks from the last successful search.
///
/// Replaced wholesale on every search; navigation wraps around both ends.
#[derive(Debug, Clone, Default)]
pub struct TrackList {
    tracks: Vec<Track>,
}

impl TrackList {
    /// Create an empty track list
    #[must_use]
    pub const fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    /// Discard the current tracks and take `tracks` in their given order.
    ///
    /// Returns the new selection: index 0, or `None` for an empty list.
    pub fn replace(&mut self, tracks: Vec<Track>) -> Option<usize> {
        self.tracks = tracks;
        if self.tracks.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    /// Remove every track
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Index after `current`, wrapping to the first track
    #[must_use]
    pub fn next(&self, current: usize) -> Option<usize> {
        let len = self.tracks.len();
        (len > 0).then(|| (current % len + 1) % len)
    }

    /// Index before `current`, wrapping to the last track
    #[must_use]
    pub fn previous(&self, current: usize) -> Option<usize> {
        let len = self.tracks.len();
        (len > 0).then(|| (current % len + len - 1) % len)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks(n: usize) -> Vec<Track> {
        (0..n)
            .map(|i| Track::new(format!("t{i}"), "artist", "", format!("https://p/{i}"), 30))
            .collect()
    }

    #[test]
    fn test_replace_selects_first() {
        let mut list = TrackList::new();
        assert_eq!(list.replace(tracks(3)), Some(0));
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(2).map(|t| t.title.as_str()), Some("t2"));
        assert!(list.get(3).is_none());
    }

    #[test]
    fn test_replace_discards_previous_tracks() {
        let mut list = TrackList::new();
        list.replace(tracks(5));
        list.replace(tracks(2));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_replace_with_empty() {
        let mut list = TrackList::new();
        list.replace(tracks(2));
        assert_eq!(list.replace(Vec::new()), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_navigation_wraps() {
        let mut list = TrackList::new();
        list.replace(tracks(4));

        assert_eq!(list.next(3), Some(0));
        assert_eq!(list.previous(0), Some(3));
        assert_eq!(list.next(1), Some(2));
        assert_eq!(list.previous(2), Some(1));
    }

    #[test]
    fn test_next_and_previous_are_inverse() {
        let mut list = TrackList::new();
        for n in 1..=6 {
            list.replace(tracks(n));
            for i in 0..n {
                assert_eq!(list.next(i).and_then(|j| list.previous(j)), Some(i));
                assert_eq!(list.previous(i).and_then(|j| list.next(j)), Some(i));
            }
        }
    }

    #[test]
    fn test_single_track_wraps_to_itself() {
        let mut list = TrackList::new();
        list.replace(tracks(1));
        assert_eq!(list.next(0), Some(0));
        assert_eq!(list.previous(0), Some(0));
    }

    #[test]
    fn test_navigation_on_empty_list() {
        let list = TrackList::new();
        assert_eq!(list.next(0), None);
        assert_eq!(list.previous(0), None);
    }
}
