//! Ordered playback queue
//!
//! Entries keep their original insertion order for the whole life of the
//! queue. Navigation is index-based and non-destructive: a cursor separates
//! what has been played from what is up next, so "previous" can walk back in
//! original order and a repeat cycle can restart from the first entry.
//!
//! ```text
//!   entries:  [ A ][ B ][ C ][ D ][ E ]
//!                        ^ current (entries[head - 1])
//!                             \______/ up next (entries[head..])
//! ```
//!
//! Shuffle does not reorder `entries`. It keeps a played set for the current
//! cycle and draws from the rest.

use crate::resolver::Resolution;
use hymn_core::types::{Track, TrackId};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct Queue {
    /// All tracks in original order (history, current and up next)
    entries: Vec<Track>,

    /// Number of entries at or behind the cursor
    head: usize,

    /// Whether `entries[head - 1]` is the current track
    ///
    /// False when nothing is playing, or when the current track was removed
    /// from the queue while it kept playing.
    holds_current: bool,

    /// Tracks already played in the current repeat cycle
    played: HashSet<TrackId>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with a collection, cursor on `start`
    ///
    /// Returns the track at `start` (clamped to the last entry), or `None`
    /// for an empty collection, in which case the queue is left untouched.
    pub fn load(&mut self, tracks: Vec<Track>, start: usize) -> Option<Track> {
        if tracks.is_empty() {
            return None;
        }

        let start = start.min(tracks.len() - 1);
        self.entries = tracks;
        self.played.clear();
        self.place_cursor(start);
        Some(self.entries[start].clone())
    }

    /// Append a track to the end of the queue
    pub fn append(&mut self, track: Track) {
        self.entries.push(track);
    }

    /// Insert a track so it plays directly after the current one
    pub fn insert_next(&mut self, track: Track) {
        self.played.remove(track.id());
        self.entries.insert(self.head, track);
    }

    /// Drop everything except the current track
    pub fn clear_upcoming(&mut self) {
        if self.holds_current {
            let current = self.entries.swap_remove(self.head - 1);
            self.entries.clear();
            self.played.retain(|id| id == current.id());
            self.entries.push(current);
            self.head = 1;
        } else {
            self.entries.clear();
            self.played.clear();
            self.head = 0;
        }
    }

    /// Put the cursor on `track` for an explicit `play(track)`
    ///
    /// Prefers the next matching entry up next, then any earlier occurrence.
    /// A track the queue does not know is inserted right after the cursor.
    pub fn select(&mut self, track: &Track) {
        let upcoming = self.entries[self.head..]
            .iter()
            .position(|t| t == track)
            .map(|i| i + self.head);

        let index = match upcoming.or_else(|| self.entries.iter().position(|t| t == track)) {
            Some(index) => index,
            None => {
                self.entries.insert(self.head, track.clone());
                self.head
            }
        };

        self.place_cursor(index);
    }

    /// Apply a resolver decision and return the track it selected
    ///
    /// `Resolution::Current` leaves the cursor where it is; the caller already
    /// holds the current track.
    pub fn commit(&mut self, resolution: Resolution) -> Option<Track> {
        match resolution {
            Resolution::Current => None,
            Resolution::Entry { index, reload } => {
                let track = self.entries.get(index)?.clone();
                if reload {
                    self.played.clear();
                }
                self.place_cursor(index);
                Some(track)
            }
        }
    }

    /// Forget which entry is current, keeping the cursor position
    ///
    /// Used on stop: the queue survives and a later `next` continues after
    /// the track that was playing.
    pub fn detach_current(&mut self) {
        self.holds_current = false;
    }

    /// Mark everything up to the cursor as played in this cycle
    ///
    /// Called when shuffle is switched on so draws start from what is still
    /// ahead.
    pub fn mark_played_through_cursor(&mut self) {
        for track in &self.entries[..self.head] {
            self.played.insert(track.id().clone());
        }
    }

    /// Remove every occurrence of a track
    ///
    /// Returns the number of entries removed. If the current entry is among
    /// them the cursor stays between its neighbours and `holds_current`
    /// becomes false.
    pub fn remove_track(&mut self, track_id: &TrackId) -> usize {
        let mut removed = 0;
        let mut index = self.entries.len();
        while index > 0 {
            index -= 1;
            if self.entries[index].id() == track_id {
                self.remove_at(index);
                removed += 1;
            }
        }
        if removed > 0 {
            self.played.remove(track_id);
        }
        removed
    }

    /// Remove an up-next entry by its position in `upcoming()`
    pub fn remove_upcoming(&mut self, index: usize) -> Option<Track> {
        let absolute = self.head.checked_add(index)?;
        self.remove_entry(absolute)
    }

    /// Remove the entry at an absolute index in `entries()`
    pub fn remove_entry(&mut self, index: usize) -> Option<Track> {
        if index >= self.entries.len() {
            return None;
        }
        Some(self.remove_at(index))
    }

    /// Move an up-next entry from one position to another
    ///
    /// Both indices are positions in `upcoming()`. Returns false when either
    /// is out of range.
    pub fn move_upcoming(&mut self, from: usize, to: usize) -> bool {
        let upcoming = self.entries.len().saturating_sub(self.head);
        if from >= upcoming || to >= upcoming {
            return false;
        }
        if from != to {
            let track = self.entries.remove(self.head + from);
            self.entries.insert(self.head + to, track);
        }
        true
    }

    /// Tracks after the cursor in original order
    pub fn upcoming(&self) -> &[Track] {
        &self.entries[self.head..]
    }

    /// Tracks not yet played in this cycle, in original order, current excluded
    pub fn unplayed(&self) -> Vec<&Track> {
        self.unplayed_indices()
            .into_iter()
            .map(|i| &self.entries[i])
            .collect()
    }

    /// Indices into `entries()` of the tracks `unplayed()` returns
    pub fn unplayed_indices(&self) -> Vec<usize> {
        let current = self.current_index();
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, t)| Some(*i) != current && !self.played.contains(t.id()))
            .map(|(i, _)| i)
            .collect()
    }

    /// All entries in original order
    pub fn entries(&self) -> &[Track] {
        &self.entries
    }

    /// Index of the current entry, if the queue holds it
    pub fn current_index(&self) -> Option<usize> {
        if self.holds_current {
            self.head.checked_sub(1)
        } else {
            None
        }
    }

    /// Number of entries at or behind the cursor
    pub fn head(&self) -> usize {
        self.head
    }

    /// Whether a track was played in the current cycle
    pub fn is_played(&self, track_id: &TrackId) -> bool {
        self.played.contains(track_id)
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn place_cursor(&mut self, index: usize) {
        self.head = index + 1;
        self.holds_current = true;
        self.played.insert(self.entries[index].id().clone());
    }

    fn remove_at(&mut self, index: usize) -> Track {
        let track = self.entries.remove(index);
        if index < self.head {
            if self.holds_current && index == self.head - 1 {
                self.holds_current = false;
            }
            self.head -= 1;
        }
        track
    }
}
