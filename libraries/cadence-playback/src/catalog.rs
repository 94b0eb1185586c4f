//! Immutable track catalog

use crate::error::{PlaybackError, Result};
use crate::types::Track;

/// Fixed, non-empty, ordered list of tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    /// Build a catalog, rejecting an empty track list
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(PlaybackError::EmptyCatalog);
        }
        Ok(Self { tracks })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the catalog has no tracks (never true for a constructed catalog)
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn last_index(&self) -> usize {
        self.tracks.len() - 1
    }

    pub fn is_last(&self, index: usize) -> bool {
        index == self.last_index()
    }

    /// Validate an index against the catalog bounds
    pub fn check_index(&self, index: usize) -> Result<()> {
        if index < self.tracks.len() {
            Ok(())
        } else {
            Err(PlaybackError::InvalidIndex {
                index,
                len: self.tracks.len(),
            })
        }
    }

    /// Index after `index`, wrapping to 0 past the last track
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.tracks.len()
    }

    /// Index before `index`, wrapping to the last track before 0
    pub fn previous_index(&self, index: usize) -> usize {
        if index == 0 {
            self.last_index()
        } else {
            index - 1
        }
    }
}
