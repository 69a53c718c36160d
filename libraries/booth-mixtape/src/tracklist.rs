//! Position-ordered tracklist for one mixtape
//!
//! Positions are zero-based and contiguous. Appends take the next position;
//! removals and moves re-sequence everything after the gap.

use crate::duration::{self, CapacityStatus, Sides};
use crate::error::{MixtapeError, Result};
use booth_core::{Contributor, MixtapeId, MixtapeTrack, TrackDraft, TrackId};

/// Result of removing a track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// The removed track
    pub removed: MixtapeTrack,
    /// Later tracks, with their new positions
    pub shifted: Vec<MixtapeTrack>,
}

/// Ordered tracks on a mixtape
#[derive(Debug, Clone)]
pub struct Tracklist {
    mixtape_id: MixtapeId,
    tracks: Vec<MixtapeTrack>,
}

impl Tracklist {
    /// Create empty tracklist
    pub fn new(mixtape_id: MixtapeId) -> Self {
        Self {
            mixtape_id,
            tracks: Vec::new(),
        }
    }

    /// Build from loaded rows
    ///
    /// Rows are ordered by position (ties by ID). Positions are left as
    /// loaded; call [`Tracklist::resequence`] to repair gaps.
    pub fn from_rows(mixtape_id: MixtapeId, mut rows: Vec<MixtapeTrack>) -> Self {
        rows.retain(|t| t.mixtape_id == mixtape_id);
        rows.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        Self {
            mixtape_id,
            tracks: rows,
        }
    }

    /// Mixtape this list belongs to
    pub fn mixtape_id(&self) -> &MixtapeId {
        &self.mixtape_id
    }

    /// Append a track at the next position
    pub fn append(&mut self, draft: TrackDraft, contributor: Contributor) -> &MixtapeTrack {
        let position = self.tracks.len() as u32;
        self.tracks.push(MixtapeTrack::from_draft(
            self.mixtape_id.clone(),
            position,
            draft,
            contributor,
        ));
        &self.tracks[self.tracks.len() - 1]
    }

    /// Remove a track by ID
    ///
    /// Returns `None` if the track is not on this list.
    pub fn remove(&mut self, track_id: &TrackId) -> Option<Removal> {
        let index = self.index_of(track_id)?;
        let removed = self.tracks.remove(index);
        let shifted = self.resequence_from(index);
        Some(Removal { removed, shifted })
    }

    /// Move a track from one index to another
    ///
    /// Returns every track whose position changed.
    pub fn reorder(&mut self, from_index: usize, to_index: usize) -> Result<Vec<MixtapeTrack>> {
        let total = self.tracks.len();
        if from_index >= total {
            return Err(MixtapeError::IndexOutOfBounds(from_index));
        }
        if to_index >= total {
            return Err(MixtapeError::IndexOutOfBounds(to_index));
        }
        if from_index == to_index {
            return Ok(Vec::new());
        }

        let track = self.tracks.remove(from_index);
        self.tracks.insert(to_index, track);
        Ok(self.resequence_from(from_index.min(to_index)))
    }

    /// Rewrite positions to `0..len`
    ///
    /// Returns the tracks whose position changed.
    pub fn resequence(&mut self) -> Vec<MixtapeTrack> {
        self.resequence_from(0)
    }

    fn resequence_from(&mut self, start: usize) -> Vec<MixtapeTrack> {
        let mut changed = Vec::new();
        for (index, track) in self.tracks.iter_mut().enumerate().skip(start) {
            let position = index as u32;
            if track.position != position {
                track.position = position;
                changed.push(track.clone());
            }
        }
        changed
    }

    fn index_of(&self, track_id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == track_id)
    }

    /// Get track by ID
    pub fn get(&self, track_id: &TrackId) -> Option<&MixtapeTrack> {
        self.tracks.iter().find(|t| &t.id == track_id)
    }

    /// Tracks in position order
    pub fn tracks(&self) -> &[MixtapeTrack] {
        &self.tracks
    }

    /// Iterate tracks in position order
    pub fn iter(&self) -> impl Iterator<Item = &MixtapeTrack> {
        self.tracks.iter()
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Whether positions are exactly `0..len`
    pub fn is_contiguous(&self) -> bool {
        self.tracks
            .iter()
            .enumerate()
            .all(|(index, track)| track.position as usize == index)
    }

    /// Sum of track durations
    pub fn total_duration(&self) -> u64 {
        duration::total_duration(&self.tracks)
    }

    /// Capacity summary against `capacity_ms`
    pub fn capacity_status(&self, capacity_ms: u64) -> CapacityStatus {
        duration::capacity_status(&self.tracks, capacity_ms)
    }

    /// Split into Side A and Side B
    pub fn sides(&self, side_threshold_ms: u64) -> Sides<'_, MixtapeTrack> {
        duration::split_sides(&self.tracks, side_threshold_ms)
    }

    /// Consume into the underlying rows
    pub fn into_tracks(self) -> Vec<MixtapeTrack> {
        self.tracks
    }
}
