//! Duration accounting
//!
//! A mixtape holds up to 90 minutes, split across two cassette sides. The
//! limit is advisory: going over is allowed and reported, never rejected.

use booth_core::MixtapeTrack;
use serde::{Deserialize, Serialize};

/// Full tape capacity (90 minutes)
pub const DEFAULT_CAPACITY_MS: u64 = 5_400_000;

/// Running time after which tracks roll onto Side B (45 minutes)
pub const DEFAULT_SIDE_THRESHOLD_MS: u64 = 2_700_000;

/// Anything with a length in milliseconds
pub trait Timed {
    /// Duration in milliseconds
    fn duration_ms(&self) -> u64;
}

impl Timed for MixtapeTrack {
    fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

impl Timed for u64 {
    fn duration_ms(&self) -> u64 {
        *self
    }
}

impl<T: Timed> Timed for &T {
    fn duration_ms(&self) -> u64 {
        (**self).duration_ms()
    }
}

/// Sum of all track durations
pub fn total_duration<T: Timed>(tracks: &[T]) -> u64 {
    tracks
        .iter()
        .fold(0u64, |total, track| total.saturating_add(track.duration_ms()))
}

/// Time left before `capacity_ms` is reached
///
/// Negative when the tracks run over capacity.
pub fn remaining<T: Timed>(tracks: &[T], capacity_ms: u64) -> i64 {
    to_signed(capacity_ms).saturating_sub(to_signed(total_duration(tracks)))
}

fn to_signed(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

/// The two halves of a tape
#[derive(Debug, PartialEq, Eq)]
pub struct Sides<'a, T> {
    /// Tracks before the threshold
    pub side_a: &'a [T],
    /// Tracks from the first one starting at or past the threshold
    pub side_b: &'a [T],
}

/// Split a position-ordered tracklist into Side A and Side B
///
/// A track goes to Side B when the running time *before* it has reached
/// `side_threshold_ms`, so a track straddling the boundary stays whole on
/// Side B. The first track is always on Side A, whatever its length or the
/// threshold. Durations never decrease the running time, so both sides are
/// contiguous.
pub fn split_sides<T: Timed>(tracks: &[T], side_threshold_ms: u64) -> Sides<'_, T> {
    let mut elapsed = 0u64;
    let mut split = tracks.len();

    for (index, track) in tracks.iter().enumerate() {
        if index > 0 && elapsed >= side_threshold_ms {
            split = index;
            break;
        }
        elapsed = elapsed.saturating_add(track.duration_ms());
    }

    let (side_a, side_b) = tracks.split_at(split);
    Sides { side_a, side_b }
}

/// Snapshot of how full a tape is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityStatus {
    /// Sum of track durations
    pub total_ms: u64,
    /// Capacity minus total, negative when over
    pub remaining_ms: i64,
    /// Whether the tape runs over capacity
    pub over_capacity: bool,
}

/// Compute total, remaining time and the over-capacity flag in one pass
pub fn capacity_status<T: Timed>(tracks: &[T], capacity_ms: u64) -> CapacityStatus {
    let total_ms = total_duration(tracks);
    let remaining_ms = to_signed(capacity_ms).saturating_sub(to_signed(total_ms));
    CapacityStatus {
        total_ms,
        remaining_ms,
        over_capacity: remaining_ms < 0,
    }
}

/// Format milliseconds as `m:ss`, or `h:mm:ss` from one hour up
pub fn format_duration(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Format a signed remaining time, prefixing `-` when over capacity
pub fn format_remaining(ms: i64) -> String {
    if ms < 0 {
        format!("-{}", format_duration(ms.unsigned_abs()))
    } else {
        format_duration(ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60_000;

    #[test]
    fn empty_tracklist() {
        let tracks: [u64; 0] = [];
        assert_eq!(total_duration(&tracks), 0);
        assert_eq!(remaining(&tracks, DEFAULT_CAPACITY_MS), 5_400_000);

        let sides = split_sides(&tracks, DEFAULT_SIDE_THRESHOLD_MS);
        assert!(sides.side_a.is_empty());
        assert!(sides.side_b.is_empty());
    }

    #[test]
    fn remaining_goes_negative_when_over() {
        let over = [50 * MIN, 45 * MIN];
        assert_eq!(remaining(&over, 90 * MIN), -5 * MIN as i64);

        let under = [25 * MIN, 15 * MIN];
        assert_eq!(remaining(&under, 90 * MIN), 50 * MIN as i64);
    }

    #[test]
    fn split_uses_running_time_before_each_track() {
        let tracks = [30 * MIN, 20 * MIN, 10 * MIN];
        let sides = split_sides(&tracks, 45 * MIN);

        assert_eq!(sides.side_a, &[30 * MIN, 20 * MIN]);
        assert_eq!(sides.side_b, &[10 * MIN]);
    }

    #[test]
    fn track_ending_exactly_on_threshold_pushes_next_to_side_b() {
        let tracks = [20 * MIN, 25 * MIN, 5 * MIN];
        let sides = split_sides(&tracks, 45 * MIN);

        assert_eq!(sides.side_a.len(), 2);
        assert_eq!(sides.side_b, &[5 * MIN]);
    }

    #[test]
    fn short_tracklist_has_empty_side_b() {
        let tracks = [10 * MIN, 10 * MIN];
        let sides = split_sides(&tracks, DEFAULT_SIDE_THRESHOLD_MS);

        assert_eq!(sides.side_a.len(), 2);
        assert!(sides.side_b.is_empty());
    }

    #[test]
    fn long_first_track_stays_on_side_a() {
        let tracks = [60 * MIN, 3 * MIN, 4 * MIN];
        let sides = split_sides(&tracks, 45 * MIN);

        assert_eq!(sides.side_a, &[60 * MIN]);
        assert_eq!(sides.side_b, &[3 * MIN, 4 * MIN]);
    }

    #[test]
    fn zero_threshold_keeps_only_first_track_on_side_a() {
        let tracks = [MIN, MIN, MIN];
        let sides = split_sides(&tracks, 0);

        assert_eq!(sides.side_a.len(), 1);
        assert_eq!(sides.side_b.len(), 2);
    }

    #[test]
    fn capacity_status_flags_overflow() {
        let status = capacity_status(&[60 * MIN, 31 * MIN], DEFAULT_CAPACITY_MS);
        assert_eq!(status.total_ms, 91 * MIN);
        assert_eq!(status.remaining_ms, -(MIN as i64));
        assert!(status.over_capacity);

        let status = capacity_status(&[90 * MIN], DEFAULT_CAPACITY_MS);
        assert_eq!(status.remaining_ms, 0);
        assert!(!status.over_capacity);
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(185_000), "3:05");
        assert_eq!(format_duration(45 * MIN), "45:00");
        assert_eq!(format_duration(DEFAULT_CAPACITY_MS), "1:30:00");
        assert_eq!(format_remaining(-5 * MIN as i64), "-5:00");
        assert_eq!(format_remaining(50 * MIN as i64), "50:00");
    }
}
