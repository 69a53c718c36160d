//! Turn rotation for collaborative mixtapes
//!
//! Whose turn it is follows from the number of tracks already on the tape,
//! so no "current turn" field has to be stored or kept in sync.

use booth_core::{CollaborationMode, Participant, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How out-of-turn contributions are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnPolicy {
    /// Log the violation and accept the track
    #[default]
    Advisory,
    /// Reject the track
    Strict,
}

/// Participant due to add the next track
///
/// Round-robin over `participants` (owner first, then collaborators by
/// rank). `None` when there is nobody to take turns.
pub fn whose_turn(participants: &[Participant], track_count: usize) -> Option<&Participant> {
    if participants.is_empty() {
        return None;
    }
    participants.get(track_count % participants.len())
}

/// An attempt to contribute while someone else holds the turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnViolation {
    /// Participant whose turn it is
    pub expected: UserId,
}

impl fmt::Display for TurnViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "it is {}'s turn", self.expected)
    }
}

/// Check whether `actor` may add the next track
///
/// Always passes in `Open` mode, and when there is no turn owner. Guests
/// (`actor == None`) never hold a turn.
pub fn check_turn(
    mode: CollaborationMode,
    participants: &[Participant],
    track_count: usize,
    actor: Option<&UserId>,
) -> Result<(), TurnViolation> {
    if mode == CollaborationMode::Open {
        return Ok(());
    }

    match whose_turn(participants, track_count) {
        None => Ok(()),
        Some(turn) if Some(&turn.user_id) == actor => Ok(()),
        Some(turn) => Err(TurnViolation {
            expected: turn.user_id.clone(),
        }),
    }
}
