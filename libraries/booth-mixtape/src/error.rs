//! Error types for mixtape management

use booth_core::{BoothError, UserId};
use thiserror::Error;

/// Mixtape errors
#[derive(Debug, Error)]
pub enum MixtapeError {
    /// Domain error from the core crate
    #[error(transparent)]
    Core(#[from] BoothError),

    /// Contribution attempted out of turn under a strict policy
    #[error("Not your turn: waiting on {expected}")]
    OutOfTurn {
        /// Participant whose turn it is
        expected: UserId,
    },

    /// Track not present in the tracklist
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The arbiter task has stopped
    #[error("Arbiter for mixtape {0} is no longer running")]
    ArbiterClosed(String),

    /// Change feed error
    #[error("Change feed error: {0}")]
    Feed(String),
}

/// Result type for mixtape operations
pub type Result<T> = std::result::Result<T, MixtapeError>;
