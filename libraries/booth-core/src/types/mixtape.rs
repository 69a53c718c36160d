/// Mixtape domain types
use crate::types::{InviteCode, MixtapeId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How collaborators take part in a collaborative mixtape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaborationMode {
    /// Any participant may add a track at any time
    #[default]
    Open,
    /// Participants add tracks in round-robin order
    Turns,
}

impl CollaborationMode {
    /// Convert mode to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaborationMode::Open => "open",
            CollaborationMode::Turns => "turns",
        }
    }

    /// Parse mode from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(CollaborationMode::Open),
            "turns" => Some(CollaborationMode::Turns),
            _ => None,
        }
    }
}

/// Mixtape
///
/// A capacity-bounded, ordered collection of tracks. The tracks themselves
/// live in their own rows and are not embedded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mixtape {
    /// Unique mixtape identifier
    pub id: MixtapeId,

    /// Owner user ID
    pub owner_id: UserId,

    /// Mixtape title
    pub title: String,

    /// Whether other users may join and contribute
    pub is_collaborative: bool,

    /// Contribution mode for collaborators
    pub collaboration_mode: CollaborationMode,

    /// Maximum number of collaborators (owner excluded)
    pub max_collaborators: u32,

    /// Code collaborators redeem to join
    pub invite_code: InviteCode,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Mixtape {
    /// Default collaborator limit for collaborative mixtapes
    pub const DEFAULT_MAX_COLLABORATORS: u32 = 5;

    /// Create a solo mixtape
    pub fn new(owner_id: UserId, title: impl Into<String>) -> Self {
        Self {
            id: MixtapeId::generate(),
            owner_id,
            title: title.into(),
            is_collaborative: false,
            collaboration_mode: CollaborationMode::Open,
            max_collaborators: 0,
            invite_code: InviteCode::generate(),
            created_at: Utc::now(),
        }
    }

    /// Create a collaborative mixtape
    pub fn collaborative(
        owner_id: UserId,
        title: impl Into<String>,
        mode: CollaborationMode,
        max_collaborators: u32,
    ) -> Self {
        Self {
            is_collaborative: true,
            collaboration_mode: mode,
            max_collaborators,
            ..Self::new(owner_id, title)
        }
    }

    /// Effective contribution mode
    ///
    /// Solo mixtapes behave as `Open`: only the owner participates, so there
    /// is nobody to take turns with.
    pub fn effective_mode(&self) -> CollaborationMode {
        if self.is_collaborative {
            self.collaboration_mode
        } else {
            CollaborationMode::Open
        }
    }
}

/// Collaborator on a mixtape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    /// Mixtape ID
    pub mixtape_id: MixtapeId,

    /// Participant user ID
    pub user_id: UserId,

    /// Rank in the contribution rotation (unique within a mixtape)
    pub turn_order: u32,

    /// When the collaborator joined
    pub joined_at: DateTime<Utc>,
}

impl Collaborator {
    /// Create a new collaborator
    pub fn new(mixtape_id: MixtapeId, user_id: UserId, turn_order: u32) -> Self {
        Self {
            mixtape_id,
            user_id,
            turn_order,
            joined_at: Utc::now(),
        }
    }
}
