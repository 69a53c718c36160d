/// Mixtape track types
use crate::types::{MixtapeId, TrackId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who added a track
///
/// Rows carry this as the column pair `added_by_user_id` / `added_by_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ContributorColumns", into = "ContributorColumns")]
pub enum Contributor {
    /// Signed-in user (owner or collaborator)
    User(UserId),

    /// Anonymous contributor identified only by a free-text name
    Guest { name: String },
}

impl Contributor {
    /// Name shown for guests who leave the name blank
    pub const ANONYMOUS: &'static str = "Anonymous";

    /// Create a guest contributor, falling back to [`Self::ANONYMOUS`]
    pub fn guest(name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        Self::Guest {
            name: if trimmed.is_empty() {
                Self::ANONYMOUS.to_string()
            } else {
                trimmed.to_string()
            },
        }
    }

    /// User ID if the contributor is signed in
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Contributor::User(id) => Some(id),
            Contributor::Guest { .. } => None,
        }
    }
}

impl fmt::Display for Contributor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contributor::User(id) => write!(f, "{}", id),
            Contributor::Guest { name } => write!(f, "{}", name),
        }
    }
}

/// Column form of [`Contributor`]
#[derive(Serialize, Deserialize)]
pub struct ContributorColumns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    added_by_user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    added_by_name: Option<String>,
}

impl TryFrom<ContributorColumns> for Contributor {
    type Error = String;

    fn try_from(columns: ContributorColumns) -> Result<Self, Self::Error> {
        match (columns.added_by_user_id, columns.added_by_name) {
            (Some(user_id), _) => Ok(Contributor::User(user_id)),
            (None, Some(name)) => Ok(Contributor::guest(name)),
            (None, None) => Err("track row has neither added_by_user_id nor added_by_name".into()),
        }
    }
}

impl From<Contributor> for ContributorColumns {
    fn from(contributor: Contributor) -> Self {
        match contributor {
            Contributor::User(user_id) => Self {
                added_by_user_id: Some(user_id),
                added_by_name: None,
            },
            Contributor::Guest { name } => Self {
                added_by_user_id: None,
                added_by_name: Some(name),
            },
        }
    }
}

/// Track on a mixtape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixtapeTrack {
    /// Unique track identifier
    pub id: TrackId,

    /// Mixtape this track belongs to
    pub mixtape_id: MixtapeId,

    /// Zero-based position, contiguous and unique within the mixtape
    pub position: u32,

    /// Track duration in milliseconds
    pub duration_ms: u64,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Spotify URI used for playlist export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify_uri: Option<String>,

    /// Who added the track
    #[serde(flatten)]
    pub contributor: Contributor,

    /// When the track was added
    pub added_at: DateTime<Utc>,
}

impl MixtapeTrack {
    /// Place a draft on a mixtape at the given position
    pub fn from_draft(
        mixtape_id: MixtapeId,
        position: u32,
        draft: TrackDraft,
        contributor: Contributor,
    ) -> Self {
        Self {
            id: TrackId::generate(),
            mixtape_id,
            position,
            duration_ms: draft.duration_ms,
            title: draft.title,
            artist: draft.artist,
            spotify_uri: draft.spotify_uri,
            contributor,
            added_at: Utc::now(),
        }
    }
}

/// Track submitted by a contributor, before a position is assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDraft {
    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Track duration in milliseconds
    pub duration_ms: u64,

    /// Spotify URI (from catalog search)
    #[serde(default)]
    pub spotify_uri: Option<String>,
}

impl TrackDraft {
    /// Create a draft without a Spotify URI
    pub fn new(title: impl Into<String>, artist: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            duration_ms,
            spotify_uri: None,
        }
    }
}
