//! Capability checks
//!
//! One predicate decides what an actor may do to a mixtape. The same
//! function gates UI controls and the contribution arbiter, so both sides
//! agree on ownership and membership rules.

use crate::error::{BoothError, Result};
use crate::types::{CollaborationMode, Contributor, Roster, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whoever is attempting an action
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Actor {
    /// Signed-in user
    User { user_id: UserId },

    /// Anonymous visitor with a display name
    Guest { name: String },
}

impl Actor {
    /// Signed-in actor
    pub fn user(user_id: UserId) -> Self {
        Self::User { user_id }
    }

    /// Anonymous actor
    pub fn guest(name: impl Into<String>) -> Self {
        Self::Guest { name: name.into() }
    }

    /// User ID if signed in
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Actor::User { user_id } => Some(user_id),
            Actor::Guest { .. } => None,
        }
    }

    /// Contributor recorded on tracks this actor adds
    pub fn as_contributor(&self) -> Contributor {
        match self {
            Actor::User { user_id } => Contributor::User(user_id.clone()),
            Actor::Guest { name } => Contributor::guest(name.clone()),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::User { user_id } => write!(f, "user {}", user_id),
            Actor::Guest { name } => write!(f, "guest {:?}", name),
        }
    }
}

/// Something an actor may attempt on a mixtape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Listen to or read the mixtape
    View,
    /// Append a track
    AddTrack,
    /// Remove a track added by `contributor`
    RemoveTrack { contributor: Contributor },
    /// Change title or mode
    EditMixtape,
    /// Remove collaborators or regenerate the invite code
    ManageCollaborators,
    /// Become a collaborator
    Join,
    /// Stop collaborating
    Leave,
    /// Export the tracklist to a playlist
    Export,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::View => "view",
            Action::AddTrack => "add a track to",
            Action::RemoveTrack { .. } => "remove a track from",
            Action::EditMixtape => "edit",
            Action::ManageCollaborators => "manage collaborators of",
            Action::Join => "join",
            Action::Leave => "leave",
            Action::Export => "export",
        };
        f.write_str(name)
    }
}

/// Decide whether `actor` may perform `action` on the mixtape in `roster`
///
/// Turn order is deliberately not consulted here; see the turn resolver.
pub fn can(actor: &Actor, action: &Action, roster: &Roster) -> bool {
    let tape = &roster.mixtape;

    let user_id = match actor {
        Actor::Guest { .. } => {
            return match action {
                Action::View => true,
                Action::AddTrack => {
                    tape.is_collaborative && tape.collaboration_mode == CollaborationMode::Open
                }
                _ => false,
            };
        }
        Actor::User { user_id } => user_id,
    };

    if roster.is_owner(user_id) {
        return !matches!(action, Action::Join | Action::Leave);
    }

    let is_collaborator = roster.collaborator(user_id).is_some();
    match action {
        Action::View => true,
        Action::AddTrack | Action::Leave | Action::Export => is_collaborator,
        Action::RemoveTrack { contributor } => {
            is_collaborator && contributor.user_id() == Some(user_id)
        }
        Action::EditMixtape | Action::ManageCollaborators => false,
        Action::Join => tape.is_collaborative && !is_collaborator,
    }
}

/// Like [`can`], but returns `PermissionDenied` naming the attempt
pub fn ensure(actor: &Actor, action: &Action, roster: &Roster) -> Result<()> {
    if can(actor, action, roster) {
        Ok(())
    } else {
        Err(BoothError::permission_denied(format!(
            "{} may not {} mixtape {}",
            actor, action, roster.mixtape.id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mixtape;

    fn collaborative(mode: CollaborationMode) -> Roster {
        let mut roster = Roster::new(Mixtape::collaborative(
            UserId::new("owner"),
            "Tape",
            mode,
            4,
        ));
        roster.add_collaborator(UserId::new("collab")).unwrap();
        roster
    }

    fn owner() -> Actor {
        Actor::user(UserId::new("owner"))
    }

    fn collab() -> Actor {
        Actor::user(UserId::new("collab"))
    }

    fn stranger() -> Actor {
        Actor::user(UserId::new("stranger"))
    }

    #[test]
    fn anyone_can_view() {
        let roster = collaborative(CollaborationMode::Turns);
        for actor in [owner(), collab(), stranger(), Actor::guest("Sam")] {
            assert!(can(&actor, &Action::View, &roster), "{actor} should view");
        }
    }

    #[test]
    fn owner_can_manage_but_not_join() {
        let roster = collaborative(CollaborationMode::Open);
        assert!(can(&owner(), &Action::EditMixtape, &roster));
        assert!(can(&owner(), &Action::ManageCollaborators, &roster));
        assert!(can(
            &owner(),
            &Action::RemoveTrack {
                contributor: Contributor::User(UserId::new("collab"))
            },
            &roster
        ));
        assert!(!can(&owner(), &Action::Join, &roster));
        assert!(!can(&owner(), &Action::Leave, &roster));
    }

    #[test]
    fn collaborator_removes_only_own_tracks() {
        let roster = collaborative(CollaborationMode::Open);
        let own = Action::RemoveTrack {
            contributor: Contributor::User(UserId::new("collab")),
        };
        let others = Action::RemoveTrack {
            contributor: Contributor::User(UserId::new("owner")),
        };

        assert!(can(&collab(), &own, &roster));
        assert!(!can(&collab(), &others, &roster));
        assert!(!can(&collab(), &Action::EditMixtape, &roster));
        assert!(can(&collab(), &Action::Leave, &roster));
    }

    #[test]
    fn stranger_can_join_collaborative_only() {
        let roster = collaborative(CollaborationMode::Turns);
        assert!(can(&stranger(), &Action::Join, &roster));
        assert!(!can(&stranger(), &Action::AddTrack, &roster));
        assert!(!can(&collab(), &Action::Join, &roster));

        let solo = Roster::new(Mixtape::new(UserId::new("owner"), "Solo"));
        assert!(!can(&stranger(), &Action::Join, &solo));
    }

    #[test]
    fn guests_add_only_to_open_collaborative_tapes() {
        let open = collaborative(CollaborationMode::Open);
        let turns = collaborative(CollaborationMode::Turns);
        let solo = Roster::new(Mixtape::new(UserId::new("owner"), "Solo"));
        let guest = Actor::guest("Sam");

        assert!(can(&guest, &Action::AddTrack, &open));
        assert!(!can(&guest, &Action::AddTrack, &turns));
        assert!(!can(&guest, &Action::AddTrack, &solo));
        assert!(!can(&guest, &Action::Join, &open));
    }

    #[test]
    fn ensure_reports_denial() {
        let roster = collaborative(CollaborationMode::Open);
        let err = ensure(&stranger(), &Action::EditMixtape, &roster).unwrap_err();
        assert!(matches!(err, BoothError::PermissionDenied(_)));
        assert!(err.to_string().contains("user stranger may not edit"));
    }
}
