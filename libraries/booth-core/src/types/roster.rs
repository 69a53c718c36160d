/// Mixtape membership: the owner plus collaborators
use crate::error::{BoothError, Result};
use crate::types::{Collaborator, Mixtape, UserId};
use serde::{Deserialize, Serialize};

/// A participant in a mixtape's contribution rotation
///
/// Derived from the owner and collaborator rows, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Participant user ID
    pub user_id: UserId,

    /// Collaborator rank, `None` for the owner
    pub turn_order: Option<u32>,

    /// Whether this participant owns the mixtape
    pub is_owner: bool,
}

impl Participant {
    /// The mixtape owner
    pub fn owner(user_id: UserId) -> Self {
        Self {
            user_id,
            turn_order: None,
            is_owner: true,
        }
    }

    /// A collaborator at the given rank
    pub fn collaborator(user_id: UserId, turn_order: u32) -> Self {
        Self {
            user_id,
            turn_order: Some(turn_order),
            is_owner: false,
        }
    }
}

/// A mixtape together with its collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    /// The mixtape
    pub mixtape: Mixtape,

    /// Collaborators in no particular order
    pub collaborators: Vec<Collaborator>,
}

impl Roster {
    /// Roster with no collaborators yet
    pub fn new(mixtape: Mixtape) -> Self {
        Self {
            mixtape,
            collaborators: Vec::new(),
        }
    }

    /// Roster from loaded rows
    pub fn with_collaborators(mixtape: Mixtape, collaborators: Vec<Collaborator>) -> Self {
        Self {
            mixtape,
            collaborators,
        }
    }

    /// Participants in rotation order
    ///
    /// Owner first, then collaborators ascending by turn order. Equal ranks
    /// can only come from inconsistent rows; they fall back to user ID order.
    pub fn participants(&self) -> Vec<Participant> {
        let mut collaborators: Vec<&Collaborator> = self.collaborators.iter().collect();
        collaborators.sort_by(|a, b| {
            a.turn_order
                .cmp(&b.turn_order)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        std::iter::once(Participant::owner(self.mixtape.owner_id.clone()))
            .chain(
                collaborators
                    .into_iter()
                    .map(|c| Participant::collaborator(c.user_id.clone(), c.turn_order)),
            )
            .collect()
    }

    /// Check if the user owns the mixtape
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.mixtape.owner_id == user_id
    }

    /// Find a collaborator by user ID
    pub fn collaborator(&self, user_id: &UserId) -> Option<&Collaborator> {
        self.collaborators.iter().find(|c| &c.user_id == user_id)
    }

    /// Check if the user is the owner or a collaborator
    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.is_owner(user_id) || self.collaborator(user_id).is_some()
    }

    /// Rank for the next collaborator to join
    pub fn next_turn_order(&self) -> u32 {
        self.collaborators
            .iter()
            .map(|c| c.turn_order + 1)
            .max()
            .unwrap_or(0)
    }

    /// Whether the collaborator limit has been reached
    pub fn is_full(&self) -> bool {
        self.collaborators.len() >= self.mixtape.max_collaborators as usize
    }

    /// Add a collaborator at the end of the rotation
    pub fn add_collaborator(&mut self, user_id: UserId) -> Result<&Collaborator> {
        if !self.mixtape.is_collaborative {
            return Err(BoothError::invalid_input(format!(
                "mixtape {} is not collaborative",
                self.mixtape.id
            )));
        }
        if self.is_owner(&user_id) {
            return Err(BoothError::invalid_input(
                "the owner cannot join their own mixtape",
            ));
        }
        if self.collaborator(&user_id).is_some() {
            return Err(BoothError::Duplicate(format!(
                "{} already collaborates on {}",
                user_id, self.mixtape.id
            )));
        }
        if self.is_full() {
            return Err(BoothError::MixtapeFull {
                max: self.mixtape.max_collaborators,
            });
        }

        let turn_order = self.next_turn_order();
        self.collaborators.push(Collaborator::new(
            self.mixtape.id.clone(),
            user_id,
            turn_order,
        ));
        let index = self.collaborators.len() - 1;
        Ok(&self.collaborators[index])
    }

    /// Join using an invite code
    pub fn redeem_invite(&mut self, user_id: UserId, code: &str) -> Result<&Collaborator> {
        if !self.mixtape.invite_code.matches(code) {
            return Err(BoothError::InvalidInviteCode);
        }
        self.add_collaborator(user_id)
    }

    /// Remove a collaborator
    ///
    /// Remaining ranks are left as they are; only their relative order matters.
    pub fn remove_collaborator(&mut self, user_id: &UserId) -> Result<Collaborator> {
        let index = self
            .collaborators
            .iter()
            .position(|c| &c.user_id == user_id)
            .ok_or_else(|| BoothError::not_found("Collaborator", user_id.as_str()))?;
        Ok(self.collaborators.remove(index))
    }
}
