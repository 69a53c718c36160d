//! Contribution arbiter
//!
//! One task per mixtape owns the authoritative roster and tracklist. All
//! writes go through its command channel and are applied one at a time, so
//! positions come from a single sequence and the turn check always sees the
//! track count it is judging. Accepted changes are published to the change
//! feed for every connected client to reconcile.

use crate::config::MixtapeConfig;
use crate::duration::{self, CapacityStatus, Sides};
use crate::error::{MixtapeError, Result};
use crate::feed::ChangeFeed;
use crate::reconcile::ChangeEvent;
use crate::tracklist::{Removal, Tracklist};
use crate::turns::{check_turn, whose_turn, TurnPolicy};
use booth_core::{
    ensure, Action, Actor, Collaborator, MixtapeId, MixtapeTrack, Participant, Roster, TrackDraft,
    TrackId, UserId,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Outcome of an accepted track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    /// The track with its assigned position
    pub track: MixtapeTrack,
    /// Tape fill after this track
    pub capacity: CapacityStatus,
    /// Whose turn it was, if the contributor jumped the queue (advisory policy)
    pub out_of_turn: Option<UserId>,
    /// Who should add the next track
    pub next_turn: Option<UserId>,
}

/// Point-in-time view of a mixtape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixtapeSnapshot {
    /// Mixtape and collaborators
    pub roster: Roster,
    /// Tracks in position order
    pub tracks: Vec<MixtapeTrack>,
    /// Tape fill
    pub capacity: CapacityStatus,
    /// Index into `tracks` of the first Side B track (`tracks.len()` when Side B is empty)
    pub side_b_start: usize,
    /// Participant due to add the next track
    pub next_turn: Option<Participant>,
}

impl MixtapeSnapshot {
    /// Tracks on each side of the tape
    pub fn sides(&self) -> Sides<'_, MixtapeTrack> {
        let (side_a, side_b) = self.tracks.split_at(self.side_b_start.min(self.tracks.len()));
        Sides { side_a, side_b }
    }
}

enum Command {
    AddTrack {
        actor: Actor,
        draft: TrackDraft,
        reply: oneshot::Sender<Result<Contribution>>,
    },
    RemoveTrack {
        actor: Actor,
        track_id: TrackId,
        reply: oneshot::Sender<Result<Removal>>,
    },
    Join {
        user_id: UserId,
        invite_code: String,
        reply: oneshot::Sender<Result<Collaborator>>,
    },
    Leave {
        user_id: UserId,
        reply: oneshot::Sender<Result<Collaborator>>,
    },
    RemoveCollaborator {
        actor: Actor,
        user_id: UserId,
        reply: oneshot::Sender<Result<Collaborator>>,
    },
    Snapshot {
        reply: oneshot::Sender<MixtapeSnapshot>,
    },
}

/// Client side of a running arbiter
#[derive(Debug, Clone)]
pub struct ArbiterHandle {
    mixtape_id: MixtapeId,
    sender: mpsc::Sender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::AddTrack { .. } => "AddTrack",
            Command::RemoveTrack { .. } => "RemoveTrack",
            Command::Join { .. } => "Join",
            Command::Leave { .. } => "Leave",
            Command::RemoveCollaborator { .. } => "RemoveCollaborator",
            Command::Snapshot { .. } => "Snapshot",
        };
        f.write_str(name)
    }
}

impl ArbiterHandle {
    /// Mixtape this arbiter serves
    pub fn mixtape_id(&self) -> &MixtapeId {
        &self.mixtape_id
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| self.closed())?;
        response.await.map_err(|_| self.closed())
    }

    fn closed(&self) -> MixtapeError {
        MixtapeError::ArbiterClosed(self.mixtape_id.to_string())
    }

    /// Append a track on behalf of `actor`
    pub async fn add_track(&self, actor: Actor, draft: TrackDraft) -> Result<Contribution> {
        self.request(|reply| Command::AddTrack {
            actor,
            draft,
            reply,
        })
        .await?
    }

    /// Remove a track on behalf of `actor`
    pub async fn remove_track(&self, actor: Actor, track_id: TrackId) -> Result<Removal> {
        self.request(|reply| Command::RemoveTrack {
            actor,
            track_id,
            reply,
        })
        .await?
    }

    /// Redeem an invite code
    pub async fn join(
        &self,
        user_id: UserId,
        invite_code: impl Into<String>,
    ) -> Result<Collaborator> {
        let invite_code = invite_code.into();
        self.request(|reply| Command::Join {
            user_id,
            invite_code,
            reply,
        })
        .await?
    }

    /// Stop collaborating
    pub async fn leave(&self, user_id: UserId) -> Result<Collaborator> {
        self.request(|reply| Command::Leave { user_id, reply }).await?
    }

    /// Remove a collaborator (owner only)
    pub async fn remove_collaborator(
        &self,
        actor: Actor,
        user_id: UserId,
    ) -> Result<Collaborator> {
        self.request(|reply| Command::RemoveCollaborator {
            actor,
            user_id,
            reply,
        })
        .await?
    }

    /// Current state of the mixtape
    pub async fn snapshot(&self) -> Result<MixtapeSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }
}

/// Single writer for one mixtape
pub struct Arbiter {
    roster: Roster,
    tracklist: Tracklist,
    config: MixtapeConfig,
    feed: Arc<dyn ChangeFeed>,
}

impl Arbiter {
    /// Create an arbiter from loaded state
    pub fn new(
        roster: Roster,
        tracks: Vec<MixtapeTrack>,
        config: MixtapeConfig,
        feed: Arc<dyn ChangeFeed>,
    ) -> Self {
        let tracklist = Tracklist::from_rows(roster.mixtape.id.clone(), tracks);
        Self {
            roster,
            tracklist,
            config,
            feed,
        }
    }

    /// Start the arbiter task
    ///
    /// The task stops when every handle has been dropped.
    pub fn spawn(self) -> (ArbiterHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(self.config.command_buffer.max(1));
        let handle = ArbiterHandle {
            mixtape_id: self.roster.mixtape.id.clone(),
            sender,
        };
        let task = tokio::spawn(self.run(receiver));
        (handle, task)
    }

    async fn run(mut self, mut receiver: mpsc::Receiver<Command>) {
        let mixtape_id = self.roster.mixtape.id.clone();

        // Rows written by racing clients before the arbiter existed may collide
        let repaired = self.tracklist.resequence();
        if !repaired.is_empty() {
            warn!(%mixtape_id, count = repaired.len(), "Repaired track positions");
            for track in repaired {
                self.publish(ChangeEvent::Update(track)).await;
            }
        }

        info!(%mixtape_id, tracks = self.tracklist.len(), "Arbiter started");

        while let Some(command) = receiver.recv().await {
            debug!(%mixtape_id, ?command, "Handling command");
            match command {
                Command::AddTrack {
                    actor,
                    draft,
                    reply,
                } => {
                    let result = self.add_track(actor, draft).await;
                    let _ = reply.send(result);
                }
                Command::RemoveTrack {
                    actor,
                    track_id,
                    reply,
                } => {
                    let result = self.remove_track(&actor, &track_id).await;
                    let _ = reply.send(result);
                }
                Command::Join {
                    user_id,
                    invite_code,
                    reply,
                } => {
                    let _ = reply.send(self.join(user_id, &invite_code));
                }
                Command::Leave { user_id, reply } => {
                    let _ = reply.send(self.leave(user_id));
                }
                Command::RemoveCollaborator {
                    actor,
                    user_id,
                    reply,
                } => {
                    let _ = reply.send(self.remove_collaborator(&actor, &user_id));
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
            }
        }

        info!(%mixtape_id, "Arbiter stopped");
    }

    async fn add_track(&mut self, actor: Actor, draft: TrackDraft) -> Result<Contribution> {
        ensure(&actor, &Action::AddTrack, &self.roster)?;

        let participants = self.roster.participants();
        let mut out_of_turn = None;
        if let Err(violation) = check_turn(
            self.roster.mixtape.effective_mode(),
            &participants,
            self.tracklist.len(),
            actor.user_id(),
        ) {
            match self.config.turn_policy {
                TurnPolicy::Strict => {
                    return Err(MixtapeError::OutOfTurn {
                        expected: violation.expected,
                    });
                }
                TurnPolicy::Advisory => {
                    warn!(
                        mixtape_id = %self.roster.mixtape.id,
                        %actor, "Out-of-turn contribution accepted: {}", violation
                    );
                    out_of_turn = Some(violation.expected);
                }
            }
        }

        let track = self
            .tracklist
            .append(draft, actor.as_contributor())
            .clone();
        let capacity = self.tracklist.capacity_status(self.config.capacity_ms);
        if capacity.over_capacity {
            warn!(
                mixtape_id = %self.roster.mixtape.id,
                over_ms = capacity.remaining_ms.unsigned_abs(),
                "Mixtape is over capacity"
            );
        }

        info!(
            mixtape_id = %self.roster.mixtape.id,
            track_id = %track.id,
            position = track.position,
            %actor,
            "Track added"
        );
        self.publish(ChangeEvent::Insert(track.clone())).await;

        let next_turn = whose_turn(&participants, self.tracklist.len()).map(|p| p.user_id.clone());
        Ok(Contribution {
            track,
            capacity,
            out_of_turn,
            next_turn,
        })
    }

    async fn remove_track(&mut self, actor: &Actor, track_id: &TrackId) -> Result<Removal> {
        let contributor = self
            .tracklist
            .get(track_id)
            .map(|t| t.contributor.clone())
            .ok_or_else(|| MixtapeError::TrackNotFound(track_id.to_string()))?;
        ensure(actor, &Action::RemoveTrack { contributor }, &self.roster)?;

        let removal = self
            .tracklist
            .remove(track_id)
            .ok_or_else(|| MixtapeError::TrackNotFound(track_id.to_string()))?;

        info!(
            mixtape_id = %self.roster.mixtape.id,
            %track_id,
            shifted = removal.shifted.len(),
            "Track removed"
        );
        self.publish(ChangeEvent::Delete(removal.removed.id.clone()))
            .await;
        for track in &removal.shifted {
            self.publish(ChangeEvent::Update(track.clone())).await;
        }

        Ok(removal)
    }

    fn join(&mut self, user_id: UserId, invite_code: &str) -> Result<Collaborator> {
        ensure(&Actor::user(user_id.clone()), &Action::Join, &self.roster)?;
        let collaborator = self.roster.redeem_invite(user_id, invite_code)?.clone();
        info!(
            mixtape_id = %self.roster.mixtape.id,
            user_id = %collaborator.user_id,
            turn_order = collaborator.turn_order,
            "Collaborator joined"
        );
        Ok(collaborator)
    }

    fn leave(&mut self, user_id: UserId) -> Result<Collaborator> {
        ensure(&Actor::user(user_id.clone()), &Action::Leave, &self.roster)?;
        let collaborator = self.roster.remove_collaborator(&user_id)?;
        info!(mixtape_id = %self.roster.mixtape.id, %user_id, "Collaborator left");
        Ok(collaborator)
    }

    fn remove_collaborator(&mut self, actor: &Actor, user_id: &UserId) -> Result<Collaborator> {
        ensure(actor, &Action::ManageCollaborators, &self.roster)?;
        let collaborator = self.roster.remove_collaborator(user_id)?;
        info!(mixtape_id = %self.roster.mixtape.id, %user_id, "Collaborator removed");
        Ok(collaborator)
    }

    fn snapshot(&self) -> MixtapeSnapshot {
        let participants = self.roster.participants();
        let tracks = self.tracklist.tracks().to_vec();
        let side_b_start = duration::split_sides(&tracks, self.config.side_threshold_ms)
            .side_a
            .len();
        MixtapeSnapshot {
            roster: self.roster.clone(),
            tracks,
            capacity: self.tracklist.capacity_status(self.config.capacity_ms),
            side_b_start,
            next_turn: whose_turn(&participants, self.tracklist.len()).cloned(),
        }
    }

    async fn publish(&self, event: ChangeEvent<MixtapeTrack>) {
        // Subscribers that miss this will resync from a snapshot
        if let Err(e) = self.feed.publish(&self.roster.mixtape.id, event).await {
            warn!(mixtape_id = %self.roster.mixtape.id, "Failed to publish change: {}", e);
        }
    }
}
