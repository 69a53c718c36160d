//! The Booth - Mixtape Management
//!
//! Collaborative mixtape logic for The Booth.
//!
//! This crate provides:
//! - Duration accounting (90-minute capacity, Side A / Side B split)
//! - Turn rotation for `turns`-mode collaborative mixtapes
//! - Tracklist lifecycle (append, remove, re-sequence)
//! - Live list reconciliation from insert/update/delete change events
//! - A change-feed seam with an in-process broadcast implementation
//! - A per-mixtape arbiter that serializes contributions
//!
//! # Architecture
//!
//! The duration, turn and reconcile modules are pure and synchronous; they
//! are safe to call from a UI event loop on every render. The arbiter is the
//! one stateful piece: it owns the authoritative tracklist for a mixtape and
//! is the only place positions are assigned.
//!
//! Storage, authentication and transport live behind the hosted backend.
//!
//! # Example: Capacity and Sides
//!
//! ```rust
//! use booth_mixtape::duration::{remaining, split_sides, DEFAULT_CAPACITY_MS};
//!
//! let minutes = |m: u64| m * 60_000;
//! let tracks = [minutes(30), minutes(20), minutes(10)];
//!
//! assert_eq!(remaining(&tracks, DEFAULT_CAPACITY_MS), minutes(30) as i64);
//!
//! let sides = split_sides(&tracks, minutes(45));
//! assert_eq!(sides.side_a.len(), 2);
//! assert_eq!(sides.side_b.len(), 1);
//! ```
//!
//! # Example: Whose Turn
//!
//! ```rust
//! use booth_core::{Participant, UserId};
//! use booth_mixtape::turns::whose_turn;
//!
//! let participants = vec![
//!     Participant::owner(UserId::new("alice")),
//!     Participant::collaborator(UserId::new("bob"), 0),
//! ];
//!
//! assert_eq!(whose_turn(&participants, 3).unwrap().user_id, UserId::new("bob"));
//! assert!(whose_turn(&[], 3).is_none());
//! ```
//!
//! # Example: Arbiter
//!
//! ```rust,no_run
//! use booth_core::{Actor, CollaborationMode, Mixtape, Roster, TrackDraft, UserId};
//! use booth_mixtape::{Arbiter, BroadcastFeed, MixtapeConfig};
//! use std::sync::Arc;
//!
//! # async fn demo() -> booth_mixtape::Result<()> {
//! let owner = UserId::new("alice");
//! let tape = Mixtape::collaborative(owner.clone(), "Road Trip", CollaborationMode::Turns, 4);
//! let config = MixtapeConfig::load(None)?;
//! let feed = Arc::new(BroadcastFeed::from_config(&config));
//!
//! let (handle, _task) = Arbiter::new(Roster::new(tape), Vec::new(), config, feed).spawn();
//!
//! let added = handle
//!     .add_track(Actor::user(owner), TrackDraft::new("Song", "Band", 200_000))
//!     .await?;
//! assert_eq!(added.track.position, 0);
//! # Ok(())
//! # }
//! ```

pub mod arbiter;
pub mod config;
pub mod duration;
mod error;
pub mod feed;
pub mod reconcile;
pub mod tracklist;
pub mod turns;

// Public exports
pub use arbiter::{Arbiter, ArbiterHandle, Contribution, MixtapeSnapshot};
pub use config::MixtapeConfig;
pub use duration::{CapacityStatus, Sides, Timed};
pub use error::{MixtapeError, Result};
pub use feed::{BroadcastFeed, ChangeFeed, FeedItem, SnapshotSource, Subscription};
pub use reconcile::{apply_event, ChangeEvent, LiveRow, Reconciler};
pub use tracklist::{Removal, Tracklist};
pub use turns::{check_turn, whose_turn, TurnPolicy, TurnViolation};
