//! The Booth Core
//!
//! Platform-agnostic domain types, capability checks and error handling for
//! The Booth.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Mixtape`, `MixtapeTrack`, `Collaborator`, `Roster`, etc.
//! - **Capabilities**: a single `can(actor, action, roster)` predicate
//! - **Error Handling**: Unified `BoothError` and `Result` types
//!
//! Persistence, authentication and transport belong to the hosted backend
//! and are not modelled here.
//!
//! # Example
//!
//! ```rust
//! use booth_core::types::{CollaborationMode, Mixtape, Roster, UserId};
//! use booth_core::capability::{can, Action, Actor};
//!
//! let owner = UserId::new("alice");
//! let tape = Mixtape::collaborative(owner.clone(), "Road Trip", CollaborationMode::Turns, 4);
//! let code = tape.invite_code.to_string();
//!
//! let mut roster = Roster::new(tape);
//! roster.redeem_invite(UserId::new("bob"), &code).unwrap();
//!
//! assert!(can(&Actor::user(UserId::new("bob")), &Action::AddTrack, &roster));
//! assert_eq!(roster.participants()[0].user_id, owner);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod capability;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use capability::{can, ensure, Action, Actor};
pub use error::{BoothError, Result};

pub use types::{
    CollaborationMode, Collaborator, Contributor, InviteCode, Mixtape, MixtapeId, MixtapeTrack,
    Participant, Roster, TrackDraft, TrackId, UserId,
};
