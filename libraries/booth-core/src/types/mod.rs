mod ids;
mod mixtape;
mod roster;
mod track;

pub use ids::{InviteCode, MixtapeId, TrackId, UserId};
pub use mixtape::{CollaborationMode, Collaborator, Mixtape};
pub use roster::{Participant, Roster};
pub use track::{Contributor, MixtapeTrack, TrackDraft};
