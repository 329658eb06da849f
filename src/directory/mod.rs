//! Session directory: rooms and participants.
//!
//! ## Participant
//!
//! A connection's identity, display name, room and role set.
//!
//! ## Room
//!
//! A lobby grouping participants, with an owner and at most one
//! [`GameSession`](crate::session::GameSession).
//!
//! ## SessionDirectory
//!
//! Owns both and keeps their cross-references consistent through
//! join, leave, disconnect and game start.

mod participant;
mod registry;
mod room;

pub use participant::Participant;
pub use registry::{Departure, Disconnect, SessionDirectory};
pub use room::Room;
