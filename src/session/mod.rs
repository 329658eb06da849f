//! Game sessions.
//!
//! A session exists only while its room exists and a game has been
//! started there. See [`GameSession`] for the history and atomicity
//! guarantees.

mod game;

pub use game::{AppliedOperator, GameSession};
