//! Core engine types: identifiers, configuration, the state contract, RNG.
//!
//! This module contains the fundamental building blocks that are
//! problem-agnostic. Problems plug in through `ProblemState` and the
//! `problem` catalog types rather than modifying the core.

pub mod ids;
pub mod config;
pub mod state;
pub mod rng;

pub use ids::{OperatorIndex, ParticipantId, RoleIndex, RoleSet, RoomId};
pub use config::EngineConfig;
pub use state::{json_snapshot, ProblemState};
pub use rng::{GameRng, GameRngState};
