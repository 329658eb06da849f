//! # rust-roomplay
//!
//! A generic engine for hosting turn-based, multi-role problems ("games")
//! for groups of participants gathered in rooms.
//!
//! ## Design Principles
//!
//! 1. **Problem-Agnostic**: The engine knows nothing about any particular
//!    game. A problem supplies a state type, an operator catalog, roles
//!    and transition rules through [`Problem`].
//!
//! 2. **Atomic Application**: An operator request is fully validated
//!    before anything changes. A rejected request leaves every room,
//!    participant and session exactly as it was.
//!
//! 3. **Immutable States**: Operators receive the current state by
//!    reference and return a new one. History is a persistent vector of
//!    previous states, so inspecting it is O(1).
//!
//! 4. **No Ambient State**: Everything lives in one [`ServerContext`]
//!    passed to every handler.
//!
//! ## Modules
//!
//! - `core`: Identifiers, role sets, configuration, state contract, RNG
//! - `problem`: The plug-in contract: operators, parameters, roles,
//!   transition rules and the problem builder
//! - `rules`: Applicability resolution and role validation
//! - `transitions`: Transition rule evaluation
//! - `session`: Game sessions and the atomic apply
//! - `directory`: Rooms and participants
//! - `server`: The transport-facing context and outbound events
//! - `games`: Bundled problems
//! - `error`: Error taxonomy

pub mod core;
pub mod error;
pub mod problem;
pub mod rules;
pub mod transitions;
pub mod session;
pub mod directory;
pub mod server;
pub mod games;

// Re-export commonly used types
pub use crate::core::{
    EngineConfig, GameRng, OperatorIndex, ParticipantId, ProblemState, RoleIndex, RoleSet, RoomId,
};

pub use crate::error::{EngineError, ErrorKind, ErrorPayload, InvalidOperator};

pub use crate::problem::{
    Operator, ParamKind, ParamSpec, ParamValue, Problem, ProblemBuilder, ProblemInfo, Role,
    RoleValidator, TransitionRule,
};

pub use crate::rules::{RoleViolation, validate_roles};

pub use crate::session::{AppliedOperator, GameSession};

pub use crate::directory::{Disconnect, Participant, Room, SessionDirectory};

pub use crate::server::{
    Dispatch, OperatorListing, OperatorOutcome, Recipient, ServerContext, ServerEvent, SharedServer,
};
