//! The transport-facing surface.
//!
//! [`ServerContext`] owns everything the engine knows: the hosted problem,
//! the session directory and the outbound event queue. Handlers are plain
//! synchronous methods; a transport decodes a request, calls the matching
//! method with the sender's [`ParticipantId`](crate::core::ParticipantId),
//! reports any error back to that sender only and delivers the drained
//! events.
//!
//! [`SharedServer`] wraps the context for multi-threaded transports.

mod context;
mod events;
mod shared;

pub use context::{GameStart, OperatorOutcome, ServerContext, ServerInfo, SERVER_VERSION};
pub use events::{
    Dispatch, OperatorCall, OperatorListing, PlayerSummary, Recipient, RoomSummary, ServerEvent,
};
pub use shared::SharedServer;
