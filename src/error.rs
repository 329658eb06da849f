//! Engine error taxonomy.
//!
//! Every error is a recoverable rejection of a single request. Errors are
//! computed before any mutation, so a rejected request leaves rooms,
//! participants and sessions exactly as they were. The transport reports
//! an error only to the participant that sent the request, using
//! [`EngineError::to_payload`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{OperatorIndex, ParticipantId, RoomId};

/// Why an operator request was refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidOperator {
    /// The index is outside `[0, operator_count)`.
    #[error("Out of Bounds: operator {} of {count}", .index.0)]
    OutOfBounds { index: OperatorIndex, count: usize },

    /// The operator is not applicable for the requester's roles, or the
    /// game has already reached its goal.
    #[error("Not Applicable: {name}")]
    NotApplicable { index: OperatorIndex, name: String },

    /// The supplied arguments do not match the parameter schema.
    #[error("Bad Arguments: {reason}")]
    BadArguments { reason: String },
}

/// Why a join request was refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum JoinRefusal {
    #[error("Room Does Not Exist")]
    RoomDoesNotExist,
    #[error("Already in another Room")]
    AlreadyInRoom,
    #[error("Room is full")]
    RoomFull,
}

/// Why a room could not be deleted.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeleteRefusal {
    #[error("Room Does Not Exist")]
    RoomDoesNotExist,
    #[error("Room is not empty")]
    RoomNotEmpty,
}

/// Errors returned by engine operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("room {0} already exists")]
    RoomAlreadyExists(RoomId),

    #[error("room {0} does not exist")]
    RoomNotFound(RoomId),

    #[error("invalid room name {0:?}")]
    InvalidRoomId(String),

    #[error("can't join room: {0}")]
    CantJoinRoom(JoinRefusal),

    #[error("can't delete room: {0}")]
    CantDeleteRoom(DeleteRefusal),

    #[error("not in a room")]
    NotInARoom,

    #[error("game already started")]
    GameAlreadyStarted,

    #[error("game not started")]
    GameNotStarted,

    #[error("invalid operator: {0}")]
    InvalidOperator(InvalidOperator),

    #[error("invalid roles: {0}")]
    InvalidRoles(String),

    #[error("unknown participant {0}")]
    UnknownParticipant(ParticipantId),
}

impl From<InvalidOperator> for EngineError {
    fn from(err: InvalidOperator) -> Self {
        Self::InvalidOperator(err)
    }
}

impl From<JoinRefusal> for EngineError {
    fn from(err: JoinRefusal) -> Self {
        Self::CantJoinRoom(err)
    }
}

impl From<DeleteRefusal> for EngineError {
    fn from(err: DeleteRefusal) -> Self {
        Self::CantDeleteRoom(err)
    }
}

/// Wire name of an error kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    RoomAlreadyExists,
    RoomNotFound,
    InvalidRoomId,
    CantJoinRoom,
    CantDeleteRoom,
    NotInARoom,
    GameAlreadyStarted,
    GameNotStarted,
    InvalidOperator,
    InvalidRoles,
    UnknownParticipant,
}

/// Error body the transport sends back to the requester.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: Option<String>,
}

impl EngineError {
    /// The wire kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RoomAlreadyExists(_) => ErrorKind::RoomAlreadyExists,
            Self::RoomNotFound(_) => ErrorKind::RoomNotFound,
            Self::InvalidRoomId(_) => ErrorKind::InvalidRoomId,
            Self::CantJoinRoom(_) => ErrorKind::CantJoinRoom,
            Self::CantDeleteRoom(_) => ErrorKind::CantDeleteRoom,
            Self::NotInARoom => ErrorKind::NotInARoom,
            Self::GameAlreadyStarted => ErrorKind::GameAlreadyStarted,
            Self::GameNotStarted => ErrorKind::GameNotStarted,
            Self::InvalidOperator(_) => ErrorKind::InvalidOperator,
            Self::InvalidRoles(_) => ErrorKind::InvalidRoles,
            Self::UnknownParticipant(_) => ErrorKind::UnknownParticipant,
        }
    }

    /// Reason text for the payload; `None` for kinds that need no detail.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::CantJoinRoom(refusal) => Some(refusal.to_string()),
            Self::CantDeleteRoom(refusal) => Some(refusal.to_string()),
            Self::InvalidOperator(reason) => Some(reason.to_string()),
            Self::InvalidRoles(reason) => Some(reason.clone()),
            Self::NotInARoom | Self::GameAlreadyStarted | Self::GameNotStarted => None,
            other => Some(other.to_string()),
        }
    }

    /// Build the payload the transport replies with.
    #[must_use]
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            kind: self.kind(),
            message: self.reason(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_operator_messages() {
        let err = EngineError::from(InvalidOperator::OutOfBounds {
            index: OperatorIndex::new(9),
            count: 3,
        });
        assert_eq!(err.kind(), ErrorKind::InvalidOperator);
        assert_eq!(err.reason().as_deref(), Some("Out of Bounds: operator 9 of 3"));
        assert_eq!(
            err.to_payload().message.as_deref(),
            Some("Out of Bounds: operator 9 of 3")
        );
    }

    #[test]
    fn test_join_refusal_payload() {
        let payload = EngineError::from(JoinRefusal::RoomDoesNotExist).to_payload();
        assert_eq!(payload.kind, ErrorKind::CantJoinRoom);
        assert_eq!(payload.message.as_deref(), Some("Room Does Not Exist"));
    }

    #[test]
    fn test_bare_kinds_have_no_message() {
        assert_eq!(EngineError::NotInARoom.to_payload().message, None);
        assert_eq!(EngineError::GameNotStarted.to_payload().message, None);
    }

    #[test]
    fn test_payload_wire_format() {
        let payload = EngineError::InvalidRoles("Too many players for role Pilot".into()).to_payload();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["type"], "InvalidRoles");
        assert_eq!(json["message"], "Too many players for role Pilot");
    }
}
