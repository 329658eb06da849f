//! Outbound events and their addressing.
//!
//! The engine never touches a network handle. Every notification is queued
//! as a [`Dispatch`]: an event plus a [`Recipient`] naming a participant, a
//! room or everyone. The transport drains the queue and delivers each
//! event in order.
//!
//! Events serialize as JSON objects tagged by an `event` field:
//!
//! ```
//! use rust_roomplay::server::ServerEvent;
//!
//! let event = ServerEvent::Transition { message: "Night falls".into() };
//! let json = serde_json::to_string(&event).unwrap();
//! assert_eq!(json, r#"{"event":"transition","message":"Night falls"}"#);
//! ```

use serde::{Deserialize, Serialize};

use crate::core::{OperatorIndex, ParticipantId, RoleSet, RoomId};
use crate::problem::{ParamSpec, ParamValue};

/// Who an event is for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "to", content = "id", rename_all = "snake_case")]
pub enum Recipient {
    /// A single participant.
    Participant(ParticipantId),
    /// Every member of a room at delivery time.
    Room(RoomId),
    /// Every connected participant.
    Everyone,
}

/// An event queued for delivery.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dispatch {
    pub to: Recipient,
    pub event: ServerEvent,
}

/// One member of a room, as shown in listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: ParticipantId,
    pub name: Option<String>,
    pub roles: RoleSet,
}

/// A room, as shown in listings and `RoomChanged` events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room: RoomId,
    pub owner: ParticipantId,
    pub in_game: bool,
    pub players: Vec<PlayerSummary>,
}

/// An operator a participant may request now.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperatorListing {
    pub name: String,
    pub op_no: OperatorIndex,
    pub params: Vec<ParamSpec>,
}

/// The operator that produced an `OperatorApplied` event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperatorCall {
    pub name: String,
    pub op_no: OperatorIndex,
    pub params: Option<Vec<ParamValue>>,
}

/// Everything the engine tells participants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Sent once to a new connection.
    YourId { id: ParticipantId },

    RoomCreated { room: RoomId },

    RoomDeleted { room: RoomId },

    RoomJoined { username: Option<String> },

    RoomLeft { username: Option<String> },

    /// A room's membership or game status changed.
    RoomChanged(RoomSummary),

    RolesChanged {
        username: Option<String>,
        roles: RoleSet,
    },

    NameChanged {
        id: ParticipantId,
        name: Option<String>,
    },

    /// `message` is the rendered initial state.
    GameStarted {
        message: String,
        state: Option<String>,
    },

    /// `message` is the rendered new state; `state` its snapshot.
    OperatorApplied {
        message: String,
        state: Option<String>,
        operator: OperatorCall,
    },

    OperatorsAvailable { operators: Vec<OperatorListing> },

    Transition { message: String },

    GameEnded { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_room_changed_is_flat() {
        let event = ServerEvent::RoomChanged(RoomSummary {
            room: RoomId::new("R"),
            owner: ParticipantId::new(1),
            in_game: false,
            players: vec![PlayerSummary {
                id: ParticipantId::new(1),
                name: Some("Ada".into()),
                roles: RoleSet::new(),
            }],
        });

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "event": "room_changed",
                "room": "R",
                "owner": 1,
                "in_game": false,
                "players": [{ "id": 1, "name": "Ada", "roles": [] }],
            })
        );
    }

    #[test]
    fn test_operator_applied_shape() {
        let event = ServerEvent::OperatorApplied {
            message: "2".into(),
            state: None,
            operator: OperatorCall {
                name: "Add".into(),
                op_no: OperatorIndex::new(0),
                params: Some(vec![ParamValue::Int(2)]),
            },
        };

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "event": "operator_applied",
                "message": "2",
                "state": null,
                "operator": { "name": "Add", "op_no": 0, "params": [2] },
            })
        );
    }

    #[test]
    fn test_recipient_shape() {
        let dispatch = Dispatch {
            to: Recipient::Room(RoomId::new("R")),
            event: ServerEvent::GameEnded { message: "done".into() },
        };
        let value = serde_json::to_value(&dispatch).unwrap();

        assert_eq!(value["to"], json!({ "to": "room", "id": "R" }));
        assert_eq!(
            serde_json::to_value(Recipient::Everyone).unwrap(),
            json!({ "to": "everyone" })
        );

        let back: Dispatch = serde_json::from_value(value).unwrap();
        assert_eq!(back, dispatch);
    }
}
