//! Connected participants.

use serde::Serialize;

use crate::core::{ParticipantId, RoleSet, RoomId};

/// A connected participant.
///
/// Created on connection and destroyed on disconnection. While outside a
/// room, `name` and `roles` are always empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: Option<String>,
    pub room: Option<RoomId>,
    pub roles: RoleSet,
}

impl Participant {
    /// A freshly connected participant: no name, no room, no roles.
    #[must_use]
    pub fn new(id: ParticipantId) -> Self {
        Self {
            id,
            name: None,
            room: None,
            roles: RoleSet::new(),
        }
    }

    /// Is this participant currently in a room?
    #[must_use]
    pub fn in_room(&self) -> bool {
        self.room.is_some()
    }

    /// Name for display, falling back to the id.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }

    /// Forget the room, name and roles. Returns the room that was left.
    pub(crate) fn clear_room(&mut self) -> Option<RoomId> {
        self.name = None;
        self.roles = RoleSet::new();
        self.room.take()
    }
}
