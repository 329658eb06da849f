//! Rooms: a lobby of participants and at most one game session.

use crate::core::{ParticipantId, RoomId};
use crate::session::GameSession;

/// A room.
///
/// Members are kept in join order. The owner is the creator until it
/// leaves, after which the earliest remaining member takes over.
#[derive(Clone, Debug)]
pub struct Room<S> {
    pub(crate) id: RoomId,
    pub(crate) owner: ParticipantId,
    pub(crate) members: Vec<ParticipantId>,
    pub(crate) game: Option<GameSession<S>>,
}

impl<S> Room<S> {
    /// An empty room owned by `owner`.
    #[must_use]
    pub fn new(id: RoomId, owner: ParticipantId) -> Self {
        Self {
            id,
            owner,
            members: Vec::new(),
            game: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    #[must_use]
    pub fn owner(&self) -> ParticipantId {
        self.owner
    }

    /// Members in join order.
    #[must_use]
    pub fn members(&self) -> &[ParticipantId] {
        &self.members
    }

    #[must_use]
    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.members.contains(&participant)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Is a game session live in this room?
    #[must_use]
    pub fn in_game(&self) -> bool {
        self.game.is_some()
    }

    #[must_use]
    pub fn game(&self) -> Option<&GameSession<S>> {
        self.game.as_ref()
    }

    /// Remove a member, handing ownership on if the owner left.
    ///
    /// Returns the new owner when ownership changed.
    pub(crate) fn remove_member(&mut self, participant: ParticipantId) -> Option<ParticipantId> {
        self.members.retain(|&m| m != participant);
        if self.owner == participant {
            if let Some(&next) = self.members.first() {
                self.owner = next;
                return Some(next);
            }
        }
        None
    }
}
