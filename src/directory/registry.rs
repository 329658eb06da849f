//! The session directory: every connected participant and every room.
//!
//! All bookkeeping that spans rooms and participants lives here, so the
//! invariants hold in one place:
//! - A participant is in at most one room, and is listed in that room's
//!   members exactly when its `room` field names it.
//! - A room with no members left is destroyed, along with its session.
//! - A room holds at most one session for its whole lifetime.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::core::{EngineConfig, ParticipantId, ProblemState, RoleSet, RoomId};
use crate::error::{DeleteRefusal, EngineError, JoinRefusal};
use crate::problem::{Problem, Role};
use crate::rules::validate_roles;
use crate::session::GameSession;

use super::participant::Participant;
use super::room::Room;

/// What happened when a participant left a room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Departure {
    /// The room that was left.
    pub room: RoomId,
    /// The participant's name at the time of leaving.
    pub name: Option<String>,
    /// The room was emptied and destroyed.
    pub room_deleted: bool,
    /// The member that took over ownership, if ownership changed.
    pub new_owner: Option<ParticipantId>,
}

/// What a disconnect changed besides removing the participant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Disconnect {
    /// The room the participant was in, if any.
    pub departure: Option<Departure>,
    /// Rooms it owned from outside, now owned by their first member.
    pub handed_over: Vec<RoomId>,
    /// Rooms it owned that had no members; destroyed.
    pub abandoned: Vec<RoomId>,
}

/// Rooms and participants for one hosted problem.
#[derive(Clone, Debug)]
pub struct SessionDirectory<S> {
    config: EngineConfig,
    participants: FxHashMap<ParticipantId, Participant>,
    rooms: FxHashMap<RoomId, Room<S>>,
}

impl<S: ProblemState> Default for SessionDirectory<S> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<S: ProblemState> SessionDirectory<S> {
    /// Create an empty directory.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            participants: FxHashMap::default(),
            rooms: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- participants ----

    /// Register a connection. Connecting twice is a no-op.
    pub fn connect(&mut self, id: ParticipantId) {
        self.participants.entry(id).or_insert_with(|| Participant::new(id));
        tracing::debug!(participant = %id, "connected");
    }

    /// Drop a connection, leaving its room first if it was in one.
    ///
    /// A creator need not be a member of its room. Any room still owned by
    /// the departing participant passes to its first member, or is
    /// destroyed when it has none.
    pub fn disconnect(&mut self, id: ParticipantId) -> Result<Disconnect, EngineError> {
        let in_room = self.participant(id)?.in_room();
        let departure = if in_room { Some(self.leave_room(id)?) } else { None };
        self.participants.remove(&id);

        let mut owned: Vec<RoomId> = self
            .rooms
            .values()
            .filter(|room| room.owner() == id)
            .map(|room| room.id().clone())
            .collect();
        owned.sort();

        let mut handed_over = Vec::new();
        let mut abandoned = Vec::new();
        for room_id in owned {
            let Some(room) = self.rooms.get_mut(&room_id) else {
                continue;
            };
            if let Some(owner) = room.remove_member(id) {
                tracing::debug!(room = %room_id, owner = %owner, "ownership transferred");
                handed_over.push(room_id);
            } else if room.is_empty() {
                self.rooms.remove(&room_id);
                tracing::info!(room = %room_id, "owner disconnected; empty room destroyed");
                abandoned.push(room_id);
            }
        }

        tracing::debug!(participant = %id, "disconnected");
        Ok(Disconnect {
            departure,
            handed_over,
            abandoned,
        })
    }

    /// Look up a participant.
    pub fn participant(&self, id: ParticipantId) -> Result<&Participant, EngineError> {
        self.participants.get(&id).ok_or(EngineError::UnknownParticipant(id))
    }

    fn participant_mut(&mut self, id: ParticipantId) -> Result<&mut Participant, EngineError> {
        self.participants.get_mut(&id).ok_or(EngineError::UnknownParticipant(id))
    }

    /// Number of connected participants.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Change a participant's display name.
    ///
    /// Returns the participant's room, if any, so the change can be
    /// announced there.
    pub fn set_name(
        &mut self,
        id: ParticipantId,
        name: Option<String>,
    ) -> Result<Option<RoomId>, EngineError> {
        let participant = self.participant_mut(id)?;
        participant.name = name;
        Ok(participant.room.clone())
    }

    /// Replace a participant's role set.
    ///
    /// Requires the participant to be in a room. Any indices are accepted
    /// by default; with `reject_unknown_roles` configured and a declared
    /// role catalog, every index must name a declared role. A running
    /// session picks up the new roles immediately unless roles are locked
    /// in game.
    pub fn set_roles(
        &mut self,
        id: ParticipantId,
        roles: RoleSet,
        declared: &[Role],
    ) -> Result<RoomId, EngineError> {
        let room_id = self.participant(id)?.room.clone().ok_or(EngineError::NotInARoom)?;

        if self.config.reject_unknown_roles && !declared.is_empty() {
            if let Some(unknown) = roles.iter().find(|r| r.index() >= declared.len()) {
                return Err(EngineError::InvalidRoles(format!("Unknown role {}", unknown.0)));
            }
        }

        let room = self
            .rooms
            .get_mut(&room_id)
            .ok_or_else(|| EngineError::RoomNotFound(room_id.clone()))?;

        if let Some(game) = room.game.as_mut() {
            if self.config.lock_roles_in_game {
                return Err(EngineError::GameAlreadyStarted);
            }
            game.assign_roles(id, roles.clone());
        }

        if let Some(participant) = self.participants.get_mut(&id) {
            participant.roles = roles;
        }
        Ok(room_id)
    }

    // ---- rooms ----

    /// Create an empty room owned by `owner`.
    ///
    /// The owner does not join automatically.
    pub fn create_room(&mut self, owner: ParticipantId, id: RoomId) -> Result<(), EngineError> {
        self.participant(owner)?;
        if !self.config.accepts_room_id(id.as_str()) {
            return Err(EngineError::InvalidRoomId(id.as_str().to_string()));
        }
        if self.rooms.contains_key(&id) {
            return Err(EngineError::RoomAlreadyExists(id));
        }

        tracing::info!(room = %id, owner = %owner, "room created");
        self.rooms.insert(id.clone(), Room::new(id, owner));
        Ok(())
    }

    /// Delete an empty room.
    pub fn delete_room(&mut self, id: &RoomId) -> Result<(), EngineError> {
        let room = self.rooms.get(id).ok_or(DeleteRefusal::RoomDoesNotExist)?;
        if !room.is_empty() {
            return Err(DeleteRefusal::RoomNotEmpty.into());
        }

        self.rooms.remove(id);
        tracing::info!(room = %id, "room deleted");
        Ok(())
    }

    /// Put a participant into a room under the given name.
    pub fn join_room(
        &mut self,
        id: ParticipantId,
        room_id: &RoomId,
        name: Option<String>,
    ) -> Result<(), EngineError> {
        let capacity = self.config.room_capacity;
        let room = self.rooms.get_mut(room_id).ok_or(JoinRefusal::RoomDoesNotExist)?;
        let participant = self
            .participants
            .get_mut(&id)
            .ok_or(EngineError::UnknownParticipant(id))?;

        if participant.in_room() {
            return Err(JoinRefusal::AlreadyInRoom.into());
        }
        if capacity.map_or(false, |cap| room.members.len() >= cap) {
            return Err(JoinRefusal::RoomFull.into());
        }

        participant.room = Some(room_id.clone());
        participant.name = name;
        room.members.push(id);

        tracing::debug!(room = %room_id, participant = %id, members = room.members.len(), "joined room");
        Ok(())
    }

    /// Take a participant out of its room.
    ///
    /// Clears the participant's name and roles, hands ownership on and
    /// destroys the room if it is left empty.
    pub fn leave_room(&mut self, id: ParticipantId) -> Result<Departure, EngineError> {
        let participant = self.participant_mut(id)?;
        if !participant.in_room() {
            return Err(EngineError::NotInARoom);
        }
        let name = participant.name.clone();
        let room_id = participant.clear_room().ok_or(EngineError::NotInARoom)?;

        let room = self
            .rooms
            .get_mut(&room_id)
            .ok_or_else(|| EngineError::RoomNotFound(room_id.clone()))?;
        let new_owner = room.remove_member(id);
        if let Some(game) = room.game.as_mut() {
            game.remove_participant(id);
        }

        let room_deleted = room.is_empty();
        if room_deleted {
            if let Some(room) = self.rooms.remove(&room_id) {
                if let Some(game) = room.game {
                    tracing::info!(room = %room_id, step = game.step(), "discarding game session with empty room");
                }
            }
            tracing::info!(room = %room_id, "room emptied and destroyed");
        } else if let Some(owner) = new_owner {
            tracing::debug!(room = %room_id, owner = %owner, "ownership transferred");
        }

        tracing::debug!(room = %room_id, participant = %id, "left room");
        Ok(Departure {
            room: room_id,
            name,
            room_deleted,
            new_owner,
        })
    }

    /// Look up a room.
    #[must_use]
    pub fn room(&self, id: &RoomId) -> Option<&Room<S>> {
        self.rooms.get(id)
    }

    /// All rooms, ordered by id.
    #[must_use]
    pub fn rooms(&self) -> Vec<&Room<S>> {
        let mut rooms: Vec<_> = self.rooms.values().collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    /// The room a participant is in.
    #[must_use]
    pub fn room_of(&self, id: ParticipantId) -> Option<&Room<S>> {
        let room_id = self.participants.get(&id)?.room.as_ref()?;
        self.rooms.get(room_id)
    }

    /// The session running in a participant's room.
    #[must_use]
    pub fn game_of(&self, id: ParticipantId) -> Option<&GameSession<S>> {
        self.room_of(id)?.game.as_ref()
    }

    /// Mutable access to the session running in a participant's room.
    pub fn game_of_mut(&mut self, id: ParticipantId) -> Option<&mut GameSession<S>> {
        let room_id = self.participants.get(&id)?.room.as_ref()?;
        self.rooms.get_mut(room_id)?.game.as_mut()
    }

    // ---- games ----

    /// Start a game in a room.
    ///
    /// Roles are validated against the members' current assignments and
    /// snapshotted into the new session.
    pub fn start_game(
        &mut self,
        room_id: &RoomId,
        problem: &Problem<S>,
        args: Option<&Value>,
    ) -> Result<&GameSession<S>, EngineError> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| EngineError::RoomNotFound(room_id.clone()))?;
        if room.game.is_some() {
            return Err(EngineError::GameAlreadyStarted);
        }

        let participants = &self.participants;
        let assignments: Vec<(ParticipantId, RoleSet)> = room
            .members
            .iter()
            .map(|id| {
                let roles = participants.get(id).map(|p| p.roles.clone()).unwrap_or_default();
                (*id, roles)
            })
            .collect();

        let role_sets: Vec<RoleSet> = assignments.iter().map(|(_, roles)| roles.clone()).collect();
        if let Some(reason) = problem.check_roles(&role_sets) {
            return Err(EngineError::InvalidRoles(reason));
        }
        validate_roles(problem.roles(), &role_sets)
            .map_err(|violation| EngineError::InvalidRoles(violation.to_string()))?;

        let initial = problem.initial_state(args);
        tracing::info!(room = %room_id, players = assignments.len(), "game started");

        let game = room.game.insert(GameSession::new(room_id.clone(), initial, assignments));
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OperatorIndex, RoleIndex};
    use crate::problem::Operator;
    use std::fmt;

    #[derive(Clone, Debug, PartialEq)]
    struct Count(u32);

    impl fmt::Display for Count {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl ProblemState for Count {
        fn is_goal(&self) -> bool {
            self.0 >= 3
        }
    }

    fn problem() -> Problem<Count> {
        Problem::builder("Count")
            .initial_state(Count(0))
            .operator(Operator::new("Up", |c: &Count| Count(c.0 + 1)))
            .role(Role::exactly_one("Left"))
            .role(Role::exactly_one("Right"))
            .build()
    }

    fn p(n: u64) -> ParticipantId {
        ParticipantId::new(n)
    }

    fn directory() -> SessionDirectory<Count> {
        let mut dir = SessionDirectory::default();
        for n in 1..=3 {
            dir.connect(p(n));
        }
        dir.create_room(p(1), RoomId::new("R")).unwrap();
        dir
    }

    #[test]
    fn test_create_existing_room_fails() {
        let mut dir = directory();
        let err = dir.create_room(p(2), RoomId::new("R")).unwrap_err();
        assert_eq!(err, EngineError::RoomAlreadyExists(RoomId::new("R")));
    }

    #[test]
    fn test_create_room_rejects_bad_ids() {
        let mut dir = directory();
        assert_eq!(
            dir.create_room(p(1), RoomId::new("")),
            Err(EngineError::InvalidRoomId(String::new()))
        );
        assert!(matches!(
            dir.create_room(p(1), RoomId::new("x".repeat(65))),
            Err(EngineError::InvalidRoomId(_))
        ));
    }

    #[test]
    fn test_join_refusals() {
        let mut dir = directory();

        assert_eq!(
            dir.join_room(p(1), &RoomId::new("nope"), None),
            Err(EngineError::CantJoinRoom(JoinRefusal::RoomDoesNotExist))
        );

        dir.create_room(p(1), RoomId::new("S")).unwrap();
        dir.join_room(p(1), &RoomId::new("R"), Some("Ada".into())).unwrap();
        assert_eq!(
            dir.join_room(p(1), &RoomId::new("S"), None),
            Err(EngineError::CantJoinRoom(JoinRefusal::AlreadyInRoom))
        );
        assert_eq!(dir.room_of(p(1)).map(|r| r.id().as_str()), Some("R"));
    }

    #[test]
    fn test_room_capacity() {
        let mut dir = SessionDirectory::<Count>::new(EngineConfig::default().with_room_capacity(1));
        dir.connect(p(1));
        dir.connect(p(2));
        dir.create_room(p(1), RoomId::new("R")).unwrap();
        dir.join_room(p(1), &RoomId::new("R"), None).unwrap();

        assert_eq!(
            dir.join_room(p(2), &RoomId::new("R"), None),
            Err(EngineError::CantJoinRoom(JoinRefusal::RoomFull))
        );
    }

    #[test]
    fn test_leave_transfers_ownership_and_destroys_empty_room() {
        let mut dir = directory();
        let r = RoomId::new("R");
        dir.join_room(p(1), &r, Some("Ada".into())).unwrap();
        dir.join_room(p(2), &r, Some("Bob".into())).unwrap();

        let departure = dir.leave_room(p(1)).unwrap();
        assert_eq!(departure.name.as_deref(), Some("Ada"));
        assert_eq!(departure.new_owner, Some(p(2)));
        assert!(!departure.room_deleted);
        assert_eq!(dir.room(&r).map(Room::owner), Some(p(2)));

        let participant = dir.participant(p(1)).unwrap();
        assert!(participant.name.is_none());
        assert!(!participant.in_room());

        let departure = dir.leave_room(p(2)).unwrap();
        assert!(departure.room_deleted);
        assert!(dir.room(&r).is_none());
    }

    #[test]
    fn test_leave_outside_room() {
        let mut dir = directory();
        assert_eq!(dir.leave_room(p(1)), Err(EngineError::NotInARoom));
    }

    #[test]
    fn test_disconnect_is_implicit_leave() {
        let mut dir = directory();
        let r = RoomId::new("R");
        dir.join_room(p(2), &r, None).unwrap();

        let outcome = dir.disconnect(p(2)).unwrap();
        assert_eq!(outcome.departure.map(|d| d.room_deleted), Some(true));
        assert!(dir.room(&r).is_none());
        assert!(dir.participant(p(2)).is_err());
        assert_eq!(dir.participant_count(), 2);
        assert_eq!(dir.disconnect(p(3)).unwrap(), Disconnect::default());
        assert_eq!(dir.participant_count(), 1);
    }

    #[test]
    fn test_creator_disconnect_hands_room_to_member() {
        let mut dir = directory();
        let r = RoomId::new("R");
        dir.join_room(p(2), &r, None).unwrap();
        dir.join_room(p(3), &r, None).unwrap();

        let outcome = dir.disconnect(p(1)).unwrap();
        assert_eq!(outcome.departure, None);
        assert_eq!(outcome.handed_over, vec![r.clone()]);
        assert!(outcome.abandoned.is_empty());

        let room = dir.room(&r).unwrap();
        assert_eq!(room.owner(), p(2));
        assert!(room.contains(room.owner()));
        assert!(dir.participant(room.owner()).is_ok());
        assert_eq!(room.members(), &[p(2), p(3)]);
    }

    #[test]
    fn test_creator_disconnect_destroys_empty_room() {
        let mut dir = directory();
        dir.create_room(p(2), RoomId::new("Other")).unwrap();

        let outcome = dir.disconnect(p(1)).unwrap();
        assert_eq!(outcome.abandoned, vec![RoomId::new("R")]);
        assert!(dir.room(&RoomId::new("R")).is_none());
        assert_eq!(dir.rooms().len(), 1);
    }

    #[test]
    fn test_delete_room() {
        let mut dir = directory();
        let r = RoomId::new("R");
        dir.join_room(p(2), &r, None).unwrap();

        assert_eq!(
            dir.delete_room(&r),
            Err(EngineError::CantDeleteRoom(DeleteRefusal::RoomNotEmpty))
        );
        dir.leave_room(p(2)).unwrap();
        assert_eq!(
            dir.delete_room(&r),
            Err(EngineError::CantDeleteRoom(DeleteRefusal::RoomDoesNotExist))
        );

        dir.create_room(p(1), RoomId::new("Empty")).unwrap();
        assert_eq!(dir.delete_room(&RoomId::new("Empty")), Ok(()));
    }

    #[test]
    fn test_set_roles_accepts_undeclared_by_default() {
        let mut dir = directory();
        let problem = problem();
        dir.join_room(p(1), &RoomId::new("R"), None).unwrap();

        let roles = RoleSet::single(RoleIndex::new(5));
        assert_eq!(dir.set_roles(p(1), roles.clone(), problem.roles()), Ok(RoomId::new("R")));
        assert_eq!(dir.participant(p(1)).unwrap().roles, roles);
    }

    #[test]
    fn test_set_roles_requires_room_and_known_roles() {
        let mut dir = SessionDirectory::<Count>::new(EngineConfig::default().with_strict_roles(true));
        for n in 1..=3 {
            dir.connect(p(n));
        }
        dir.create_room(p(1), RoomId::new("R")).unwrap();
        let problem = problem();
        let roles = RoleSet::single(RoleIndex::new(0));

        assert_eq!(
            dir.set_roles(p(1), roles.clone(), problem.roles()),
            Err(EngineError::NotInARoom)
        );

        dir.join_room(p(1), &RoomId::new("R"), None).unwrap();
        assert_eq!(
            dir.set_roles(p(1), RoleSet::single(RoleIndex::new(5)), problem.roles()),
            Err(EngineError::InvalidRoles("Unknown role 5".into()))
        );
        assert_eq!(dir.set_roles(p(1), roles.clone(), problem.roles()), Ok(RoomId::new("R")));
        assert_eq!(dir.participant(p(1)).unwrap().roles, roles);
    }

    #[test]
    fn test_start_game_validates_roles() {
        let mut dir = directory();
        let problem = problem();
        let r = RoomId::new("R");
        dir.join_room(p(1), &r, None).unwrap();
        dir.join_room(p(2), &r, None).unwrap();
        dir.set_roles(p(1), RoleSet::single(RoleIndex::new(0)), problem.roles()).unwrap();
        dir.set_roles(p(2), RoleSet::single(RoleIndex::new(0)), problem.roles()).unwrap();

        assert_eq!(
            dir.start_game(&r, &problem, None).map(|_| ()),
            Err(EngineError::InvalidRoles("Too many players for role Left".into()))
        );
        assert!(dir.game_of(p(1)).is_none());

        dir.set_roles(p(2), RoleSet::single(RoleIndex::new(1)), problem.roles()).unwrap();
        let game = dir.start_game(&r, &problem, None).unwrap();
        assert_eq!(game.step(), 0);
        assert_eq!(game.roles_of(p(2)), RoleSet::single(RoleIndex::new(1)));

        assert_eq!(
            dir.start_game(&r, &problem, None).map(|_| ()),
            Err(EngineError::GameAlreadyStarted)
        );
    }

    #[test]
    fn test_custom_role_check_runs_first() {
        let mut dir = directory();
        let problem = Problem::builder("Solo")
            .initial_state(Count(0))
            .role(Role::exactly_one("Left"))
            .role_validator(|sets| (sets.len() != 1).then(|| "Solo game".to_string()))
            .build();
        let r = RoomId::new("R");
        dir.join_room(p(1), &r, None).unwrap();
        dir.join_room(p(2), &r, None).unwrap();

        assert_eq!(
            dir.start_game(&r, &problem, None).map(|_| ()),
            Err(EngineError::InvalidRoles("Solo game".into()))
        );

        dir.leave_room(p(2)).unwrap();
        assert_eq!(
            dir.start_game(&r, &problem, None).map(|_| ()),
            Err(EngineError::InvalidRoles("Not enough players for role Left".into()))
        );
        dir.set_roles(p(1), RoleSet::single(RoleIndex::new(0)), problem.roles()).unwrap();
        assert!(dir.start_game(&r, &problem, None).is_ok());
    }

    #[test]
    fn test_roles_propagate_into_running_game() {
        let mut dir = directory();
        let problem = Problem::builder("Free")
            .initial_state(Count(0))
            .operator(Operator::new("Up", |c: &Count| Count(c.0 + 1)))
            .build();
        let r = RoomId::new("R");
        dir.join_room(p(1), &r, None).unwrap();
        dir.start_game(&r, &problem, None).unwrap();

        dir.set_roles(p(1), RoleSet::single(RoleIndex::new(3)), problem.roles()).unwrap();
        assert_eq!(
            dir.game_of(p(1)).map(|g| g.roles_of(p(1))),
            Some(RoleSet::single(RoleIndex::new(3)))
        );

        let game = dir.game_of_mut(p(1)).unwrap();
        game.apply(&problem, p(1), OperatorIndex::new(0), None).unwrap();
        assert_eq!(dir.game_of(p(1)).map(GameSession::step), Some(1));
    }

    #[test]
    fn test_locked_roles_reject_mid_game_changes() {
        let mut dir = SessionDirectory::<Count>::new(EngineConfig::default().with_locked_roles(true));
        let problem = problem();
        let r = RoomId::new("R");
        dir.connect(p(1));
        dir.connect(p(2));
        dir.create_room(p(1), r.clone()).unwrap();
        dir.join_room(p(1), &r, None).unwrap();
        dir.join_room(p(2), &r, None).unwrap();
        dir.set_roles(p(1), RoleSet::single(RoleIndex::new(0)), problem.roles()).unwrap();
        dir.set_roles(p(2), RoleSet::single(RoleIndex::new(1)), problem.roles()).unwrap();
        dir.start_game(&r, &problem, None).unwrap();

        assert_eq!(
            dir.set_roles(p(1), RoleSet::single(RoleIndex::new(1)), problem.roles()),
            Err(EngineError::GameAlreadyStarted)
        );
        assert_eq!(dir.participant(p(1)).unwrap().roles, RoleSet::single(RoleIndex::new(0)));
    }

    #[test]
    fn test_rooms_sorted() {
        let mut dir = directory();
        dir.create_room(p(1), RoomId::new("B")).unwrap();
        dir.create_room(p(1), RoomId::new("A")).unwrap();

        let ids: Vec<_> = dir.rooms().iter().map(|r| r.id().as_str().to_string()).collect();
        assert_eq!(ids, vec!["A", "B", "R"]);
    }
}
