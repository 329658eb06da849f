//! The server context: one hosted problem, its directory and an outbox.
//!
//! Every handler takes `&mut self`, runs to completion and either returns
//! an error (having changed nothing) or commits and queues the events the
//! change produced. The transport drains the queue with
//! [`ServerContext::drain_events`] after each request.
//!
//! ## Example
//!
//! ```
//! use rust_roomplay::core::{EngineConfig, OperatorIndex, ParticipantId, ProblemState};
//! use rust_roomplay::problem::{Operator, Problem};
//! use rust_roomplay::server::ServerContext;
//! use std::fmt;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Steps(u32);
//!
//! impl fmt::Display for Steps {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "{} steps", self.0)
//!     }
//! }
//!
//! impl ProblemState for Steps {
//!     fn is_goal(&self) -> bool {
//!         self.0 >= 2
//!     }
//! }
//!
//! let problem = Problem::builder("Walk")
//!     .initial_state(Steps(0))
//!     .operator(Operator::new("Step", |s: &Steps| Steps(s.0 + 1)))
//!     .build();
//!
//! let mut server = ServerContext::new(problem, EngineConfig::default());
//! let ada = ParticipantId::new(1);
//! server.connect(ada);
//! server.create_room(ada, "Park").unwrap();
//! server.join_room(ada, "Park", Some("Ada".into())).unwrap();
//! server.start_game_for(ada, None).unwrap();
//!
//! let outcome = server.choose_operator(ada, OperatorIndex::new(0), None).unwrap();
//! assert_eq!(outcome.state_render, "1 steps");
//! assert!(outcome.goal_message.is_none());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{EngineConfig, OperatorIndex, ParticipantId, ProblemState, RoleIndex, RoleSet, RoomId};
use crate::directory::{Departure, Room, SessionDirectory};
use crate::error::EngineError;
use crate::problem::{ParamValue, Problem, ProblemInfo, Role};
use crate::session::GameSession;

use super::events::{
    Dispatch, OperatorCall, OperatorListing, PlayerSummary, Recipient, RoomSummary, ServerEvent,
};

/// Version of this engine, reported by [`ServerContext::info`].
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reply to an `info` request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub server_version: String,
    #[serde(flatten)]
    pub problem: ProblemInfo,
}

/// Result of starting a game.
#[derive(Clone, Debug, PartialEq)]
pub struct GameStart {
    pub room: RoomId,
    /// Rendered initial state.
    pub state_render: String,
    pub snapshot: Option<String>,
    /// Visible operators for each member, in member order.
    pub operators: Vec<(ParticipantId, Vec<OperatorListing>)>,
}

/// Result of a committed operator request.
#[derive(Clone, Debug, PartialEq)]
pub struct OperatorOutcome {
    /// Display name of the applied operator.
    pub narration: String,
    /// Rendered new state.
    pub state_render: String,
    pub snapshot: Option<String>,
    /// Transition messages, in rule declaration order.
    pub transitions: Vec<String>,
    /// Present when the goal was reached.
    pub goal_message: Option<String>,
}

/// All server-side state for one hosted problem.
#[derive(Debug)]
pub struct ServerContext<S> {
    problem: Problem<S>,
    directory: SessionDirectory<S>,
    outbox: Vec<Dispatch>,
}

impl<S: ProblemState> ServerContext<S> {
    /// Host `problem` with the given configuration.
    pub fn new(problem: Problem<S>, config: EngineConfig) -> Self {
        tracing::info!(
            problem = %problem.info().name,
            operators = problem.operator_count(),
            roles = problem.roles().len(),
            "hosting problem"
        );
        Self {
            problem,
            directory: SessionDirectory::new(config),
            outbox: Vec::new(),
        }
    }

    #[must_use]
    pub fn problem(&self) -> &Problem<S> {
        &self.problem
    }

    #[must_use]
    pub fn directory(&self) -> &SessionDirectory<S> {
        &self.directory
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        self.directory.config()
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<Dispatch> {
        std::mem::take(&mut self.outbox)
    }

    fn send(&mut self, to: Recipient, event: ServerEvent) {
        self.outbox.push(Dispatch { to, event });
    }

    // ---- connections ----

    pub fn connect(&mut self, id: ParticipantId) {
        self.directory.connect(id);
        self.send(Recipient::Participant(id), ServerEvent::YourId { id });
    }

    /// Drop a connection; leaves its room through the normal path and
    /// announces rooms whose ownership it gave up.
    pub fn disconnect(&mut self, id: ParticipantId) -> Result<(), EngineError> {
        let outcome = self.directory.disconnect(id)?;
        if let Some(departure) = outcome.departure {
            self.announce_departure(departure);
        }
        for room in outcome.handed_over {
            self.announce_room(&room);
        }
        for room in outcome.abandoned {
            self.send(Recipient::Everyone, ServerEvent::RoomDeleted { room });
        }
        Ok(())
    }

    // ---- rooms ----

    pub fn create_room(
        &mut self,
        owner: ParticipantId,
        room: impl Into<RoomId>,
    ) -> Result<(), EngineError> {
        let room = room.into();
        self.directory.create_room(owner, room.clone())?;
        self.send(Recipient::Everyone, ServerEvent::RoomCreated { room: room.clone() });
        self.announce_room(&room);
        Ok(())
    }

    pub fn delete_room(&mut self, room: impl Into<RoomId>) -> Result<(), EngineError> {
        let room = room.into();
        self.directory.delete_room(&room)?;
        self.send(Recipient::Everyone, ServerEvent::RoomDeleted { room });
        Ok(())
    }

    pub fn join_room(
        &mut self,
        id: ParticipantId,
        room: impl Into<RoomId>,
        username: Option<String>,
    ) -> Result<(), EngineError> {
        let room = room.into();
        self.directory.join_room(id, &room, username.clone())?;
        self.send(Recipient::Room(room.clone()), ServerEvent::RoomJoined { username });
        self.announce_room(&room);
        Ok(())
    }

    pub fn leave_room(&mut self, id: ParticipantId) -> Result<(), EngineError> {
        let departure = self.directory.leave_room(id)?;
        self.announce_departure(departure);
        Ok(())
    }

    pub fn set_name(&mut self, id: ParticipantId, name: Option<String>) -> Result<(), EngineError> {
        if let Some(room) = self.directory.set_name(id, name.clone())? {
            self.send(Recipient::Room(room.clone()), ServerEvent::NameChanged { id, name });
            self.announce_room(&room);
        }
        Ok(())
    }

    pub fn set_roles(
        &mut self,
        id: ParticipantId,
        roles: impl IntoIterator<Item = RoleIndex>,
    ) -> Result<(), EngineError> {
        let roles: RoleSet = roles.into_iter().collect();
        let room = self.directory.set_roles(id, roles.clone(), self.problem.roles())?;
        let username = self.directory.participant(id)?.name.clone();

        self.send(Recipient::Room(room.clone()), ServerEvent::RolesChanged { username, roles });
        self.announce_room(&room);
        Ok(())
    }

    // ---- games ----

    /// Start a game in `room`.
    ///
    /// `args` are handed to the problem's initial-state factory.
    pub fn start_game(
        &mut self,
        room: impl Into<RoomId>,
        args: Option<&Value>,
    ) -> Result<GameStart, EngineError> {
        let room = room.into();
        let game = self.directory.start_game(&room, &self.problem, args)?;
        let state = game.current_state();
        let state_render = state.to_string();
        let snapshot = state.snapshot();
        let ended = game.is_ended();

        self.send(
            Recipient::Room(room.clone()),
            ServerEvent::GameStarted {
                message: state_render.clone(),
                state: snapshot.clone(),
            },
        );
        self.announce_room(&room);

        let operators = self.member_operators(&room);
        if ended {
            self.announce_goal(&room);
        } else {
            self.send_operators(&operators);
        }

        Ok(GameStart {
            room,
            state_render,
            snapshot,
            operators,
        })
    }

    /// Start a game in the participant's room.
    pub fn start_game_for(
        &mut self,
        id: ParticipantId,
        args: Option<&Value>,
    ) -> Result<GameStart, EngineError> {
        let room = self.room_id_of(id)?;
        self.start_game(room, args)
    }

    /// Apply an operator on behalf of a participant.
    pub fn choose_operator(
        &mut self,
        id: ParticipantId,
        op_no: OperatorIndex,
        args: Option<&[ParamValue]>,
    ) -> Result<OperatorOutcome, EngineError> {
        let room = self.room_id_of(id)?;
        let game = self.directory.game_of_mut(id).ok_or(EngineError::GameNotStarted)?;

        let applied = match game.apply(&self.problem, id, op_no, args) {
            Ok(applied) => applied,
            Err(err) => {
                tracing::debug!(room = %room, participant = %id, error = %err, "operator rejected");
                return Err(err.into());
            }
        };
        let state = game.current_state();
        let state_render = state.to_string();
        let snapshot = state.snapshot();

        for message in &applied.transitions {
            self.send(
                Recipient::Room(room.clone()),
                ServerEvent::Transition { message: message.clone() },
            );
        }
        self.send(
            Recipient::Room(room.clone()),
            ServerEvent::OperatorApplied {
                message: state_render.clone(),
                state: snapshot.clone(),
                operator: OperatorCall {
                    name: applied.name.clone(),
                    op_no,
                    params: applied.params.as_ref().map(|args| args.to_vec()),
                },
            },
        );

        if applied.goal_message.is_some() {
            tracing::info!(room = %room, step = applied.step, "goal reached");
            self.announce_goal(&room);
        } else {
            let operators = self.member_operators(&room);
            self.send_operators(&operators);
        }

        Ok(OperatorOutcome {
            narration: applied.name,
            state_render,
            snapshot,
            transitions: applied.transitions,
            goal_message: applied.goal_message,
        })
    }

    /// Operators the participant may request now. Empty outside a game
    /// and once the game has ended.
    #[must_use]
    pub fn operators_for(&self, id: ParticipantId) -> Vec<OperatorListing> {
        match self.directory.game_of(id) {
            Some(game) => listings(&self.problem, game, id),
            None => Vec::new(),
        }
    }

    // ---- read-only ----

    #[must_use]
    pub fn list_roles(&self) -> &[Role] {
        self.problem.roles()
    }

    /// Every room, ordered by id.
    #[must_use]
    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        self.directory
            .rooms()
            .into_iter()
            .map(|room| self.summarize(room))
            .collect()
    }

    #[must_use]
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            server_version: SERVER_VERSION.to_string(),
            problem: self.problem.info().clone(),
        }
    }

    // ---- helpers ----

    fn room_id_of(&self, id: ParticipantId) -> Result<RoomId, EngineError> {
        self.directory.participant(id)?;
        self.directory
            .room_of(id)
            .map(|room| room.id().clone())
            .ok_or(EngineError::NotInARoom)
    }

    fn summarize(&self, room: &Room<S>) -> RoomSummary {
        let players = room
            .members()
            .iter()
            .filter_map(|&id| self.directory.participant(id).ok())
            .map(|p| PlayerSummary {
                id: p.id,
                name: p.name.clone(),
                roles: p.roles.clone(),
            })
            .collect();

        RoomSummary {
            room: room.id().clone(),
            owner: room.owner(),
            in_game: room.in_game(),
            players,
        }
    }

    fn announce_room(&mut self, room: &RoomId) {
        if !self.config().announce_room_changes {
            return;
        }
        if let Some(summary) = self.directory.room(room).map(|r| self.summarize(r)) {
            self.send(Recipient::Everyone, ServerEvent::RoomChanged(summary));
        }
    }

    fn announce_departure(&mut self, departure: Departure) {
        if departure.room_deleted {
            self.send(Recipient::Everyone, ServerEvent::RoomDeleted { room: departure.room });
            return;
        }
        self.send(
            Recipient::Room(departure.room.clone()),
            ServerEvent::RoomLeft { username: departure.name },
        );
        self.announce_room(&departure.room);
    }

    fn announce_goal(&mut self, room: &RoomId) {
        let message = match self.directory.room(room).and_then(Room::game) {
            Some(game) => game.current_state().goal_message(),
            None => return,
        };
        self.send(Recipient::Room(room.clone()), ServerEvent::GameEnded { message });
    }

    fn member_operators(&self, room: &RoomId) -> Vec<(ParticipantId, Vec<OperatorListing>)> {
        let Some(room) = self.directory.room(room) else {
            return Vec::new();
        };
        let Some(game) = room.game() else {
            return Vec::new();
        };
        room.members()
            .iter()
            .map(|&id| (id, listings(&self.problem, game, id)))
            .collect()
    }

    fn send_operators(&mut self, operators: &[(ParticipantId, Vec<OperatorListing>)]) {
        for (id, listing) in operators {
            self.send(
                Recipient::Participant(*id),
                ServerEvent::OperatorsAvailable { operators: listing.clone() },
            );
        }
    }
}

fn listings<S: ProblemState>(
    problem: &Problem<S>,
    game: &GameSession<S>,
    id: ParticipantId,
) -> Vec<OperatorListing> {
    let state = game.current_state();
    game.available_operators(problem, id)
        .into_iter()
        .map(|(op_no, op)| OperatorListing {
            name: op.display_name(state),
            op_no,
            params: op.params().map(<[_]>::to_vec).unwrap_or_default(),
        })
        .collect()
}
