//! A live game: current state, history, counters and role assignments.
//!
//! ## History
//!
//! `history[i]` is the state that was current immediately before the
//! (i+1)-th applied operator, so `history.len() == step` at all times. The
//! history is an `im::Vector`, so handing a copy to an observer is O(1).
//!
//! ## Atomic apply
//!
//! [`GameSession::apply`] validates everything first (bounds,
//! applicability, arguments) and only then commits. A rejected request
//! leaves state, history and counters untouched.

use std::fmt;

use im::Vector;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::core::{OperatorIndex, ParticipantId, ProblemState, RoleSet, RoomId};
use crate::error::InvalidOperator;
use crate::problem::{validate_args, Args, Operator, ParamValue, Problem};
use crate::rules::applicability;
use crate::transitions;

/// Result of one committed operator application.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppliedOperator {
    /// Index of the applied operator.
    pub op_no: OperatorIndex,

    /// Display name, computed from the pre-transition state.
    pub name: String,

    /// Arguments the operator was applied with.
    pub params: Option<Args>,

    /// Messages from matching transition rules, in declaration order.
    pub transitions: Vec<String>,

    /// Goal message, present when this application reached the goal.
    pub goal_message: Option<String>,

    /// Step counter after the commit.
    pub step: u32,
}

/// The live instance of a problem being played in one room.
#[derive(Clone)]
pub struct GameSession<S> {
    room: RoomId,
    current: S,
    history: Vector<S>,
    step: u32,
    depth: u32,
    roles: FxHashMap<ParticipantId, RoleSet>,
    ended: bool,
}

impl<S: fmt::Debug> fmt::Debug for GameSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("room", &self.room)
            .field("current", &self.current)
            .field("step", &self.step)
            .field("depth", &self.depth)
            .field("ended", &self.ended)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

impl<S: ProblemState> GameSession<S> {
    /// Start a session from an initial state and a role snapshot.
    ///
    /// A session whose initial state is already a goal starts ended.
    pub fn new(
        room: RoomId,
        initial: S,
        roles: impl IntoIterator<Item = (ParticipantId, RoleSet)>,
    ) -> Self {
        let ended = initial.is_goal();
        Self {
            room,
            current: initial,
            history: Vector::new(),
            step: 0,
            depth: 0,
            roles: roles.into_iter().collect(),
            ended,
        }
    }

    /// Room this session belongs to.
    #[must_use]
    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// The current state.
    #[must_use]
    pub fn current_state(&self) -> &S {
        &self.current
    }

    /// Previously-current states, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<S> {
        &self.history
    }

    /// Number of operators applied.
    #[must_use]
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Depth counter. Mirrors `step`; kept separate so bookkeeping that
    /// diverges from the step count (such as resets) has a home.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Has the goal been reached?
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Roles held by a participant in this session (empty if unknown).
    #[must_use]
    pub fn roles_of(&self, participant: ParticipantId) -> RoleSet {
        self.roles.get(&participant).cloned().unwrap_or_default()
    }

    /// Replace a participant's roles. Not re-validated.
    pub fn assign_roles(&mut self, participant: ParticipantId, roles: RoleSet) {
        self.roles.insert(participant, roles);
    }

    /// Drop a participant from the role map.
    pub fn remove_participant(&mut self, participant: ParticipantId) {
        self.roles.remove(&participant);
    }

    /// Operators the participant may request now, in index order.
    ///
    /// Empty once the session has ended.
    pub fn available_operators<'p>(
        &self,
        problem: &'p Problem<S>,
        participant: ParticipantId,
    ) -> Vec<(OperatorIndex, &'p Operator<S>)> {
        if self.ended {
            return Vec::new();
        }
        applicability::resolve(problem.operators(), &self.current, &self.roles_of(participant))
    }

    /// Apply an operator on behalf of a participant.
    ///
    /// Errors leave the session unchanged.
    pub fn apply(
        &mut self,
        problem: &Problem<S>,
        participant: ParticipantId,
        op_no: OperatorIndex,
        args: Option<&[ParamValue]>,
    ) -> Result<AppliedOperator, InvalidOperator> {
        let operator = problem.operator(op_no).ok_or(InvalidOperator::OutOfBounds {
            index: op_no,
            count: problem.operator_count(),
        })?;

        if self.ended
            || !applicability::is_applicable(operator, &self.current, &self.roles_of(participant))
        {
            return Err(InvalidOperator::NotApplicable {
                index: op_no,
                name: operator.name().to_string(),
            });
        }

        let args = match (operator.params(), args) {
            (Some(schema), Some(args)) => {
                validate_args(schema, args).map_err(|reason| InvalidOperator::BadArguments { reason })?;
                Some(args)
            }
            _ => None,
        };

        let name = operator.display_name(&self.current);
        let next = operator.transform(&self.current, args);

        // Commit.
        let old = std::mem::replace(&mut self.current, next);
        self.step += 1;
        self.depth += 1;
        let messages = transitions::evaluate(&old, &self.current, operator, problem.transitions());
        self.history.push_back(old);

        let goal_message = if self.current.is_goal() {
            self.ended = true;
            Some(self.current.goal_message())
        } else {
            None
        };

        tracing::debug!(
            room = %self.room,
            participant = %participant,
            op = %op_no,
            step = self.step,
            ended = self.ended,
            "operator applied"
        );

        Ok(AppliedOperator {
            op_no,
            name,
            params: args.map(|a| a.iter().cloned().collect()),
            transitions: messages,
            goal_message,
            step: self.step,
        })
    }
}
