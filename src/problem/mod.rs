//! Problem plug-in contract.
//!
//! A problem is everything the engine needs to host a game:
//! - A state type implementing [`ProblemState`](crate::core::ProblemState)
//! - An operator catalog (positional, stable)
//! - A role catalog (possibly empty)
//! - Transition rules (possibly empty)
//! - A way to produce the initial state
//! - Optionally, a custom role check run at game start
//! - Descriptive metadata
//!
//! Problems are compiled in and registered at startup through
//! [`ProblemBuilder`]. Every optional hook is an `Option` resolved when the
//! problem is built, never looked up per call.
//!
//! ## Example
//!
//! ```
//! use rust_roomplay::problem::{Operator, Problem, Role};
//!
//! let problem = Problem::builder("Counter")
//!     .initial_state(0i64)
//!     .operator(Operator::new("Increment", |n: &i64| n + 1))
//!     .role(Role::exactly_one("Counter"))
//!     .build();
//!
//! assert_eq!(problem.operator_count(), 1);
//! assert_eq!(problem.initial_state(None), 0);
//! ```

mod operator;
mod param;
mod role;
mod transition;

pub use operator::{NameFn, Operator, ParamTransform, Precondition, Transform};
pub use param::{validate_args, Args, ParamKind, ParamSpec, ParamValue};
pub use role::Role;
pub use transition::{TransitionAction, TransitionCondition, TransitionMessage, TransitionRule};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{OperatorIndex, RoleIndex, RoleSet};

/// Descriptive metadata about a problem.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemInfo {
    pub name: String,
    pub version: String,
    pub authors: Vec<String>,
    pub creation_date: String,
    pub description: String,
}

impl ProblemInfo {
    /// Metadata with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Factory producing an initial state from optional start arguments.
pub type StateFactory<S> = Arc<dyn Fn(Option<&Value>) -> S + Send + Sync>;

/// Custom role check: the members' role sets in member order, `Some(reason)`
/// to refuse the start.
pub type RoleValidator = Arc<dyn Fn(&[RoleSet]) -> Option<String> + Send + Sync>;

/// How a new session obtains its first state.
pub enum InitialState<S> {
    /// The same canned state for every session.
    Canned(S),
    /// Built per session, optionally from start-game arguments.
    Factory(StateFactory<S>),
}

impl<S: Clone> Clone for InitialState<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Canned(state) => Self::Canned(state.clone()),
            Self::Factory(f) => Self::Factory(Arc::clone(f)),
        }
    }
}

/// A loaded problem definition.
pub struct Problem<S> {
    info: ProblemInfo,
    operators: Vec<Operator<S>>,
    roles: Vec<Role>,
    transitions: Vec<TransitionRule<S>>,
    initial: InitialState<S>,
    role_validator: Option<RoleValidator>,
}

impl<S> fmt::Debug for Problem<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("info", &self.info)
            .field("operators", &self.operators)
            .field("roles", &self.roles)
            .field("transitions", &self.transitions.len())
            .field("role_validator", &self.role_validator.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: Clone> Clone for Problem<S> {
    fn clone(&self) -> Self {
        Self {
            info: self.info.clone(),
            operators: self.operators.clone(),
            roles: self.roles.clone(),
            transitions: self.transitions.clone(),
            initial: self.initial.clone(),
            role_validator: self.role_validator.clone(),
        }
    }
}

impl<S: Clone> Problem<S> {
    /// Start building a problem.
    pub fn builder(name: impl Into<String>) -> ProblemBuilder<S> {
        ProblemBuilder::new(ProblemInfo::named(name))
    }

    /// Produce a fresh initial state.
    ///
    /// Canned states ignore `args`.
    #[must_use]
    pub fn initial_state(&self, args: Option<&Value>) -> S {
        match &self.initial {
            InitialState::Canned(state) => state.clone(),
            InitialState::Factory(factory) => factory(args),
        }
    }

    /// Problem metadata.
    #[must_use]
    pub fn info(&self) -> &ProblemInfo {
        &self.info
    }

    /// The operator catalog, in positional order.
    #[must_use]
    pub fn operators(&self) -> &[Operator<S>] {
        &self.operators
    }

    /// Look up an operator by index.
    #[must_use]
    pub fn operator(&self, index: OperatorIndex) -> Option<&Operator<S>> {
        self.operators.get(index.index())
    }

    /// Number of operators; valid indices are `0..operator_count()`.
    #[must_use]
    pub fn operator_count(&self) -> usize {
        self.operators.len()
    }

    /// The role catalog, in positional order.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Look up a role by index.
    #[must_use]
    pub fn role(&self, index: RoleIndex) -> Option<&Role> {
        self.roles.get(index.index())
    }

    /// True when the problem declares roles (and role gating applies).
    #[must_use]
    pub fn has_roles(&self) -> bool {
        !self.roles.is_empty()
    }

    /// Declared transition rules, in declaration order.
    #[must_use]
    pub fn transitions(&self) -> &[TransitionRule<S>] {
        &self.transitions
    }

    /// Run the custom role check, if the problem has one.
    #[must_use]
    pub fn check_roles(&self, assignments: &[RoleSet]) -> Option<String> {
        self.role_validator.as_ref().and_then(|check| check(assignments))
    }
}

/// Builder for [`Problem`].
pub struct ProblemBuilder<S> {
    info: ProblemInfo,
    operators: Vec<Operator<S>>,
    roles: Vec<Role>,
    transitions: Vec<TransitionRule<S>>,
    initial: Option<InitialState<S>>,
    role_validator: Option<RoleValidator>,
}

impl<S: Clone> ProblemBuilder<S> {
    /// Start from the given metadata.
    pub fn new(info: ProblemInfo) -> Self {
        Self {
            info,
            operators: Vec::new(),
            roles: Vec::new(),
            transitions: Vec::new(),
            initial: None,
            role_validator: None,
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.info.version = version.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.info.authors.push(author.into());
        self
    }

    pub fn creation_date(mut self, date: impl Into<String>) -> Self {
        self.info.creation_date = date.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.info.description = description.into();
        self
    }

    /// Append an operator. Its index is its position in append order.
    pub fn operator(mut self, operator: Operator<S>) -> Self {
        self.operators.push(operator);
        self
    }

    /// Append a role. Its index is its position in append order.
    pub fn role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    /// Append a transition rule.
    pub fn transition(mut self, rule: TransitionRule<S>) -> Self {
        self.transitions.push(rule);
        self
    }

    /// Every session starts from a clone of this state.
    pub fn initial_state(mut self, state: S) -> Self {
        self.initial = Some(InitialState::Canned(state));
        self
    }

    /// Every session starts from a state built by `factory`.
    pub fn state_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(Option<&Value>) -> S + Send + Sync + 'static,
    {
        self.initial = Some(InitialState::Factory(Arc::new(factory)));
        self
    }

    /// Add a role check run at game start before the per-role limits.
    pub fn role_validator<F>(mut self, check: F) -> Self
    where
        F: Fn(&[RoleSet]) -> Option<String> + Send + Sync + 'static,
    {
        self.role_validator = Some(Arc::new(check));
        self
    }

    /// Finish the problem.
    ///
    /// Panics if no initial state or factory was supplied; a problem
    /// without one cannot host a game.
    pub fn build(self) -> Problem<S> {
        let initial = self
            .initial
            .unwrap_or_else(|| panic!("problem {:?} has no initial state", self.info.name));

        Problem {
            info: self.info,
            operators: self.operators,
            roles: self.roles,
            transitions: self.transitions,
            initial,
            role_validator: self.role_validator,
        }
    }
}
