//! Operator declarations.
//!
//! An operator is the "verb" a participant may request. It is defined by:
//! - A static name (and optionally a dynamic name computed from the state)
//! - An applicability predicate over `(state, optional role)`
//! - A pure transformation `state -> state`
//! - Optionally a parameter schema and a parameterized transformation
//!   `(state, args) -> state`
//!
//! Transformations receive the current state by reference and must return
//! a new value. The engine never hands out a mutable state.
//!
//! ## Example
//!
//! ```
//! use rust_roomplay::problem::Operator;
//! use rust_roomplay::core::RoleIndex;
//!
//! // "Increment" is open to everyone, except that role 1 may not use it.
//! let inc = Operator::<i64>::new("Increment", |n| n + 1)
//!     .with_precondition(|_, role| role != Some(RoleIndex::new(1)));
//!
//! assert_eq!(inc.transform(&41, None), 42);
//! assert!(inc.is_applicable(&0, None));
//! assert!(!inc.is_applicable(&0, Some(RoleIndex::new(1))));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::core::RoleIndex;

use super::param::{ParamSpec, ParamValue};

/// Applicability predicate. `None` role is the global/self-service check.
pub type Precondition<S> = Arc<dyn Fn(&S, Option<RoleIndex>) -> bool + Send + Sync>;

/// Plain transformation.
pub type Transform<S> = Arc<dyn Fn(&S) -> S + Send + Sync>;

/// Parameterized transformation.
pub type ParamTransform<S> = Arc<dyn Fn(&S, &[ParamValue]) -> S + Send + Sync>;

/// Dynamic display name.
pub type NameFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// A named, indexed action participants may request.
pub struct Operator<S> {
    name: String,
    precondition: Precondition<S>,
    transform: Transform<S>,
    params: Option<Vec<ParamSpec>>,
    param_transform: Option<ParamTransform<S>>,
    dynamic_name: Option<NameFn<S>>,
}

impl<S> Clone for Operator<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            precondition: Arc::clone(&self.precondition),
            transform: Arc::clone(&self.transform),
            params: self.params.clone(),
            param_transform: self.param_transform.clone(),
            dynamic_name: self.dynamic_name.clone(),
        }
    }
}

impl<S> fmt::Debug for Operator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("dynamic_name", &self.dynamic_name.is_some())
            .finish_non_exhaustive()
    }
}

impl<S> Operator<S> {
    /// Create an operator that is always applicable.
    pub fn new<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&S) -> S + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            precondition: Arc::new(|_: &S, _: Option<RoleIndex>| true),
            transform: Arc::new(transform),
            params: None,
            param_transform: None,
            dynamic_name: None,
        }
    }

    /// Set the applicability predicate (builder pattern).
    #[must_use]
    pub fn with_precondition<F>(mut self, precondition: F) -> Self
    where
        F: Fn(&S, Option<RoleIndex>) -> bool + Send + Sync + 'static,
    {
        self.precondition = Arc::new(precondition);
        self
    }

    /// Declare parameters and the transformation that consumes them
    /// (builder pattern).
    ///
    /// The plain transformation remains in use for requests without
    /// arguments.
    #[must_use]
    pub fn with_params<F>(mut self, params: Vec<ParamSpec>, transform: F) -> Self
    where
        F: Fn(&S, &[ParamValue]) -> S + Send + Sync + 'static,
    {
        self.params = Some(params);
        self.param_transform = Some(Arc::new(transform));
        self
    }

    /// Compute the display name from the state (builder pattern).
    #[must_use]
    pub fn with_dynamic_name<F>(mut self, name: F) -> Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
    {
        self.dynamic_name = Some(Arc::new(name));
        self
    }

    /// Static name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name for the given state.
    #[must_use]
    pub fn display_name(&self, state: &S) -> String {
        match &self.dynamic_name {
            Some(name) => name(state),
            None => self.name.clone(),
        }
    }

    /// Declared parameter schema, if any.
    #[must_use]
    pub fn params(&self) -> Option<&[ParamSpec]> {
        self.params.as_deref()
    }

    /// Evaluate the applicability predicate for a single role (or none).
    #[must_use]
    pub fn is_applicable(&self, state: &S, role: Option<RoleIndex>) -> bool {
        (self.precondition)(state, role)
    }

    /// Produce the successor state.
    ///
    /// Without a schema or without arguments the plain transformation is
    /// used; otherwise the arguments go to the parameterized one. Argument
    /// validation is the caller's responsibility.
    #[must_use]
    pub fn transform(&self, state: &S, args: Option<&[ParamValue]>) -> S {
        match (&self.param_transform, args) {
            (Some(transform), Some(args)) => transform(state, args),
            _ => (self.transform)(state),
        }
    }
}
