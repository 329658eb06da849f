//! Transition rules: narration hooks fired after a state change.
//!
//! A rule pairs a condition over `(old state, new state, operator)` with an
//! action that is either a fixed message or a function computing one from
//! the same triple.

use std::fmt;
use std::sync::Arc;

use super::operator::Operator;

/// Condition over a completed transition.
pub type TransitionCondition<S> = Arc<dyn Fn(&S, &S, &Operator<S>) -> bool + Send + Sync>;

/// Message computed from a completed transition.
pub type TransitionMessage<S> = Arc<dyn Fn(&S, &S, &Operator<S>) -> String + Send + Sync>;

/// What a rule says when it fires.
pub enum TransitionAction<S> {
    /// Used verbatim.
    Fixed(String),
    /// Invoked at evaluation time.
    Computed(TransitionMessage<S>),
}

impl<S> Clone for TransitionAction<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(text) => Self::Fixed(text.clone()),
            Self::Computed(f) => Self::Computed(Arc::clone(f)),
        }
    }
}

impl<S> fmt::Debug for TransitionAction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(text) => f.debug_tuple("Fixed").field(text).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A declared transition rule.
pub struct TransitionRule<S> {
    condition: TransitionCondition<S>,
    action: TransitionAction<S>,
}

impl<S> Clone for TransitionRule<S> {
    fn clone(&self) -> Self {
        Self {
            condition: Arc::clone(&self.condition),
            action: self.action.clone(),
        }
    }
}

impl<S> fmt::Debug for TransitionRule<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionRule")
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

impl<S> TransitionRule<S> {
    /// Rule with a fixed message.
    pub fn fixed<C>(condition: C, message: impl Into<String>) -> Self
    where
        C: Fn(&S, &S, &Operator<S>) -> bool + Send + Sync + 'static,
    {
        Self {
            condition: Arc::new(condition),
            action: TransitionAction::Fixed(message.into()),
        }
    }

    /// Rule whose message is computed from the transition.
    pub fn computed<C, M>(condition: C, message: M) -> Self
    where
        C: Fn(&S, &S, &Operator<S>) -> bool + Send + Sync + 'static,
        M: Fn(&S, &S, &Operator<S>) -> String + Send + Sync + 'static,
    {
        Self {
            condition: Arc::new(condition),
            action: TransitionAction::Computed(Arc::new(message)),
        }
    }

    /// Does this rule match the transition?
    #[must_use]
    pub fn matches(&self, old: &S, new: &S, operator: &Operator<S>) -> bool {
        (self.condition)(old, new, operator)
    }

    /// Produce this rule's message for the transition.
    #[must_use]
    pub fn message(&self, old: &S, new: &S, operator: &Operator<S>) -> String {
        match &self.action {
            TransitionAction::Fixed(text) => text.clone(),
            TransitionAction::Computed(f) => f(old, new, operator),
        }
    }

    /// The rule's action.
    #[must_use]
    pub fn action(&self) -> &TransitionAction<S> {
        &self.action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_rule() {
        let op = Operator::<i64>::new("Inc", |n| n + 1);
        let rule = TransitionRule::fixed(|old: &i64, new: &i64, _: &Operator<i64>| new > old, "went up");

        assert!(rule.matches(&1, &2, &op));
        assert!(!rule.matches(&2, &1, &op));
        assert_eq!(rule.message(&1, &2, &op), "went up");
        assert!(matches!(rule.action(), TransitionAction::Fixed(_)));
    }

    #[test]
    fn test_computed_rule_sees_triple() {
        let op = Operator::<i64>::new("Inc", |n| n + 1);
        let rule = TransitionRule::computed(
            |_: &i64, _: &i64, _: &Operator<i64>| true,
            |old: &i64, new: &i64, op: &Operator<i64>| format!("{}: {} -> {}", op.name(), old, new),
        );

        assert_eq!(rule.message(&1, &2, &op), "Inc: 1 -> 2");
        assert_eq!(format!("{:?}", rule.action()), "Computed(..)");
    }
}
