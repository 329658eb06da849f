//! Transition rule evaluation.

use crate::problem::{Operator, TransitionRule};

/// Evaluate every rule against a completed transition.
///
/// All matching rules contribute, in declaration order; this is not
/// first-match-wins. No rules (or no matches) yields an empty list.
pub fn evaluate<S>(
    old: &S,
    new: &S,
    operator: &Operator<S>,
    rules: &[TransitionRule<S>],
) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| rule.matches(old, new, operator))
        .map(|rule| rule.message(old, new, operator))
        .collect()
}
