//! Applicability resolution.
//!
//! Given a state and a participant's role set, compute which operators the
//! participant may request right now.
//!
//! - Empty role set: an operator is included iff its predicate holds with
//!   no role (the global check).
//! - Non-empty role set: an operator is included iff its predicate holds
//!   for at least one held role. A participant holding several roles sees
//!   the union of what each role could do.
//!
//! Results are in operator-index order, which is also the order sent on the
//! wire; the same state and role set always produce the same list.

use crate::core::{OperatorIndex, RoleSet};
use crate::problem::Operator;

/// Is `operator` applicable in `state` for a participant holding `roles`?
#[must_use]
pub fn is_applicable<S>(operator: &Operator<S>, state: &S, roles: &RoleSet) -> bool {
    if roles.is_empty() {
        return operator.is_applicable(state, None);
    }
    roles.iter().any(|role| operator.is_applicable(state, Some(role)))
}

/// All operators applicable in `state` for `roles`, in index order.
pub fn resolve<'a, S>(
    operators: &'a [Operator<S>],
    state: &S,
    roles: &RoleSet,
) -> Vec<(OperatorIndex, &'a Operator<S>)> {
    operators
        .iter()
        .enumerate()
        .filter(|(_, op)| is_applicable(op, state, roles))
        .map(|(i, op)| (OperatorIndex::new(i as u32), op))
        .collect()
}
