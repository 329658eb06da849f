//! Role cardinality validation.
//!
//! Checked once, when a game starts, against the role sets of the room's
//! members at that instant. A participant holding several roles counts
//! once toward each of them.
//!
//! Roles are checked in declaration order and the first violation wins;
//! for a single role the minimum is checked before the maximum.

use thiserror::Error;

use crate::core::{RoleIndex, RoleSet};
use crate::problem::Role;

/// A role whose assignee count is out of bounds.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RoleViolation {
    #[error("Not enough players for role {name}")]
    TooFew {
        role: RoleIndex,
        name: String,
        count: u32,
    },
    #[error("Too many players for role {name}")]
    TooMany {
        role: RoleIndex,
        name: String,
        count: u32,
    },
}

impl RoleViolation {
    /// The offending role.
    #[must_use]
    pub fn role(&self) -> RoleIndex {
        match self {
            Self::TooFew { role, .. } | Self::TooMany { role, .. } => *role,
        }
    }
}

/// Validate role assignments against the declared catalog.
///
/// With no declared roles, validation always succeeds.
pub fn validate_roles<'a, I>(declared: &[Role], assignments: I) -> Result<(), RoleViolation>
where
    I: IntoIterator<Item = &'a RoleSet>,
{
    if declared.is_empty() {
        return Ok(());
    }

    let mut counts = vec![0u32; declared.len()];
    for set in assignments {
        for role in set.iter() {
            if let Some(count) = counts.get_mut(role.index()) {
                *count += 1;
            }
        }
    }

    for (i, (role, &count)) in declared.iter().zip(&counts).enumerate() {
        let index = RoleIndex::new(i as u16);
        if role.too_few(count) {
            return Err(RoleViolation::TooFew {
                role: index,
                name: role.name.clone(),
                count,
            });
        }
        if role.too_many(count) {
            return Err(RoleViolation::TooMany {
                role: index,
                name: role.name.clone(),
                count,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> Vec<Role> {
        vec![Role::exactly_one("North"), Role::exactly_one("South")]
    }

    fn set(roles: &[u16]) -> RoleSet {
        roles.iter().map(|&r| RoleIndex::new(r)).collect()
    }

    #[test]
    fn test_valid_assignment() {
        let assignments = [set(&[0]), set(&[1])];
        assert_eq!(validate_roles(&pair(), &assignments), Ok(()));
    }

    #[test]
    fn test_first_violation_wins() {
        // Role 0 is over max and role 1 under min; role 0 is reported.
        let assignments = [set(&[0]), set(&[0])];
        let err = validate_roles(&pair(), &assignments).unwrap_err();

        assert_eq!(err.role(), RoleIndex::new(0));
        assert!(matches!(err, RoleViolation::TooMany { count: 2, .. }));
        assert_eq!(err.to_string(), "Too many players for role North");
    }

    #[test]
    fn test_too_few() {
        let assignments = [set(&[0])];
        let err = validate_roles(&pair(), &assignments).unwrap_err();

        assert_eq!(err.role(), RoleIndex::new(1));
        assert_eq!(err.to_string(), "Not enough players for role South");
    }

    #[test]
    fn test_multi_role_participant_counts_for_each() {
        let assignments = [set(&[0, 1])];
        assert_eq!(validate_roles(&pair(), &assignments), Ok(()));
    }

    #[test]
    fn test_no_declared_roles_skips_validation() {
        let assignments = [set(&[5]), set(&[5])];
        assert_eq!(validate_roles(&[], &assignments), Ok(()));
    }

    #[test]
    fn test_unknown_role_indices_ignored() {
        let assignments = [set(&[0]), set(&[1]), set(&[7])];
        assert_eq!(validate_roles(&pair(), &assignments), Ok(()));
    }

    #[test]
    fn test_unbounded_role() {
        let roles = vec![Role::new("Crowd").with_min(1)];
        let assignments = [set(&[0]), set(&[0]), set(&[0])];
        assert_eq!(validate_roles(&roles, &assignments), Ok(()));
        assert!(validate_roles(&roles, &[] as &[RoleSet]).is_err());
    }
}
