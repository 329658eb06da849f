//! Role declarations.
//!
//! Roles are declared once by the problem and never change at runtime.
//! A role's position in the catalog is its `RoleIndex`.

use serde::{Deserialize, Serialize};

/// A named category of participant with occupancy limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Display name.
    pub name: String,

    /// Minimum assignees required to start. `None` means no minimum.
    pub min: Option<u32>,

    /// Maximum assignees allowed. `None` for unbounded.
    pub max: Option<u32>,
}

impl Role {
    /// Create a role with no occupancy limits.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min: None,
            max: None,
        }
    }

    /// Create a role that must be held by exactly one participant.
    pub fn exactly_one(name: impl Into<String>) -> Self {
        Self::new(name).with_min(1).with_max(1)
    }

    /// Set the minimum number of assignees.
    #[must_use]
    pub fn with_min(mut self, min: u32) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the maximum number of assignees.
    #[must_use]
    pub fn with_max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }

    /// Is `count` below this role's minimum?
    #[must_use]
    pub fn too_few(&self, count: u32) -> bool {
        self.min.is_some_and(|min| count < min)
    }

    /// Is `count` above this role's maximum?
    #[must_use]
    pub fn too_many(&self, count: u32) -> bool {
        self.max.is_some_and(|max| count > max)
    }
}
