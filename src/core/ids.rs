//! Identifiers used across the engine.
//!
//! ## Participants and rooms
//!
//! - `ParticipantId`: opaque connection identity handed in by the transport.
//! - `RoomId`: externally chosen room name, unique within a server.
//!
//! ## Positional catalog indices
//!
//! - `RoleIndex`: position of a role in the problem's role catalog.
//! - `OperatorIndex`: position of an operator in the operator catalog.
//!
//! Positional indices are what travels on the wire. They are stable for
//! the lifetime of a loaded problem and are always bounds-checked before use.
//!
//! ## RoleSet
//!
//! The set of roles a participant holds. Kept sorted and deduplicated so
//! iteration order is deterministic.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Opaque participant (connection) identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl ParticipantId {
    /// Create a new participant ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Participant({})", self.0)
    }
}

/// Room identifier, chosen by whoever creates the room.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Create a new room ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the room name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of a role in the problem's role catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleIndex(pub u16);

impl RoleIndex {
    /// Create a new role index.
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Get the index as `usize` for catalog lookup.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for RoleIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Role({})", self.0)
    }
}

/// Position of an operator in the problem's operator catalog.
///
/// This is the operator's identity on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorIndex(pub u32);

impl OperatorIndex {
    /// Create a new operator index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the index as `usize` for catalog lookup.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for OperatorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Operator({})", self.0)
    }
}

/// Sorted, deduplicated set of role indices held by one participant.
///
/// Most participants hold one or two roles, so the set is inline up to four.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<RoleIndex>", into = "Vec<RoleIndex>")]
pub struct RoleSet {
    roles: SmallVec<[RoleIndex; 4]>,
}

impl RoleSet {
    /// Create an empty role set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding a single role.
    #[must_use]
    pub fn single(role: RoleIndex) -> Self {
        let mut roles = SmallVec::new();
        roles.push(role);
        Self { roles }
    }

    /// Insert a role. Returns false if it was already present.
    pub fn insert(&mut self, role: RoleIndex) -> bool {
        match self.roles.binary_search(&role) {
            Ok(_) => false,
            Err(pos) => {
                self.roles.insert(pos, role);
                true
            }
        }
    }

    /// Check whether the set holds a role.
    #[must_use]
    pub fn contains(&self, role: RoleIndex) -> bool {
        self.roles.binary_search(&role).is_ok()
    }

    /// Number of roles held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// True when no role is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Iterate roles in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = RoleIndex> + '_ {
        self.roles.iter().copied()
    }

    /// Borrow the roles as a sorted slice.
    #[must_use]
    pub fn as_slice(&self) -> &[RoleIndex] {
        &self.roles
    }
}

impl FromIterator<RoleIndex> for RoleSet {
    fn from_iter<I: IntoIterator<Item = RoleIndex>>(iter: I) -> Self {
        let mut roles: SmallVec<[RoleIndex; 4]> = iter.into_iter().collect();
        roles.sort_unstable();
        roles.dedup();
        Self { roles }
    }
}

impl From<Vec<RoleIndex>> for RoleSet {
    fn from(roles: Vec<RoleIndex>) -> Self {
        roles.into_iter().collect()
    }
}

impl From<RoleSet> for Vec<RoleIndex> {
    fn from(set: RoleSet) -> Self {
        set.roles.into_vec()
    }
}
