//! Engine configuration.
//!
//! The engine is configured once at startup. Every field has a default,
//! so a transport can start from `EngineConfig::default()` and override
//! only what it needs, either with the `with_*` builders or by parsing a
//! JSON document.

use serde::{Deserialize, Serialize};

/// Default upper bound on room name length.
pub const DEFAULT_MAX_ROOM_ID_LEN: usize = 64;

/// Engine configuration parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum members per room. `None` for unlimited.
    pub room_capacity: Option<usize>,

    /// Reject role changes while the participant's room has a game running.
    /// When false, changes are applied to the running session without
    /// re-validating role cardinality.
    pub lock_roles_in_game: bool,

    /// Refuse role indices the problem does not declare. When false, any
    /// index is stored; role validation ignores undeclared ones.
    pub reject_unknown_roles: bool,

    /// Queue a `RoomChanged` event for everyone whenever a room's
    /// membership or game status changes.
    pub announce_room_changes: bool,

    /// Maximum room name length in bytes. Empty names are always refused.
    pub max_room_id_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            room_capacity: None,
            lock_roles_in_game: false,
            reject_unknown_roles: false,
            announce_room_changes: true,
            max_room_id_len: DEFAULT_MAX_ROOM_ID_LEN,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Limit the number of members per room.
    #[must_use]
    pub fn with_room_capacity(mut self, capacity: usize) -> Self {
        self.room_capacity = Some(capacity);
        self
    }

    /// Reject role changes during a running game.
    #[must_use]
    pub fn with_locked_roles(mut self, locked: bool) -> Self {
        self.lock_roles_in_game = locked;
        self
    }

    /// Refuse undeclared role indices in role requests.
    #[must_use]
    pub fn with_strict_roles(mut self, strict: bool) -> Self {
        self.reject_unknown_roles = strict;
        self
    }

    /// Enable or disable server-wide `RoomChanged` announcements.
    #[must_use]
    pub fn with_room_announcements(mut self, announce: bool) -> Self {
        self.announce_room_changes = announce;
        self
    }

    /// Set the maximum room name length.
    #[must_use]
    pub fn with_max_room_id_len(mut self, len: usize) -> Self {
        self.max_room_id_len = len;
        self
    }

    /// Check a proposed room name against the length limits.
    #[must_use]
    pub fn accepts_room_id(&self, id: &str) -> bool {
        !id.is_empty() && id.len() <= self.max_room_id_len
    }
}
