//! Gating rules applied before a request reaches a game session.
//!
//! - [`applicability`]: which operators a participant may request now
//! - [`roles`]: whether a room's role assignments allow a game to start
//!
//! Both are pure functions over the problem catalog; neither mutates
//! anything.

pub mod applicability;
pub mod roles;

pub use applicability::{is_applicable, resolve};
pub use roles::{validate_roles, RoleViolation};
