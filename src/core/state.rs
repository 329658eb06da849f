//! The state contract every problem plug-in satisfies.
//!
//! ## ProblemState
//!
//! A problem's state is an opaque value to the engine. The engine only
//! needs to:
//! - Compare states structurally (`PartialEq`)
//! - Keep previous states in history (`Clone`)
//! - Render the state for participants (`Display`)
//! - Ask whether the goal has been reached, and what to say when it has
//! - Optionally capture a machine-readable snapshot
//!
//! Operators never mutate a state in place. Every transformation receives
//! the current state by shared reference and returns a fresh value.

use std::fmt;

use serde::Serialize;

/// A problem state.
///
/// `Display` is the human-readable rendering sent with every state change.
pub trait ProblemState: Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Has the problem been solved (or otherwise concluded)?
    fn is_goal(&self) -> bool;

    /// Message announced when the goal is reached.
    fn goal_message(&self) -> String {
        String::new()
    }

    /// Machine-readable snapshot of the state.
    ///
    /// Returns `None` when the state has no snapshot form or capturing
    /// it failed. A missing snapshot never fails a response.
    fn snapshot(&self) -> Option<String> {
        None
    }
}

/// Serialize a value to a JSON snapshot, degrading to `None` on failure.
///
/// Plug-ins call this from `ProblemState::snapshot`.
pub fn json_snapshot<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(json) => Some(json),
        Err(err) => {
            tracing::warn!(error = %err, "state snapshot failed");
            None
        }
    }
}
