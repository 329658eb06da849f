//! Transition narration.
//!
//! After every committed state change the notifier runs the problem's
//! transition rules and collects one message per matching rule. The
//! transport turns each message into a `Transition` notification.

mod notifier;

pub use notifier::evaluate;
