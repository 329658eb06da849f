//! Thread-safe handle for transports that serve participants in parallel.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::core::ProblemState;

use super::context::ServerContext;
use super::events::Dispatch;

/// A [`ServerContext`] behind one lock.
///
/// Every request, disconnects included, runs under the lock, so requests
/// are linearized: two operator requests for the same room can never
/// interleave their read-modify-write of the session.
pub struct SharedServer<S> {
    inner: Arc<Mutex<ServerContext<S>>>,
}

impl<S> Clone for SharedServer<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ProblemState> SharedServer<S> {
    pub fn new(context: ServerContext<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(context)),
        }
    }

    /// Lock the context for a sequence of calls.
    pub fn lock(&self) -> MutexGuard<'_, ServerContext<S>> {
        self.inner.lock()
    }

    /// Run one request and collect the events it queued.
    ///
    /// Events queued by earlier requests and not yet drained are returned
    /// too, ahead of this request's.
    pub fn handle<R>(&self, request: impl FnOnce(&mut ServerContext<S>) -> R) -> (R, Vec<Dispatch>) {
        let mut context = self.lock();
        let result = request(&mut context);
        let events = context.drain_events();
        (result, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EngineConfig, OperatorIndex, ParticipantId};
    use crate::problem::{Operator, Problem};
    use crate::server::ServerEvent;
    use std::fmt;
    use std::thread;

    #[derive(Clone, Debug, PartialEq)]
    struct Hits(u32);

    impl fmt::Display for Hits {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{} hits", self.0)
        }
    }

    impl ProblemState for Hits {
        fn is_goal(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_concurrent_applies_are_serialized() {
        let problem = Problem::builder("Hits")
            .initial_state(Hits(0))
            .operator(Operator::new("Hit", |h: &Hits| Hits(h.0 + 1)))
            .build();
        let server = SharedServer::new(ServerContext::new(problem, EngineConfig::default()));

        {
            let mut context = server.lock();
            for n in 0..4 {
                context.connect(ParticipantId::new(n));
            }
            context.create_room(ParticipantId::new(0), "R").unwrap();
            for n in 0..4 {
                context.join_room(ParticipantId::new(n), "R", None).unwrap();
            }
            context.start_game("R", None).unwrap();
        }

        let workers: Vec<_> = (0..4)
            .map(|n| {
                let server = server.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        let (result, _) = server.handle(|ctx| {
                            ctx.choose_operator(ParticipantId::new(n), OperatorIndex::new(0), None)
                        });
                        result.unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let context = server.lock();
        let game = context.directory().game_of(ParticipantId::new(0)).unwrap();
        assert_eq!(game.step(), 100);
        assert_eq!(game.history().len(), 100);
        assert_eq!(game.current_state(), &Hits(100));
        for (k, state) in game.history().iter().enumerate() {
            assert_eq!(state, &Hits(k as u32));
        }
    }

    #[test]
    fn test_handle_returns_events() {
        let problem = Problem::builder("Hits").initial_state(Hits(0)).build();
        let server = SharedServer::new(ServerContext::new(problem, EngineConfig::default()));

        let ((), events) = server.handle(|ctx| ctx.connect(ParticipantId::new(5)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, ServerEvent::YourId { id: ParticipantId::new(5) });
    }
}
