//! Single-assignment result slots.
//!
//! A [`Fut`] is the result slot of one asynchronous invocation: empty until
//! resolved, resolved at most once, immutable afterwards. Readers have three
//! options, matching the three places futures are consumed:
//!
//! - [`Fut::try_get`] — non-blocking poll (guard evaluation, introspection)
//! - [`Fut::wait`] — block the calling context until resolution (the local
//!   blocking-get primitive used by synchronous dispatch and external
//!   drivers)
//! - [`Fut::on_resolved`] — a callback fired exactly once at resolution
//!   (used by schedulers to turn resolution into a ready notification)

use crate::error::RuntimeError;
use crate::types::Value;
use core::fmt;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// The outcome a task resolves its future with: the method body's return
/// value, or the failure it raised.
pub type TaskOutcome = Result<Value, RuntimeError>;

type Callback = Box<dyn FnOnce(&TaskOutcome) + Send>;

enum State {
    Pending(Vec<Callback>),
    Resolved(TaskOutcome),
}

struct Inner {
    state: Mutex<State>,
    resolved: Condvar,
}

/// A single-assignment result slot.
///
/// Cloning a `Fut` clones a handle to the same slot; equality between
/// handles is slot identity ([`Fut::same_slot`]).
#[derive(Clone)]
pub struct Fut {
    inner: Arc<Inner>,
}

impl Fut {
    /// Creates a new, unresolved future.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::Pending(Vec::new())),
                resolved: Condvar::new(),
            }),
        }
    }

    /// Resolves the future with the given outcome.
    ///
    /// Returns `true` if this call performed the resolution, `false` if the
    /// future was already resolved (the outcome is then discarded). Pending
    /// callbacks run on the calling thread, after the internal lock is
    /// released.
    pub fn resolve(&self, outcome: TaskOutcome) -> bool {
        let callbacks = {
            let mut state = self.inner.state.lock();
            match &mut *state {
                State::Resolved(_) => return false,
                State::Pending(callbacks) => {
                    let callbacks = std::mem::take(callbacks);
                    *state = State::Resolved(outcome.clone());
                    callbacks
                }
            }
        };
        self.inner.resolved.notify_all();
        for callback in callbacks {
            callback(&outcome);
        }
        true
    }

    /// Returns the outcome if the future is resolved, without blocking.
    #[must_use]
    pub fn try_get(&self) -> Option<TaskOutcome> {
        match &*self.inner.state.lock() {
            State::Resolved(outcome) => Some(outcome.clone()),
            State::Pending(_) => None,
        }
    }

    /// Returns true if the future has been resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(&*self.inner.state.lock(), State::Resolved(_))
    }

    /// Blocks the calling thread until the future is resolved, then returns
    /// the outcome.
    #[must_use]
    pub fn wait(&self) -> TaskOutcome {
        let mut state = self.inner.state.lock();
        loop {
            if let State::Resolved(outcome) = &*state {
                return outcome.clone();
            }
            self.inner.resolved.wait(&mut state);
        }
    }

    /// Registers a callback to run when the future resolves.
    ///
    /// If the future is already resolved, the callback runs immediately on
    /// the calling thread.
    pub fn on_resolved(&self, callback: impl FnOnce(&TaskOutcome) + Send + 'static) {
        let immediate = {
            let mut state = self.inner.state.lock();
            match &mut *state {
                State::Pending(callbacks) => {
                    callbacks.push(Box::new(callback));
                    None
                }
                State::Resolved(outcome) => Some((outcome.clone(), callback)),
            }
        };
        if let Some((outcome, callback)) = immediate {
            callback(&outcome);
        }
    }

    /// Returns true if `other` is a handle to the same slot.
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Fut {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Fut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_resolved() { "resolved" } else { "pending" };
        write!(f, "Fut({state})")
    }
}
