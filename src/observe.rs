//! Observer interfaces for external tooling.
//!
//! The runtime pushes two one-way event streams to registered observers:
//! object lifecycle milestones ("created", then "initialized" — two distinct
//! events so a debugger can tell an allocated-but-unconstructed object from
//! a usable one) and [`ScheduleAction`] trace records. The core never
//! queries observers; a slow observer slows the run but cannot change its
//! semantics.

use crate::sched::action::ScheduleAction;
use crate::types::{CogId, ObjectId};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Receives object lifecycle milestones.
///
/// Both methods default to no-ops so observers can subscribe to a single
/// milestone.
pub trait LifecycleObserver: Send + Sync {
    /// An object was allocated and its constructor arguments stored.
    fn object_created(&self, cog: CogId, object: ObjectId) {
        let _ = (cog, object);
    }

    /// The object's constructor body ran to completion; ordinary dispatch
    /// is legal from this point on.
    fn object_initialized(&self, cog: CogId, object: ObjectId) {
        let _ = (cog, object);
    }
}

/// Receives scheduling decisions as immutable trace records.
pub trait TraceObserver: Send + Sync {
    /// A scheduling decision was made.
    fn schedule_action(&self, action: &ScheduleAction);
}

/// Registry fanning events out to all registered observers.
///
/// Shared by the runtime, its groups, and their schedulers. Registration is
/// append-only.
#[derive(Default)]
pub struct Observers {
    lifecycle: RwLock<Vec<Arc<dyn LifecycleObserver>>>,
    trace: RwLock<Vec<Arc<dyn TraceObserver>>>,
}

impl Observers {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a lifecycle observer.
    pub fn register_lifecycle(&self, observer: Arc<dyn LifecycleObserver>) {
        self.lifecycle.write().push(observer);
    }

    /// Registers a trace observer.
    pub fn register_trace(&self, observer: Arc<dyn TraceObserver>) {
        self.trace.write().push(observer);
    }

    pub(crate) fn notify_object_created(&self, cog: CogId, object: ObjectId) {
        for observer in self.lifecycle.read().iter() {
            observer.object_created(cog, object);
        }
    }

    pub(crate) fn notify_object_initialized(&self, cog: CogId, object: ObjectId) {
        for observer in self.lifecycle.read().iter() {
            observer.object_initialized(cog, object);
        }
    }

    pub(crate) fn notify_schedule_action(&self, action: &ScheduleAction) {
        for observer in self.trace.read().iter() {
            observer.schedule_action(action);
        }
    }

    pub(crate) fn has_trace_observers(&self) -> bool {
        !self.trace.read().is_empty()
    }
}

/// A trace observer that records every action in memory.
///
/// Useful in tests and as the capture side of replay tooling.
#[derive(Default)]
pub struct TraceBuffer {
    actions: Mutex<Vec<ScheduleAction>>,
}

impl TraceBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded actions, in emission order.
    #[must_use]
    pub fn actions(&self) -> Vec<ScheduleAction> {
        self.actions.lock().clone()
    }

    /// Returns the number of recorded actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.lock().len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.lock().is_empty()
    }
}

impl TraceObserver for TraceBuffer {
    fn schedule_action(&self, action: &ScheduleAction) {
        self.actions.lock().push(action.clone());
    }
}
