//! Tasks: the execution unit of one asynchronous method invocation.
//!
//! A task owns a result future and a continuation. Executing a task means
//! running its pending continuation, which yields a [`Step`]: either the
//! final value, or a wait condition plus the next continuation. The group's
//! scheduler interprets steps; the task itself only records state.
//!
//! # State machine
//!
//! ```text
//! Ready ──chosen──▶ Running ──suspension──▶ Suspended
//!   ▲                  │                        │
//!   └──────condition holds◀─────────────────────┘
//!                      │
//!                      └──body returns/raises──▶ Finished (absorbing)
//! ```

use crate::error::RuntimeError;
use crate::future::Fut;
use crate::object::ObjectRef;
use crate::types::{CogId, ObjectId, TaskId, Value};
use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;

/// The result of executing one slice of a task.
pub enum Step {
    /// The method body ran to completion with this value.
    Done(Value),
    /// The body reached a suspension point: it waits on `0` and resumes by
    /// running `1` once the condition holds.
    Suspend(WaitCondition, Continuation),
}

impl Step {
    /// Shorthand for a suspension on an unresolved future.
    #[must_use]
    pub fn await_fut(
        fut: Fut,
        resume: impl FnOnce() -> Result<Self, RuntimeError> + Send + 'static,
    ) -> Self {
        Self::Suspend(WaitCondition::Resolved(fut), Box::new(resume))
    }

    /// Shorthand for a suspension on a boolean guard.
    #[must_use]
    pub fn await_guard(
        guard: impl Fn() -> bool + Send + Sync + 'static,
        resume: impl FnOnce() -> Result<Self, RuntimeError> + Send + 'static,
    ) -> Self {
        Self::Suspend(WaitCondition::guard(guard), Box::new(resume))
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done(v) => f.debug_tuple("Done").field(v).finish(),
            Self::Suspend(cond, _) => f.debug_tuple("Suspend").field(cond).finish(),
        }
    }
}

/// The rest of a suspended method body, run when its wait condition holds.
pub type Continuation = Box<dyn FnOnce() -> Result<Step, RuntimeError> + Send>;

/// What a suspended task is waiting for.
///
/// These are the only two suspension points in the model: blocking on a
/// future that is not yet resolved, and an await-style guard that is
/// currently false.
#[derive(Clone)]
pub enum WaitCondition {
    /// Wait until the future is resolved.
    Resolved(Fut),
    /// Wait until the guard evaluates to true.
    Guard(Arc<dyn Fn() -> bool + Send + Sync>),
}

impl WaitCondition {
    /// Creates a guard condition from a closure.
    #[must_use]
    pub fn guard(f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self::Guard(Arc::new(f))
    }

    /// Returns true if the condition currently holds.
    #[must_use]
    pub fn holds(&self) -> bool {
        match self {
            Self::Resolved(fut) => fut.is_resolved(),
            Self::Guard(guard) => guard(),
        }
    }
}

impl fmt::Debug for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(fut) => f.debug_tuple("Resolved").field(fut).finish(),
            Self::Guard(_) => write!(f, "Guard"),
        }
    }
}

/// The lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Eligible to run, not yet granted control.
    Ready,
    /// Currently executing; at most one per group.
    Running,
    /// Blocked on a wait condition.
    Suspended,
    /// Result resolved; terminal.
    Finished,
}

impl TaskState {
    /// Returns true if the task is in its terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// An immutable descriptor of a runnable task, handed to scheduling
/// strategies as part of a candidate set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskInfo {
    /// The task's id.
    pub task: TaskId,
    /// The group the task belongs to.
    pub cog: CogId,
    /// The invocation's target object.
    pub object: ObjectId,
    /// The invoked method's name.
    pub method: String,
}

/// One asynchronous invocation's execution unit.
pub struct Task {
    id: TaskId,
    cog: CogId,
    target: ObjectRef,
    method: String,
    fut: Fut,
    state: Mutex<TaskState>,
    continuation: Mutex<Option<Continuation>>,
    wait: Mutex<Option<WaitCondition>>,
}

impl Task {
    /// Creates a fresh READY task whose first continuation runs `body`
    /// against the target object.
    #[must_use]
    pub fn new(
        cog: CogId,
        target: ObjectRef,
        method: impl Into<String>,
        body: impl FnOnce() -> Result<Step, RuntimeError> + Send + 'static,
    ) -> Arc<Self> {
        let method = method.into();
        Arc::new(Self {
            id: TaskId::next(),
            cog,
            target,
            method,
            fut: Fut::new(),
            state: Mutex::new(TaskState::Ready),
            continuation: Mutex::new(Some(Box::new(body))),
            wait: Mutex::new(None),
        })
    }

    /// Returns the task's id.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning group's id.
    #[must_use]
    pub fn cog(&self) -> CogId {
        self.cog
    }

    /// Returns the invocation's target object.
    #[must_use]
    pub fn target(&self) -> &ObjectRef {
        &self.target
    }

    /// Returns the result future.
    #[must_use]
    pub fn fut(&self) -> &Fut {
        &self.fut
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TaskState {
        *self.state.lock()
    }

    /// Returns an immutable descriptor for strategy candidate sets.
    #[must_use]
    pub fn info(&self) -> TaskInfo {
        TaskInfo {
            task: self.id,
            cog: self.cog,
            object: self.target.id(),
            method: self.method.clone(),
        }
    }

    /// READY → RUNNING. Returns true if the transition happened.
    pub fn mark_running(&self) -> bool {
        let mut state = self.state.lock();
        if *state == TaskState::Ready {
            *state = TaskState::Running;
            true
        } else {
            false
        }
    }

    /// RUNNING → SUSPENDED, parking the continuation and wait condition.
    /// Returns true if the transition happened.
    pub fn mark_suspended(&self, wait: WaitCondition, continuation: Continuation) -> bool {
        let mut state = self.state.lock();
        if *state == TaskState::Running {
            *state = TaskState::Suspended;
            *self.continuation.lock() = Some(continuation);
            *self.wait.lock() = Some(wait);
            true
        } else {
            false
        }
    }

    /// SUSPENDED → READY, clearing the wait condition. Returns true if the
    /// transition happened.
    pub fn mark_ready(&self) -> bool {
        let mut state = self.state.lock();
        if *state == TaskState::Suspended {
            *state = TaskState::Ready;
            *self.wait.lock() = None;
            true
        } else {
            false
        }
    }

    /// RUNNING → FINISHED, resolving the result future. Returns true if the
    /// transition happened; FINISHED is absorbing.
    pub fn finish(&self, outcome: Result<Value, RuntimeError>) -> bool {
        {
            let mut state = self.state.lock();
            if state.is_terminal() {
                return false;
            }
            *state = TaskState::Finished;
        }
        // Resolved outside the state lock: resolution callbacks may call
        // back into a scheduler.
        self.fut.resolve(outcome);
        true
    }

    /// Takes the pending continuation, leaving the slot empty.
    ///
    /// Only the scheduler that just granted this task control calls this.
    #[must_use]
    pub(crate) fn take_continuation(&self) -> Option<Continuation> {
        self.continuation.lock().take()
    }

    /// Returns the parked wait condition of a suspended task, if any.
    #[must_use]
    pub(crate) fn wait_condition(&self) -> Option<WaitCondition> {
        self.wait.lock().clone()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("cog", &self.cog)
            .field("method", &self.method)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
