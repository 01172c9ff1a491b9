//! Identifier types for runtime entities.
//!
//! These types provide type-safe, process-unique identifiers for the three
//! kinds of runtime entities: concurrent object groups, active objects, and
//! tasks. Each kind draws from its own atomic counter, so allocation is safe
//! when many groups create objects and tasks concurrently, and an id is
//! never reused within a process.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static COG_COUNTER: AtomicU64 = AtomicU64::new(1);
static OBJECT_COUNTER: AtomicU64 = AtomicU64::new(1);
static TASK_COUNTER: AtomicU64 = AtomicU64::new(1);

/// A unique identifier for a concurrent object group.
///
/// Groups are the unit of exclusive execution and object ownership.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CogId(u64);

impl CogId {
    /// Allocates the next process-unique group id.
    #[must_use]
    pub fn next() -> Self {
        Self(COG_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Creates an id with a fixed value, for tests that don't care about
    /// allocation order.
    #[doc(hidden)]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for CogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CogId({})", self.0)
    }
}

impl fmt::Display for CogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// A unique identifier for an active object.
///
/// Object identity is stable for the object's lifetime and independent of
/// its field contents; equality and observability key off this id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(u64);

impl ObjectId {
    /// Allocates the next process-unique object id.
    #[must_use]
    pub fn next() -> Self {
        Self(OBJECT_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Creates an id with a fixed value, for tests.
    #[doc(hidden)]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O{}", self.0)
    }
}

/// A unique identifier for a task.
///
/// Each asynchronous method invocation gets a fresh task id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskId(u64);

impl TaskId {
    /// Allocates the next process-unique task id.
    #[must_use]
    pub fn next() -> Self {
        Self(TASK_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Creates an id with a fixed value, for tests.
    #[doc(hidden)]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskId({})", self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}
