//! Error types for the runtime.
//!
//! The taxonomy follows two tiers:
//!
//! - **Usage errors** are surfaced to the triggering caller as a variant of
//!   [`RuntimeError`]: arity mismatches on construction, dispatch of an
//!   unknown method, use of an object before its constructor has run.
//! - **Contract breaches** inside the scheduler itself (a strategy choosing
//!   a task outside the candidate set, a round asked to choose from an empty
//!   set) are bugs, not conditions; they panic rather than leave a group's
//!   scheduler in an inconsistent state.
//!
//! [`RuntimeError::NoSuchField`] is deliberately a recoverable condition:
//! reading a field before its first write is distinct from reading a field
//! that holds a null-like value, and reflective callers are expected to
//! handle it.
//!
//! Errors are `Clone` because a failing task resolves its result future with
//! the error while the same error may also propagate to a synchronous
//! caller.

use crate::types::{CogId, ObjectId};
use thiserror::Error;

/// Errors produced by object construction, field access, dispatch, and
/// asynchronous calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuntimeError {
    /// Constructor argument count does not match the class parameter list.
    #[error("Arity mismatch constructing `{class}`: {expected} parameters, {given} arguments")]
    ArityMismatch {
        /// The class being constructed.
        class: String,
        /// Number of declared constructor parameters.
        expected: usize,
        /// Number of arguments supplied.
        given: usize,
    },

    /// Field read before any write for that name.
    #[error("No such field `{field}`")]
    NoSuchField {
        /// The field name that was looked up.
        field: String,
    },

    /// Method lookup failed on the receiver's class descriptor.
    #[error("Method `{method}` not found on class `{class}`")]
    MethodNotFound {
        /// The receiver's class name.
        class: String,
        /// The method name that was looked up.
        method: String,
    },

    /// Object used for dispatch before its constructor body completed.
    #[error("Object {object} used before initialization completed")]
    NotInitialized {
        /// The object that was dispatched on.
        object: ObjectId,
    },

    /// Asynchronous call targeted an object owned by a different group.
    #[error("Object {object} does not belong to group {cog}")]
    ForeignObject {
        /// The target object.
        object: ObjectId,
        /// The group the call was submitted to.
        cog: CogId,
    },

    /// An await-style guard was reached inside a synchronous call, where no
    /// scheduler can resume it.
    #[error("Await guard reached in a synchronous call")]
    GuardInSyncCall,

    /// An application-level failure raised by a method body.
    #[error("Task failed: {0}")]
    Failure(String),
}

impl RuntimeError {
    /// Shorthand for an application-level failure.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }
}
