//! Core types: identifiers and runtime values.

pub mod id;
pub mod value;

pub use id::{CogId, ObjectId, TaskId};
pub use value::Value;
