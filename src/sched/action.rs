//! Schedule actions: immutable trace records of scheduling decisions.
//!
//! Every decision a group's scheduler makes can be pushed to trace
//! observers as a [`ScheduleAction`]. Actions are value records: construction
//! is the only mutation, and they exist purely for observability — removing
//! every observer changes nothing about runtime semantics.
//!
//! The variant set is deliberately closed: a trace consumer that matches on
//! it exhaustively keeps working as the runtime evolves, because growing the
//! set is an explicit, breaking decision.

use crate::types::{CogId, TaskId};
use core::fmt;

/// An immutable record of one scheduling decision.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScheduleAction {
    /// A task was granted control in a group.
    ScheduleTask {
        /// The group the decision concerns.
        cog: CogId,
        /// The task that was chosen.
        task: TaskId,
    },
}

impl ScheduleAction {
    /// Returns the group this action concerns.
    #[must_use]
    pub const fn cog(&self) -> CogId {
        match self {
            Self::ScheduleTask { cog, .. } => *cog,
        }
    }

    /// Returns the task this action concerns, where applicable.
    #[must_use]
    pub const fn task(&self) -> Option<TaskId> {
        match self {
            Self::ScheduleTask { task, .. } => Some(*task),
        }
    }

    /// Compact single-token form for dense trace rendering, e.g. `C3`.
    #[must_use]
    pub fn short_string(&self) -> String {
        self.cog().to_string()
    }
}

impl fmt::Display for ScheduleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScheduleTask { cog, task } => {
                write!(f, "Schedule task {task} in {cog}")
            }
        }
    }
}
