//! Scheduling: per-group arbiters, pluggable policies, trace actions.

pub mod action;
pub mod scheduler;
pub mod strategy;

pub use action::ScheduleAction;
pub use scheduler::TaskScheduler;
pub use strategy::{RandomStrategy, RoundRobinStrategy, SchedulingStrategy, ScriptedStrategy};
