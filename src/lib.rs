//! Cogsim: a simulation runtime for concurrent object groups.
//!
//! # Overview
//!
//! Cogsim is the concurrency runtime of an actor-based modeling language.
//! Active objects live in concurrent object groups (COGs); each group hosts
//! a set of objects sharing one logical thread of control. Asynchronous
//! method invocations become tasks; at every suspension point (blocking on
//! a future, awaiting a guard) control returns to the group's scheduler,
//! which consults a pluggable [`sched::SchedulingStrategy`] to pick the
//! next runnable task. The same program can therefore be executed under
//! many interleavings — random, round-robin, or externally scripted for
//! model checking and replay — without touching its method bodies.
//!
//! # Core guarantees
//!
//! - **Single active task**: at most one task per group is RUNNING at any
//!   instant; scheduling rounds for one group are strictly serialized.
//! - **Absorbing completion**: a FINISHED task never re-enters the
//!   runnable pool; its result future resolves exactly once.
//! - **Strategy closure**: a strategy's choice is always a member of the
//!   candidate set it was handed; anything else is a fatal contract breach.
//! - **Replayability**: the random strategy draws from a seeded
//!   deterministic generator and logs its seed, so a failing run can be
//!   replayed bit-for-bit by fixing the seed (see
//!   [`config::ENV_SCHEDULER_SEED`]).
//!
//! # Module structure
//!
//! - [`types`]: identifiers and runtime values
//! - [`class`]: class descriptors and opaque method closures
//! - [`object`]: active objects (fields, dispatch, reclassification)
//! - [`future`]: single-assignment result slots
//! - [`task`]: task records, steps, wait conditions
//! - [`sched`]: per-group schedulers, strategies, trace actions
//! - [`cog`]: concurrent object groups
//! - [`runtime`]: the construction root
//! - [`config`]: configuration and environment overrides
//! - [`observe`]: lifecycle and trace observer interfaces
//! - [`error`]: error types
//! - [`util`]: deterministic RNG
//!
//! # Example
//!
//! ```
//! use cogsim::class::ClassBuilder;
//! use cogsim::config::{RuntimeConfig, StrategyKind};
//! use cogsim::runtime::Runtime;
//! use cogsim::types::Value;
//!
//! let runtime = Runtime::with_config(
//!     RuntimeConfig::new().with_strategy(StrategyKind::RoundRobin),
//! );
//! let cog = runtime.new_cog();
//!
//! let counter = ClassBuilder::new("Counter")
//!     .param("n")
//!     .simple_method("incr", |this, _args| {
//!         let n = this.get_field("n")?.as_int().unwrap_or(0);
//!         this.set_field("n", Value::Int(n + 1));
//!         Ok(Value::Int(n + 1))
//!     })
//!     .build();
//!
//! let obj = cog.new_object(counter, vec![Value::Int(0)]).unwrap();
//! let fut = cog.async_call(&obj, "incr", vec![]).unwrap();
//! assert_eq!(fut.wait(), Ok(Value::Int(1)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod class;
pub mod cog;
pub mod config;
pub mod error;
pub mod future;
pub mod object;
pub mod observe;
pub mod runtime;
pub mod sched;
pub mod task;
pub mod types;
pub mod util;

pub use class::{ClassBuilder, ClassDescriptor, MethodClosure};
pub use cog::Cog;
pub use config::{RuntimeConfig, StrategyKind};
pub use error::RuntimeError;
pub use future::{Fut, TaskOutcome};
pub use object::{ActiveObject, ObjectRef};
pub use observe::{LifecycleObserver, Observers, TraceBuffer, TraceObserver};
pub use runtime::Runtime;
pub use sched::{
    RandomStrategy, RoundRobinStrategy, ScheduleAction, SchedulingStrategy, ScriptedStrategy,
    TaskScheduler,
};
pub use task::{Step, Task, TaskInfo, TaskState, WaitCondition};
pub use types::{CogId, ObjectId, TaskId, Value};
