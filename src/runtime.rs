//! The process-level runtime: group registry, configuration, observers.
//!
//! A [`Runtime`] is the construction root. It holds the configuration that
//! new groups inherit, the observer registry all groups push events to, and
//! the set of groups created so far. Groups live until the runtime is
//! dropped; there is no explicit group teardown in normal operation.

use crate::cog::Cog;
use crate::config::RuntimeConfig;
use crate::observe::{LifecycleObserver, Observers, TraceObserver};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// The runtime: owns configuration, observers, and all groups.
pub struct Runtime {
    config: RuntimeConfig,
    observers: Arc<Observers>,
    cogs: Mutex<Vec<Arc<Cog>>>,
}

impl Runtime {
    /// Creates a runtime with the default configuration.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::with_config(RuntimeConfig::new())
    }

    /// Creates a runtime with an explicit configuration.
    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            observers: Arc::new(Observers::new()),
            cogs: Mutex::new(Vec::new()),
        })
    }

    /// Returns the configuration groups are constructed with.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Registers an observer for object lifecycle milestones.
    ///
    /// Observers registered after a group was created still receive that
    /// group's future events; events already emitted are not replayed.
    pub fn register_lifecycle_observer(&self, observer: Arc<dyn LifecycleObserver>) {
        self.observers.register_lifecycle(observer);
    }

    /// Registers an observer for scheduling trace actions.
    pub fn register_trace_observer(&self, observer: Arc<dyn TraceObserver>) {
        self.observers.register_trace(observer);
    }

    /// Creates a new concurrent object group.
    ///
    /// The group's scheduler gets its own strategy instance built from the
    /// runtime configuration.
    pub fn new_cog(&self) -> Arc<Cog> {
        let cog = Cog::new(self.config.build_strategy(), Arc::clone(&self.observers));
        debug!(cog = %cog.id(), "created group");
        self.cogs.lock().push(Arc::clone(&cog));
        cog
    }

    /// Returns all groups created so far.
    #[must_use]
    pub fn cogs(&self) -> Vec<Arc<Cog>> {
        self.cogs.lock().clone()
    }
}
