//! Runtime configuration.
//!
//! # Precedence
//!
//! Settings are resolved in this order (highest priority first):
//!
//! 1. **Programmatic** — values set via the builder-style setters
//! 2. **Environment** — `COGSIM_*` variables, read by
//!    [`RuntimeConfig::from_env`]
//! 3. **Defaults** — random strategy, seed derived from a high-resolution
//!    clock reading at strategy construction
//!
//! Fixing the seed makes a randomly scheduled run replayable bit-for-bit;
//! the random strategy also logs the seed it actually used, so a failing
//! unseeded run can be pinned down after the fact.

use crate::sched::strategy::{RandomStrategy, RoundRobinStrategy, SchedulingStrategy};
use tracing::warn;

/// Environment variable overriding the random strategy's seed.
pub const ENV_SCHEDULER_SEED: &str = "COGSIM_SCHEDULER_SEED";

/// Which scheduling policy new groups are constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    /// Seeded uniformly random choice (the default).
    #[default]
    Random,
    /// Deterministic rotation over the candidate order.
    RoundRobin,
}

/// Configuration consumed when constructing groups and their schedulers.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// The scheduling policy for new groups.
    pub strategy: StrategyKind,
    /// Seed for the random strategy; `None` derives one from the clock.
    pub scheduler_seed: Option<u64>,
}

impl RuntimeConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from the environment.
    ///
    /// An unparsable seed value is ignored with a warning rather than
    /// failing startup.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Ok(raw) = std::env::var(ENV_SCHEDULER_SEED) {
            match raw.parse::<u64>() {
                Ok(seed) => config.scheduler_seed = Some(seed),
                Err(_) => {
                    warn!(var = ENV_SCHEDULER_SEED, value = %raw, "ignoring unparsable scheduler seed");
                }
            }
        }
        config
    }

    /// Sets the scheduling policy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Fixes the random strategy's seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.scheduler_seed = Some(seed);
        self
    }

    /// Builds a strategy instance for one group's scheduler.
    ///
    /// Every group gets its own instance (no shared mutable state across
    /// schedulers); with a fixed seed, all groups draw the same reproducible
    /// decision sequence.
    #[must_use]
    pub(crate) fn build_strategy(&self) -> Box<dyn SchedulingStrategy> {
        match self.strategy {
            StrategyKind::Random => match self.scheduler_seed {
                Some(seed) => Box::new(RandomStrategy::new(seed)),
                None => Box::new(RandomStrategy::from_clock()),
            },
            StrategyKind::RoundRobin => Box::new(RoundRobinStrategy::new()),
        }
    }
}
