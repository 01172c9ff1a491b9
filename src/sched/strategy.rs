//! Pluggable scheduling policies.
//!
//! A [`SchedulingStrategy`] is consulted by a group's scheduler whenever
//! more than one task is runnable: given the non-empty, ordered candidate
//! snapshot, it picks exactly one. The choice must be a member of the
//! candidate set; the scheduler treats anything else as a fatal contract
//! violation.
//!
//! Strategies must be deterministic given identical internal state and
//! candidate order, or explicitly randomized from a caller-visible seed, so
//! that any failing run can be replayed bit-for-bit.
//!
//! Strategies are injected per scheduler at construction time. There is no
//! process-wide shared strategy instance; reproducibility comes from the
//! seed in [`crate::config::RuntimeConfig`], not from hidden global state.

use crate::task::TaskInfo;
use crate::types::TaskId;
use crate::util::DetRng;
use std::collections::VecDeque;
use tracing::info;

/// A policy choosing the next task to run among runnable candidates.
pub trait SchedulingStrategy: Send {
    /// Picks one of the candidates.
    ///
    /// `candidates` is never empty and its order is the scheduler's stable
    /// submission order. The returned id must identify one of the
    /// candidates.
    fn choose(&mut self, candidates: &[TaskInfo]) -> TaskId;
}

/// Uniformly random choice from a seeded deterministic generator.
///
/// The seed is logged once at construction so a failing run can be
/// reproduced by fixing the same seed in the configuration.
#[derive(Debug)]
pub struct RandomStrategy {
    rng: DetRng,
    seed: u64,
}

impl RandomStrategy {
    /// Creates a strategy from an explicit seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        info!(seed, "random scheduling strategy seed");
        Self {
            rng: DetRng::new(seed),
            seed,
        }
    }

    /// Creates a strategy seeded from a high-resolution clock reading.
    #[must_use]
    pub fn from_clock() -> Self {
        Self::new(clock_seed())
    }

    /// Returns the seed this strategy was constructed with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl SchedulingStrategy for RandomStrategy {
    fn choose(&mut self, candidates: &[TaskInfo]) -> TaskId {
        candidates[self.rng.pick_index(candidates.len())].task
    }
}

/// Derives a seed from the system clock, at nanosecond resolution.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

/// Rotating choice over the candidate order.
///
/// Deterministic with no seed: the n-th consultation picks index
/// `n mod len`. Under a stable candidate order this cycles through the
/// runnable tasks.
#[derive(Debug, Default)]
pub struct RoundRobinStrategy {
    turns: usize,
}

impl RoundRobinStrategy {
    /// Creates a strategy starting at the first candidate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulingStrategy for RoundRobinStrategy {
    fn choose(&mut self, candidates: &[TaskInfo]) -> TaskId {
        let index = self.turns % candidates.len();
        self.turns = self.turns.wrapping_add(1);
        candidates[index].task
    }
}

/// Externally-driven choice, for model checking and replay.
///
/// Decisions are fed in ahead of time as a list of task ids. Each
/// consultation consumes one scripted entry; if the entry does not name a
/// current candidate (or the script is exhausted), the first candidate is
/// chosen instead, so a partial script still yields a complete run.
#[derive(Debug, Default)]
pub struct ScriptedStrategy {
    script: VecDeque<TaskId>,
}

impl ScriptedStrategy {
    /// Creates a strategy with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a strategy from a pre-recorded decision sequence.
    #[must_use]
    pub fn from_script(script: impl IntoIterator<Item = TaskId>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Appends one decision to the script.
    pub fn push(&mut self, task: TaskId) {
        self.script.push_back(task);
    }

    /// Returns the number of unconsumed decisions.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl SchedulingStrategy for ScriptedStrategy {
    fn choose(&mut self, candidates: &[TaskInfo]) -> TaskId {
        match self.script.pop_front() {
            Some(scripted) if candidates.iter().any(|c| c.task == scripted) => scripted,
            _ => candidates[0].task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CogId, ObjectId};

    fn candidates(ids: &[u64]) -> Vec<TaskInfo> {
        ids.iter()
            .map(|&n| TaskInfo {
                task: TaskId::from_raw(n),
                cog: CogId::from_raw(1),
                object: ObjectId::from_raw(n),
                method: "run".into(),
            })
            .collect()
    }

    #[test]
    fn random_same_seed_same_choices() {
        let pool = candidates(&[1, 2, 3, 4, 5]);
        let mut a = RandomStrategy::new(0xC0FFEE);
        let mut b = RandomStrategy::new(0xC0FFEE);
        for _ in 0..50 {
            assert_eq!(a.choose(&pool), b.choose(&pool));
        }
    }

    #[test]
    fn random_choice_is_a_candidate() {
        let pool = candidates(&[10, 20, 30]);
        let mut strategy = RandomStrategy::new(7);
        for _ in 0..100 {
            let chosen = strategy.choose(&pool);
            assert!(pool.iter().any(|c| c.task == chosen));
        }
    }

    #[test]
    fn round_robin_cycles() {
        let pool = candidates(&[1, 2, 3]);
        let mut strategy = RoundRobinStrategy::new();
        assert_eq!(strategy.choose(&pool), TaskId::from_raw(1));
        assert_eq!(strategy.choose(&pool), TaskId::from_raw(2));
        assert_eq!(strategy.choose(&pool), TaskId::from_raw(3));
        assert_eq!(strategy.choose(&pool), TaskId::from_raw(1));
    }

    #[test]
    fn scripted_follows_script_then_falls_back() {
        let pool = candidates(&[1, 2, 3]);
        let mut strategy =
            ScriptedStrategy::from_script([TaskId::from_raw(3), TaskId::from_raw(99)]);
        assert_eq!(strategy.choose(&pool), TaskId::from_raw(3));
        // 99 is not a candidate: fall back to the first.
        assert_eq!(strategy.choose(&pool), TaskId::from_raw(1));
        // Script exhausted: first candidate again.
        assert_eq!(strategy.choose(&pool), TaskId::from_raw(1));
        assert_eq!(strategy.remaining(), 0);
    }
}
