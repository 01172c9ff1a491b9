//! Per-group task scheduler.
//!
//! One [`TaskScheduler`] per concurrent object group enforces the group's
//! core invariant: at most one of its tasks is RUNNING at any instant. All
//! runnable-pool and active-slot mutation happens under the group lock, and
//! a drain flag guarantees that scheduling rounds for one group are strictly
//! serialized even when several threads poke the scheduler at once — the
//! thread that owns the drain loop runs rounds until the group is idle,
//! everyone else only deposits work.
//!
//! A scheduling round: promote suspended tasks whose guard now holds,
//! snapshot the READY set, pick one (the strategy decides when there is more
//! than one), emit a [`ScheduleAction`], and execute the task's continuation
//! on the draining thread. The resulting [`Step`] is fed back through
//! [`TaskScheduler::on_suspend`] or [`TaskScheduler::on_finish`].

use crate::future::TaskOutcome;
use crate::observe::Observers;
use crate::sched::action::ScheduleAction;
use crate::sched::strategy::SchedulingStrategy;
use crate::task::{Continuation, Step, Task, TaskState, WaitCondition};
use crate::types::{CogId, TaskId};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, trace};

struct Pools {
    /// All tasks ever submitted to this group, for introspection.
    tasks: Vec<Arc<Task>>,
    /// READY tasks in stable submission order.
    ready: Vec<Arc<Task>>,
    /// SUSPENDED tasks with their parked wait conditions.
    suspended: Vec<Arc<Task>>,
    /// The task currently granted control, if any.
    running: Option<TaskId>,
    /// True while some thread owns the drain loop.
    draining: bool,
}

/// The per-group arbiter driving the suspend/resume protocol.
pub struct TaskScheduler {
    cog: CogId,
    /// Self-handle for the wake-up callbacks registered on futures.
    me: std::sync::Weak<TaskScheduler>,
    strategy: Mutex<Box<dyn SchedulingStrategy>>,
    observers: Arc<Observers>,
    pools: Mutex<Pools>,
}

impl TaskScheduler {
    /// Creates a scheduler for the given group with an injected strategy.
    #[must_use]
    pub fn new(
        cog: CogId,
        strategy: Box<dyn SchedulingStrategy>,
        observers: Arc<Observers>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            cog,
            me: me.clone(),
            strategy: Mutex::new(strategy),
            observers,
            pools: Mutex::new(Pools {
                tasks: Vec::new(),
                ready: Vec::new(),
                suspended: Vec::new(),
                running: None,
                draining: false,
            }),
        })
    }

    /// Returns the group this scheduler arbitrates.
    #[must_use]
    pub fn cog(&self) -> CogId {
        self.cog
    }

    /// Adds a freshly created READY task to the group's runnable pool.
    ///
    /// Does not start a scheduling round by itself; callers kick an idle
    /// group with [`TaskScheduler::run_until_idle`] when they want the task
    /// executed eagerly.
    pub fn submit(&self, task: Arc<Task>) {
        debug_assert_eq!(task.cog(), self.cog, "task submitted to a foreign group");
        let mut pools = self.pools.lock();
        pools.tasks.push(Arc::clone(&task));
        pools.ready.push(task);
    }

    /// Moves a SUSPENDED task whose condition now holds back to READY and,
    /// if the group has no running task, performs scheduling rounds.
    ///
    /// Called by future-resolution callbacks; unknown or already-promoted
    /// task ids are ignored (resolution and guard promotion can race
    /// benignly).
    pub fn on_ready(&self, task: TaskId) {
        {
            let mut pools = self.pools.lock();
            let Some(pos) = pools.suspended.iter().position(|t| t.id() == task) else {
                return;
            };
            let task = pools.suspended.remove(pos);
            if task.mark_ready() {
                pools.ready.push(task);
            }
        }
        self.run_until_idle();
    }

    /// Parks the running task on a wait condition and performs scheduling
    /// rounds, since the group now has no running task.
    ///
    /// For a future condition, resumption is wired up here: resolution
    /// triggers [`TaskScheduler::on_ready`]. A guard condition is
    /// re-evaluated at every subsequent scheduling round.
    pub fn on_suspend(&self, task: &Arc<Task>, wait: WaitCondition, resume: Continuation) {
        let suspended = task.mark_suspended(wait.clone(), resume);
        debug_assert!(suspended, "only the running task can suspend");
        {
            let mut pools = self.pools.lock();
            debug_assert_eq!(pools.running, Some(task.id()));
            pools.running = None;
            pools.suspended.push(Arc::clone(task));
        }
        if let WaitCondition::Resolved(fut) = wait {
            let scheduler = self.me.clone();
            let id = task.id();
            fut.on_resolved(move |_| {
                if let Some(scheduler) = scheduler.upgrade() {
                    scheduler.on_ready(id);
                }
            });
        }
        self.run_until_idle();
    }

    /// Resolves the task's future, retires it as FINISHED, and performs
    /// scheduling rounds, since the group is now idle.
    pub fn on_finish(&self, task: &Arc<Task>, outcome: TaskOutcome) {
        {
            let mut pools = self.pools.lock();
            debug_assert_eq!(pools.running, Some(task.id()));
            pools.running = None;
        }
        // Resolution runs outside the group lock: waiters in other groups
        // re-enter their schedulers from the resolution callback.
        task.finish(outcome);
        self.run_until_idle();
    }

    /// Runs scheduling rounds on the calling thread until no READY task
    /// remains.
    ///
    /// Returns immediately if another thread already owns the drain loop or
    /// a task is currently running; the owning loop will pick up any work
    /// deposited in the meantime.
    pub fn run_until_idle(&self) {
        {
            let mut pools = self.pools.lock();
            if pools.draining || pools.running.is_some() {
                return;
            }
            pools.draining = true;
        }
        loop {
            let Some(task) = self.next_round() else {
                break;
            };
            let granted = task.mark_running();
            debug_assert!(granted, "chosen task was not READY");

            let action = ScheduleAction::ScheduleTask {
                cog: self.cog,
                task: task.id(),
            };
            trace!(cog = %self.cog, task = %task.id(), "scheduling round chose task");
            if self.observers.has_trace_observers() {
                self.observers.notify_schedule_action(&action);
            }

            let resume = task
                .take_continuation()
                .expect("a READY task always has a pending continuation");
            // The body runs without the group lock held; it may submit
            // tasks, resolve futures, and re-enter this scheduler.
            match resume() {
                Ok(Step::Done(value)) => self.on_finish(&task, Ok(value)),
                Ok(Step::Suspend(wait, resume)) => self.on_suspend(&task, wait, resume),
                Err(err) => self.on_finish(&task, Err(err)),
            }
            // on_finish/on_suspend saw draining == true and returned after
            // bookkeeping; this loop remains the only round driver.
        }
    }

    /// One scheduling round: promote guards, then pick among READY tasks.
    ///
    /// Returns `None` when the group goes idle. The chosen task is recorded
    /// as the group's running task while still under the lock.
    fn next_round(&self) -> Option<Arc<Task>> {
        let mut pools = self.pools.lock();
        promote_held_guards(&mut pools);

        if pools.ready.is_empty() {
            pools.draining = false;
            return None;
        }

        let index = if pools.ready.len() == 1 {
            0
        } else {
            let candidates: Vec<_> = pools.ready.iter().map(|t| t.info()).collect();
            let chosen = self.strategy.lock().choose(&candidates);
            let Some(index) = pools.ready.iter().position(|t| t.id() == chosen) else {
                error!(cog = %self.cog, chosen = %chosen, "strategy chose a task outside the candidate set");
                panic!("scheduling strategy for {} chose {} outside the candidate set", self.cog, chosen);
            };
            index
        };

        let task = pools.ready.remove(index);
        pools.running = Some(task.id());
        Some(task)
    }

    /// Returns true if the group has no running and no ready task.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        let pools = self.pools.lock();
        pools.running.is_none() && pools.ready.is_empty()
    }

    /// Returns the id of the currently running task, if any.
    #[must_use]
    pub fn running(&self) -> Option<TaskId> {
        self.pools.lock().running
    }

    /// Returns a state snapshot of every task ever submitted to this group.
    #[must_use]
    pub fn task_states(&self) -> Vec<(TaskId, TaskState)> {
        self.pools
            .lock()
            .tasks
            .iter()
            .map(|t| (t.id(), t.state()))
            .collect()
    }

    /// Looks up a submitted task by id.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<Arc<Task>> {
        self.pools
            .lock()
            .tasks
            .iter()
            .find(|t| t.id() == id)
            .cloned()
    }
}

/// Moves suspended tasks whose condition currently holds back to READY.
///
/// Guards have no resolution callback, so this sweep at the top of every
/// round is what releases them.
fn promote_held_guards(pools: &mut Pools) {
    let mut index = 0;
    while index < pools.suspended.len() {
        let holds = pools.suspended[index]
            .wait_condition()
            .is_some_and(|cond| cond.holds());
        if holds {
            let task = pools.suspended.remove(index);
            if task.mark_ready() {
                pools.ready.push(task);
            }
        } else {
            index += 1;
        }
    }
}
