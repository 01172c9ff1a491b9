//! Concurrent object groups.
//!
//! A [`Cog`] is the unit of exclusive execution and ownership: it owns the
//! active objects created within it and exactly one [`TaskScheduler`]
//! enforcing the single-active-task invariant. Objects never migrate
//! between groups; all cross-group interaction goes through asynchronous
//! calls and futures.
//!
//! Object creation is a two-phase protocol. [`Cog::create_object`] allocates
//! the object and stores constructor arguments into fields positionally
//! matched against the class's parameter list ("object created" milestone);
//! [`Cog::run_init`] then runs the constructor body ("object initialized").
//! Dispatching on an object between the two phases fails fast.

use crate::class::ClassDescriptor;
use crate::error::RuntimeError;
use crate::future::Fut;
use crate::object::{ActiveObject, ObjectRef};
use crate::observe::Observers;
use crate::sched::scheduler::TaskScheduler;
use crate::sched::strategy::SchedulingStrategy;
use crate::task::Task;
use crate::types::{CogId, Value};
use core::fmt;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// A concurrent object group: objects, one scheduler, one logical thread of
/// control.
pub struct Cog {
    id: CogId,
    /// Self-handle so objects can hold a non-owning back-reference.
    me: Weak<Cog>,
    scheduler: Arc<TaskScheduler>,
    objects: Mutex<Vec<ObjectRef>>,
    observers: Arc<Observers>,
}

impl Cog {
    /// Creates a group with an injected scheduling strategy.
    pub(crate) fn new(strategy: Box<dyn SchedulingStrategy>, observers: Arc<Observers>) -> Arc<Self> {
        let id = CogId::next();
        Arc::new_cyclic(|me| Self {
            id,
            me: me.clone(),
            scheduler: TaskScheduler::new(id, strategy, Arc::clone(&observers)),
            objects: Mutex::new(Vec::new()),
            observers,
        })
    }

    /// Returns the group's process-unique id.
    #[must_use]
    pub fn id(&self) -> CogId {
        self.id
    }

    /// Returns the group's scheduler, for task submission and introspection.
    #[must_use]
    pub fn scheduler(&self) -> &Arc<TaskScheduler> {
        &self.scheduler
    }

    /// Allocates an object in this group (phase one of creation).
    ///
    /// Constructor arguments are stored into fields positionally matched
    /// against the descriptor's parameter list. Fails with
    /// [`RuntimeError::ArityMismatch`] if the counts differ; no object is
    /// created in that case. Notifies observers of the "object created"
    /// milestone.
    pub fn create_object(
        &self,
        class: Arc<ClassDescriptor>,
        args: Vec<Value>,
    ) -> Result<ObjectRef, RuntimeError> {
        if args.len() != class.params().len() {
            return Err(RuntimeError::ArityMismatch {
                class: class.name().to_owned(),
                expected: class.params().len(),
                given: args.len(),
            });
        }
        let object = ActiveObject::new(self.me.clone(), self.id, Arc::clone(&class));
        for (param, value) in class.params().iter().zip(args) {
            object.set_field(param.clone(), value);
        }
        self.objects.lock().push(Arc::clone(&object));
        self.observers.notify_object_created(self.id, object.id());
        Ok(object)
    }

    /// Runs the object's constructor body (phase two of creation) and
    /// notifies the "object initialized" milestone.
    ///
    /// Must be called before any other method is dispatched on the object;
    /// until then dispatch fails with [`RuntimeError::NotInitialized`].
    pub fn run_init(&self, object: &ObjectRef) -> Result<(), RuntimeError> {
        if object.cog_id() != self.id {
            return Err(RuntimeError::ForeignObject {
                object: object.id(),
                cog: self.id,
            });
        }
        object.run_constructor()?;
        object.mark_initialized();
        self.observers.notify_object_initialized(self.id, object.id());
        Ok(())
    }

    /// Both creation phases in one call.
    pub fn new_object(
        &self,
        class: Arc<ClassDescriptor>,
        args: Vec<Value>,
    ) -> Result<ObjectRef, RuntimeError> {
        let object = self.create_object(class, args)?;
        self.run_init(&object)?;
        Ok(object)
    }

    /// Creates a task for an asynchronous method invocation on an object of
    /// this group, submits it, and kicks a scheduling round if the group is
    /// idle.
    ///
    /// Returns the task's result future. The method is resolved against the
    /// target's class descriptor both here (so unknown methods fail at the
    /// call site) and again when the task first runs (so reclassification
    /// between submission and execution takes effect).
    pub fn async_call(
        &self,
        target: &ObjectRef,
        method: impl Into<String>,
        args: Vec<Value>,
    ) -> Result<Fut, RuntimeError> {
        let method = method.into();
        if target.cog_id() != self.id {
            return Err(RuntimeError::ForeignObject {
                object: target.id(),
                cog: self.id,
            });
        }
        if !target.is_initialized() {
            return Err(RuntimeError::NotInitialized { object: target.id() });
        }
        let class = target.class();
        if !class.has_method(&method) {
            return Err(RuntimeError::MethodNotFound {
                class: class.name().to_owned(),
                method,
            });
        }

        let receiver = Arc::clone(target);
        let invoked = method.clone();
        let task = Task::new(self.id, Arc::clone(target), method, move || {
            let class = receiver.class();
            let body = class
                .method(&invoked)
                .ok_or_else(|| RuntimeError::MethodNotFound {
                    class: class.name().to_owned(),
                    method: invoked.clone(),
                })?;
            body(&receiver, &args)
        });
        let fut = task.fut().clone();
        self.scheduler.submit(task);
        self.scheduler.run_until_idle();
        Ok(fut)
    }

    /// Returns the objects owned by this group.
    #[must_use]
    pub fn objects(&self) -> Vec<ObjectRef> {
        self.objects.lock().clone()
    }
}

impl fmt::Debug for Cog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cog")
            .field("id", &self.id)
            .field("objects", &self.objects.lock().len())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Cog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "COG {}", self.id)
    }
}
