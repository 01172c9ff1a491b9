//! Active objects: actor instances with identity, fields, and dispatch.
//!
//! An active object has a stable identity, a non-owning back-reference to
//! the group that owns it, a swappable class descriptor, and a string-keyed
//! field table. The field table is an open map rather than fixed slots
//! because field sets can be extended at runtime, objects can be
//! reclassified, and external tooling introspects fields by name.
//!
//! Initialization is two-phase: allocation stores constructor arguments into
//! fields, then [`crate::cog::Cog::run_init`] runs the constructor body.
//! Dispatch before the second phase completes fails fast with
//! [`RuntimeError::NotInitialized`].

use crate::class::ClassDescriptor;
use crate::cog::Cog;
use crate::error::RuntimeError;
use crate::task::{Step, WaitCondition};
use crate::types::{CogId, ObjectId, Value};
use core::fmt;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// A shared handle to an active object.
pub type ObjectRef = Arc<ActiveObject>;

/// An actor instance owned by a concurrent object group.
pub struct ActiveObject {
    id: ObjectId,
    /// Self-handle so `&self` methods can hand an [`ObjectRef`] to method
    /// closures.
    me: Weak<ActiveObject>,
    cog: Weak<Cog>,
    cog_id: CogId,
    class: RwLock<Arc<ClassDescriptor>>,
    fields: Mutex<HashMap<String, Value>>,
    initialized: AtomicBool,
}

impl ActiveObject {
    /// Allocates an object bound to the given group.
    ///
    /// The back-reference is non-owning: the object does not keep its group
    /// alive.
    pub(crate) fn new(cog: Weak<Cog>, cog_id: CogId, class: Arc<ClassDescriptor>) -> ObjectRef {
        Arc::new_cyclic(|me| Self {
            id: ObjectId::next(),
            me: me.clone(),
            cog,
            cog_id,
            class: RwLock::new(class),
            fields: Mutex::new(HashMap::new()),
            initialized: AtomicBool::new(false),
        })
    }

    /// Allocates an object with no owning group, for unit tests of the
    /// object surface alone.
    #[doc(hidden)]
    #[must_use]
    pub fn detached(class: Arc<ClassDescriptor>) -> ObjectRef {
        Arc::new_cyclic(|me| Self {
            id: ObjectId::next(),
            me: me.clone(),
            cog: Weak::new(),
            cog_id: CogId::next(),
            class: RwLock::new(class),
            fields: Mutex::new(HashMap::new()),
            initialized: AtomicBool::new(true),
        })
    }

    /// Returns a shared handle to this object.
    ///
    /// The handle always upgrades: a `&self` caller proves the object is
    /// alive.
    fn self_ref(&self) -> ObjectRef {
        self.me.upgrade().expect("self-handle of a live object upgrades")
    }

    /// Returns the object's stable identity.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns the owning group's id.
    #[must_use]
    pub fn cog_id(&self) -> CogId {
        self.cog_id
    }

    /// Returns the owning group, if it is still alive.
    #[must_use]
    pub fn cog(&self) -> Option<Arc<Cog>> {
        self.cog.upgrade()
    }

    /// Returns the current class descriptor.
    #[must_use]
    pub fn class(&self) -> Arc<ClassDescriptor> {
        Arc::clone(&self.class.read())
    }

    /// Swaps the class descriptor (dynamic reclassification).
    ///
    /// Only the dispatch table changes; field storage is untouched, so
    /// fields absent from the new descriptor remain readable until
    /// separately removed.
    pub fn set_class(&self, class: Arc<ClassDescriptor>) {
        *self.class.write() = class;
    }

    /// Reads a field by name.
    ///
    /// Fails with [`RuntimeError::NoSuchField`] if the name has never been
    /// written. This is distinct from a field holding [`Value::Unit`].
    pub fn get_field(&self, name: &str) -> Result<Value, RuntimeError> {
        self.fields
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::NoSuchField { field: name.to_owned() })
    }

    /// Writes a field, implicitly declaring it on first write.
    pub fn set_field(&self, name: impl Into<String>, value: Value) {
        self.fields.lock().insert(name.into(), value);
    }

    /// Removes a field, returning its value if it was present.
    pub fn remove_field(&self, name: &str) -> Option<Value> {
        self.fields.lock().remove(name)
    }

    /// Returns the names of all fields written so far.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.fields.lock().keys().cloned().collect()
    }

    /// Returns true once the constructor body has run to completion.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub(crate) fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::Release);
    }

    /// Invokes a method synchronously with this object as receiver.
    ///
    /// This is the local, blocking call primitive: the body runs on the
    /// calling context, and blocking on an unresolved future blocks the
    /// caller. An await-style guard cannot be served here (no scheduler owns
    /// this context) and fails with [`RuntimeError::GuardInSyncCall`].
    ///
    /// Fails with [`RuntimeError::MethodNotFound`] for unknown methods and
    /// [`RuntimeError::NotInitialized`] before `run_init` has completed.
    pub fn dispatch(&self, method: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        if !self.is_initialized() {
            return Err(RuntimeError::NotInitialized { object: self.id });
        }
        let class = self.class();
        let body = class
            .method(method)
            .ok_or_else(|| RuntimeError::MethodNotFound {
                class: class.name().to_owned(),
                method: method.to_owned(),
            })?;
        Self::drive_to_completion(body(&self.self_ref(), args)?)
    }

    /// Runs the constructor body synchronously (phase two of creation).
    ///
    /// Constructor arguments are not passed again: phase one already stored
    /// them into the parameter-named fields, which is where constructor
    /// bodies read them.
    pub(crate) fn run_constructor(&self) -> Result<(), RuntimeError> {
        let class = self.class();
        if let Some(body) = class.constructor() {
            Self::drive_to_completion(body(&self.self_ref(), &[])?)?;
        }
        Ok(())
    }

    /// Drives a step chain on the calling context, blocking through future
    /// suspensions.
    fn drive_to_completion(mut step: Step) -> Result<Value, RuntimeError> {
        loop {
            match step {
                Step::Done(value) => return Ok(value),
                Step::Suspend(WaitCondition::Resolved(fut), resume) => {
                    let _ = fut.wait();
                    step = resume()?;
                }
                Step::Suspend(WaitCondition::Guard(_), _) => {
                    return Err(RuntimeError::GuardInSyncCall);
                }
            }
        }
    }
}

impl fmt::Debug for ActiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveObject")
            .field("id", &self.id)
            .field("cog", &self.cog_id)
            .field("class", &self.class().name())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassBuilder;
    use crate::future::Fut;

    #[test]
    fn field_read_before_write_fails() {
        let obj = ActiveObject::detached(ClassBuilder::new("C").field("x").build());
        assert_eq!(
            obj.get_field("x"),
            Err(RuntimeError::NoSuchField { field: "x".into() })
        );
        obj.set_field("x", Value::Int(5));
        assert_eq!(obj.get_field("x"), Ok(Value::Int(5)));
        obj.set_field("x", Value::Int(6));
        assert_eq!(obj.get_field("x"), Ok(Value::Int(6)));
    }

    #[test]
    fn unit_valued_field_is_not_missing() {
        let obj = ActiveObject::detached(ClassBuilder::new("C").build());
        obj.set_field("maybe", Value::Unit);
        assert_eq!(obj.get_field("maybe"), Ok(Value::Unit));
    }

    #[test]
    fn dispatch_runs_method_body() {
        let class = ClassBuilder::new("Counter")
            .simple_method("incr", |receiver, _| {
                let n = receiver.get_field("n").ok().and_then(|v| v.as_int()).unwrap_or(0);
                receiver.set_field("n", Value::Int(n + 1));
                Ok(Value::Int(n + 1))
            })
            .build();
        let obj = ActiveObject::detached(class);
        assert_eq!(obj.dispatch("incr", &[]), Ok(Value::Int(1)));
        assert_eq!(obj.dispatch("incr", &[]), Ok(Value::Int(2)));
    }

    #[test]
    fn dispatch_unknown_method_fails() {
        let obj = ActiveObject::detached(ClassBuilder::new("C").build());
        assert_eq!(
            obj.dispatch("nope", &[]),
            Err(RuntimeError::MethodNotFound {
                class: "C".into(),
                method: "nope".into(),
            })
        );
    }

    #[test]
    fn dispatch_blocks_through_resolved_futures() {
        let fut = Fut::new();
        fut.resolve(Ok(Value::Int(9)));
        let awaited = fut.clone();
        let class = ClassBuilder::new("C")
            .method("get", move |_, _| {
                let f = awaited.clone();
                Ok(Step::await_fut(f.clone(), move || {
                    f.try_get().expect("resolved")
                        .map(Step::Done)
                }))
            })
            .build();
        let obj = ActiveObject::detached(class);
        assert_eq!(obj.dispatch("get", &[]), Ok(Value::Int(9)));
    }

    #[test]
    fn guard_in_sync_dispatch_is_rejected() {
        let class = ClassBuilder::new("C")
            .method("wait", |_, _| {
                Ok(Step::await_guard(|| false, || Ok(Step::Done(Value::Unit))))
            })
            .build();
        let obj = ActiveObject::detached(class);
        assert_eq!(obj.dispatch("wait", &[]), Err(RuntimeError::GuardInSyncCall));
    }

    #[test]
    fn reclassification_keeps_fields() {
        let old = ClassBuilder::new("Old")
            .simple_method("who", |_, _| Ok(Value::from("old")))
            .build();
        let new = ClassBuilder::new("New")
            .simple_method("who", |_, _| Ok(Value::from("new")))
            .build();

        let obj = ActiveObject::detached(old);
        obj.set_field("kept", Value::Int(1));
        assert_eq!(obj.dispatch("who", &[]), Ok(Value::from("old")));

        obj.set_class(new);
        assert_eq!(obj.dispatch("who", &[]), Ok(Value::from("new")));
        assert_eq!(obj.get_field("kept"), Ok(Value::Int(1)));
        assert_eq!(obj.class().name(), "New");
    }
}
