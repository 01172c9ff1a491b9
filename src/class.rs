//! Class descriptors and method closures.
//!
//! A [`ClassDescriptor`] is the pre-compiled, opaque per-class metadata the
//! code generator hands the runtime: ordered constructor parameter names, an
//! optional constructor body, declared field names, and a table of named
//! method bodies. The runtime never looks inside a body; it only invokes it
//! and observes the [`Step`] it returns.
//!
//! Descriptors are immutable and shared. Dynamic reclassification swaps
//! which descriptor an object points at, never mutates a descriptor.

use crate::error::RuntimeError;
use crate::object::ObjectRef;
use crate::task::Step;
use crate::types::Value;
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

/// An opaque, pre-compiled method body.
///
/// Invoked with the receiver and the argument values; yields a [`Step`] so
/// the same representation serves synchronous dispatch and task execution.
pub type MethodClosure = Arc<dyn Fn(&ObjectRef, &[Value]) -> Result<Step, RuntimeError> + Send + Sync>;

/// Pre-compiled per-class metadata: constructor parameters, declared
/// fields, constructor body, and the method dispatch table.
pub struct ClassDescriptor {
    name: String,
    params: Vec<String>,
    fields: Vec<String>,
    init: Option<MethodClosure>,
    methods: HashMap<String, MethodClosure>,
}

impl ClassDescriptor {
    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ordered constructor parameter names.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Returns the declared field names.
    #[must_use]
    pub fn declared_fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns the constructor body, if the class declares one.
    #[must_use]
    pub fn constructor(&self) -> Option<&MethodClosure> {
        self.init.as_ref()
    }

    /// Looks up a method body by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodClosure> {
        self.methods.get(name)
    }

    /// Returns true if the class declares a method with this name.
    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("fields", &self.fields)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder assembling a [`ClassDescriptor`].
///
/// This is the seam the class/method compiler plugs into; tests use it to
/// hand-write small classes.
pub struct ClassBuilder {
    name: String,
    params: Vec<String>,
    fields: Vec<String>,
    init: Option<MethodClosure>,
    methods: HashMap<String, MethodClosure>,
}

impl ClassBuilder {
    /// Starts a descriptor for the named class.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            fields: Vec::new(),
            init: None,
            methods: HashMap::new(),
        }
    }

    /// Appends a constructor parameter. Parameters double as field names:
    /// constructor arguments are stored positionally into fields of the
    /// same name.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.fields.push(name.clone());
        self.params.push(name);
        self
    }

    /// Declares a non-parameter field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    /// Sets the constructor body, run by `run_init` after allocation.
    #[must_use]
    pub fn init(
        mut self,
        body: impl Fn(&ObjectRef, &[Value]) -> Result<Step, RuntimeError> + Send + Sync + 'static,
    ) -> Self {
        self.init = Some(Arc::new(body));
        self
    }

    /// Adds a method with a steppable body (may suspend).
    #[must_use]
    pub fn method(
        mut self,
        name: impl Into<String>,
        body: impl Fn(&ObjectRef, &[Value]) -> Result<Step, RuntimeError> + Send + Sync + 'static,
    ) -> Self {
        self.methods.insert(name.into(), Arc::new(body));
        self
    }

    /// Adds a method whose body completes in one slice, without suspension.
    #[must_use]
    pub fn simple_method(
        self,
        name: impl Into<String>,
        body: impl Fn(&ObjectRef, &[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    ) -> Self {
        self.method(name, move |receiver, args| {
            body(receiver, args).map(Step::Done)
        })
    }

    /// Finalizes the descriptor.
    #[must_use]
    pub fn build(self) -> Arc<ClassDescriptor> {
        Arc::new(ClassDescriptor {
            name: self.name,
            params: self.params,
            fields: self.fields,
            init: self.init,
            methods: self.methods,
        })
    }
}
