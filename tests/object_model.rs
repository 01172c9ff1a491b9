//! End-to-end tests of the object model: two-phase creation, fields,
//! dispatch, reclassification, and lifecycle observation.

use cogsim::{
    ClassBuilder, CogId, LifecycleObserver, ObjectId, Runtime, RuntimeConfig, RuntimeError,
    StrategyKind, Value,
};
use std::sync::{Arc, Mutex};

fn round_robin_runtime() -> Arc<Runtime> {
    Runtime::with_config(RuntimeConfig::new().with_strategy(StrategyKind::RoundRobin))
}

/// A class with two constructor parameters and a derived field set by the
/// constructor body.
fn account_class() -> Arc<cogsim::ClassDescriptor> {
    ClassBuilder::new("Account")
        .param("owner")
        .param("balance")
        .field("overdrawn")
        .init(|this, _args| {
            let balance = this.get_field("balance")?.as_int().unwrap_or(0);
            this.set_field("overdrawn", Value::Bool(balance < 0));
            Ok(cogsim::Step::Done(Value::Unit))
        })
        .simple_method("getField", |this, args| {
            let name = args[0].as_str().ok_or_else(|| {
                RuntimeError::failure("getField expects a field name")
            })?;
            this.get_field(name)
        })
        .simple_method("setField", |this, args| {
            let name = args[0].as_str().ok_or_else(|| {
                RuntimeError::failure("setField expects a field name")
            })?;
            this.set_field(name.to_owned(), args[1].clone());
            Ok(Value::Unit)
        })
        .build()
}

#[test]
fn constructor_args_become_fields() {
    let runtime = round_robin_runtime();
    let cog = runtime.new_cog();
    let obj = cog
        .new_object(account_class(), vec![Value::from("ada"), Value::Int(100)])
        .unwrap();

    assert_eq!(obj.get_field("owner"), Ok(Value::from("ada")));
    assert_eq!(obj.get_field("balance"), Ok(Value::Int(100)));
    // Derived by the constructor body.
    assert_eq!(obj.get_field("overdrawn"), Ok(Value::Bool(false)));
}

#[test]
fn arity_mismatch_creates_no_object() {
    let runtime = round_robin_runtime();
    let cog = runtime.new_cog();
    let result = cog.new_object(account_class(), vec![Value::from("ada")]);
    assert_eq!(
        result.err(),
        Some(RuntimeError::ArityMismatch {
            class: "Account".into(),
            expected: 2,
            given: 1,
        })
    );
    assert!(cog.objects().is_empty());
}

#[test]
fn dispatch_before_init_fails_fast() {
    let runtime = round_robin_runtime();
    let cog = runtime.new_cog();
    let obj = cog
        .create_object(account_class(), vec![Value::from("ada"), Value::Int(1)])
        .unwrap();

    let not_initialized = RuntimeError::NotInitialized { object: obj.id() };
    assert_eq!(
        obj.dispatch("getField", &[Value::from("owner")]),
        Err(not_initialized.clone())
    );
    assert_eq!(
        cog.async_call(&obj, "getField", vec![Value::from("owner")])
            .map(|_| ()),
        Err(not_initialized)
    );

    // After phase two the same calls succeed.
    cog.run_init(&obj).unwrap();
    assert_eq!(
        obj.dispatch("getField", &[Value::from("owner")]),
        Ok(Value::from("ada"))
    );
}

#[test]
fn set_then_get_field_round_trips() {
    let runtime = round_robin_runtime();
    let cog = runtime.new_cog();
    let obj = cog
        .new_object(account_class(), vec![Value::from("ada"), Value::Int(0)])
        .unwrap();

    // An unwritten field is an error, not a default.
    let fut = cog
        .async_call(&obj, "getField", vec![Value::from("x")])
        .unwrap();
    assert_eq!(
        fut.wait(),
        Err(RuntimeError::NoSuchField { field: "x".into() })
    );

    let fut = cog
        .async_call(&obj, "setField", vec![Value::from("x"), Value::Int(5)])
        .unwrap();
    assert_eq!(fut.wait(), Ok(Value::Unit));

    let fut = cog
        .async_call(&obj, "getField", vec![Value::from("x")])
        .unwrap();
    assert_eq!(fut.wait(), Ok(Value::Int(5)));
}

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<(String, ObjectId)>>,
}

impl LifecycleObserver for EventLog {
    fn object_created(&self, _cog: CogId, object: ObjectId) {
        self.events.lock().unwrap().push(("created".into(), object));
    }
    fn object_initialized(&self, _cog: CogId, object: ObjectId) {
        self.events
            .lock()
            .unwrap()
            .push(("initialized".into(), object));
    }
}

#[test]
fn lifecycle_milestones_arrive_in_order() {
    let runtime = round_robin_runtime();
    let log = Arc::new(EventLog::default());
    runtime.register_lifecycle_observer(Arc::clone(&log) as Arc<dyn LifecycleObserver>);

    let cog = runtime.new_cog();
    let obj = cog
        .new_object(account_class(), vec![Value::from("ada"), Value::Int(1)])
        .unwrap();

    let events = log.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            ("created".to_owned(), obj.id()),
            ("initialized".to_owned(), obj.id()),
        ]
    );
}

#[test]
fn foreign_objects_are_rejected() {
    let runtime = round_robin_runtime();
    let home = runtime.new_cog();
    let other = runtime.new_cog();
    let obj = home
        .new_object(account_class(), vec![Value::from("ada"), Value::Int(1)])
        .unwrap();

    let expected = Err(RuntimeError::ForeignObject {
        object: obj.id(),
        cog: other.id(),
    });
    assert_eq!(
        other
            .async_call(&obj, "getField", vec![Value::from("owner")])
            .map(|_| ()),
        expected
    );
    assert_eq!(other.run_init(&obj), expected);
}

#[test]
fn unknown_method_fails_at_the_call_site() {
    let runtime = round_robin_runtime();
    let cog = runtime.new_cog();
    let obj = cog
        .new_object(account_class(), vec![Value::from("ada"), Value::Int(1)])
        .unwrap();
    assert_eq!(
        cog.async_call(&obj, "transmogrify", vec![]).map(|_| ()),
        Err(RuntimeError::MethodNotFound {
            class: "Account".into(),
            method: "transmogrify".into(),
        })
    );
}

#[test]
fn failing_method_resolves_future_with_error() {
    let runtime = round_robin_runtime();
    let cog = runtime.new_cog();
    let class = ClassBuilder::new("Flaky")
        .simple_method("boom", |_, _| Err(RuntimeError::failure("deliberate")))
        .simple_method("fine", |_, _| Ok(Value::Int(1)))
        .build();
    let obj = cog.new_object(class, vec![]).unwrap();

    let fut = cog.async_call(&obj, "boom", vec![]).unwrap();
    assert_eq!(fut.wait(), Err(RuntimeError::failure("deliberate")));

    // The group keeps working after a task failure.
    let fut = cog.async_call(&obj, "fine", vec![]).unwrap();
    assert_eq!(fut.wait(), Ok(Value::Int(1)));
}

#[test]
fn reclassification_swaps_dispatch_and_keeps_fields() {
    let runtime = round_robin_runtime();
    let cog = runtime.new_cog();

    let idle = ClassBuilder::new("Idle")
        .simple_method("mode", |_, _| Ok(Value::from("idle")))
        .build();
    let busy = ClassBuilder::new("Busy")
        .simple_method("mode", |_, _| Ok(Value::from("busy")))
        .build();

    let obj = cog.new_object(idle, vec![]).unwrap();
    obj.set_field("jobs", Value::Int(3));
    let fut = cog.async_call(&obj, "mode", vec![]).unwrap();
    assert_eq!(fut.wait(), Ok(Value::from("idle")));

    obj.set_class(busy);
    let fut = cog.async_call(&obj, "mode", vec![]).unwrap();
    assert_eq!(fut.wait(), Ok(Value::from("busy")));
    // Identity and field storage are untouched by the swap.
    assert_eq!(obj.get_field("jobs"), Ok(Value::Int(3)));
    assert_eq!(obj.class().name(), "Busy");
}
