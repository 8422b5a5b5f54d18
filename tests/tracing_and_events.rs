//! Trace callback observations: which events a registry reports, in which order,
//! and what they carry.

use promise_registry::{EventRegistry, PromiseEvent};
use std::cell::RefCell;
use std::rc::Rc;

fn traced() -> (Rc<RefCell<Vec<String>>>, EventRegistry<&'static str, u32>) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let events_clone = events.clone();

    let registry = EventRegistry::builder()
        .producer("traced")
        .trace_callback(move |event| {
            events_clone.borrow_mut().push(format!("{}", event));
        })
        .build();

    (events, registry)
}

#[test]
fn test_basic_tracing() {
    let (events, mut registry) = traced();

    registry.declare_callback("success");
    registry.register("success", |_| Ok(())).unwrap();
    registry.fulfill("success", vec![1]).unwrap();

    let captured = events.borrow();
    assert_eq!(captured.len(), 3);
    assert!(captured[0].contains("declare"));
    assert!(captured[1].contains("register"));
    assert!(captured[2].contains("fulfill"));
}

#[test]
fn test_trace_declare_existing_slot() {
    let (events, mut registry) = traced();

    registry.declare_callbacks(["success", "success", "teardown"]);

    assert_eq!(
        *events.borrow(),
        vec![
            "declare { name: success, created: true }",
            "declare { name: success, created: false }",
            "declare { name: teardown, created: false }",
        ]
    );
}

#[test]
fn test_trace_cached_and_delivered() {
    let (events, mut registry) = traced();
    registry.declare_callbacks(["a", "b"]);
    events.borrow_mut().clear();

    registry.fulfill("a", vec![]).unwrap();
    registry.register("a", |_| Ok(())).unwrap();
    registry.register("b", |_| Ok(())).unwrap();
    registry.fulfill("b", vec![]).unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            "fulfill { name: a, delivered: false }",
            "register { name: a, deferred: true }",
            "register { name: b, deferred: false }",
            "fulfill { name: b, delivered: true }",
        ]
    );
}

#[test]
fn test_event_emitted_before_callback_runs() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let trace_order = order.clone();
    let callback_order = order.clone();

    let mut registry: EventRegistry<(), ()> = EventRegistry::builder()
        .callbacks(["done"])
        .trace_callback(move |event| {
            if let PromiseEvent::Fulfill { .. } = event {
                trace_order.borrow_mut().push("trace");
            }
        })
        .build();

    registry
        .register("done", move |_| {
            callback_order.borrow_mut().push("callback");
            Ok(())
        })
        .unwrap();
    registry.fulfill_empty("done").unwrap();

    assert_eq!(*order.borrow(), vec!["trace", "callback"]);
}

#[test]
fn test_clear_trace_callback() {
    let (events, mut registry) = traced();

    registry.declare_callback("x");
    registry.clear_trace_callback();
    registry.declare_callback("y");
    registry.teardown();

    assert_eq!(events.borrow().len(), 1);
}

#[test]
fn test_trace_teardown_once() {
    let (events, mut registry) = traced();

    registry.teardown();
    registry.teardown();

    assert_eq!(*events.borrow(), vec!["Tearing down the registry"]);
}
