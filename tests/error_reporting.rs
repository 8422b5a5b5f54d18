//! Integration tests for `report_error` and the process-wide default sink.
//!
//! NOTE: All tests use #[serial] because they swap the same process-wide default sink.
//! Running them in parallel would cause interference.

use promise_registry::{
    clear_default_sink, default_sink, reset_default_sink, set_default_sink, EventRegistry,
    PromiseError, PromiseLayer,
};
use serial_test::serial;
use std::error::Error;
use std::sync::{Arc, Mutex};

fn collecting_sink() -> (
    Arc<Mutex<Vec<String>>>,
    impl Fn(&(dyn Error + 'static)) + Send + Sync + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    (seen, move |e: &(dyn Error + 'static)| {
        seen_clone.lock().unwrap().push(e.to_string());
    })
}

#[test]
#[serial]
fn test_default_sink_is_tracing() {
    reset_default_sink();
    let registry: EventRegistry<u8, u8> = EventRegistry::default();

    assert!(default_sink().is_some());
    assert!(registry.report_error(PromiseError::MissingName).is_ok());
}

#[test]
#[serial]
fn test_without_sink_the_error_is_handed_back() {
    clear_default_sink();
    let registry: EventRegistry<u8, u8> = EventRegistry::default();

    let err = registry.report_error(PromiseError::TornDown).unwrap_err();
    assert!(matches!(err, PromiseError::TornDown));

    reset_default_sink();
}

#[test]
#[serial]
fn test_default_sink_is_shared_by_all_registries() {
    let (seen, sink) = collecting_sink();
    set_default_sink(sink);

    let a: EventRegistry<u8, u8> = EventRegistry::default();
    let b: EventRegistry<&str, String> = EventRegistry::new(Some("b"), None);

    a.report_error(std::fmt::Error).unwrap();
    b.report_error(PromiseError::UndeclaredCallback { name: "x".into() })
        .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "an error occurred when formatting an argument".to_string(),
            "no callback slot declared for \"x\"".to_string(),
        ]
    );

    reset_default_sink();
}

#[test]
#[serial]
fn test_instance_sink_overrides_default() {
    let (global_seen, global) = collecting_sink();
    let (local_seen, local) = collecting_sink();
    set_default_sink(global);

    let mut registry: EventRegistry<u8, u8> = EventRegistry::builder().sink(local).build();
    registry.report_error(PromiseError::TornDown).unwrap();

    registry.clear_error_sink();
    registry.report_error(PromiseError::MissingName).unwrap();

    assert_eq!(local_seen.lock().unwrap().len(), 1);
    assert_eq!(global_seen.lock().unwrap().len(), 1);

    reset_default_sink();
}

#[test]
#[serial]
fn test_composer_reports_callback_failures() {
    let (seen, sink) = collecting_sink();
    set_default_sink(sink);

    let mut registry: EventRegistry<u8, i32> = EventRegistry::new(Some(1), None);
    registry.declare_callback("error");
    registry
        .register("error", |call| {
            if call.args().iter().any(|v| *v < 0) {
                return Err("negative value".into());
            }
            Ok(())
        })
        .unwrap();

    // The composing object decides what to do with a failing callback.
    let delivered = registry.fulfill("error", vec![-5]).map(|_| ());
    if let Err(err) = delivered {
        PromiseLayer::report_error(&registry, err).unwrap();
    }

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["callback for \"error\" failed: negative value".to_string()]
    );

    reset_default_sink();
}
