//! # Promise Registry
//!
//! A deferred-callback registry: a producer announces named events, and consumers may
//! register interest either before or after the event occurs.
//!
//! Every registered callback receives the fulfillment's arguments, the producer and the
//! registry, and runs against the configured context, regardless of which call came first.
//!
//! ## Quick Start
//!
//! ```rust
//! use promise_registry::EventRegistry;
//!
//! let mut promise: EventRegistry<&str, &str> = EventRegistry::new(Some("loader"), None);
//! promise.declare_callback("complete");
//!
//! promise.fulfill("complete", vec!["config.toml"]).unwrap();
//!
//! promise
//!     .register("complete", |call| {
//!         assert_eq!(call.arg(0), Some(&"config.toml"));
//!         assert_eq!(call.context(), Some(&"loader"));
//!         Ok(())
//!     })
//!     .unwrap();
//! ```
//!
//! ## Features
//!
//! - **Order independent**: fulfillments before registration are cached and delivered late
//! - **Synchronous**: callbacks run on the caller's stack, errors propagate unmodified
//! - **Composable**: [`define_promise!`] builds types with one method per event, and layers stack
//! - **Tracing support**: `tracing` logs plus an optional per-registry trace callback
//!
//! ## Main Items
//!
//! - [`EventRegistry`] - the registry itself
//! - [`RegistryBuilder`] - construction with sink, trace callback and slots
//! - [`PromiseLayer`] - trait for types composing a registry
//! - [`ErrorSink`] - where `report_error` sends errors ([`set_default_sink`] for the process-wide default)

mod builder;
mod invocation;
mod layer;
mod macros;
mod promise_error;
mod promise_event;
mod registry;
mod sink;

// Re-export the main public API
pub use builder::RegistryBuilder;
pub use invocation::{Callback, CallbackError, CallbackResult, Invocation};
pub use layer::PromiseLayer;
pub use promise_error::PromiseError;
pub use promise_event::PromiseEvent;
pub use registry::{is_reserved_name, CallbackSlot, EventRegistry, TraceCallback, RESERVED_NAMES};
pub use sink::{
    clear_default_sink, default_sink, reset_default_sink, set_default_sink, set_default_sink_arc,
    ErrorSink, SinkRef, TracingSink,
};
