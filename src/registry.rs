//! Deferred-callback registry.
//!
//! An [`EventRegistry`] lets a producer announce named events whose consumers may
//! register interest before or after the event occurs. Two tables drive it:
//!
//! - registered callbacks, one per event name
//! - pending fulfillments, cached for events that fired before anyone listened
//!
//! For any name at most one of the two is populated. A fulfillment with a registered
//! callback is delivered immediately; otherwise it is cached and delivered the moment a
//! callback is registered. Everything runs synchronously on the caller's stack.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::invocation::{Callback, CallbackResult, Invocation};
use crate::sink::{self, ErrorSink, SinkRef};
use crate::{PromiseError, PromiseEvent, RegistryBuilder};

/// Type alias for the per-registry trace callback.
pub type TraceCallback = Arc<dyn Fn(&PromiseEvent)>;

/// Method names of the registry, of [`PromiseLayer`](crate::PromiseLayer) and of types
/// generated by [`define_promise!`](crate::define_promise). Declaring a slot under one of
/// these is a no-op.
pub const RESERVED_NAMES: &[&str] = &[
    "builder",
    "callback_declared",
    "clear_error_sink",
    "clear_trace_callback",
    "context",
    "create",
    "declare_callback",
    "declare_callback_in",
    "declare_callbacks",
    "declare_callbacks_in",
    "default",
    "deref",
    "deref_mut",
    "effective_context",
    "fulfill",
    "fulfill_empty",
    "has_callback",
    "has_pending",
    "is_torn_down",
    "new",
    "producer",
    "register",
    "registry",
    "registry_mut",
    "report_error",
    "set_error_sink",
    "set_trace_callback",
    "slot",
    "slot_names",
    "teardown",
];

/// Whether `name` is one of [`RESERVED_NAMES`].
///
/// Usable in const context, which is how `define_promise!` rejects reserved event names.
pub const fn is_reserved_name(name: &str) -> bool {
    let name = name.as_bytes();
    let mut i = 0;
    while i < RESERVED_NAMES.len() {
        let reserved = RESERVED_NAMES[i].as_bytes();
        if reserved.len() == name.len() {
            let mut j = 0;
            while j < name.len() && reserved[j] == name[j] {
                j += 1;
            }
            if j == name.len() {
                return true;
            }
        }
        i += 1;
    }
    false
}

/// Descriptor of a declared callback slot.
///
/// Only names backed by a slot accept callbacks and count as declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackSlot {
    name: String,
    layer: Option<&'static str>,
}

impl CallbackSlot {
    /// Event name of the slot.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Composition layer that declared the slot, if one was given.
    pub fn layer(&self) -> Option<&'static str> {
        self.layer
    }
}

/// A fulfillment that arrived before a callback was registered.
struct Pending<H, A> {
    context: Option<H>,
    producer: Option<H>,
    args: Vec<A>,
}

/// Callbacks and pending fulfillments. Dropped as a whole on teardown.
struct Tables<H, A> {
    callbacks: HashMap<String, Callback<H, A>>,
    pending: HashMap<String, Pending<H, A>>,
}

impl<H, A> Default for Tables<H, A> {
    fn default() -> Self {
        Self {
            callbacks: HashMap::new(),
            pending: HashMap::new(),
        }
    }
}

/// Registry of named deferred callbacks.
///
/// `H` is the handle type of the producer and the context, `A` the type of the
/// positional arguments passed to `fulfill`.
///
/// # Examples
///
/// ```rust
/// use promise_registry::EventRegistry;
///
/// let mut promise: EventRegistry<&str, i32> = EventRegistry::new(Some("uploader"), None);
/// promise.declare_callbacks(["success", "error"]);
///
/// // Fulfilled before anyone listens: cached.
/// promise.fulfill("success", vec![200]).unwrap();
///
/// // Delivered the moment a callback shows up.
/// promise
///     .register("success", |call| {
///         assert_eq!(call.args(), &[200]);
///         assert_eq!(call.producer(), Some(&"uploader"));
///         Ok(())
///     })
///     .unwrap();
/// ```
pub struct EventRegistry<H, A> {
    producer: Option<H>,
    context: Option<H>,
    slots: HashMap<String, CallbackSlot>,
    tables: Option<Tables<H, A>>,
    delivering: Option<String>,
    sink: Option<SinkRef>,
    trace: Option<TraceCallback>,
}

impl<H, A> Default for EventRegistry<H, A> {
    fn default() -> Self {
        Self {
            producer: None,
            context: None,
            slots: HashMap::new(),
            tables: Some(Tables::default()),
            delivering: None,
            sink: None,
            trace: None,
        }
    }
}

impl<H, A> EventRegistry<H, A> {
    // ---------------------------------------------------------------------------------------------
    // Construction & teardown
    // ---------------------------------------------------------------------------------------------

    /// Create an empty registry.
    ///
    /// When `context` is `None`, callbacks run against `producer`.
    pub fn new(producer: Option<H>, context: Option<H>) -> Self {
        Self {
            producer,
            context,
            ..Self::default()
        }
    }

    /// Start building a registry with a sink, trace callback or slots up front.
    pub fn builder() -> RegistryBuilder<H, A> {
        RegistryBuilder::new()
    }

    pub(crate) fn set_sink(&mut self, sink: Option<SinkRef>) {
        self.sink = sink;
    }

    /// Release every callback, pending fulfillment, the producer and the context.
    ///
    /// Calling it again is a no-op. Declared slots survive, so `callback_declared`
    /// answers the same before and after.
    pub fn teardown(&mut self) {
        let Some(mut tables) = self.tables.take() else {
            return;
        };

        debug!(
            callbacks = tables.callbacks.len(),
            pending = tables.pending.len(),
            "tearing down registry"
        );

        tables.callbacks.clear();
        tables.pending.clear();
        self.context = None;
        self.producer = None;

        self.emit_event(|| PromiseEvent::Teardown {});
    }

    /// Whether `teardown` has run.
    pub fn is_torn_down(&self) -> bool {
        self.tables.is_none()
    }

    /// The object that makes the promises.
    pub fn producer(&self) -> Option<&H> {
        self.producer.as_ref()
    }

    /// The explicitly configured context, if any.
    pub fn context(&self) -> Option<&H> {
        self.context.as_ref()
    }

    /// The context callbacks run against: the configured context, else the producer.
    pub fn effective_context(&self) -> Option<&H> {
        self.context.as_ref().or(self.producer.as_ref())
    }

    // ---------------------------------------------------------------------------------------------
    // Slots
    // ---------------------------------------------------------------------------------------------

    /// Declare a callback slot for `name`.
    ///
    /// Returns `true` if a new slot was created. An existing slot is never replaced, and
    /// neither the empty name nor the registry's own method names (see [`RESERVED_NAMES`])
    /// are ever turned into slots.
    pub fn declare_callback(&mut self, name: impl Into<String>) -> bool {
        self.declare_slot(None, name.into())
    }

    /// Same as [`declare_callback`](Self::declare_callback), recording which layer declared it.
    pub fn declare_callback_in(&mut self, layer: &'static str, name: impl Into<String>) -> bool {
        self.declare_slot(Some(layer), name.into())
    }

    /// Declare every name in `names`. Returns how many slots were newly created.
    pub fn declare_callbacks<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .map(|name| self.declare_slot(None, name.into()))
            .filter(|created| *created)
            .count()
    }

    /// Declare every name in `names` on behalf of `layer`.
    pub fn declare_callbacks_in<I, S>(&mut self, layer: &'static str, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .map(|name| self.declare_slot(Some(layer), name.into()))
            .filter(|created| *created)
            .count()
    }

    fn declare_slot(&mut self, layer: Option<&'static str>, name: String) -> bool {
        let created = if name.is_empty() || is_reserved_name(&name) || self.slots.contains_key(&name)
        {
            false
        } else {
            self.slots.insert(
                name.clone(),
                CallbackSlot {
                    name: name.clone(),
                    layer,
                },
            );
            true
        };

        debug!(event = %name, layer = layer.unwrap_or("-"), created, "declare callback slot");
        self.emit_event(|| PromiseEvent::Declare { name, created });

        created
    }

    /// Whether a callback slot was declared for `name`.
    ///
    /// False for undeclared names and for the registry's own operations.
    pub fn callback_declared(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Descriptor of the slot declared for `name`.
    pub fn slot(&self, name: &str) -> Option<&CallbackSlot> {
        self.slots.get(name)
    }

    /// Names of all declared slots, in no particular order.
    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Whether a fulfillment for `name` is cached, waiting for a callback.
    pub fn has_pending(&self, name: &str) -> bool {
        self.tables
            .as_ref()
            .is_some_and(|t| t.pending.contains_key(name))
    }

    /// Whether a callback is stored for `name`. True while that callback is running, too.
    pub fn has_callback(&self, name: &str) -> bool {
        self.tables.as_ref().is_some_and(|t| {
            t.callbacks.contains_key(name) || self.delivering.as_deref() == Some(name)
        })
    }

    // ---------------------------------------------------------------------------------------------
    // Tracing
    // ---------------------------------------------------------------------------------------------

    /// Set a callback observing every operation of this registry.
    ///
    /// Events are emitted before any user callback runs.
    pub fn set_trace_callback(&mut self, callback: impl Fn(&PromiseEvent) + 'static) {
        self.trace = Some(Arc::new(callback));
    }

    pub(crate) fn set_trace_arc(&mut self, callback: Option<TraceCallback>) {
        self.trace = callback;
    }

    /// Clear the trace callback.
    pub fn clear_trace_callback(&mut self) {
        self.trace = None;
    }

    fn emit_event(&self, event: impl FnOnce() -> PromiseEvent) {
        if let Some(callback) = self.trace.as_ref() {
            callback(&event());
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Error reporting
    // ---------------------------------------------------------------------------------------------

    /// Use `sink` for this registry instead of the process-wide default.
    pub fn set_error_sink(&mut self, sink: impl ErrorSink + 'static) {
        self.sink = Some(Arc::new(sink));
    }

    /// Fall back to the process-wide default sink again.
    pub fn clear_error_sink(&mut self) {
        self.sink = None;
    }

    /// Forward `error` to this registry's sink, else to the process-wide default.
    ///
    /// # Errors
    ///
    /// With no sink configured anywhere the error is handed back unchanged.
    pub fn report_error<E>(&self, error: E) -> Result<(), E>
    where
        E: std::error::Error + 'static,
    {
        match self.sink.clone().or_else(sink::default_sink) {
            Some(sink) => {
                sink.report(&error);
                Ok(())
            }
            None => Err(error),
        }
    }
}

impl<H: Clone, A> EventRegistry<H, A> {
    // ---------------------------------------------------------------------------------------------
    // Registration & fulfillment
    // ---------------------------------------------------------------------------------------------

    /// Supply the callback for the slot `name`.
    ///
    /// If `name` was already fulfilled, `callback` runs right away with the cached
    /// arguments and context and the cached record is discarded; the callback is not kept.
    /// Otherwise it is stored and runs on every later fulfillment of `name`.
    ///
    /// A name holds at most one stored callback for the life of the registry. Supplying a
    /// second one is an error rather than a silent replacement of the first.
    ///
    /// # Errors
    ///
    /// - no slot declared for `name`
    /// - a callback is already stored for `name` ([`PromiseError::AlreadyRegistered`])
    /// - the registry was torn down
    /// - the callback itself failed (only when a pending fulfillment was delivered)
    pub fn register<F>(&mut self, name: &str, callback: F) -> Result<&mut Self, PromiseError>
    where
        F: FnMut(&Invocation<'_, H, A>) -> CallbackResult + 'static,
    {
        if !self.slots.contains_key(name) {
            return Err(PromiseError::UndeclaredCallback {
                name: name.to_owned(),
            });
        }

        let tables = self.tables.as_mut().ok_or(PromiseError::TornDown)?;

        if tables.callbacks.contains_key(name) {
            return Err(PromiseError::AlreadyRegistered {
                name: name.to_owned(),
            });
        }

        let Some(pending) = tables.pending.remove(name) else {
            tables.callbacks.insert(name.to_owned(), Box::new(callback));
            debug!(event = %name, deferred = false, "callback registered");
            self.emit_event(|| PromiseEvent::Register {
                name: name.to_owned(),
                deferred: false,
            });
            return Ok(self);
        };

        debug!(event = %name, deferred = true, "delivering pending fulfillment");
        self.emit_event(|| PromiseEvent::Register {
            name: name.to_owned(),
            deferred: true,
        });

        let mut callback = callback;
        let invocation = Invocation::new(
            name,
            pending.context.as_ref(),
            &pending.args,
            pending.producer.as_ref(),
            self,
        );
        callback(&invocation).map_err(|source| PromiseError::Callback {
            name: name.to_owned(),
            source,
        })?;

        Ok(self)
    }

    /// Fulfill the event `name` with positional `args`.
    ///
    /// With a callback registered it runs now; otherwise the fulfillment is cached,
    /// replacing any earlier cached fulfillment of the same name.
    ///
    /// # Errors
    ///
    /// - `name` is empty ([`PromiseError::MissingName`])
    /// - the registry was torn down
    /// - the registered callback failed
    pub fn fulfill(&mut self, name: &str, args: Vec<A>) -> Result<&mut Self, PromiseError> {
        if name.is_empty() {
            return Err(PromiseError::MissingName);
        }

        let context = self.effective_context().cloned();
        let producer = self.producer.clone();
        let tables = self.tables.as_mut().ok_or(PromiseError::TornDown)?;

        let Some(mut callback) = tables.callbacks.remove(name) else {
            let replaced = tables
                .pending
                .insert(
                    name.to_owned(),
                    Pending {
                        context,
                        producer,
                        args,
                    },
                )
                .is_some();

            debug!(event = %name, replaced, "fulfillment cached");
            self.emit_event(|| PromiseEvent::Fulfill {
                name: name.to_owned(),
                delivered: false,
            });
            return Ok(self);
        };

        debug!(event = %name, args = args.len(), "delivering fulfillment");
        self.emit_event(|| PromiseEvent::Fulfill {
            name: name.to_owned(),
            delivered: true,
        });

        self.delivering = Some(name.to_owned());
        let result = callback(&Invocation::new(
            name,
            context.as_ref(),
            &args,
            producer.as_ref(),
            self,
        ));

        self.delivering = None;

        // Callbacks only see `&self`, so the tables are still there.
        if let Some(tables) = self.tables.as_mut() {
            tables.callbacks.insert(name.to_owned(), callback);
        }

        result.map_err(|source| PromiseError::Callback {
            name: name.to_owned(),
            source,
        })?;

        Ok(self)
    }

    /// Fulfill `name` without positional arguments.
    pub fn fulfill_empty(&mut self, name: &str) -> Result<&mut Self, PromiseError> {
        self.fulfill(name, Vec::new())
    }
}

impl<H, A> fmt::Debug for EventRegistry<H, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut slots: Vec<&str> = self.slot_names().collect();
        slots.sort_unstable();

        let (callbacks, pending) = match self.tables.as_ref() {
            Some(t) => (
                t.callbacks.len() + usize::from(self.delivering.is_some()),
                t.pending.len(),
            ),
            None => (0, 0),
        };

        f.debug_struct("EventRegistry")
            .field("slots", &slots)
            .field("callbacks", &callbacks)
            .field("pending", &pending)
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
