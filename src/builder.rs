use std::sync::Arc;

use crate::registry::TraceCallback;
use crate::sink::{ErrorSink, SinkRef};
use crate::{EventRegistry, PromiseEvent};

/// Builder for [`EventRegistry`] with fluent API
pub struct RegistryBuilder<H, A> {
    producer: Option<H>,
    context: Option<H>,
    callbacks: Vec<String>,
    sink: Option<SinkRef>,
    trace: Option<TraceCallback>,
    _args: std::marker::PhantomData<fn(A)>,
}

impl<H, A> Default for RegistryBuilder<H, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H, A> RegistryBuilder<H, A> {
    /// Creates a builder with no producer, no context and no slots
    pub fn new() -> Self {
        Self {
            producer: None,
            context: None,
            callbacks: Vec::new(),
            sink: None,
            trace: None,
            _args: std::marker::PhantomData,
        }
    }

    /// Object that makes the promise, handed to every callback
    pub fn producer(mut self, producer: H) -> Self {
        self.producer = Some(producer);
        self
    }

    /// Receiver callbacks run against. Falls back to the producer when unset
    pub fn context(mut self, context: H) -> Self {
        self.context = Some(context);
        self
    }

    /// Slot names declared when the registry is built
    pub fn callbacks<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.callbacks.extend(names.into_iter().map(Into::into));
        self
    }

    /// Per-registry error sink, overriding the process-wide default
    pub fn sink(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Observer for declare, register, fulfill and teardown events
    pub fn trace_callback(mut self, callback: impl Fn(&PromiseEvent) + 'static) -> Self {
        self.trace = Some(Arc::new(callback));
        self
    }

    /// Build the registry. The trace callback is installed first, so it sees the slot declarations.
    pub fn build(self) -> EventRegistry<H, A> {
        let mut registry = EventRegistry::new(self.producer, self.context);
        registry.set_sink(self.sink);
        registry.set_trace_arc(self.trace);
        registry.declare_callbacks(self.callbacks);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_builder_sets_everything() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let events_clone = events.clone();

        let registry: EventRegistry<u32, ()> = EventRegistry::builder()
            .producer(1)
            .context(2)
            .callbacks(["success", "error"])
            .trace_callback(move |e| events_clone.borrow_mut().push(e.clone()))
            .build();

        assert_eq!(registry.producer(), Some(&1));
        assert_eq!(registry.effective_context(), Some(&2));
        assert!(registry.callback_declared("success"));
        assert!(registry.callback_declared("error"));
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn test_builder_sink_is_used() {
        let reported = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let reported_clone = reported.clone();

        let registry: EventRegistry<u32, ()> = RegistryBuilder::new()
            .sink(move |_: &(dyn std::error::Error + 'static)| {
                reported_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            })
            .build();

        registry.report_error(std::fmt::Error).unwrap();
        assert_eq!(reported.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
