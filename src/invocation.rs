//! What a callback sees when it is invoked.

use crate::EventRegistry;

/// Error type callbacks may return. Propagated unmodified as the source of
/// [`PromiseError::Callback`](crate::PromiseError::Callback).
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Return type of every callback.
pub type CallbackResult = Result<(), CallbackError>;

/// A stored callback.
pub type Callback<H, A> = Box<dyn FnMut(&Invocation<'_, H, A>) -> CallbackResult>;

/// Arguments of a single callback invocation.
///
/// Mirrors the effective argument list of a fulfillment: the positional arguments,
/// then the producer, then the registry that made the promise. The context is the
/// receiver the callback runs against.
pub struct Invocation<'a, H, A> {
    name: &'a str,
    context: Option<&'a H>,
    args: &'a [A],
    producer: Option<&'a H>,
    registry: &'a EventRegistry<H, A>,
}

impl<'a, H, A> Invocation<'a, H, A> {
    pub(crate) fn new(
        name: &'a str,
        context: Option<&'a H>,
        args: &'a [A],
        producer: Option<&'a H>,
        registry: &'a EventRegistry<H, A>,
    ) -> Self {
        Self {
            name,
            context,
            args,
            producer,
            registry,
        }
    }

    /// Name of the fulfilled event.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Effective context captured when the event was fulfilled.
    pub fn context(&self) -> Option<&'a H> {
        self.context
    }

    /// Positional arguments passed to `fulfill`.
    pub fn args(&self) -> &'a [A] {
        self.args
    }

    /// Positional argument at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&'a A> {
        self.args.get(index)
    }

    /// The object that made the promise.
    pub fn producer(&self) -> Option<&'a H> {
        self.producer
    }

    /// The registry delivering this invocation.
    ///
    /// Read-only for the duration of the call. The running callback still counts as
    /// registered: `has_callback(name())` is `true` while it runs.
    pub fn registry(&self) -> &'a EventRegistry<H, A> {
        self.registry
    }
}
