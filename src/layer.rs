//! Core trait for types that compose a registry.
//!
//! This module provides the `PromiseLayer` trait with default implementations that
//! delegate to the composed [`EventRegistry`]. A layer only has to say where its
//! registry lives; everything else comes for free.
//!
//! Layers stack by wrapping: a child layer owns its parent, declares its own event
//! names on the same flat registry and hands out the parent's registry as its own.
//! Because slot declaration is idempotent, a child never clobbers a parent's slot.

use crate::invocation::{CallbackResult, Invocation};
use crate::{EventRegistry, PromiseError};

/// Core trait defining how a composing type reaches its registry.
///
/// Implemented by [`EventRegistry`] itself and by every type generated with
/// [`define_promise!`](crate::define_promise).
pub trait PromiseLayer {
    /// Handle type of the producer and the context.
    type Handle: Clone;

    /// Positional argument type of fulfillments.
    type Arg;

    /// Build the layer, declaring every event name it and its parents contribute.
    fn create(producer: Option<Self::Handle>, context: Option<Self::Handle>) -> Self
    where
        Self: Sized;

    /// Access the composed registry.
    fn registry(&self) -> &EventRegistry<Self::Handle, Self::Arg>;

    /// Access the composed registry mutably.
    fn registry_mut(&mut self) -> &mut EventRegistry<Self::Handle, Self::Arg>;

    // -------------------------------------------------------------------------------------------------
    // Delegation
    // -------------------------------------------------------------------------------------------------

    /// Fulfill the event `name`. See [`EventRegistry::fulfill`].
    fn fulfill(&mut self, name: &str, args: Vec<Self::Arg>) -> Result<&mut Self, PromiseError>
    where
        Self: Sized,
    {
        self.registry_mut().fulfill(name, args)?;
        Ok(self)
    }

    /// Supply the callback for `name`. See [`EventRegistry::register`].
    fn register<F>(&mut self, name: &str, callback: F) -> Result<&mut Self, PromiseError>
    where
        Self: Sized,
        F: FnMut(&Invocation<'_, Self::Handle, Self::Arg>) -> CallbackResult + 'static,
    {
        self.registry_mut().register(name, callback)?;
        Ok(self)
    }

    /// Whether `name` is a declared callback slot.
    fn callback_declared(&self, name: &str) -> bool {
        self.registry().callback_declared(name)
    }

    /// Release callbacks, pending fulfillments and references.
    fn teardown(&mut self) {
        self.registry_mut().teardown();
    }

    /// Forward `error` to the configured sink, or hand it back.
    fn report_error<E>(&self, error: E) -> Result<(), E>
    where
        E: std::error::Error + 'static,
    {
        self.registry().report_error(error)
    }
}

impl<H: Clone, A> PromiseLayer for EventRegistry<H, A> {
    type Handle = H;
    type Arg = A;

    fn create(producer: Option<H>, context: Option<H>) -> Self {
        EventRegistry::new(producer, context)
    }

    fn registry(&self) -> &EventRegistry<H, A> {
        self
    }

    fn registry_mut(&mut self) -> &mut EventRegistry<H, A> {
        self
    }
}
