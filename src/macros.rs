//! Macros for creating promise types.
//!
//! This module provides a macro-based approach to attach named callback slots to a
//! type, one registration method per event, on top of a single flat [`EventRegistry`].
//!
//! [`EventRegistry`]: crate::EventRegistry

/// Creates a promise type with one registration method per event name.
///
/// The macro generates:
/// - A struct wrapping its base layer (an [`EventRegistry`](crate::EventRegistry) or
///   another generated type)
/// - `EVENTS`, the names this layer declares
/// - `new(producer, context)`, which builds the base and declares `EVENTS` on it
/// - One method per event that registers the callback for that event
/// - [`PromiseLayer`](crate::PromiseLayer), `Deref`/`DerefMut` to the base, and `Default`
///
/// # Examples
///
/// ```rust
/// use promise_registry::{define_promise, EventRegistry, PromiseLayer};
///
/// define_promise! {
///     /// Promise made by an upload.
///     pub struct UploadPromise: EventRegistry<&'static str, u16> { success, error }
/// }
///
/// let mut upload = UploadPromise::new(Some("uploader"), None);
/// upload.fulfill("success", vec![201]).unwrap();
///
/// upload
///     .success(|call| {
///         assert_eq!(call.args(), &[201]);
///         Ok(())
///     })
///     .unwrap();
/// ```
///
/// # Layering
///
/// A layer can extend another generated type. Both contribute slots to the same registry,
/// and names the parent already declared are left untouched:
///
/// ```rust
/// use promise_registry::{define_promise, EventRegistry, PromiseLayer};
///
/// define_promise! {
///     pub struct Request: EventRegistry<u32, String> { success, error }
/// }
///
/// define_promise! {
///     pub struct RetryingRequest: Request { retry, error }
/// }
///
/// let request = RetryingRequest::new(Some(7), None);
/// assert!(request.callback_declared("success"));
/// assert!(request.callback_declared("retry"));
/// assert_eq!(request.registry().slot("error").unwrap().layer(), Some("Request"));
/// ```
///
/// # Reserved names
///
/// Event names must not collide with registry methods (see
/// [`RESERVED_NAMES`](crate::RESERVED_NAMES)). Such a name is rejected at compile time:
///
/// ```compile_fail
/// use promise_registry::{define_promise, EventRegistry};
///
/// define_promise! {
///     pub struct Lifecycle: EventRegistry<u8, u8> { started, teardown }
/// }
/// ```
#[macro_export]
macro_rules! define_promise {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $base:ty { $($event:ident),* $(,)? }
    ) => {
        $(
            const _: () = assert!(
                !$crate::is_reserved_name(stringify!($event)),
                concat!("`", stringify!($event), "` is a registry method and cannot name an event"),
            );
        )*

        $(#[$meta])*
        $vis struct $name {
            parent: $base,
        }

        impl $name {
            /// Event names declared by this layer, parents excluded.
            pub const EVENTS: &'static [&'static str] = &[$(stringify!($event)),*];

            /// Create the promise. Callbacks run against `context`, else `producer`.
            pub fn new(
                producer: Option<<$base as $crate::PromiseLayer>::Handle>,
                context: Option<<$base as $crate::PromiseLayer>::Handle>,
            ) -> Self {
                <Self as $crate::PromiseLayer>::create(producer, context)
            }

            $(
                #[doc = concat!("Supply the callback for the `", stringify!($event), "` event.")]
                pub fn $event<F>(&mut self, callback: F) -> Result<&mut Self, $crate::PromiseError>
                where
                    F: FnMut(
                            &$crate::Invocation<
                                '_,
                                <$base as $crate::PromiseLayer>::Handle,
                                <$base as $crate::PromiseLayer>::Arg,
                            >,
                        ) -> $crate::CallbackResult
                        + 'static,
                {
                    $crate::PromiseLayer::registry_mut(&mut *self)
                        .register(stringify!($event), callback)?;
                    Ok(self)
                }
            )*
        }

        impl $crate::PromiseLayer for $name {
            type Handle = <$base as $crate::PromiseLayer>::Handle;
            type Arg = <$base as $crate::PromiseLayer>::Arg;

            fn create(producer: Option<Self::Handle>, context: Option<Self::Handle>) -> Self {
                let mut parent = <$base as $crate::PromiseLayer>::create(producer, context);
                $crate::PromiseLayer::registry_mut(&mut parent)
                    .declare_callbacks_in(stringify!($name), Self::EVENTS.iter().copied());
                Self { parent }
            }

            fn registry(&self) -> &$crate::EventRegistry<Self::Handle, Self::Arg> {
                $crate::PromiseLayer::registry(&self.parent)
            }

            fn registry_mut(&mut self) -> &mut $crate::EventRegistry<Self::Handle, Self::Arg> {
                $crate::PromiseLayer::registry_mut(&mut self.parent)
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $base;

            fn deref(&self) -> &$base {
                &self.parent
            }
        }

        impl ::std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut $base {
                &mut self.parent
            }
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                <Self as $crate::PromiseLayer>::create(None, None)
            }
        }
    };
}
