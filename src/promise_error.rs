use thiserror::Error;

use crate::CallbackError;

/// Errors returned by registry operations.
///
/// Callback failures are never swallowed: they come back as [`PromiseError::Callback`]
/// with the original error as the `source`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PromiseError {
    /// `fulfill` was called without an event name.
    #[error("the first argument to fulfill must be the name of the promise to fulfill")]
    MissingName,

    /// A callback was registered for a name that has no declared slot.
    #[error("no callback slot declared for {name:?}")]
    UndeclaredCallback {
        /// The event name that was used.
        name: String,
    },

    /// A callback is already stored for this name.
    #[error("a callback is already registered for {name:?}")]
    AlreadyRegistered {
        /// The event name that was used.
        name: String,
    },

    /// The registry was torn down and no longer holds callbacks or pending records.
    #[error("registry has been torn down")]
    TornDown,

    /// A callback returned an error while being invoked.
    #[error("callback for {name:?} failed: {source}")]
    Callback {
        /// The event whose callback failed.
        name: String,
        /// The error returned by the callback.
        #[source]
        source: CallbackError,
    },
}

impl PromiseError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            PromiseError::MissingName => "missing_name",
            PromiseError::UndeclaredCallback { .. } => "undeclared_callback",
            PromiseError::AlreadyRegistered { .. } => "already_registered",
            PromiseError::TornDown => "torn_down",
            PromiseError::Callback { .. } => "callback_failed",
        }
    }
}
