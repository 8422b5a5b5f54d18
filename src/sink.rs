//! Error sinks used by `report_error`.
//!
//! A sink is the seam for handing callback failures to a host application's error reporting.
//! Each registry may carry its own sink; otherwise the process-wide default is used.
//! The default starts out as [`TracingSink`], which logs through `tracing::error!`.

use std::error::Error;
use std::sync::{Arc, LazyLock, RwLock};

/// Receives errors forwarded by `report_error`.
pub trait ErrorSink: Send + Sync {
    /// Report one error. Must not panic.
    fn report(&self, error: &(dyn Error + 'static));
}

impl<F> ErrorSink for F
where
    F: Fn(&(dyn Error + 'static)) + Send + Sync,
{
    fn report(&self, error: &(dyn Error + 'static)) {
        self(error)
    }
}

/// Sink that logs every error at `error` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    /// Construct a new [`TracingSink`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ErrorSink for TracingSink {
    fn report(&self, error: &(dyn Error + 'static)) {
        tracing::error!(error = %error, "callback error reported");
    }
}

/// Shared handle to a sink.
pub type SinkRef = Arc<dyn ErrorSink>;

static DEFAULT_SINK: LazyLock<RwLock<Option<SinkRef>>> =
    LazyLock::new(|| RwLock::new(Some(Arc::new(TracingSink))));

/// Replace the process-wide default sink.
///
/// Registries without their own sink pick this up on every `report_error` call.
///
/// # Lock Poisoning Recovery
///
/// If the lock is poisoned, the inner value is recovered and overwritten.
pub fn set_default_sink(sink: impl ErrorSink + 'static) {
    set_default_sink_arc(Arc::new(sink));
}

/// Replace the process-wide default sink with an already shared one.
pub fn set_default_sink_arc(sink: SinkRef) {
    let mut guard = DEFAULT_SINK.write().unwrap_or_else(|p| p.into_inner());
    *guard = Some(sink);
}

/// Remove the process-wide default sink.
///
/// Afterwards `report_error` hands errors back to the caller unless the registry has its own sink.
pub fn clear_default_sink() {
    let mut guard = DEFAULT_SINK.write().unwrap_or_else(|p| p.into_inner());
    *guard = None;
}

/// Restore the process-wide default sink to [`TracingSink`].
pub fn reset_default_sink() {
    set_default_sink(TracingSink);
}

/// Current process-wide default sink, if any.
pub fn default_sink() -> Option<SinkRef> {
    DEFAULT_SINK
        .read()
        .unwrap_or_else(|p| p.into_inner())
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    use serial_test::serial;
    use std::sync::Mutex;

    #[test]
    #[serial]
    fn test_default_is_present() {
        reset_default_sink();
        assert!(default_sink().is_some());
    }

    #[test]
    #[serial]
    fn test_clear_and_set_default() {
        clear_default_sink();
        assert!(default_sink().is_none());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        set_default_sink(move |e: &(dyn Error + 'static)| {
            seen_clone.lock().unwrap().push(e.to_string());
        });

        let err: Box<dyn Error + Send + Sync> = "boom".into();
        default_sink().unwrap().report(err.as_ref());
        assert_eq!(*seen.lock().unwrap(), vec!["boom".to_string()]);

        reset_default_sink();
    }

    #[test]
    fn test_tracing_sink_does_not_panic() {
        let err = std::fmt::Error;
        TracingSink::new().report(&err);
    }
}
