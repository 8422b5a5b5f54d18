/// What a registry just did, reported before it acts.
///
/// Delivered to the observer installed with `set_trace_callback` or
/// `RegistryBuilder::trace_callback`. Cloneable so observers can keep a log.
///
/// # Examples
///
/// ```rust
/// use promise_registry::PromiseEvent;
///
/// let event = PromiseEvent::Declare { name: "success".into(), created: true };
/// assert_eq!(event.to_string(), "declare { name: success, created: true }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromiseEvent {
    /// A callback slot declaration was requested.
    Declare {
        /// The event name
        name: String,
        /// Whether a new slot was created (false when one already existed)
        created: bool,
    },

    /// A callback was supplied for a slot.
    Register {
        /// The event name
        name: String,
        /// Whether a pending fulfillment was consumed instead of storing the callback
        deferred: bool,
    },

    /// An event was fulfilled.
    Fulfill {
        /// The event name
        name: String,
        /// Whether a registered callback received it now (false when it was cached)
        delivered: bool,
    },

    /// The registry released its callbacks, pending records and references.
    Teardown {},
}

impl std::fmt::Display for PromiseEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromiseEvent::Declare { name, created } => {
                write!(f, "declare {{ name: {}, created: {} }}", name, created)
            }
            PromiseEvent::Register { name, deferred } => {
                write!(f, "register {{ name: {}, deferred: {} }}", name, deferred)
            }
            PromiseEvent::Fulfill { name, delivered } => {
                write!(f, "fulfill {{ name: {}, delivered: {} }}", name, delivered)
            }
            PromiseEvent::Teardown {} => write!(f, "Tearing down the registry"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promise_event_display() {
        let event = PromiseEvent::Register {
            name: "success".into(),
            deferred: true,
        };
        assert_eq!(event.to_string(), "register { name: success, deferred: true }");

        let event = PromiseEvent::Fulfill {
            name: "complete".into(),
            delivered: false,
        };
        assert_eq!(
            event.to_string(),
            "fulfill { name: complete, delivered: false }"
        );

        assert_eq!(
            PromiseEvent::Teardown {}.to_string(),
            "Tearing down the registry"
        );
    }

    #[test]
    fn test_promise_event_clone() {
        let event = PromiseEvent::Declare {
            name: "error".into(),
            created: false,
        };
        assert_eq!(event.clone(), event);
    }
}
