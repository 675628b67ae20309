use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use super::hover;
use super::normalize::{normalize, Event, EventError};
use crate::dom::Target;
use crate::host::{HostCapabilities, Listener};

/// What a handler asks of the host once it returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    Continue,
    /// Equivalent to calling `prevent_default()` on the event.
    Cancel,
}

impl From<()> for Outcome {
    fn from(_: ()) -> Self {
        Outcome::Continue
    }
}

/// `false` cancels, anything else continues.
impl From<bool> for Outcome {
    fn from(keep_default: bool) -> Self {
        if keep_default {
            Outcome::Continue
        } else {
            Outcome::Cancel
        }
    }
}

/// A caller-supplied event handler.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Event) -> Outcome>);

impl Handler {
    /// Handlers may return `()`, `bool` or [`Outcome`].
    pub fn new<F, R>(handler: F) -> Self
    where
        F: Fn(&Event) -> R + 'static,
        R: Into<Outcome>,
    {
        Self(Rc::new(move |event: &Event| -> Outcome { handler(event).into() }))
    }

    pub(crate) fn invoke(&self, event: &Event) -> Outcome {
        let outcome = (self.0)(event);
        if outcome == Outcome::Cancel {
            event.prevent_default();
        }
        outcome
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// Wrap `handler` so the host hands it a normalized event.
pub(crate) fn wrap(host: &Rc<dyn HostCapabilities>, handler: Handler) -> Listener {
    let host = Rc::downgrade(host);
    Listener::new(move |argument| {
        let Some(host) = host.upgrade() else {
            return;
        };
        match normalize(host.as_ref(), argument) {
            Ok(event) => {
                handler.invoke(&event);
            }
            Err(err) => debug!(target: "dom_compat", error = %err, "dropped event"),
        }
    })
}

/// Registers normalized handlers with a host.
///
/// `bind` returns the [`Listener`] the host actually holds. Removal only
/// works by passing that listener back to `unbind`; the original handler is
/// never registered with the host and cannot be used to find it.
///
/// On legacy hosts `capture` is ignored and capture-phase handlers run
/// during bubbling instead.
#[derive(Clone)]
pub struct EventBinder {
    host: Rc<dyn HostCapabilities>,
}

impl EventBinder {
    pub fn new(host: Rc<dyn HostCapabilities>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &Rc<dyn HostCapabilities> {
        &self.host
    }

    /// Register `handler` for `name` on `target`.
    ///
    /// Returns `None` without registering anything when the handler is
    /// missing or the target cannot receive events.
    pub fn bind(
        &self,
        target: &Target,
        name: &str,
        handler: impl Into<Option<Handler>>,
        capture: bool,
    ) -> Option<Listener> {
        let Some(handler) = handler.into() else {
            debug!(target: "dom_compat", event = name, error = %EventError::NotAFunction, "bind ignored");
            return None;
        };
        if !self.host.is_event_target(target) {
            debug!(
                target: "dom_compat",
                event = name,
                target_node = ?target,
                error = %EventError::InvalidTarget,
                "bind ignored"
            );
            return None;
        }

        let (native_name, listener) = hover::adapt(&self.host, target, name, handler);
        trace!(
            target: "dom_compat",
            event = name,
            native = %native_name,
            capture,
            listener = listener.id(),
            "bind"
        );
        self.host.add_listener(target, &native_name, &listener, capture);
        Some(listener)
    }

    /// Remove a listener previously returned by [`EventBinder::bind`].
    pub fn unbind(&self, target: &Target, name: &str, listener: &Listener, capture: bool) {
        if !self.host.is_event_target(target) {
            debug!(target: "dom_compat", event = name, error = %EventError::InvalidTarget, "unbind ignored");
            return;
        }
        let native_name = hover::native_name(self.host.as_ref(), name);
        self.host
            .remove_listener(target, native_name, listener, capture);
    }
}

impl fmt::Debug for EventBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBinder")
            .field("model", &self.host.model())
            .finish()
    }
}
