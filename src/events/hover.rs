//! `mouseenter`/`mouseleave` for hosts that only fire the bubbling
//! `mouseover`/`mouseout` pair.
//!
//! The emulated handler listens to the bubbling event and stays quiet when
//! the pointer moved between two nodes that are both inside the bound
//! element, which is exactly the case where enter/leave would not fire.

use std::rc::Rc;

use tracing::{debug, trace};

use super::binder::{wrap, Handler};
use super::normalize::normalize;
use crate::dom::Target;
use crate::host::{HostCapabilities, Listener};

/// The bubbling event standing in for `name`, if the host needs one.
pub fn emulated_name(host: &dyn HostCapabilities, name: &str) -> Option<&'static str> {
    if host.has_native_hover() {
        return None;
    }
    match name {
        "mouseenter" => Some("mouseover"),
        "mouseleave" => Some("mouseout"),
        _ => None,
    }
}

/// The event name actually registered with the host for `name`.
pub fn native_name<'a>(host: &dyn HostCapabilities, name: &'a str) -> &'a str {
    emulated_name(host, name).unwrap_or(name)
}

/// Rewrite `(name, handler)` into what gets registered with the host.
pub(crate) fn adapt(
    host: &Rc<dyn HostCapabilities>,
    bound: &Target,
    name: &str,
    handler: Handler,
) -> (String, Listener) {
    match emulated_name(host.as_ref(), name) {
        Some(native) => (
            native.to_string(),
            hover_listener(host, bound.clone(), name, handler),
        ),
        None => (name.to_string(), wrap(host, handler)),
    }
}

fn hover_listener(
    host: &Rc<dyn HostCapabilities>,
    bound: Target,
    requested: &str,
    handler: Handler,
) -> Listener {
    let host = Rc::downgrade(host);
    let requested = requested.to_string();
    Listener::new(move |argument| {
        let Some(host) = host.upgrade() else {
            return;
        };
        let mut event = match normalize(host.as_ref(), argument) {
            Ok(event) => event,
            Err(err) => {
                debug!(target: "dom_compat", error = %err, "dropped hover event");
                return;
            }
        };

        if let Some(related) = &event.related_target {
            if host.contains(&bound, related) {
                trace!(target: "dom_compat", event = %requested, "pointer stayed inside bound element");
                return;
            }
        }

        event.kind = requested.clone();
        handler.invoke(&event);
    })
}
