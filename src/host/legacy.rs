use std::cell::RefCell;

use tracing::{debug, trace};

use super::raw::{HostEvent, SyntheticEvent};
use super::{DispatchOutcome, HostCapabilities, HostCore, HostError, Listener, TaskQueue};
use crate::dom::{Document, Target};
use crate::profile::HostProfile;

/// Host with only named `attachEvent`/`detachEvent` registration.
///
/// Listeners are keyed by `on<event>` and receive no argument; the event
/// being dispatched is reachable through [`HostCapabilities::current_event`]
/// until dispatch returns. There is no capture phase: the `capture` flag is
/// ignored and every listener runs during bubbling.
pub struct LegacyHost {
    core: HostCore,
    current: RefCell<Option<HostEvent>>,
}

impl LegacyHost {
    pub fn new(profile: HostProfile, document: Document) -> Result<Self, HostError> {
        Ok(Self {
            core: HostCore::new(profile, document)?,
            current: RefCell::new(None),
        })
    }
}

/// Puts the previous current event back when dispatch unwinds or returns.
struct CurrentEventGuard<'a> {
    slot: &'a RefCell<Option<HostEvent>>,
    previous: Option<HostEvent>,
}

impl<'a> CurrentEventGuard<'a> {
    fn enter(slot: &'a RefCell<Option<HostEvent>>, event: HostEvent) -> Self {
        let previous = slot.replace(Some(event));
        Self { slot, previous }
    }
}

impl Drop for CurrentEventGuard<'_> {
    fn drop(&mut self) {
        self.slot.replace(self.previous.take());
    }
}

fn slot_name(name: &str) -> String {
    format!("on{name}")
}

impl HostCapabilities for LegacyHost {
    fn profile(&self) -> &HostProfile {
        &self.core.profile
    }

    fn document(&self) -> &Document {
        &self.core.document
    }

    fn tasks(&self) -> &TaskQueue {
        &self.core.tasks
    }

    fn current_event(&self) -> Option<HostEvent> {
        self.current.borrow().clone()
    }

    fn add_listener(&self, target: &Target, name: &str, listener: &Listener, capture: bool) {
        if capture {
            debug!(
                target: "dom_compat",
                event = name,
                "capture phase unsupported on legacy host; attaching for bubbling"
            );
        }
        self.core
            .registry
            .add(target, &slot_name(name), listener, false);
    }

    fn remove_listener(&self, target: &Target, name: &str, listener: &Listener, _capture: bool) {
        self.core
            .registry
            .remove(target, &slot_name(name), listener, false);
    }

    fn dispatch(&self, event: &SyntheticEvent) -> DispatchOutcome {
        let raw = HostEvent::new(event.present_legacy());
        let path = self.core.document.propagation_path(&event.target);
        trace!(target: "dom_compat", kind = %event.kind, target_node = ?event.target, "dispatch");

        let _current = CurrentEventGuard::enter(&self.current, raw.clone());
        self.core.registry.dispatch(
            &path,
            &slot_name(&event.kind),
            &raw,
            false,
            event.bubbles(),
            |listener| listener.call(None),
        );
        DispatchOutcome::from_event(&raw)
    }

    fn listener_count(&self, target: &Target, name: &str) -> usize {
        self.core.registry.count_for(target, &slot_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::rc::Rc;

    fn host() -> LegacyHost {
        LegacyHost::new(
            HostProfile::legacy(),
            Document::parse(r#"<button id="button">Go</button>"#),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn current_event_is_set_only_during_dispatch() {
        let host = Rc::new(host());
        let button = host.document().get_element_by_id("button").unwrap();
        let seen = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&seen);
        let weak = Rc::downgrade(&host);
        host.add_listener(
            &button,
            "click",
            &Listener::new(move |argument| {
                assert!(argument.is_none());
                let host = weak.upgrade().unwrap();
                *slot.borrow_mut() = host.current_event().map(|event| event.borrow().kind.clone());
            }),
            false,
        );

        host.dispatch(&SyntheticEvent::new("click", button));
        assert_eq!(seen.borrow().as_deref(), Some("click"));
        assert!(host.current_event().is_none());
    }

    #[tokio::test]
    async fn current_event_is_restored_after_a_panicking_listener() {
        let host = host();
        let button = host.document().get_element_by_id("button").unwrap();
        host.add_listener(
            &button,
            "click",
            &Listener::new(|_| panic!("listener failed")),
            false,
        );

        let result = catch_unwind(AssertUnwindSafe(|| {
            host.dispatch(&SyntheticEvent::new("click", button.clone()));
        }));
        assert!(result.is_err());
        assert!(host.current_event().is_none());
    }

    #[tokio::test]
    async fn capture_flag_is_ignored() {
        let host = host();
        let button = host.document().get_element_by_id("button").unwrap();
        let listener = Listener::new(|_| {});
        host.add_listener(&button, "click", &listener, true);
        assert_eq!(host.listener_count(&button, "click"), 1);

        host.remove_listener(&button, "click", &listener, true);
        assert_eq!(host.listener_count(&button, "click"), 0);
    }
}
