use std::cell::RefCell;

use super::raw::HostEvent;
use super::Listener;
use crate::dom::Target;

struct Registration {
    target: Target,
    name: String,
    capture: bool,
    listener: Listener,
}

impl Registration {
    fn matches(&self, target: &Target, name: &str, capture: bool) -> bool {
        self.capture == capture && self.name == name && &self.target == target
    }
}

/// Listener table of one host, in registration order.
#[derive(Default)]
pub(crate) struct Registry {
    entries: RefCell<Vec<Registration>>,
}

impl Registry {
    /// Returns false when the same listener is already registered for the
    /// same target, name and phase.
    pub(crate) fn add(&self, target: &Target, name: &str, listener: &Listener, capture: bool) -> bool {
        let mut entries = self.entries.borrow_mut();
        if entries
            .iter()
            .any(|entry| entry.matches(target, name, capture) && &entry.listener == listener)
        {
            return false;
        }
        entries.push(Registration {
            target: target.clone(),
            name: name.to_string(),
            capture,
            listener: listener.clone(),
        });
        true
    }

    pub(crate) fn remove(&self, target: &Target, name: &str, listener: &Listener, capture: bool) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries
            .iter()
            .position(|entry| entry.matches(target, name, capture) && &entry.listener == listener)
        {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn count_for(&self, target: &Target, name: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.name == name && &entry.target == target)
            .count()
    }

    // Snapshot so listeners may bind or unbind while being called.
    fn matching(&self, target: &Target, name: &str, capture: bool) -> Vec<Listener> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.matches(target, name, capture))
            .map(|entry| entry.listener.clone())
            .collect()
    }

    /// Walk `path` (innermost first) delivering `event` to matching
    /// listeners: capture from the root down when `capture_phase` is set,
    /// then the target itself, then bubbling back up when `bubbles`.
    pub(crate) fn dispatch(
        &self,
        path: &[Target],
        name: &str,
        event: &HostEvent,
        capture_phase: bool,
        bubbles: bool,
        mut deliver: impl FnMut(&Listener),
    ) {
        let Some(target) = path.first() else {
            return;
        };
        let stopped = || event.borrow().is_propagation_stopped();

        if capture_phase {
            for node in path.iter().skip(1).rev() {
                if stopped() {
                    return;
                }
                for listener in self.matching(node, name, true) {
                    deliver(&listener);
                }
            }
        }

        if stopped() {
            return;
        }
        for listener in self.matching(target, name, true) {
            deliver(&listener);
        }
        for listener in self.matching(target, name, false) {
            deliver(&listener);
        }

        if bubbles {
            for node in path.iter().skip(1) {
                if stopped() {
                    return;
                }
                for listener in self.matching(node, name, false) {
                    deliver(&listener);
                }
            }
        }
    }
}
