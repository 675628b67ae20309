use tracing::trace;

use super::raw::{HostEvent, SyntheticEvent};
use super::{DispatchOutcome, HostCapabilities, HostCore, HostError, Listener, TaskQueue};
use crate::dom::{Document, Target};
use crate::profile::HostProfile;

/// Host with `addEventListener`/`removeEventListener`, a capture phase,
/// and events passed to listeners as their argument.
pub struct StandardHost {
    core: HostCore,
}

impl StandardHost {
    pub fn new(profile: HostProfile, document: Document) -> Result<Self, HostError> {
        Ok(Self {
            core: HostCore::new(profile, document)?,
        })
    }
}

impl HostCapabilities for StandardHost {
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
        None
    }

    fn add_listener(&self, target: &Target, name: &str, listener: &Listener, capture: bool) {
        self.core.registry.add(target, name, listener, capture);
    }

    fn remove_listener(&self, target: &Target, name: &str, listener: &Listener, capture: bool) {
        self.core.registry.remove(target, name, listener, capture);
    }

    fn dispatch(&self, event: &SyntheticEvent) -> DispatchOutcome {
        let document = &self.core.document;
        let raw = HostEvent::new(
            event.present_standard(document.scroll_offset(), document.bounding_rect(&event.target)),
        );
        let path = document.propagation_path(&event.target);
        trace!(target: "dom_compat", kind = %event.kind, target_node = ?event.target, "dispatch");

        self.core.registry.dispatch(
            &path,
            &event.kind,
            &raw,
            true,
            event.bubbles(),
            |listener| listener.call(Some(raw.clone())),
        );
        DispatchOutcome::from_event(&raw)
    }

    fn listener_count(&self, target: &Target, name: &str) -> usize {
        self.core.registry.count_for(target, name)
    }
}
