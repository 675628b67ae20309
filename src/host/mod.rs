//! Host event models.
//!
//! [`HostCapabilities`] is everything the binder, normalizer and ready
//! detector need from the environment they run in. Each host class gets
//! one implementation, chosen once by [`select`] from a [`HostProfile`].

pub mod legacy;
pub mod raw;
pub(crate) mod registry;
pub mod standard;
pub mod tasks;

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::dom::{Document, Point, Readiness, Rect, Target};
use crate::profile::{EventModel, HostProfile};

pub use legacy::LegacyHost;
pub use raw::{Cancellation, HostEvent, RawEvent, SyntheticEvent};
pub use standard::StandardHost;
pub use tasks::{Task, TaskId, TaskQueue, Tick};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Error)]
pub enum HostError {
    #[error("no tokio runtime is available to drive host timers")]
    NoRuntime,
    #[error("document is still parsing")]
    NotParsed,
}

/// The callable a host keeps in its listener table.
///
/// Identity is by allocation: clones compare equal, two listeners built
/// from the same closure source do not.
#[derive(Clone)]
pub struct Listener {
    id: u64,
    callback: Rc<dyn Fn(Option<HostEvent>)>,
}

impl Listener {
    pub fn new(callback: impl Fn(Option<HostEvent>) + 'static) -> Self {
        Self {
            id: NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed),
            callback: Rc::new(callback),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn call(&self, event: Option<HostEvent>) {
        (self.callback)(event)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id).finish()
    }
}

/// Cancellation state of an event once dispatch finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl DispatchOutcome {
    pub fn from_event(event: &HostEvent) -> Self {
        let raw = event.borrow();
        Self {
            default_prevented: raw.is_default_prevented(),
            propagation_stopped: raw.is_propagation_stopped(),
        }
    }
}

pub trait HostCapabilities {
    fn profile(&self) -> &HostProfile;

    fn document(&self) -> &Document;

    fn tasks(&self) -> &TaskQueue;

    fn model(&self) -> EventModel {
        self.profile().model
    }

    /// Element nodes, the document and the window.
    fn is_event_target(&self, target: &Target) -> bool {
        self.document().is_event_target(target)
    }

    fn has_native_hover(&self) -> bool {
        self.profile().native_hover()
    }

    fn uses_legacy_buttons(&self) -> bool {
        self.profile().uses_legacy_buttons()
    }

    fn has_content_loaded(&self) -> bool {
        self.profile().has_content_loaded()
    }

    fn contains(&self, ancestor: &Target, node: &Target) -> bool {
        ancestor.contains(node)
    }

    fn scroll_offset(&self) -> Point {
        self.document().scroll_offset()
    }

    fn bounding_rect(&self, target: &Target) -> Option<Rect> {
        self.document().bounding_rect(target)
    }

    fn readiness(&self) -> Readiness {
        self.document().readiness()
    }

    /// Fails until the tree is fully parsed.
    fn probe_parsed(&self) -> Result<(), HostError> {
        if self.readiness().is_parsed() {
            Ok(())
        } else {
            Err(HostError::NotParsed)
        }
    }

    /// The event being dispatched, for hosts that do not pass it to
    /// listeners as an argument.
    fn current_event(&self) -> Option<HostEvent>;

    fn add_listener(&self, target: &Target, name: &str, listener: &Listener, capture: bool);

    fn remove_listener(&self, target: &Target, name: &str, listener: &Listener, capture: bool);

    fn queue_task(&self, task: Task) -> TaskId {
        self.tasks().queue(task)
    }

    fn set_interval(&self, period: Duration, tick: Tick) -> TaskId {
        self.tasks().set_interval(period, tick)
    }

    fn clear_interval(&self, id: TaskId) {
        self.tasks().clear(id)
    }

    // Driver side: what the browser itself would do.

    /// Deliver `event` to every listener along its propagation path.
    fn dispatch(&self, event: &SyntheticEvent) -> DispatchOutcome;

    /// Listeners registered on `target` for the event `name`.
    fn listener_count(&self, target: &Target, name: &str) -> usize;

    /// Run one turn of the host task queue.
    fn run_pending(&self) -> usize {
        self.tasks().run_pending()
    }

    /// Mark the tree as parsed, firing `DOMContentLoaded` where supported.
    fn finish_parsing(&self) {
        if self.document().advance_readiness(Readiness::Interactive) && self.has_content_loaded() {
            self.dispatch(&SyntheticEvent::new("DOMContentLoaded", Target::Document));
        }
    }

    /// Mark every subresource loaded and fire `load` on the window.
    fn finish_loading(&self) {
        self.finish_parsing();
        if self.document().advance_readiness(Readiness::Complete) {
            self.dispatch(&SyntheticEvent::new("load", Target::Window));
        }
    }
}

/// State shared by both host variants.
pub(crate) struct HostCore {
    pub(crate) profile: HostProfile,
    pub(crate) document: Document,
    pub(crate) registry: registry::Registry,
    pub(crate) tasks: TaskQueue,
}

impl HostCore {
    pub(crate) fn new(profile: HostProfile, document: Document) -> Result<Self, HostError> {
        Ok(Self {
            profile,
            document,
            registry: registry::Registry::default(),
            tasks: TaskQueue::new()?,
        })
    }
}

/// Build the host variant `profile` describes.
pub fn select(profile: HostProfile, document: Document) -> Result<Rc<dyn HostCapabilities>, HostError> {
    info!(
        target: "dom_compat",
        model = ?profile.model,
        native_hover = profile.native_hover(),
        legacy_buttons = profile.uses_legacy_buttons(),
        content_loaded = profile.has_content_loaded(),
        "selected host event model"
    );
    let host: Rc<dyn HostCapabilities> = match profile.model {
        EventModel::Standard => Rc::new(StandardHost::new(profile, document)?),
        EventModel::Legacy => Rc::new(LegacyHost::new(profile, document)?),
    };
    Ok(host)
}
