//! Host-side event objects.
//!
//! A [`RawEvent`] is what a host hands to its listeners, in whichever shape
//! its event model uses. Standard hosts fill `target`/`related_target` and
//! expose native cancellation methods; legacy hosts fill `src_element`,
//! `from_element`/`to_element` and only carry cancellation flags.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use keyboard_types::Modifiers;

use crate::dom::{Point, Rect, Target};
use crate::profile::EventModel;

/// How a raw event records cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancellation {
    /// The event exposes `stopPropagation()` / `preventDefault()`.
    Native {
        propagation_stopped: bool,
        default_prevented: bool,
    },
    /// Only the `cancelBubble` / `returnValue` flags exist.
    Legacy {
        cancel_bubble: bool,
        return_value: bool,
    },
}

impl Cancellation {
    pub fn for_model(model: EventModel) -> Self {
        match model {
            EventModel::Standard => Cancellation::Native {
                propagation_stopped: false,
                default_prevented: false,
            },
            EventModel::Legacy => Cancellation::Legacy {
                cancel_bubble: false,
                return_value: true,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct RawEvent {
    pub kind: String,
    pub target: Option<Target>,
    pub src_element: Option<Target>,
    pub related_target: Option<Target>,
    pub from_element: Option<Target>,
    pub to_element: Option<Target>,
    pub modifiers: Modifiers,
    pub button: Option<u16>,
    pub key_code: Option<u32>,
    pub char_code: Option<u32>,
    pub client: Option<Point>,
    pub page: Option<Point>,
    pub screen: Option<Point>,
    pub offset: Option<Point>,
    pub cancellation: Cancellation,
}

impl RawEvent {
    pub fn new(kind: impl Into<String>, model: EventModel) -> Self {
        Self {
            kind: kind.into(),
            target: None,
            src_element: None,
            related_target: None,
            from_element: None,
            to_element: None,
            modifiers: Modifiers::empty(),
            button: None,
            key_code: None,
            char_code: None,
            client: None,
            page: None,
            screen: None,
            offset: None,
            cancellation: Cancellation::for_model(model),
        }
    }

    pub fn has_native_methods(&self) -> bool {
        matches!(self.cancellation, Cancellation::Native { .. })
    }

    pub fn stop_propagation(&mut self) {
        match &mut self.cancellation {
            Cancellation::Native {
                propagation_stopped,
                ..
            } => *propagation_stopped = true,
            Cancellation::Legacy { cancel_bubble, .. } => *cancel_bubble = true,
        }
    }

    pub fn prevent_default(&mut self) {
        match &mut self.cancellation {
            Cancellation::Native {
                default_prevented, ..
            } => *default_prevented = true,
            Cancellation::Legacy { return_value, .. } => *return_value = false,
        }
    }

    pub fn is_propagation_stopped(&self) -> bool {
        match self.cancellation {
            Cancellation::Native {
                propagation_stopped,
                ..
            } => propagation_stopped,
            Cancellation::Legacy { cancel_bubble, .. } => cancel_bubble,
        }
    }

    pub fn is_default_prevented(&self) -> bool {
        match self.cancellation {
            Cancellation::Native {
                default_prevented, ..
            } => default_prevented,
            Cancellation::Legacy { return_value, .. } => !return_value,
        }
    }
}

/// Shared handle to the event object a host is currently dispatching.
#[derive(Clone)]
pub struct HostEvent(Rc<RefCell<RawEvent>>);

impl HostEvent {
    pub fn new(raw: RawEvent) -> Self {
        Self(Rc::new(RefCell::new(raw)))
    }

    pub fn borrow(&self) -> Ref<'_, RawEvent> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, RawEvent> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &HostEvent) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.0.borrow();
        f.debug_struct("HostEvent")
            .field("kind", &raw.kind)
            .field("cancellation", &raw.cancellation)
            .finish()
    }
}

/// Model-independent description of an event to dispatch. Each host
/// presents it in its own shape, the way a browser would have reported the
/// same user action.
#[derive(Debug, Clone)]
pub struct SyntheticEvent {
    pub kind: String,
    pub target: Target,
    pub related_target: Option<Target>,
    pub modifiers: Modifiers,
    /// Standard button code (0 left, 1 middle, 2 right).
    pub button: Option<u16>,
    pub key_code: Option<u32>,
    pub char_code: Option<u32>,
    pub client: Option<Point>,
    pub screen: Option<Point>,
}

impl SyntheticEvent {
    pub fn new(kind: impl Into<String>, target: Target) -> Self {
        Self {
            kind: kind.into(),
            target,
            related_target: None,
            modifiers: Modifiers::empty(),
            button: None,
            key_code: None,
            char_code: None,
            client: None,
            screen: None,
        }
    }

    /// A primary-button mouse event at `client`.
    pub fn mouse(kind: impl Into<String>, target: Target, client: Point) -> Self {
        Self {
            button: Some(0),
            client: Some(client),
            screen: Some(client),
            ..Self::new(kind, target)
        }
    }

    pub fn key(kind: impl Into<String>, target: Target, key_code: u32, char_code: u32) -> Self {
        Self {
            key_code: Some(key_code),
            char_code: Some(char_code),
            ..Self::new(kind, target)
        }
    }

    pub fn with_related(mut self, related: Target) -> Self {
        self.related_target = Some(related);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_button(mut self, button: u16) -> Self {
        self.button = Some(button);
        self
    }

    pub fn with_screen(mut self, screen: Point) -> Self {
        self.screen = Some(screen);
        self
    }

    /// Whether this kind of event travels back up the tree.
    pub fn bubbles(&self) -> bool {
        !matches!(
            self.kind.as_str(),
            "mouseenter" | "mouseleave" | "focus" | "blur" | "load" | "unload" | "scroll"
        )
    }

    /// Standard shape: targets as given, page and offset coordinates
    /// filled in by the host.
    pub(crate) fn present_standard(&self, scroll: Point, rect: Option<Rect>) -> RawEvent {
        let mut raw = RawEvent::new(self.kind.clone(), EventModel::Standard);
        raw.target = Some(self.target.clone());
        raw.related_target = self.related_target.clone();
        raw.modifiers = self.modifiers;
        raw.button = self.button;
        raw.key_code = self.key_code;
        raw.char_code = self.char_code;
        raw.client = self.client;
        raw.screen = self.screen;
        raw.page = self
            .client
            .map(|client| Point::new(client.x + scroll.x, client.y + scroll.y));
        raw.offset = match (self.client, rect) {
            (Some(client), Some(rect)) => Some(Point::new(client.x - rect.left, client.y - rect.top)),
            _ => None,
        };
        raw
    }

    /// Legacy shape: `srcElement`, `fromElement`/`toElement`, bit-flag
    /// button codes, no page or offset coordinates.
    pub(crate) fn present_legacy(&self) -> RawEvent {
        let mut raw = RawEvent::new(self.kind.clone(), EventModel::Legacy);
        raw.src_element = Some(self.target.clone());
        match self.kind.as_str() {
            "mouseover" => {
                raw.from_element = self.related_target.clone();
                raw.to_element = Some(self.target.clone());
            }
            "mouseout" => {
                raw.from_element = Some(self.target.clone());
                raw.to_element = self.related_target.clone();
            }
            _ => {}
        }
        raw.modifiers = self.modifiers;
        raw.button = self.button.map(legacy_button_code);
        raw.key_code = self.key_code;
        raw.char_code = self.char_code;
        raw.client = self.client;
        raw.screen = self.screen;
        raw
    }
}

fn legacy_button_code(button: u16) -> u16 {
    match button {
        0 => 1,
        1 => 4,
        2 => 2,
        other => other,
    }
}
