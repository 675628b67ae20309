//! Canonical event descriptors.
//!
//! [`normalize`] turns whatever a host delivered into an [`Event`] with the
//! same field names, coordinate systems and button/key codes on every host.

use serde_json::{json, Map as JsonMap, Value as JsonValue};
use thiserror::Error;

use crate::dom::{Point, Target};
use crate::host::{HostCapabilities, HostEvent, RawEvent};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// Neither the listener argument nor the host fallback held an event,
    /// or the event carried no target.
    #[error("no event could be resolved: {0}")]
    InvalidEvent(&'static str),
    #[error("target cannot receive events")]
    InvalidTarget,
    #[error("handler is not callable")]
    NotAFunction,
}

/// Host-independent view of one dispatched event.
///
/// Built once per listener invocation and never reused. Cancellation goes
/// through to the host event it was built from.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: String,
    pub target: Target,
    pub related_target: Option<Target>,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    /// 0 left, 1 middle, 2 right; `None` outside mouse events.
    pub button: Option<u16>,
    pub key_code: Option<u32>,
    pub client: Option<Point>,
    pub page: Option<Point>,
    pub screen: Option<Point>,
    pub offset: Option<Point>,
    pub original: HostEvent,
}

impl Event {
    pub fn stop_propagation(&self) {
        self.original.borrow_mut().stop_propagation();
    }

    pub fn prevent_default(&self) {
        self.original.borrow_mut().prevent_default();
    }

    pub fn is_default_prevented(&self) -> bool {
        self.original.borrow().is_default_prevented()
    }

    pub fn is_mouse(&self) -> bool {
        is_mouse_kind(&self.kind)
    }

    pub fn is_key(&self) -> bool {
        is_key_kind(&self.kind)
    }

    /// Descriptor fields under their DOM names.
    pub fn to_json(&self) -> JsonValue {
        let mut map = JsonMap::new();
        map.insert("type".to_string(), JsonValue::String(self.kind.clone()));
        map.insert("target".to_string(), json!(format!("{:?}", self.target)));
        map.insert(
            "relatedTarget".to_string(),
            self.related_target
                .as_ref()
                .map_or(JsonValue::Null, |t| json!(format!("{t:?}"))),
        );
        map.insert("ctrlKey".to_string(), JsonValue::Bool(self.ctrl_key));
        map.insert("shiftKey".to_string(), JsonValue::Bool(self.shift_key));
        map.insert("altKey".to_string(), JsonValue::Bool(self.alt_key));
        map.insert("button".to_string(), json!(self.button));
        map.insert("keyCode".to_string(), json!(self.key_code));
        insert_point(&mut map, "client", self.client);
        insert_point(&mut map, "page", self.page);
        insert_point(&mut map, "screen", self.screen);
        insert_point(&mut map, "offset", self.offset);
        JsonValue::Object(map)
    }
}

fn insert_point(map: &mut JsonMap<String, JsonValue>, prefix: &str, point: Option<Point>) {
    map.insert(format!("{prefix}X"), json!(point.map(|p| p.x)));
    map.insert(format!("{prefix}Y"), json!(point.map(|p| p.y)));
}

pub fn is_mouse_kind(kind: &str) -> bool {
    kind.starts_with("mouse") || kind.contains("click")
}

pub fn is_key_kind(kind: &str) -> bool {
    kind.starts_with("key")
}

/// Map the legacy bit-flag button encoding to standard codes.
pub fn legacy_button(code: u16) -> Option<u16> {
    match code {
        0 | 1 | 3 | 5 | 7 => Some(0),
        2 | 6 => Some(2),
        4 => Some(1),
        _ => None,
    }
}

/// Build the canonical descriptor for the event a listener was called with,
/// falling back to the host's current event when the argument is absent.
pub fn normalize(host: &dyn HostCapabilities, argument: Option<HostEvent>) -> Result<Event, EventError> {
    let original = argument
        .or_else(|| host.current_event())
        .ok_or(EventError::InvalidEvent("listener received no event"))?;
    let raw = original.borrow();

    let target = raw
        .target
        .clone()
        .or_else(|| raw.src_element.clone())
        .ok_or(EventError::InvalidEvent("event has no target"))?;

    let mut event = Event {
        kind: raw.kind.clone(),
        target,
        related_target: None,
        ctrl_key: raw.modifiers.ctrl(),
        shift_key: raw.modifiers.shift(),
        alt_key: raw.modifiers.alt(),
        button: None,
        key_code: None,
        client: raw.client,
        page: raw.page,
        screen: raw.screen,
        offset: raw.offset,
        original: original.clone(),
    };

    if is_mouse_kind(&raw.kind) {
        normalize_mouse(host, &raw, &mut event);
    }
    if is_key_kind(&raw.kind) {
        event.key_code = match raw.key_code {
            Some(0) | None => raw.char_code,
            code => code,
        };
    }

    drop(raw);
    Ok(event)
}

fn normalize_mouse(host: &dyn HostCapabilities, raw: &RawEvent, event: &mut Event) {
    event.related_target = raw.related_target.clone().or_else(|| match raw.kind.as_str() {
        "mouseover" => raw.from_element.clone(),
        "mouseout" => raw.to_element.clone(),
        _ => None,
    });

    if event.offset.is_none() {
        event.offset = match (raw.client, host.bounding_rect(&event.target)) {
            (Some(client), Some(rect)) => Some(Point::new(client.x - rect.left, client.y - rect.top)),
            _ => None,
        };
    }

    if event.page.is_none() {
        let scroll = host.scroll_offset();
        event.page = raw
            .client
            .map(|client| Point::new(client.x + scroll.x, client.y + scroll.y));
    }

    event.button = if host.uses_legacy_buttons() {
        raw.button.and_then(legacy_button)
    } else {
        raw.button
    };
}
