//! Cross-host DOM event layer: binds handlers that always see the same
//! normalized event, emulates `mouseenter`/`mouseleave` where the host
//! lacks them, and fires document-ready callbacks exactly once.

pub mod compat;
pub mod dom;
pub mod events;
pub mod host;
pub mod logging;
pub mod profile;
pub mod ready;

// Re-export commonly used types
pub use compat::Compat;
pub use dom::{Document, Point, Readiness, Rect, Target};
pub use events::{Event, EventBinder, EventError, Handler, Outcome};
pub use host::{DispatchOutcome, HostCapabilities, HostError, Listener, SyntheticEvent};
pub use profile::{EventModel, HostProfile, ProfileError};
pub use ready::{Phase, ReadyHandler, ReadyState};
