pub mod binder;
pub mod hover;
pub mod normalize;

pub use binder::{EventBinder, Handler, Outcome};
pub use normalize::{normalize, Event, EventError};
