//! Alert policy, alert events, and per-frame render output.

mod dispatcher;
mod event;
mod render;

pub use dispatcher::AlertDispatcher;
pub use event::{AlertDecision, AlertEvent, AlertKind, AlertSink, TracingSink};
pub use render::{ColorClass, RenderDirective};
