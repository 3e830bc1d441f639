// Services layer for business logic
// Services own validation and invariant checks, calling storage directly

pub mod event;

pub use event::{EventError, EventService};
