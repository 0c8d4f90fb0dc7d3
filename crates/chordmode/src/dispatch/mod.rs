//! Stacked event dispatch.
//!
//! - `DispatchSignal`: what a handler did with an event
//! - `EventKind`: which events a handler listens for
//! - `EventDispatchStack`: routes events through handlers, newest first

mod signal;
mod stack;

pub use signal::{DispatchSignal, EventKind, QueryKind};
pub use stack::{EventDispatchStack, HandlerFn, HandlerId, HandlerSpec};
