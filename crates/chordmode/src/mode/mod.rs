//! Modal contexts.
//!
//! A mode is a group of handlers on the shared [`EventDispatchStack`] with a
//! lifecycle: activate registers them, exit removes them. Modes nest purely
//! by registration order, so the most recently activated mode sees events
//! first.
//!
//! [`EventDispatchStack`]: crate::dispatch::EventDispatchStack

mod context;
mod options;
mod stack;

pub use context::{consume_escape_keyup, Continuation, ModalContext, ModeId};
pub use options::{ModeEvent, ModeOptions};
pub use stack::ModalContextStack;
