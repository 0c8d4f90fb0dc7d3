//! Modal keyboard handling: a stack of event handlers, modes that own groups
//! of handlers, and an interpreter for counted, chorded key commands.
//!
//! A [`Session`](session::Session) wires these together for terminal hosts.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod keys;
pub mod logging;
pub mod mode;
pub mod modes;
pub mod session;

pub use command::Command;
pub use dispatch::{DispatchSignal, EventDispatchStack, EventKind};
pub use error::KeymapError;
pub use keys::{KeyMapping, KeySequenceInterpreter, MappingBuilder};
pub use mode::{ModalContext, ModalContextStack};
pub use session::{Effect, HostEvent, Response, Session};
