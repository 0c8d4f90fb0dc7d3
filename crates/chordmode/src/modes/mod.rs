//! Concrete modes built on [`ModalContext`](crate::mode::ModalContext).

mod insert;
mod key_handler;
mod pass_next_key;

pub use insert::{InsertMode, INSERT_MODE};
pub use key_handler::KeyHandlerMode;
pub use pass_next_key::{PassNextKeyMode, PASS_NEXT_KEY_MODE};
