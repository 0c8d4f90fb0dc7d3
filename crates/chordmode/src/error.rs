//! Errors raised while building keymaps.

use thiserror::Error;

/// A keymap that cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeymapError {
    #[error("empty key sequence")]
    EmptySequence,

    #[error("invalid key `{key}` in `{sequence}`")]
    InvalidKey { sequence: String, key: String },

    #[error("unknown modifier `{modifier}` in `{sequence}`")]
    UnknownModifier { sequence: String, modifier: String },

    #[error("unknown command `{0}`")]
    UnknownCommand(String),
}
