//! Key tokens, command mappings and the key sequence interpreter.

mod interpreter;
mod mapping;
mod notation;
mod resolver;

pub use interpreter::{
    is_escape_token, CommandInvocation, DispatchFn, InterpreterConfig, KeyOutcome,
    KeySequenceInterpreter, ESCAPE_TOKENS,
};
pub use mapping::{BindOutcome, Branch, KeyMapping, MappingBuilder, Node};
pub use notation::{format_key_sequence, parse_key_sequence};
pub use resolver::{CrosstermKeyResolver, KeyResolver, Overlay, PointerTracker};
