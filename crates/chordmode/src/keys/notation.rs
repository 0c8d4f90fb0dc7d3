//! Keymap notation.
//!
//! Sequences are written the way they are typed: `gg`, `<c-d>`, `g<left>`.
//! Parsing turns them into the same key tokens the resolver produces for
//! live key events, so a parsed sequence can be looked up directly.

use crate::error::KeymapError;

use super::resolver::shifted;

const MODIFIERS: [&str; 4] = ["a", "c", "m", "s"];

/// Splits a sequence such as `"<c-w>gT"` into key tokens.
///
/// Printable characters keep their case. Named keys are lowercased and
/// modifiers are sorted so `<C-A-x>` and `<a-c-x>` name the same token.
pub fn parse_key_sequence(sequence: &str) -> Result<Vec<String>, KeymapError> {
    let mut tokens = Vec::new();
    let mut rest = sequence;

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some(end) = rest[1..].find('>') {
                // `<>` falls through to two literal characters
                let inner = &rest[1..end + 1];
                if !inner.is_empty() {
                    tokens.push(parse_group(sequence, inner)?);
                    rest = &rest[end + 2..];
                    continue;
                }
            }
        }
        tokens.push(c.to_string());
        rest = &rest[c.len_utf8()..];
    }

    if tokens.is_empty() {
        return Err(KeymapError::EmptySequence);
    }
    Ok(tokens)
}

/// Joins tokens back into notation. Named keys are wrapped in angle brackets.
pub fn format_key_sequence<S: AsRef<str>>(keys: &[S]) -> String {
    keys.iter()
        .map(|key| {
            let key = key.as_ref();
            if key.chars().count() > 1 && !key.starts_with('<') {
                format!("<{key}>")
            } else {
                key.to_string()
            }
        })
        .collect()
}

fn parse_group(sequence: &str, inner: &str) -> Result<String, KeymapError> {
    let mut modifiers = Vec::new();
    let mut rest = inner;

    // A modifier is a single letter followed by '-', with something after it.
    while rest.len() > 2 && rest.as_bytes()[1] == b'-' {
        let modifier = rest[..1].to_ascii_lowercase();
        if !MODIFIERS.contains(&modifier.as_str()) {
            return Err(KeymapError::UnknownModifier {
                sequence: sequence.to_string(),
                modifier,
            });
        }
        if !modifiers.contains(&modifier) {
            modifiers.push(modifier);
        }
        rest = &rest[2..];
    }

    let key = if rest.chars().count() == 1 {
        rest.to_string()
    } else {
        named_key(&rest.to_ascii_lowercase())
            .ok_or_else(|| KeymapError::InvalidKey {
                sequence: sequence.to_string(),
                key: rest.to_string(),
            })?
            .to_string()
    };

    // Shift on a printable key is its uppercase form, as the resolver reports it
    let key = match modifiers.iter().position(|m| m == "s") {
        Some(shift) if key.chars().count() == 1 => {
            modifiers.remove(shift);
            key.chars().map(shifted).collect()
        }
        _ => key,
    };

    // `<x>` is just `x`
    if modifiers.is_empty() {
        return Ok(key);
    }
    modifiers.sort();
    Ok(format!("<{}-{}>", modifiers.join("-"), key))
}

/// Canonical name for a named key, accepting common aliases.
fn named_key(name: &str) -> Option<&'static str> {
    let key = match name {
        "esc" | "escape" => "escape",
        "cr" | "enter" | "return" => "enter",
        "space" => "space",
        "tab" => "tab",
        "bs" | "backspace" => "backspace",
        "del" | "delete" => "delete",
        "ins" | "insert" => "insert",
        "left" => "left",
        "right" => "right",
        "up" => "up",
        "down" => "down",
        "home" => "home",
        "end" => "end",
        "pageup" => "pageup",
        "pagedown" => "pagedown",
        "lt" => "<",
        "gt" => ">",
        "f1" => "f1",
        "f2" => "f2",
        "f3" => "f3",
        "f4" => "f4",
        "f5" => "f5",
        "f6" => "f6",
        "f7" => "f7",
        "f8" => "f8",
        "f9" => "f9",
        "f10" => "f10",
        "f11" => "f11",
        "f12" => "f12",
        _ => return None,
    };
    Some(key)
}
