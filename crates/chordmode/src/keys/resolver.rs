//! Collaborators the interpreter consults but does not own.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Turns a raw key event into a key token.
///
/// Tokens use the same form as parsed keymap notation: printable characters
/// as typed (uppercased when shift is held), named keys lowercased (`left`,
/// `space`, `enter`), and modified keys as `<c-x>`. Pure modifier presses
/// resolve to `""`.
pub trait KeyResolver {
    fn key_char(&self, key: &KeyEvent) -> String;
}

/// Something that tracks what the pointer is hovering over.
pub trait PointerTracker {
    fn clear_hover(&self);
}

/// A toggleable overlay such as the help dialog.
pub trait Overlay {
    fn is_showing(&self) -> bool;
    fn toggle(&self);
}

/// Resolves crossterm key events, optionally remapping characters for a
/// keyboard layout.
#[derive(Debug, Clone, Default)]
pub struct CrosstermKeyResolver {
    layout: HashMap<char, char>,
}

impl CrosstermKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a resolver from `typed -> intended` character pairs.
    /// Entries whose sides are not single characters are ignored.
    pub fn with_layout<'a, I>(layout: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut map = HashMap::new();
        for (from, to) in layout {
            match (single_char(from), single_char(to)) {
                (Some(from), Some(to)) => {
                    map.insert(from, to);
                }
                _ => tracing::warn!(from = %from, to = %to, "ignoring layout entry"),
            }
        }
        Self { layout: map }
    }

    fn translate(&self, c: char) -> char {
        self.layout.get(&c).copied().unwrap_or(c)
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Uppercase form of `c`, or `c` itself when it has no single-character
/// uppercase.
pub(crate) fn shifted(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

impl KeyResolver for CrosstermKeyResolver {
    fn key_char(&self, key: &KeyEvent) -> String {
        let base = match key.code {
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char(c) => {
                let c = self.translate(c);
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    shifted(c).to_string()
                } else {
                    c.to_string()
                }
            }
            KeyCode::Enter => "enter".to_string(),
            KeyCode::Esc => "escape".to_string(),
            KeyCode::Tab => "tab".to_string(),
            KeyCode::BackTab => return "<s-tab>".to_string(),
            KeyCode::Backspace => "backspace".to_string(),
            KeyCode::Delete => "delete".to_string(),
            KeyCode::Insert => "insert".to_string(),
            KeyCode::Left => "left".to_string(),
            KeyCode::Right => "right".to_string(),
            KeyCode::Up => "up".to_string(),
            KeyCode::Down => "down".to_string(),
            KeyCode::Home => "home".to_string(),
            KeyCode::End => "end".to_string(),
            KeyCode::PageUp => "pageup".to_string(),
            KeyCode::PageDown => "pagedown".to_string(),
            KeyCode::F(n) => format!("f{n}"),
            KeyCode::CapsLock => "capslock".to_string(),
            KeyCode::ScrollLock => "scrolllock".to_string(),
            KeyCode::NumLock => "numlock".to_string(),
            KeyCode::PrintScreen => "printscreen".to_string(),
            KeyCode::Pause => "pause".to_string(),
            KeyCode::Menu => "menu".to_string(),
            KeyCode::Modifier(_) | KeyCode::Media(_) | KeyCode::KeypadBegin | KeyCode::Null => {
                return String::new()
            }
        };

        let mut modifiers = Vec::new();
        if key.modifiers.contains(KeyModifiers::ALT) {
            modifiers.push("a");
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            modifiers.push("c");
        }
        if key.modifiers.intersects(KeyModifiers::META | KeyModifiers::SUPER) {
            modifiers.push("m");
        }
        // Shift is folded into printable characters
        if key.modifiers.contains(KeyModifiers::SHIFT) && base.chars().count() > 1 {
            modifiers.push("s");
        }

        if modifiers.is_empty() {
            base
        } else {
            format!("<{}-{}>", modifiers.join("-"), base)
        }
    }
}
