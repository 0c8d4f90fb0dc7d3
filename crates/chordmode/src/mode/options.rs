//! Per-mode options.

/// Events a mode can inspect for its built-in behaviours.
pub trait ModeEvent {
    /// Returns true if this is an escape key event (down or up).
    fn is_escape(&self) -> bool;
}

/// Options controlling how a [`ModalContext`](super::ModalContext) behaves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModeOptions {
    /// Mode name, used in handler names and logs.
    pub name: String,
    /// Text shown to the user while the mode is the innermost one.
    pub indicator: Option<String>,
    /// Activating a mode exits every other active mode with the same key.
    pub singleton: Option<String>,
    /// Exit on escape, swallowing the escape keyup.
    pub exit_on_escape: bool,
    /// Exit when the surface loses focus.
    pub exit_on_blur: bool,
    /// Exit on any click.
    pub exit_on_click: bool,
    /// Stop key events nothing above claimed from reaching modes below.
    pub suppress_all_keyboard_events: bool,
}

impl ModeOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn indicator(mut self, indicator: impl Into<String>) -> Self {
        self.indicator = Some(indicator.into());
        self
    }

    pub fn singleton(mut self, key: impl Into<String>) -> Self {
        self.singleton = Some(key.into());
        self
    }

    pub fn exit_on_escape(mut self) -> Self {
        self.exit_on_escape = true;
        self
    }

    pub fn exit_on_blur(mut self) -> Self {
        self.exit_on_blur = true;
        self
    }

    pub fn exit_on_click(mut self) -> Self {
        self.exit_on_click = true;
        self
    }

    pub fn suppress_all_keyboard_events(mut self) -> Self {
        self.suppress_all_keyboard_events = true;
        self
    }
}
