//! Events a host feeds into a session.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};

use crate::dispatch::{EventKind, QueryKind};
use crate::mode::ModeEvent;

/// An input event, or a question, from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Key(KeyEvent),
    Focus,
    Blur,
    Click,
    Query(QueryKind),
}

impl HostEvent {
    /// Handler kind this event is dispatched to. Key releases are keyups;
    /// presses and repeats are keydowns.
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::Key(key) if key.kind == KeyEventKind::Release => EventKind::KeyUp,
            HostEvent::Key(_) => EventKind::KeyDown,
            HostEvent::Focus => EventKind::Focus,
            HostEvent::Blur => EventKind::Blur,
            HostEvent::Click => EventKind::Click,
            HostEvent::Query(query) => EventKind::Query(*query),
        }
    }

    pub fn key(&self) -> Option<&KeyEvent> {
        match self {
            HostEvent::Key(key) => Some(key),
            _ => None,
        }
    }

    /// Converts a terminal event. Events with no counterpart (resize,
    /// paste, mouse movement) give `None`.
    pub fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) => Some(HostEvent::Key(key)),
            Event::FocusGained => Some(HostEvent::Focus),
            Event::FocusLost => Some(HostEvent::Blur),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(_) => Some(HostEvent::Click),
                _ => None,
            },
            _ => None,
        }
    }
}

impl ModeEvent for HostEvent {
    fn is_escape(&self) -> bool {
        match self {
            HostEvent::Key(key) => match key.code {
                KeyCode::Esc => true,
                KeyCode::Char('[') => key.modifiers.contains(KeyModifiers::CONTROL),
                _ => false,
            },
            _ => false,
        }
    }
}
