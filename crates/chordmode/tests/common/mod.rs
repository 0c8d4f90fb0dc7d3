//! Test utilities for chordmode integration tests.
//!
//! Builds sessions from TOML snippets and synthesizes terminal key events.

#![allow(dead_code)]

use chordmode::config::Config;
use chordmode::keys::CommandInvocation;
use chordmode::{Command, HostEvent, Response, Session};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

/// A session configured from `toml`, with test logging installed.
pub fn session_with(toml: &str) -> Session {
    chordmode::logging::test();
    let config: Config = toml::from_str(toml).expect("test config should parse");
    Session::new(config).expect("test session should start")
}

pub fn session() -> Session {
    session_with("")
}

pub fn down(code: KeyCode) -> HostEvent {
    HostEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub fn up(code: KeyCode) -> HostEvent {
    HostEvent::Key(KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Release,
        state: KeyEventState::NONE,
    })
}

pub fn ctrl(c: char) -> HostEvent {
    HostEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

/// Presses and releases a key, returning the keydown response.
pub fn press(session: &mut Session, code: KeyCode) -> Response {
    let response = session.handle_event(down(code));
    session.handle_event(up(code));
    response
}

/// Types each character of `keys` and collects every command recognised.
pub fn type_keys(session: &mut Session, keys: &str) -> Vec<CommandInvocation<Command>> {
    let mut commands = Vec::new();
    for c in keys.chars() {
        for event in [down(KeyCode::Char(c)), up(KeyCode::Char(c))] {
            let response = session.handle_event(event);
            commands.extend(response.commands().cloned());
        }
    }
    commands
}

pub fn invocation(command: Command, count: Option<u32>) -> CommandInvocation<Command> {
    CommandInvocation { command, count }
}
