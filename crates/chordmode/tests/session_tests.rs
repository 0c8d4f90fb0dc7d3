//! Integration tests for chordmode sessions.

mod common;

use chordmode::config::load_config_from;
use chordmode::{Command, DispatchSignal, Effect, Session};
use common::{ctrl, down, invocation, press, session, session_with, type_keys, up};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::io::Write;

/// A count followed by a two-key chord dispatches once with that count.
#[test]
fn test_count_and_chord() {
    let mut session = session();
    assert_eq!(
        type_keys(&mut session, "5gt"),
        vec![invocation(Command::NextTab, Some(5))]
    );
    assert_eq!(
        type_keys(&mut session, "gg"),
        vec![invocation(Command::ScrollToTop, None)]
    );
    assert_eq!(session.pending_keys(), "");
}

/// An unknown key inside a chord resets, and the next key starts fresh.
#[test]
fn test_unmatched_key_resets() {
    let mut session = session();
    type_keys(&mut session, "3g");
    let response = press(&mut session, KeyCode::Char('q'));
    assert_eq!(response.signal, DispatchSignal::ContinueBubbling);
    assert!(response.effects.is_empty());

    assert_eq!(
        type_keys(&mut session, "t"),
        vec![invocation(Command::CreateTab, None)]
    );
}

/// Control-modified keys use angle-bracket notation in keymaps.
#[test]
fn test_modified_key_binding() {
    let mut session = session();
    let response = session.handle_event(ctrl('e'));
    assert_eq!(response.signal, DispatchSignal::SuppressEvent);
    assert_eq!(
        response.commands().cloned().collect::<Vec<_>>(),
        vec![invocation(Command::ScrollDown, None)]
    );
}

/// A shifted lowercase key reaches the uppercase binding.
#[test]
fn test_shifted_letter_uses_uppercase_binding() {
    let mut session = session();
    let shifted_g = KeyEvent::new(KeyCode::Char('g'), KeyModifiers::SHIFT);
    let response = session.handle_event(chordmode::HostEvent::Key(shifted_g));
    assert_eq!(
        response.commands().cloned().collect::<Vec<_>>(),
        vec![invocation(Command::ScrollToBottom, None)]
    );
}

#[test]
fn test_insert_mode_round_trip() {
    let mut session = session();
    type_keys(&mut session, "i");
    assert_eq!(session.indicator().as_deref(), Some("INSERT"));
    assert!(session.is_capturing_text());

    // keys go to the host, normal mode never sees them
    let response = press(&mut session, KeyCode::Char('j'));
    assert_eq!(response.signal, DispatchSignal::SuppressPropagation);
    assert!(response.effects.is_empty());

    let response = session.handle_event(down(KeyCode::Esc));
    assert_eq!(response.signal, DispatchSignal::SuppressEvent);
    assert_eq!(response.effects, vec![Effect::ModeExited("insert".into())]);
    let response = session.handle_event(up(KeyCode::Esc));
    assert_eq!(response.signal, DispatchSignal::SuppressEvent);

    assert_eq!(session.indicator().as_deref(), Some("NORMAL"));
    assert!(!session.is_capturing_text());
    assert_eq!(
        type_keys(&mut session, "j"),
        vec![invocation(Command::ScrollDown, None)]
    );
}

#[test]
fn test_blur_leaves_insert_mode() {
    let mut session = session();
    type_keys(&mut session, "i");
    let response = session.handle_event(chordmode::HostEvent::Blur);
    assert_eq!(response.effects, vec![Effect::ModeExited("insert".into())]);
    assert_eq!(session.active_modes(), vec!["normal".to_string()]);
}

#[test]
fn test_pass_keys() {
    let mut session = session_with(
        r#"
[keys]
pass_keys = "j"
"#,
    );

    let response = press(&mut session, KeyCode::Char('j'));
    assert_eq!(response.signal, DispatchSignal::ContinueBubbling);
    assert!(response.effects.is_empty());

    // with a count pending, the pass key is an ordinary key again
    assert_eq!(
        type_keys(&mut session, "3j"),
        vec![invocation(Command::ScrollDown, Some(3))]
    );
}

#[test]
fn test_pass_next_key() {
    let mut session = session_with(
        r#"
[[keymap.normal]]
key = "\\"
action = "pass_next_key"
"#,
    );

    assert_eq!(
        type_keys(&mut session, "2\\"),
        vec![invocation(Command::PassNextKey, Some(2))]
    );
    assert_eq!(session.indicator().as_deref(), Some("PASS NEXT KEY"));

    let response = press(&mut session, KeyCode::Char('j'));
    assert_eq!(response.signal, DispatchSignal::SuppressPropagation);
    assert!(response.effects.is_empty());

    assert_eq!(
        session
            .handle_event(down(KeyCode::Char('x')))
            .signal,
        DispatchSignal::SuppressPropagation
    );
    let response = session.handle_event(up(KeyCode::Char('x')));
    assert_eq!(
        response.effects,
        vec![Effect::ModeExited("pass-next-key".into())]
    );

    assert_eq!(
        type_keys(&mut session, "j"),
        vec![invocation(Command::ScrollDown, None)]
    );
}

#[test]
fn test_visual_mode() {
    let mut session = session();
    type_keys(&mut session, "v");
    assert_eq!(session.indicator().as_deref(), Some("VISUAL"));

    assert_eq!(
        type_keys(&mut session, "2j0"),
        vec![
            invocation(Command::MoveDown, Some(2)),
            invocation(Command::LineStart, None),
        ]
    );

    // unmapped keys stop at visual mode instead of reaching normal mode
    let response = press(&mut session, KeyCode::Char('x'));
    assert_eq!(response.signal, DispatchSignal::SuppressPropagation);
    assert!(response.effects.is_empty());

    let response = session.handle_event(down(KeyCode::Char('y')));
    assert_eq!(
        response.effects,
        vec![
            Effect::Command(invocation(Command::YankSelection, None)),
            Effect::ModeExited("visual".into()),
        ]
    );
    assert_eq!(session.indicator().as_deref(), Some("NORMAL"));
}

#[test]
fn test_escape_leaves_visual_mode() {
    let mut session = session();
    type_keys(&mut session, "vg");

    let response = session.handle_event(down(KeyCode::Esc));
    assert_eq!(response.signal, DispatchSignal::SuppressEvent);
    assert_eq!(response.effects, vec![Effect::ModeExited("visual".into())]);
    assert_eq!(session.active_modes(), vec!["normal".to_string()]);
}

#[test]
fn test_escape_cancels_pending_count() {
    let mut session = session();
    type_keys(&mut session, "4");
    assert_eq!(session.pending_keys(), "4");

    let response = session.handle_event(down(KeyCode::Esc));
    assert_eq!(response.signal, DispatchSignal::SuppressEvent);
    assert_eq!(session.pending_keys(), "");
    assert_eq!(
        session.handle_event(up(KeyCode::Esc)).signal,
        DispatchSignal::SuppressEvent
    );

    // the next escape is at rest
    let response = press(&mut session, KeyCode::Esc);
    assert_eq!(response.signal, DispatchSignal::ContinueBubbling);
    assert_eq!(response.effects, vec![Effect::ClearHover]);
}

#[test]
fn test_layout_translation() {
    let mut session = session_with(
        r#"
[keys]
layout = { "о" = "j", "п" = "g" }
"#,
    );
    assert_eq!(
        type_keys(&mut session, "оппj"),
        vec![
            invocation(Command::ScrollDown, None),
            invocation(Command::ScrollToTop, None),
            invocation(Command::ScrollDown, None),
        ]
    );
}

#[test]
fn test_config_file_remaps_keys() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[keymap]
unmap = ["x"]

[[keymap.normal]]
key = "gx"
action = "removeTab"
description = "Close tab"
"#
    )
    .unwrap();

    let config = load_config_from(file.path()).unwrap();
    let mut session = Session::new(config).unwrap();

    assert!(type_keys(&mut session, "x").is_empty());
    assert_eq!(
        type_keys(&mut session, "gx"),
        vec![invocation(Command::RemoveTab, None)]
    );
    assert!(session
        .help_lines()
        .iter()
        .any(|line| line.contains("gx") && line.contains("Close tab")));
}

#[test]
fn test_bad_config_fails_to_start() {
    let config = toml::from_str(
        r#"
[[keymap.visual]]
key = "<bogus>"
action = "yank_selection"
"#,
    )
    .unwrap();
    let err = Session::new(config).unwrap_err();
    assert!(format!("{err:#}").contains("invalid key `bogus`"));
}
