//! Incremental recognition of counted, chorded key commands.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::dispatch::DispatchSignal;

use super::mapping::{Branch, KeyMapping, Node};
use super::notation::format_key_sequence;
use super::resolver::{Overlay, PointerTracker};

/// Tokens that act as escape.
pub const ESCAPE_TOKENS: [&str; 2] = ["escape", "<c-[>"];

pub fn is_escape_token(token: &str) -> bool {
    ESCAPE_TOKENS.contains(&token)
}

/// A recognised command with its repeat count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation<C> {
    pub command: C,
    /// `None` when no count was typed.
    pub count: Option<u32>,
}

impl<C> CommandInvocation<C> {
    /// How many times to run the command.
    pub fn repeat(&self) -> u32 {
        self.count.unwrap_or(1)
    }
}

pub type DispatchFn<C> = Box<dyn FnMut(CommandInvocation<C>) -> anyhow::Result<()>>;

/// What [`KeySequenceInterpreter::interpret`] did with a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Empty token (a modifier press). Nothing changed.
    Ignored,
    /// Escape discarded a pending count or chord.
    EscapeReset,
    /// Escape closed the overlay.
    OverlayClosed,
    /// Escape with nothing pending.
    EscapeAtRest,
    /// A digit extended the count. Holds the new count.
    Counted(u32),
    /// A chord prefix was typed.
    Descended,
    /// A command was dispatched.
    Dispatched,
    /// A command was dispatched and the command limit is used up.
    Exhausted,
    /// A pass key at rest, left for the host.
    PassedThrough,
    /// Not a count, chord or pass key. State was reset.
    Unmatched,
}

impl KeyOutcome {
    pub fn signal(self) -> DispatchSignal {
        match self {
            KeyOutcome::EscapeReset
            | KeyOutcome::OverlayClosed
            | KeyOutcome::Counted(_)
            | KeyOutcome::Descended
            | KeyOutcome::Dispatched
            | KeyOutcome::Exhausted => DispatchSignal::SuppressEvent,
            KeyOutcome::Ignored
            | KeyOutcome::EscapeAtRest
            | KeyOutcome::PassedThrough
            | KeyOutcome::Unmatched => DispatchSignal::ContinueBubbling,
        }
    }
}

/// Everything an interpreter starts from.
pub struct InterpreterConfig<C> {
    pub mapping: KeyMapping<C>,
    pub dispatch: DispatchFn<C>,
    pub pass_keys: BTreeSet<String>,
    pub initial_count: u32,
    /// Exhaust after this many commands.
    pub command_limit: Option<u32>,
    pub overlay: Option<Rc<dyn Overlay>>,
    pub pointer: Option<Rc<dyn PointerTracker>>,
}

impl<C> InterpreterConfig<C> {
    pub fn new<F>(mapping: KeyMapping<C>, dispatch: F) -> Self
    where
        F: FnMut(CommandInvocation<C>) -> anyhow::Result<()> + 'static,
    {
        Self {
            mapping,
            dispatch: Box::new(dispatch),
            pass_keys: BTreeSet::new(),
            initial_count: 0,
            command_limit: None,
            overlay: None,
            pointer: None,
        }
    }

    pub fn pass_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pass_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn initial_count(mut self, count: u32) -> Self {
        self.initial_count = count;
        self
    }

    pub fn command_limit(mut self, limit: u32) -> Self {
        self.command_limit = Some(limit);
        self
    }

    pub fn overlay(mut self, overlay: Rc<dyn Overlay>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn pointer(mut self, pointer: Rc<dyn PointerTracker>) -> Self {
        self.pointer = Some(pointer);
        self
    }
}

/// Turns a stream of key tokens into command invocations.
///
/// The interpreter keeps a count prefix and its position in the mapping
/// tree. Its position is a path of branches from the root, innermost last;
/// it is at the root when only the root is on the path, and at rest when it
/// is at the root with no count.
pub struct KeySequenceInterpreter<C> {
    mapping: KeyMapping<C>,
    dispatch: DispatchFn<C>,
    pass_keys: BTreeSet<String>,
    count_prefix: u32,
    match_state: Vec<Rc<Branch<C>>>,
    typed: Vec<String>,
    commands_left: Option<u32>,
    overlay: Option<Rc<dyn Overlay>>,
    pointer: Option<Rc<dyn PointerTracker>>,
}

impl<C: Clone + fmt::Debug> KeySequenceInterpreter<C> {
    pub fn new(config: InterpreterConfig<C>) -> Self {
        let root = config.mapping.root().clone();
        let mut interpreter = Self {
            mapping: config.mapping,
            dispatch: config.dispatch,
            pass_keys: config.pass_keys,
            count_prefix: 0,
            match_state: vec![root],
            typed: Vec::new(),
            commands_left: config.command_limit,
            overlay: config.overlay,
            pointer: config.pointer,
        };
        interpreter.reset(config.initial_count);
        interpreter
    }

    pub fn mapping(&self) -> &KeyMapping<C> {
        &self.mapping
    }

    pub fn count_prefix(&self) -> u32 {
        self.count_prefix
    }

    /// Number of chord keys typed so far.
    pub fn depth(&self) -> usize {
        self.match_state.len() - 1
    }

    /// Pending chord keys, for display.
    pub fn pending(&self) -> String {
        format_key_sequence(&self.typed)
    }

    pub fn pass_keys(&self) -> &BTreeSet<String> {
        &self.pass_keys
    }

    /// True once the command limit has been used up.
    pub fn is_exhausted(&self) -> bool {
        self.commands_left == Some(0)
    }

    pub fn is_at_root(&self) -> bool {
        self.match_state.len() == 1
    }

    pub fn is_in_reset_state(&self) -> bool {
        self.count_prefix == 0 && self.is_at_root()
    }

    pub fn is_count_key(&self, key: &str) -> bool {
        match digit(key) {
            Some(0) => self.count_prefix > 0 && !self.pass_keys.contains(key),
            Some(_) => !self.pass_keys.contains(key),
            None => false,
        }
    }

    pub fn is_pass_key(&self, key: &str) -> bool {
        self.is_in_reset_state() && self.pass_keys.contains(key)
    }

    pub fn is_mapped_key(&self, key: &str) -> bool {
        self.current().contains_key(key) && !self.is_pass_key(key)
    }

    /// Returns to the root with the given count.
    pub fn reset(&mut self, count: u32) {
        self.count_prefix = count;
        self.match_state.clear();
        self.match_state.push(self.mapping.root().clone());
        self.typed.clear();
    }

    pub fn set_mapping(&mut self, mapping: KeyMapping<C>) {
        self.mapping = mapping;
        self.reset(0);
    }

    pub fn set_pass_keys<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pass_keys = keys.into_iter().map(Into::into).collect();
        self.reset(0);
    }

    /// Advances through the mapping with a key from the current branch,
    /// dispatching when a command is reached.
    pub fn consume_char(&mut self, key: &str) -> KeyOutcome {
        let node = match self.current().get(key) {
            Some(node) => node.clone(),
            None => {
                self.reset(0);
                return KeyOutcome::Unmatched;
            }
        };

        let command = match node {
            Node::Branch(branch) => {
                self.match_state.push(branch);
                self.typed.push(key.to_string());
                tracing::trace!(pending = %self.pending(), "chord_descend");
                return KeyOutcome::Descended;
            }
            Node::Leaf(command) => command,
        };

        let count = (self.count_prefix > 0).then_some(self.count_prefix);
        let exhausted = match self.commands_left.as_mut() {
            Some(left) => {
                *left = left.saturating_sub(1);
                *left == 0
            }
            None => false,
        };
        // The transition is committed before dispatch so a failing callback
        // leaves the interpreter consistent.
        if exhausted {
            let count_prefix = self.count_prefix;
            self.reset(count_prefix);
        } else {
            self.reset(0);
        }

        tracing::debug!(command = ?command, count = ?count, "dispatch_command");
        if let Err(err) = (self.dispatch)(CommandInvocation { command, count }) {
            tracing::warn!(error = %format!("{err:#}"), "command failed");
        }

        if exhausted {
            KeyOutcome::Exhausted
        } else {
            KeyOutcome::Dispatched
        }
    }

    /// Feeds one resolved token through the interpreter.
    pub fn interpret(&mut self, key: &str) -> KeyOutcome {
        let outcome = self.interpret_inner(key);
        tracing::trace!(key, outcome = ?outcome, "key_interpreted");
        outcome
    }

    /// Feeds one resolved token and answers how the event should propagate.
    pub fn on_key(&mut self, key: &str) -> DispatchSignal {
        self.interpret(key).signal()
    }

    fn interpret_inner(&mut self, key: &str) -> KeyOutcome {
        if key.is_empty() {
            return KeyOutcome::Ignored;
        }
        if self.is_exhausted() {
            return KeyOutcome::PassedThrough;
        }

        if is_escape_token(key) {
            if !self.is_in_reset_state() {
                self.reset(0);
                return KeyOutcome::EscapeReset;
            }
            if let Some(overlay) = self.overlay.as_ref().filter(|overlay| overlay.is_showing()) {
                overlay.toggle();
                return KeyOutcome::OverlayClosed;
            }
            if let Some(pointer) = &self.pointer {
                pointer.clear_hover();
            }
            return KeyOutcome::EscapeAtRest;
        }

        if self.is_count_key(key) {
            let value = digit(key).unwrap_or(0);
            self.count_prefix = self.count_prefix.saturating_mul(10).saturating_add(value);
            return KeyOutcome::Counted(self.count_prefix);
        }

        if self.is_mapped_key(key) {
            return self.consume_char(key);
        }

        let passed = self.is_pass_key(key);
        self.reset(0);
        if passed {
            KeyOutcome::PassedThrough
        } else {
            KeyOutcome::Unmatched
        }
    }

    fn current(&self) -> &Branch<C> {
        match self.match_state.last() {
            Some(branch) => branch,
            None => self.mapping.root(),
        }
    }
}

impl<C> fmt::Debug for KeySequenceInterpreter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySequenceInterpreter")
            .field("count_prefix", &self.count_prefix)
            .field("pending", &self.typed)
            .field("pass_keys", &self.pass_keys)
            .field("commands_left", &self.commands_left)
            .finish()
    }
}

fn digit(key: &str) -> Option<u32> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_digit(10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::MappingBuilder;
    use std::cell::{Cell, RefCell};

    type Log = Rc<RefCell<Vec<CommandInvocation<&'static str>>>>;

    fn mapping() -> KeyMapping<&'static str> {
        let mut builder = MappingBuilder::new();
        builder.bind(["i"], "enterInsertMode").unwrap();
        builder.bind(["j"], "scrollDown").unwrap();
        builder.bind(["k"], "scrollUp").unwrap();
        builder.bind(["g", "g"], "scrollToTop").unwrap();
        builder.bind(["g", "t"], "nextTab").unwrap();
        builder.build()
    }

    fn config(log: &Log) -> InterpreterConfig<&'static str> {
        let log = log.clone();
        InterpreterConfig::new(mapping(), move |invocation| {
            log.borrow_mut().push(invocation);
            Ok(())
        })
    }

    fn setup() -> (KeySequenceInterpreter<&'static str>, Log) {
        let log = Log::default();
        (KeySequenceInterpreter::new(config(&log)), log)
    }

    fn press(interpreter: &mut KeySequenceInterpreter<&'static str>, keys: &[&str]) {
        for key in keys {
            interpreter.on_key(key);
        }
    }

    fn invocation(command: &'static str, count: Option<u32>) -> CommandInvocation<&'static str> {
        CommandInvocation { command, count }
    }

    struct FakeOverlay(Cell<bool>);

    impl Overlay for FakeOverlay {
        fn is_showing(&self) -> bool {
            self.0.get()
        }

        fn toggle(&self) {
            self.0.set(!self.0.get());
        }
    }

    #[derive(Default)]
    struct FakePointer(Cell<u32>);

    impl PointerTracker for FakePointer {
        fn clear_hover(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_starts_at_rest() {
        let (interpreter, _) = setup();
        assert!(interpreter.is_in_reset_state());
        assert_eq!(interpreter.depth(), 0);
    }

    #[test]
    fn test_single_key_command() {
        let (mut interpreter, log) = setup();
        assert_eq!(interpreter.on_key("j"), DispatchSignal::SuppressEvent);
        assert_eq!(*log.borrow(), vec![invocation("scrollDown", None)]);
        assert!(interpreter.is_in_reset_state());
    }

    #[test]
    fn test_chords() {
        let (mut interpreter, log) = setup();
        assert_eq!(interpreter.interpret("g"), KeyOutcome::Descended);
        assert_eq!(interpreter.depth(), 1);
        assert_eq!(interpreter.pending(), "g");
        assert!(log.borrow().is_empty());

        assert_eq!(interpreter.interpret("t"), KeyOutcome::Dispatched);
        press(&mut interpreter, &["g", "g"]);
        assert_eq!(
            *log.borrow(),
            vec![invocation("nextTab", None), invocation("scrollToTop", None)]
        );
        assert!(interpreter.is_in_reset_state());
    }

    #[test]
    fn test_count_prefix() {
        let (mut interpreter, log) = setup();
        assert_eq!(interpreter.interpret("5"), KeyOutcome::Counted(5));
        assert_eq!(interpreter.interpret("g"), KeyOutcome::Descended);
        assert_eq!(interpreter.count_prefix(), 5);
        interpreter.interpret("t");
        assert_eq!(*log.borrow(), vec![invocation("nextTab", Some(5))]);

        press(&mut interpreter, &["1", "0", "2", "j"]);
        assert_eq!(log.borrow()[1], invocation("scrollDown", Some(102)));
        assert!(interpreter.is_in_reset_state());
    }

    #[test]
    fn test_zero_only_continues_a_count() {
        let (mut interpreter, _) = setup();
        assert!(!interpreter.is_count_key("0"));
        assert_eq!(interpreter.interpret("0"), KeyOutcome::Unmatched);
        assert!(interpreter.is_in_reset_state());

        interpreter.interpret("3");
        assert!(interpreter.is_count_key("0"));
        assert_eq!(interpreter.interpret("0"), KeyOutcome::Counted(30));
    }

    #[test]
    fn test_count_saturates() {
        let (mut interpreter, log) = setup();
        for _ in 0..12 {
            interpreter.interpret("9");
        }
        assert_eq!(interpreter.count_prefix(), u32::MAX);
        interpreter.interpret("j");
        assert_eq!(log.borrow()[0].count, Some(u32::MAX));
    }

    #[test]
    fn test_unmatched_key_resets() {
        let (mut interpreter, log) = setup();
        press(&mut interpreter, &["3", "g"]);
        assert_eq!(interpreter.on_key("x"), DispatchSignal::ContinueBubbling);
        assert!(interpreter.is_in_reset_state());

        // `j` is mapped at the root but not inside the `g` chord
        press(&mut interpreter, &["g"]);
        assert_eq!(interpreter.interpret("j"), KeyOutcome::Unmatched);
        assert!(interpreter.is_in_reset_state());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_pass_keys_win_at_rest() {
        let log = Log::default();
        let mut interpreter = KeySequenceInterpreter::new(config(&log).pass_keys(["i", "2"]));

        assert!(interpreter.is_pass_key("i"));
        assert!(!interpreter.is_mapped_key("i"));
        assert_eq!(interpreter.on_key("i"), DispatchSignal::ContinueBubbling);
        assert!(log.borrow().is_empty());

        // pass keys never start a count
        assert!(!interpreter.is_count_key("2"));
        assert_eq!(interpreter.interpret("2"), KeyOutcome::PassedThrough);
    }

    #[test]
    fn test_pass_keys_only_at_rest() {
        let log = Log::default();
        let mut interpreter = KeySequenceInterpreter::new(config(&log).pass_keys(["i"]));

        interpreter.interpret("3");
        assert!(!interpreter.is_pass_key("i"));
        assert_eq!(interpreter.interpret("i"), KeyOutcome::Dispatched);
        assert_eq!(*log.borrow(), vec![invocation("enterInsertMode", Some(3))]);
    }

    #[test]
    fn test_pass_key_inside_chord_is_unmatched() {
        let log = Log::default();
        let mut interpreter = KeySequenceInterpreter::new(config(&log).pass_keys(["t"]));

        interpreter.interpret("g");
        assert!(!interpreter.is_pass_key("t"));
        assert_eq!(interpreter.interpret("t"), KeyOutcome::Dispatched);
        assert_eq!(*log.borrow(), vec![invocation("nextTab", None)]);
    }

    #[test]
    fn test_modifier_press_changes_nothing() {
        let (mut interpreter, _) = setup();
        press(&mut interpreter, &["4", "g"]);
        assert_eq!(interpreter.on_key(""), DispatchSignal::ContinueBubbling);
        assert_eq!(interpreter.count_prefix(), 4);
        assert_eq!(interpreter.depth(), 1);
    }

    #[test]
    fn test_escape_resets_pending_input() {
        let (mut interpreter, log) = setup();
        press(&mut interpreter, &["2", "g"]);
        assert_eq!(interpreter.interpret("escape"), KeyOutcome::EscapeReset);
        assert_eq!(KeyOutcome::EscapeReset.signal(), DispatchSignal::SuppressEvent);
        assert!(interpreter.is_in_reset_state());
        interpreter.interpret("j");
        assert_eq!(*log.borrow(), vec![invocation("scrollDown", None)]);

        interpreter.interpret("7");
        assert_eq!(interpreter.interpret("<c-[>"), KeyOutcome::EscapeReset);
    }

    #[test]
    fn test_escape_closes_overlay() {
        let log = Log::default();
        let overlay = Rc::new(FakeOverlay(Cell::new(true)));
        let pointer = Rc::new(FakePointer::default());
        let mut interpreter = KeySequenceInterpreter::new(
            config(&log).overlay(overlay.clone()).pointer(pointer.clone()),
        );

        assert_eq!(interpreter.interpret("escape"), KeyOutcome::OverlayClosed);
        assert!(!overlay.is_showing());
        assert_eq!(pointer.0.get(), 0);

        assert_eq!(interpreter.on_key("escape"), DispatchSignal::ContinueBubbling);
        assert_eq!(pointer.0.get(), 1);
        assert!(!overlay.is_showing());
    }

    #[test]
    fn test_escape_pending_takes_priority_over_overlay() {
        let log = Log::default();
        let overlay = Rc::new(FakeOverlay(Cell::new(true)));
        let mut interpreter = KeySequenceInterpreter::new(config(&log).overlay(overlay.clone()));

        interpreter.interpret("g");
        assert_eq!(interpreter.interpret("escape"), KeyOutcome::EscapeReset);
        assert!(overlay.is_showing());
    }

    #[test]
    fn test_set_mapping_behaves_like_new() {
        let (mut interpreter, log) = setup();
        press(&mut interpreter, &["3", "g"]);

        let mut builder = MappingBuilder::new();
        builder.bind(["x"], "closeTab").unwrap();
        interpreter.set_mapping(builder.build());
        assert!(interpreter.is_in_reset_state());
        assert!(!interpreter.is_mapped_key("j"));

        interpreter.interpret("x");
        assert_eq!(*log.borrow(), vec![invocation("closeTab", None)]);
    }

    #[test]
    fn test_set_pass_keys_resets() {
        let (mut interpreter, _) = setup();
        interpreter.interpret("g");
        interpreter.set_pass_keys(["j"]);
        assert!(interpreter.is_in_reset_state());
        assert!(interpreter.is_pass_key("j"));
        assert!(!interpreter.is_mapped_key("j"));
    }

    #[test]
    fn test_initial_count() {
        let log = Log::default();
        let mut interpreter = KeySequenceInterpreter::new(config(&log).initial_count(4));
        assert!(!interpreter.is_in_reset_state());
        interpreter.interpret("k");
        assert_eq!(*log.borrow(), vec![invocation("scrollUp", Some(4))]);
        assert!(interpreter.is_in_reset_state());
    }

    #[test]
    fn test_command_limit_exhausts() {
        let log = Log::default();
        let mut interpreter = KeySequenceInterpreter::new(config(&log).command_limit(1));

        interpreter.interpret("2");
        assert_eq!(interpreter.interpret("j"), KeyOutcome::Exhausted);
        assert_eq!(KeyOutcome::Exhausted.signal(), DispatchSignal::SuppressEvent);
        assert!(interpreter.is_exhausted());
        assert_eq!(interpreter.count_prefix(), 2);
        assert_eq!(*log.borrow(), vec![invocation("scrollDown", Some(2))]);

        // nothing more is consumed
        assert_eq!(interpreter.interpret("k"), KeyOutcome::PassedThrough);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_command_limit_counts_commands() {
        let log = Log::default();
        let mut interpreter = KeySequenceInterpreter::new(config(&log).command_limit(2));
        assert_eq!(interpreter.interpret("j"), KeyOutcome::Dispatched);
        interpreter.interpret("g");
        assert_eq!(interpreter.interpret("g"), KeyOutcome::Exhausted);
    }

    #[test]
    fn test_failed_dispatch_keeps_state_consistent() {
        let mut interpreter = KeySequenceInterpreter::new(InterpreterConfig::new(
            mapping(),
            |_: CommandInvocation<&'static str>| anyhow::bail!("no such tab"),
        ));
        interpreter.interpret("3");
        assert_eq!(interpreter.interpret("j"), KeyOutcome::Dispatched);
        assert!(interpreter.is_in_reset_state());
    }

    #[test]
    fn test_consume_char_outside_branch() {
        let (mut interpreter, log) = setup();
        interpreter.interpret("5");
        assert_eq!(interpreter.consume_char("z"), KeyOutcome::Unmatched);
        assert!(interpreter.is_in_reset_state());
        assert!(log.borrow().is_empty());
    }
}
