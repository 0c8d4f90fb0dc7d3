//! A session: the dispatcher, the active modes and the keymaps, driven by
//! host events.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use anyhow::{Context, Result};

use crate::command::Command;
use crate::config::{Config, Keymap};
use crate::dispatch::{DispatchSignal, EventDispatchStack, QueryKind};
use crate::keys::{
    CommandInvocation, CrosstermKeyResolver, InterpreterConfig, KeyMapping, KeyResolver, Overlay,
    PointerTracker,
};
use crate::mode::{Continuation, ModalContextStack, ModeOptions};
use crate::modes::{InsertMode, KeyHandlerMode, PassNextKeyMode, INSERT_MODE, PASS_NEXT_KEY_MODE};

pub use crate::event::HostEvent;

pub const NORMAL_MODE: &str = "normal";
pub const VISUAL_MODE: &str = "visual";

/// Something the host should act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// A command was recognised.
    Command(CommandInvocation<Command>),
    /// Escape at rest: drop hover state.
    ClearHover,
    /// The named mode exited.
    ModeExited(String),
}

/// The result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    /// How the event propagated through the modes.
    pub signal: DispatchSignal,
    /// What the host should do, in the order it happened.
    pub effects: Vec<Effect>,
}

impl Response {
    /// Commands recognised while handling the event.
    pub fn commands(&self) -> impl Iterator<Item = &CommandInvocation<Command>> {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Command(invocation) => Some(invocation),
            _ => None,
        })
    }
}

type Outbox = Rc<RefCell<Vec<CommandInvocation<Command>>>>;
type EffectSink = Rc<RefCell<Vec<Effect>>>;

/// The help dialog. Only its visibility is tracked here; the host draws it.
#[derive(Debug, Default)]
pub struct HelpOverlay {
    showing: Cell<bool>,
}

impl Overlay for HelpOverlay {
    fn is_showing(&self) -> bool {
        self.showing.get()
    }

    fn toggle(&self) {
        self.showing.set(!self.showing.get());
        tracing::debug!(showing = self.showing.get(), "help_toggle");
    }
}

struct HoverTracker {
    effects: EffectSink,
}

impl PointerTracker for HoverTracker {
    fn clear_hover(&self) {
        self.effects.borrow_mut().push(Effect::ClearHover);
    }
}

/// Owns everything needed to turn host events into commands.
///
/// Normal mode is active for the lifetime of the session. Commands that
/// change modes are applied after the event that produced them has finished
/// dispatching.
pub struct Session {
    dispatcher: Rc<EventDispatchStack<HostEvent>>,
    modes: Rc<ModalContextStack<HostEvent>>,
    resolver: Rc<CrosstermKeyResolver>,
    normal_keymap: Keymap,
    visual_keymap: Keymap,
    visual_mapping: KeyMapping<Command>,
    help: Rc<HelpOverlay>,
    outbox: Outbox,
    effects: EffectSink,
    normal: KeyHandlerMode<Command>,
    visual: Option<KeyHandlerMode<Command>>,
    insert: Option<InsertMode>,
    pass_next_key: Option<PassNextKeyMode>,
}

impl Session {
    pub fn new(config: Config) -> Result<Self> {
        let normal_keymap =
            Keymap::normal_from(&config.keymap).context("Invalid normal-mode keymap")?;
        let visual_keymap =
            Keymap::visual_from(&config.keymap).context("Invalid visual-mode keymap")?;
        let normal_mapping = normal_keymap
            .build()
            .context("Failed to build normal-mode keymap")?;
        let visual_mapping = visual_keymap
            .build()
            .context("Failed to build visual-mode keymap")?;

        let dispatcher = Rc::new(EventDispatchStack::new());
        let modes = ModalContextStack::new(dispatcher.clone());
        let resolver = Rc::new(CrosstermKeyResolver::with_layout(&config.keys.layout));
        let help = Rc::new(HelpOverlay::default());
        let outbox = Outbox::default();
        let effects = EffectSink::default();

        let interpreter = InterpreterConfig::new(normal_mapping, command_sink(&outbox))
            .pass_keys(config.keys.pass_key_tokens())
            .overlay(help.clone())
            .pointer(Rc::new(HoverTracker {
                effects: effects.clone(),
            }));
        let normal = KeyHandlerMode::activate(
            &modes,
            ModeOptions::new(NORMAL_MODE).indicator("NORMAL"),
            resolver.clone(),
            interpreter,
            None,
        );

        tracing::info!(
            normal_bindings = normal_keymap.len(),
            visual_bindings = visual_keymap.len(),
            pass_keys = %config.keys.pass_keys,
            "session_start"
        );

        Ok(Self {
            dispatcher,
            modes,
            resolver,
            normal_keymap,
            visual_keymap,
            visual_mapping,
            help,
            outbox,
            effects,
            normal,
            visual: None,
            insert: None,
            pass_next_key: None,
        })
    }

    /// Dispatches one event and applies the commands it produced.
    pub fn handle_event(&mut self, event: HostEvent) -> Response {
        let kind = event.kind();
        let signal = self.dispatcher.dispatch(kind, &event);
        tracing::trace!(kind = kind.label(), signal = ?signal, "event_handled");

        let mut effects = self.drain_effects();
        loop {
            let pending = std::mem::take(&mut *self.outbox.borrow_mut());
            if pending.is_empty() {
                break;
            }
            for invocation in pending {
                effects.push(Effect::Command(invocation.clone()));
                self.apply(&invocation);
                effects.extend(self.drain_effects());
            }
        }

        Response { signal, effects }
    }

    /// Indicator of the innermost mode that has one.
    pub fn indicator(&self) -> Option<String> {
        self.modes.indicator()
    }

    /// Asks the active modes whether text input is being captured.
    pub fn is_capturing_text(&self) -> bool {
        let query = QueryKind::TextCaptured;
        self.dispatcher
            .dispatch(HostEvent::Query(query).kind(), &HostEvent::Query(query))
            .as_bool()
    }

    pub fn is_help_showing(&self) -> bool {
        self.help.is_showing()
    }

    /// Names of the active modes, outermost first.
    pub fn active_modes(&self) -> Vec<String> {
        self.modes.names()
    }

    /// Pending count and chord of the innermost key handling mode.
    pub fn pending_keys(&self) -> String {
        let handler = self
            .visual
            .as_ref()
            .filter(|visual| visual.is_active())
            .unwrap_or(&self.normal);
        let interpreter = handler.interpreter().borrow();
        match interpreter.count_prefix() {
            0 => interpreter.pending(),
            count => format!("{count}{}", interpreter.pending()),
        }
    }

    pub fn resolver(&self) -> &dyn KeyResolver {
        self.resolver.as_ref()
    }

    /// Help listing for both keymaps.
    pub fn help_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (title, keymap) in [("Normal mode", &self.normal_keymap), ("Visual mode", &self.visual_keymap)] {
            lines.push(format!("{title}:"));
            for (keys, description) in keymap.help_lines() {
                lines.push(format!("  {keys:<8} {description}"));
            }
        }
        lines
    }

    fn apply(&mut self, invocation: &CommandInvocation<Command>) {
        match invocation.command {
            Command::EnterInsertMode => self.enter_insert_mode(),
            Command::EnterVisualMode => self.enter_visual_mode(),
            Command::PassNextKey => self.enter_pass_next_key(invocation.repeat()),
            Command::ShowHelp => self.help.toggle(),
            Command::ExitVisualMode | Command::YankSelection => {
                if let Some(visual) = &self.visual {
                    visual.exit();
                }
            }
            _ => {}
        }
    }

    fn enter_insert_mode(&mut self) {
        if self.insert.as_ref().is_some_and(InsertMode::is_active) {
            return;
        }
        let exit = self.report_exit(INSERT_MODE);
        self.insert = Some(InsertMode::activate(&self.modes, Some(exit)));
    }

    fn enter_visual_mode(&mut self) {
        if self.visual.as_ref().is_some_and(KeyHandlerMode::is_active) {
            return;
        }
        let options = ModeOptions::new(VISUAL_MODE)
            .indicator("VISUAL")
            .singleton(VISUAL_MODE)
            .exit_on_escape()
            .suppress_all_keyboard_events();
        let interpreter =
            InterpreterConfig::new(self.visual_mapping.clone(), command_sink(&self.outbox));
        let exit = self.report_exit(VISUAL_MODE);
        self.visual = Some(KeyHandlerMode::activate(
            &self.modes,
            options,
            self.resolver.clone(),
            interpreter,
            Some(exit),
        ));
    }

    fn enter_pass_next_key(&mut self, count: u32) {
        let exit = self.report_exit(PASS_NEXT_KEY_MODE);
        self.pass_next_key = Some(PassNextKeyMode::activate(&self.modes, count, Some(exit)));
    }

    fn report_exit(&self, name: &str) -> Continuation {
        let effects = self.effects.clone();
        let name = name.to_string();
        Box::new(move || effects.borrow_mut().push(Effect::ModeExited(name)))
    }

    fn drain_effects(&self) -> Vec<Effect> {
        std::mem::take(&mut *self.effects.borrow_mut())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("modes", &self.modes)
            .field("help_showing", &self.help.is_showing())
            .finish_non_exhaustive()
    }
}

fn command_sink(
    outbox: &Outbox,
) -> impl FnMut(CommandInvocation<Command>) -> anyhow::Result<()> + 'static {
    let outbox = outbox.clone();
    move |invocation| {
        outbox.borrow_mut().push(invocation);
        Ok(())
    }
}
