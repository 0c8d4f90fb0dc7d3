//! One active mode: a set of handler registrations with a lifecycle.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::dispatch::{DispatchSignal, EventDispatchStack, EventKind, HandlerId, HandlerSpec};

use super::{ModalContextStack, ModeEvent, ModeOptions};

/// Runs once when a mode exits.
pub type Continuation = Box<dyn FnOnce()>;

/// Identifies a modal context within its [`ModalContextStack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeId(pub(super) u64);

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode-{}", self.0)
    }
}

/// A mode: owns its handler registrations and removes them on exit.
///
/// Created with [`ModalContext::new`], then [`activate`](ModalContext::activate)d.
/// Handlers that need to exit the mode should capture a `Weak` from
/// `Rc::downgrade` before activation.
pub struct ModalContext<E: ModeEvent + 'static> {
    id: ModeId,
    options: ModeOptions,
    active: Cell<bool>,
    handler_ids: RefCell<Vec<HandlerId>>,
    exit_continuation: RefCell<Option<Continuation>>,
    dispatcher: Rc<EventDispatchStack<E>>,
    modes: Weak<ModalContextStack<E>>,
}

impl<E: ModeEvent + 'static> ModalContext<E> {
    pub fn new(modes: &Rc<ModalContextStack<E>>, options: ModeOptions) -> Rc<Self> {
        Rc::new(Self {
            id: modes.next_id(),
            options,
            active: Cell::new(false),
            handler_ids: RefCell::new(Vec::new()),
            exit_continuation: RefCell::new(None),
            dispatcher: modes.dispatcher().clone(),
            modes: Rc::downgrade(modes),
        })
    }

    pub fn id(&self) -> ModeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn options(&self) -> &ModeOptions {
        &self.options
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn dispatcher(&self) -> &Rc<EventDispatchStack<E>> {
        &self.dispatcher
    }

    /// Registers `handlers` and makes this the innermost active mode.
    ///
    /// Handlers are pushed in order, so the last one sees events first.
    /// Handlers implied by the options surround them: keyboard suppression
    /// below, escape/blur/click exits above.
    pub fn activate(
        self: &Rc<Self>,
        handlers: Vec<HandlerSpec<E>>,
        exit_continuation: Option<Continuation>,
    ) {
        if self.active.get() {
            tracing::warn!(mode = %self.options.name, id = %self.id, "activate on an active mode ignored");
            return;
        }

        let Some(modes) = self.modes.upgrade() else {
            tracing::warn!(mode = %self.options.name, "mode stack dropped; not activating");
            return;
        };

        if let Some(key) = &self.options.singleton {
            modes.exit_singleton(key, self.id);
        }

        let mut specs = Vec::with_capacity(handlers.len() + 4);
        if self.options.suppress_all_keyboard_events {
            specs.push(HandlerSpec::new(EventKind::KeyDown, "suppress-keydown", |_: &E| {
                DispatchSignal::SuppressPropagation
            }));
            specs.push(HandlerSpec::new(EventKind::KeyUp, "suppress-keyup", |_: &E| {
                DispatchSignal::SuppressPropagation
            }));
        }
        specs.extend(handlers);
        if self.options.exit_on_escape {
            let weak = Rc::downgrade(self);
            specs.push(HandlerSpec::new(
                EventKind::KeyDown,
                "exit-on-escape",
                move |event: &E| {
                    if !event.is_escape() {
                        return DispatchSignal::ContinueBubbling;
                    }
                    if let Some(mode) = weak.upgrade() {
                        mode.exit(None);
                        consume_escape_keyup(&mode.dispatcher);
                    }
                    DispatchSignal::SuppressEvent
                },
            ));
        }
        if self.options.exit_on_blur {
            specs.push(self.exit_handler(EventKind::Blur, "exit-on-blur"));
        }
        if self.options.exit_on_click {
            specs.push(self.exit_handler(EventKind::Click, "exit-on-click"));
        }

        {
            let mut ids = self.handler_ids.borrow_mut();
            for spec in specs {
                ids.push(self.register(spec));
            }
        }
        *self.exit_continuation.borrow_mut() = exit_continuation;
        self.active.set(true);
        modes.register(self.clone());

        tracing::debug!(mode = %self.options.name, id = %self.id, depth = modes.len(), "mode_activate");
    }

    /// Registers one more handler owned by this (active) mode.
    ///
    /// Returns `None` if the mode is not active.
    pub fn push_handler(&self, spec: HandlerSpec<E>) -> Option<HandlerId> {
        if !self.active.get() {
            return None;
        }
        let id = self.register(spec);
        self.handler_ids.borrow_mut().push(id);
        Some(id)
    }

    /// Leaves the mode.
    ///
    /// The first call removes the mode's handlers. Every call then runs
    /// `continuation` if given, or else the continuation stored by
    /// [`activate`](Self::activate). The stored continuation is cleared
    /// either way, so it runs at most once.
    pub fn exit(&self, continuation: Option<Continuation>) {
        if self.active.replace(false) {
            let ids = std::mem::take(&mut *self.handler_ids.borrow_mut());
            for id in ids {
                self.dispatcher.remove(id);
            }
            if let Some(modes) = self.modes.upgrade() {
                modes.forget(self.id);
            }
            tracing::debug!(mode = %self.options.name, id = %self.id, "mode_exit");
        }

        let stored = self.exit_continuation.borrow_mut().take();
        if let Some(continuation) = continuation.or(stored) {
            continuation();
        }
    }

    fn register(&self, spec: HandlerSpec<E>) -> HandlerId {
        let name = format!("{}/{}", self.options.name, spec.name);
        self.dispatcher.push_spec(HandlerSpec { name, ..spec })
    }

    fn exit_handler(self: &Rc<Self>, kind: EventKind, name: &str) -> HandlerSpec<E> {
        let weak = Rc::downgrade(self);
        HandlerSpec::new(kind, name, move |_: &E| {
            if let Some(mode) = weak.upgrade() {
                mode.exit(None);
            }
            DispatchSignal::ContinueBubbling
        })
    }
}

impl<E: ModeEvent + 'static> fmt::Debug for ModalContext<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalContext")
            .field("id", &self.id)
            .field("name", &self.options.name)
            .field("active", &self.active.get())
            .field("handlers", &self.handler_ids.borrow().len())
            .finish()
    }
}

/// Swallows the keyup belonging to an escape keydown that was just consumed.
///
/// The handler removes itself on that keyup, or on blur if the keyup never
/// arrives.
pub fn consume_escape_keyup<E: ModeEvent + 'static>(dispatcher: &Rc<EventDispatchStack<E>>) {
    let ids: Rc<RefCell<Vec<HandlerId>>> = Rc::default();

    let weak = Rc::downgrade(dispatcher);
    let own_ids = ids.clone();
    let keyup = dispatcher.push(EventKind::KeyUp, "consume-escape-keyup", move |event: &E| {
        if !event.is_escape() {
            return DispatchSignal::ContinueBubbling;
        }
        if let Some(dispatcher) = weak.upgrade() {
            for id in own_ids.borrow().iter() {
                dispatcher.remove(*id);
            }
        }
        DispatchSignal::SuppressEvent
    });

    let weak = Rc::downgrade(dispatcher);
    let own_ids = ids.clone();
    let blur = dispatcher.push(EventKind::Blur, "consume-escape-keyup/blur", move |_: &E| {
        if let Some(dispatcher) = weak.upgrade() {
            for id in own_ids.borrow().iter() {
                dispatcher.remove(*id);
            }
        }
        DispatchSignal::ContinueBubbling
    });

    ids.borrow_mut().extend([keyup, blur]);
}
