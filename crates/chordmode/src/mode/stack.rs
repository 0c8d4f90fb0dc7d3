//! The owned collection of active modes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::dispatch::EventDispatchStack;

use super::{ModalContext, ModeEvent, ModeId};

/// Active modal contexts, innermost last.
///
/// Held by the session alongside the [`EventDispatchStack`] all of its modes
/// register on. Modes add and remove themselves on activate and exit.
pub struct ModalContextStack<E: ModeEvent + 'static> {
    dispatcher: Rc<EventDispatchStack<E>>,
    active: RefCell<Vec<Rc<ModalContext<E>>>>,
    next_id: Cell<u64>,
}

impl<E: ModeEvent + 'static> ModalContextStack<E> {
    pub fn new(dispatcher: Rc<EventDispatchStack<E>>) -> Rc<Self> {
        Rc::new(Self {
            dispatcher,
            active: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        })
    }

    pub fn dispatcher(&self) -> &Rc<EventDispatchStack<E>> {
        &self.dispatcher
    }

    /// Active modes, outermost first.
    pub fn active(&self) -> Vec<Rc<ModalContext<E>>> {
        self.active.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.active.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.borrow().is_empty()
    }

    /// Innermost active mode with the given name.
    pub fn find(&self, name: &str) -> Option<Rc<ModalContext<E>>> {
        self.active
            .borrow()
            .iter()
            .rev()
            .find(|mode| mode.name() == name)
            .cloned()
    }

    /// Indicator of the innermost mode that has one.
    pub fn indicator(&self) -> Option<String> {
        self.active
            .borrow()
            .iter()
            .rev()
            .find_map(|mode| mode.options().indicator.clone())
    }

    /// Names of the active modes, outermost first.
    pub fn names(&self) -> Vec<String> {
        self.active
            .borrow()
            .iter()
            .map(|mode| mode.name().to_string())
            .collect()
    }

    /// Exits every active mode, innermost first.
    pub fn exit_all(&self) {
        let modes = self.active();
        for mode in modes.iter().rev() {
            mode.exit(None);
        }
    }

    pub(super) fn next_id(&self) -> ModeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        ModeId(id)
    }

    pub(super) fn register(&self, mode: Rc<ModalContext<E>>) {
        self.active.borrow_mut().push(mode);
    }

    pub(super) fn forget(&self, id: ModeId) {
        self.active.borrow_mut().retain(|mode| mode.id() != id);
    }

    pub(super) fn exit_singleton(&self, key: &str, except: ModeId) {
        let rivals: Vec<_> = self
            .active
            .borrow()
            .iter()
            .filter(|mode| mode.id() != except && mode.options().singleton.as_deref() == Some(key))
            .cloned()
            .collect();
        for mode in rivals {
            tracing::debug!(singleton = key, mode = %mode.name(), "singleton_replaced");
            mode.exit(None);
        }
    }
}

impl<E: ModeEvent + 'static> fmt::Debug for ModalContextStack<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalContextStack")
            .field("active", &self.names())
            .finish()
    }
}
