//! The handler stack every event bubbles through.
//!
//! Handlers are registered per [`EventKind`] and invoked most recent first.
//! The stack is shared (`Rc<EventDispatchStack<E>>`) and all methods take
//! `&self`, so a handler may push or remove handlers while it runs.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::{DispatchSignal, EventKind};

/// Identifies one registration on an [`EventDispatchStack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A handler callback.
pub type HandlerFn<E> = Box<dyn FnMut(&E) -> DispatchSignal>;

/// A handler waiting to be registered.
pub struct HandlerSpec<E> {
    pub kind: EventKind,
    pub name: String,
    pub callback: HandlerFn<E>,
}

impl<E> HandlerSpec<E> {
    pub fn new(
        kind: EventKind,
        name: impl Into<String>,
        callback: impl FnMut(&E) -> DispatchSignal + 'static,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            callback: Box::new(callback),
        }
    }
}

impl<E> fmt::Debug for HandlerSpec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSpec")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

struct HandlerEntry<E> {
    id: HandlerId,
    kind: EventKind,
    name: String,
    callback: RefCell<HandlerFn<E>>,
    /// Set on removal so a dispatch already holding a snapshot skips it.
    removed: Cell<bool>,
}

/// Ordered registry of active handlers.
pub struct EventDispatchStack<E> {
    /// Oldest first; dispatch walks it backwards.
    entries: RefCell<Vec<Rc<HandlerEntry<E>>>>,
    next_id: Cell<u64>,
}

impl<E> Default for EventDispatchStack<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventDispatchStack<E> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Registers a handler on top of the stack and returns its id.
    pub fn push(
        &self,
        kind: EventKind,
        name: impl Into<String>,
        callback: impl FnMut(&E) -> DispatchSignal + 'static,
    ) -> HandlerId {
        self.push_spec(HandlerSpec::new(kind, name, callback))
    }

    /// Registers a prepared [`HandlerSpec`].
    pub fn push_spec(&self, spec: HandlerSpec<E>) -> HandlerId {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        tracing::trace!(id = %id, kind = spec.kind.label(), name = %spec.name, "handler_push");
        self.entries.borrow_mut().push(Rc::new(HandlerEntry {
            id,
            kind: spec.kind,
            name: spec.name,
            callback: RefCell::new(spec.callback),
            removed: Cell::new(false),
        }));
        id
    }

    /// Removes a handler. Unknown ids are ignored.
    pub fn remove(&self, id: HandlerId) {
        let mut entries = self.entries.borrow_mut();
        if let Some(pos) = entries.iter().position(|entry| entry.id == id) {
            let entry = entries.remove(pos);
            entry.removed.set(true);
            tracing::trace!(id = %id, name = %entry.name, "handler_remove");
        }
    }

    /// Bubbles `event` through the handlers registered for `kind`.
    ///
    /// The handler order is captured when the call starts: handlers pushed
    /// by a callback are not invoked by this dispatch, and handlers removed
    /// by a callback are skipped.
    pub fn dispatch(&self, kind: EventKind, event: &E) -> DispatchSignal {
        let snapshot: Vec<Rc<HandlerEntry<E>>> = self
            .entries
            .borrow()
            .iter()
            .rev()
            .filter(|entry| entry.kind == kind)
            .cloned()
            .collect();

        for entry in snapshot {
            if entry.removed.get() {
                continue;
            }
            let signal = match entry.callback.try_borrow_mut() {
                Ok(mut callback) => callback(event),
                Err(_) => {
                    tracing::warn!(
                        id = %entry.id,
                        name = %entry.name,
                        "handler re-entered during its own dispatch; skipping"
                    );
                    continue;
                }
            };
            if signal.halts() {
                tracing::trace!(
                    kind = kind.label(),
                    id = %entry.id,
                    name = %entry.name,
                    ?signal,
                    "dispatch_halted"
                );
                return signal;
            }
        }

        DispatchSignal::ContinueBubbling
    }

    /// Drops every registration.
    pub fn reset(&self) {
        let mut entries = self.entries.borrow_mut();
        for entry in entries.iter() {
            entry.removed.set(true);
        }
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, id: HandlerId) -> bool {
        self.entries.borrow().iter().any(|entry| entry.id == id)
    }

    /// Handler names, most recent first. Used for debugging output.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .rev()
            .map(|entry| entry.name.clone())
            .collect()
    }
}

impl<E> fmt::Debug for EventDispatchStack<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatchStack")
            .field("handlers", &self.names())
            .field("next_id", &self.next_id.get())
            .finish()
    }
}
