//! Insert mode: keys go to the host untouched.

use std::rc::Rc;

use crate::dispatch::{DispatchSignal, EventKind, HandlerSpec, QueryKind};
use crate::event::HostEvent;
use crate::mode::{Continuation, ModalContext, ModalContextStack, ModeOptions};

pub const INSERT_MODE: &str = "insert";

/// While active, modes below never see key events and the host is told text
/// is being captured. Escape or blur leaves the mode.
pub struct InsertMode {
    context: Rc<ModalContext<HostEvent>>,
}

impl InsertMode {
    pub fn options() -> ModeOptions {
        ModeOptions::new(INSERT_MODE)
            .indicator("INSERT")
            .singleton(INSERT_MODE)
            .exit_on_escape()
            .exit_on_blur()
    }

    pub fn activate(modes: &Rc<ModalContextStack<HostEvent>>, exit: Option<Continuation>) -> Self {
        let context = ModalContext::new(modes, Self::options());
        let pass = |_: &HostEvent| DispatchSignal::SuppressPropagation;
        context.activate(
            vec![
                HandlerSpec::new(EventKind::KeyDown, "pass-keydown", pass),
                HandlerSpec::new(EventKind::KeyUp, "pass-keyup", pass),
                HandlerSpec::new(
                    EventKind::Query(QueryKind::TextCaptured),
                    "text-captured",
                    |_: &HostEvent| DispatchSignal::StopBubblingReturn(true),
                ),
            ],
            exit,
        );
        Self { context }
    }

    pub fn context(&self) -> &Rc<ModalContext<HostEvent>> {
        &self.context
    }

    pub fn is_active(&self) -> bool {
        self.context.is_active()
    }

    pub fn exit(&self) {
        self.context.exit(None);
    }
}
