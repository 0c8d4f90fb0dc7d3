//! Passes the next few keys straight to the host.

use std::cell::Cell;
use std::rc::Rc;

use crate::dispatch::{DispatchSignal, EventKind, HandlerSpec};
use crate::event::HostEvent;
use crate::mode::{Continuation, ModalContext, ModalContextStack, ModeOptions};

pub const PASS_NEXT_KEY_MODE: &str = "pass-next-key";

/// Lets `count` keys through, then exits once the last of them is released.
///
/// Keyups for keys pressed before activation are ignored, so the key that
/// triggered the mode does not use up the count. Losing focus exits, since
/// releases after a blur never arrive.
pub struct PassNextKeyMode {
    context: Rc<ModalContext<HostEvent>>,
}

impl PassNextKeyMode {
    pub fn activate(
        modes: &Rc<ModalContextStack<HostEvent>>,
        count: u32,
        exit: Option<Continuation>,
    ) -> Self {
        let options = ModeOptions::new(PASS_NEXT_KEY_MODE)
            .indicator("PASS NEXT KEY")
            .singleton(PASS_NEXT_KEY_MODE)
            .exit_on_blur();
        let context = ModalContext::new(modes, options);

        let held = Rc::new(Cell::new(0u32));
        let remaining = Rc::new(Cell::new(count.max(1)));

        let pressed = held.clone();
        let keydown = HandlerSpec::new(EventKind::KeyDown, "pass-keydown", move |_: &HostEvent| {
            pressed.set(pressed.get() + 1);
            DispatchSignal::SuppressPropagation
        });

        let weak = Rc::downgrade(&context);
        let keyup = HandlerSpec::new(EventKind::KeyUp, "pass-keyup", move |_: &HostEvent| {
            if held.get() > 0 {
                held.set(held.get() - 1);
                if held.get() == 0 {
                    remaining.set(remaining.get().saturating_sub(1));
                    if remaining.get() == 0 {
                        if let Some(mode) = weak.upgrade() {
                            mode.exit(None);
                        }
                    }
                }
            }
            DispatchSignal::SuppressPropagation
        });

        context.activate(vec![keydown, keyup], exit);
        Self { context }
    }

    pub fn is_active(&self) -> bool {
        self.context.is_active()
    }

    pub fn exit(&self) {
        self.context.exit(None);
    }
}
