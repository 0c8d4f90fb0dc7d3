//! A mode driven by a key sequence interpreter.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::dispatch::{DispatchSignal, EventKind, HandlerSpec};
use crate::event::HostEvent;
use crate::keys::{InterpreterConfig, KeyOutcome, KeyResolver, KeySequenceInterpreter};
use crate::mode::{consume_escape_keyup, Continuation, ModalContext, ModalContextStack, ModeOptions};

/// Feeds resolved keydowns to a [`KeySequenceInterpreter`].
///
/// Escape that only cancels pending input also swallows its keyup. When the
/// interpreter's command limit runs out the mode exits.
pub struct KeyHandlerMode<C: 'static> {
    context: Rc<ModalContext<HostEvent>>,
    interpreter: Rc<RefCell<KeySequenceInterpreter<C>>>,
}

impl<C: Clone + fmt::Debug + 'static> KeyHandlerMode<C> {
    pub fn activate(
        modes: &Rc<ModalContextStack<HostEvent>>,
        options: ModeOptions,
        resolver: Rc<dyn KeyResolver>,
        config: InterpreterConfig<C>,
        exit: Option<Continuation>,
    ) -> Self {
        let context = ModalContext::new(modes, options);
        let interpreter = Rc::new(RefCell::new(KeySequenceInterpreter::new(config)));

        let weak = Rc::downgrade(&context);
        let shared = interpreter.clone();
        let keydown = HandlerSpec::new(EventKind::KeyDown, "keys", move |event: &HostEvent| {
            let Some(key) = event.key() else {
                return DispatchSignal::ContinueBubbling;
            };
            let token = resolver.key_char(key);
            let outcome = match shared.try_borrow_mut() {
                Ok(mut interpreter) => interpreter.interpret(&token),
                Err(_) => {
                    tracing::warn!(key = %token, "interpreter busy; key not handled");
                    return DispatchSignal::ContinueBubbling;
                }
            };

            if let Some(mode) = weak.upgrade() {
                match outcome {
                    KeyOutcome::EscapeReset => consume_escape_keyup(mode.dispatcher()),
                    KeyOutcome::Exhausted => mode.exit(None),
                    _ => {}
                }
            }
            outcome.signal()
        });

        context.activate(vec![keydown], exit);
        Self {
            context,
            interpreter,
        }
    }

    pub fn context(&self) -> &Rc<ModalContext<HostEvent>> {
        &self.context
    }

    pub fn interpreter(&self) -> &Rc<RefCell<KeySequenceInterpreter<C>>> {
        &self.interpreter
    }

    pub fn is_active(&self) -> bool {
        self.context.is_active()
    }

    pub fn exit(&self) {
        self.context.exit(None);
    }
}

impl<C> fmt::Debug for KeyHandlerMode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandlerMode")
            .field("context", &self.context)
            .field("interpreter", &self.interpreter)
            .finish()
    }
}
