//! Handler results and event kinds.

/// What a handler wants done with the event it was given.
///
/// Every handler invocation returns exactly one signal. Dispatch stops at the
/// first handler answering anything other than [`DispatchSignal::ContinueBubbling`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchSignal {
    /// Not handled here; keep bubbling and let the host act.
    #[default]
    ContinueBubbling,
    /// Fully consumed: no further handlers, no host default action.
    SuppressEvent,
    /// No further handlers, but the host default action still happens.
    SuppressPropagation,
    /// Stop bubbling and hand a boolean answer back to the dispatcher's caller.
    StopBubblingReturn(bool),
}

impl DispatchSignal {
    /// Returns true if dispatch stops at the handler that returned this signal.
    pub fn halts(&self) -> bool {
        !matches!(self, DispatchSignal::ContinueBubbling)
    }

    /// Returns true if the host must not perform its default action.
    pub fn prevents_default(&self) -> bool {
        matches!(self, DispatchSignal::SuppressEvent)
    }

    /// The answer to a query dispatch.
    ///
    /// Only `StopBubblingReturn(true)` answers yes; an unclaimed query is a no.
    pub fn as_bool(&self) -> bool {
        matches!(self, DispatchSignal::StopBubblingReturn(true))
    }
}

/// Questions a host can ask the active modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Is some mode capturing free text input right now?
    TextCaptured,
}

/// The event type a handler is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyDown,
    KeyUp,
    Focus,
    Blur,
    Click,
    Query(QueryKind),
}

impl EventKind {
    /// Returns the name used in log output.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::KeyDown => "keydown",
            EventKind::KeyUp => "keyup",
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
            EventKind::Click => "click",
            EventKind::Query(QueryKind::TextCaptured) => "query:text-captured",
        }
    }

    /// Returns true for keydown and keyup.
    pub fn is_key(&self) -> bool {
        matches!(self, EventKind::KeyDown | EventKind::KeyUp)
    }
}
