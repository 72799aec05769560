//! The windowing-runtime seam.
//!
//! The launcher only ever talks to these two traits. The real backend lives in
//! [`webview`]; tests drive the launcher through an in-process fake.

pub mod errors;
#[cfg(feature = "webview")]
pub mod webview;

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::window::WindowOptions;
use errors::UiError;

/// Runtime-assigned identity of one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// Handle returned by [`Window::handle_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Window events that handlers can subscribe to by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Closed,
    Focus,
    Blur,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Closed => "closed",
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = UiError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "closed" => Ok(EventKind::Closed),
            "focus" => Ok(EventKind::Focus),
            "blur" => Ok(EventKind::Blur),
            other => Err(UiError::UnknownEvent(other.to_owned())),
        }
    }
}

/// What a handler is told when its event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventResult {
    pub window: WindowId,
    pub kind: EventKind,
}

/// Event callback. Runs on the runtime's dispatch thread, never on the caller's.
pub type EventHandler<W> = Box<dyn FnMut(EventResult, &W) + Send + 'static>;

/// A process-wide windowing runtime.
///
/// `init_logger` and `start` are idempotent: the runtime is started at most once
/// per process and lives until the process exits.
pub trait WindowingRuntime {
    type Window: Window;

    fn init_logger(&self);
    fn start(&self);
    fn new_window(&self, options: WindowOptions) -> Self::Window;
}

/// A handle to one window owned by the runtime.
///
/// Only event registration reports failure; everything else is fire-and-forget.
pub trait Window: Clone + Send + 'static {
    fn id(&self) -> WindowId;
    fn show(&self);
    fn focus(&self);
    fn handle_event(
        &self,
        event: &str,
        handler: EventHandler<Self>,
    ) -> Result<SubscriptionId, UiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_round_trip() {
        for kind in [EventKind::Closed, EventKind::Focus, EventKind::Blur] {
            assert_eq!(kind.name().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_event_names_are_rejected() {
        let err = "Closed".parse::<EventKind>().expect_err("names are case sensitive");
        assert!(matches!(err, UiError::UnknownEvent(ref name) if name == "Closed"));
    }
}
