use std::fmt::{self, Display};

/// A central error enum for window and runtime errors.
#[derive(Debug)]
pub enum UiError {
    IoError(std::io::Error),
    /// The runtime could not be started or failed while building a window.
    Runtime(String),
    /// An event subscription named an event the runtime does not emit.
    UnknownEvent(String),
    /// The runtime was never started, or failed to start.
    NotRunning,
    /// The runtime's event loop is gone; nothing will be delivered any more.
    Disconnected,
}

/// Convert from std::io::Error.
impl From<std::io::Error> for UiError {
    fn from(err: std::io::Error) -> UiError {
        UiError::IoError(err)
    }
}

impl Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::IoError(e) => write!(f, "IO error: {}", e),
            UiError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
            UiError::UnknownEvent(name) => write!(f, "Unknown window event '{}'", name),
            UiError::NotRunning => write!(f, "Windowing runtime is not running"),
            UiError::Disconnected => write!(f, "Windowing runtime disconnected"),
        }
    }
}

impl std::error::Error for UiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UiError::IoError(e) => Some(e),
            _ => None,
        }
    }
}
