pub mod launcher;
pub mod runtime;
pub mod utils;
pub mod window;

// re‑export ergonomic entry points
pub use launcher::{show_ui, try_show_ui};
pub use runtime::errors::UiError;
pub use runtime::{EventHandler, EventKind, EventResult, SubscriptionId, Window, WindowId, WindowingRuntime};
pub use window::options::{SizeHW, WindowOptions};

#[cfg(feature = "webview")]
pub use runtime::webview::WebviewRuntime;
