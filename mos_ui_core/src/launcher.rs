use std::sync::mpsc;

use log::{debug, error, info};

use crate::runtime::errors::UiError;
use crate::runtime::{EventKind, EventResult, SubscriptionId, Window, WindowingRuntime};
use crate::window::WindowOptions;

/// Opens the Mongoose OS UI on `url` and blocks until the user closes the window.
///
/// If the close observer cannot be registered (or the runtime goes away before the
/// window is closed) the error is logged and the process exits with status 1.
pub fn show_ui<R: WindowingRuntime>(runtime: &R, url: &str) {
    if let Err(e) = try_show_ui(runtime, url) {
        error!("Failed to show UI: {}", e);
        std::process::exit(1);
    }
}

/// Same sequence as [`show_ui`], but hands failures back to the caller.
///
/// init logger → start → create → show → focus → subscribe to "closed" → wait.
pub fn try_show_ui<R: WindowingRuntime>(runtime: &R, url: &str) -> Result<(), UiError> {
    runtime.init_logger();
    runtime.start();

    let window = runtime.new_window(WindowOptions::mongoose_os(url));
    window.show();
    window.focus();
    info!("Opened UI window {:?} on {}", window.id(), url);

    let (closed_rx, _subscription) = observe_close(&window)?;

    // Blocks until the observer hands over its single signal.
    closed_rx.recv().map_err(|_| UiError::Disconnected)?;
    info!("UI window {:?} closed", window.id());
    Ok(())
}

/// Registers a single-shot observer on the window's "closed" event.
///
/// The returned receiver is the rendezvous end: the observer's send only
/// completes once somebody is receiving, and it sends at most once.
fn observe_close<W: Window>(
    window: &W,
) -> Result<(mpsc::Receiver<()>, SubscriptionId), UiError> {
    let (closed_tx, closed_rx) = mpsc::sync_channel::<()>(0);
    let mut closed_tx = Some(closed_tx);

    let subscription = window.handle_event(
        EventKind::Closed.name(),
        Box::new(move |result: EventResult, _window: &W| match closed_tx.take() {
            Some(tx) => {
                debug!("Close observed for {:?}", result.window);
                if tx.send(()).is_err() {
                    debug!("Nobody is waiting for {:?} to close any more", result.window);
                }
            }
            None => debug!("Ignoring repeated close for {:?}", result.window),
        }),
    )?;

    Ok((closed_rx, subscription))
}
