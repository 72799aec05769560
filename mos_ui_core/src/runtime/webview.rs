//! `tao` + `wry` implementation of the windowing runtime.
//!
//! The native event loop runs on its own thread for the rest of the process.
//! Window handles never touch native objects directly: every call becomes a
//! [`Command`] sent through the event loop proxy, so commands are applied in
//! the order they were issued.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, OnceLock};
use std::thread;

use log::{debug, error, info, warn};
use tao::dpi::LogicalSize;
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy, EventLoopWindowTarget};
use tao::window::{Window as NativeWindow, WindowBuilder, WindowId as NativeWindowId};
use wry::{WebView, WebViewBuilder};

use super::errors::UiError;
use super::{EventHandler, EventKind, EventResult, SubscriptionId, Window, WindowId, WindowingRuntime};
use crate::utils::logging::init_logging;
use crate::window::WindowOptions;

const RUNTIME_THREAD_NAME: &str = "mos-ui-runtime";

/// Started at most once per process; holds the proxy or the reason startup failed.
static EVENT_LOOP: OnceLock<Result<Dispatcher, String>> = OnceLock::new();

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

type BoundHandler = Box<dyn FnMut(EventResult) + Send + 'static>;

/// Requests from window handles to the event loop thread.
enum Command {
    Create {
        id: WindowId,
        options: WindowOptions,
    },
    Show(WindowId),
    Focus(WindowId),
    Subscribe {
        id: WindowId,
        kind: EventKind,
        subscription: SubscriptionId,
        handler: BoundHandler,
    },
}

/// Shared sending side of the event loop proxy.
#[derive(Clone)]
struct Dispatcher {
    proxy: Arc<Mutex<EventLoopProxy<Command>>>,
}

impl Dispatcher {
    fn send(&self, command: Command) -> Result<(), UiError> {
        let proxy = self.proxy.lock().map_err(|_| UiError::Disconnected)?;
        proxy.send_event(command).map_err(|_| UiError::Disconnected)
    }
}

/// The process-wide webview runtime.
///
/// Cheap to construct; every instance shares the same event loop thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebviewRuntime;

impl WebviewRuntime {
    pub fn new() -> Self {
        Self
    }

    fn dispatcher(&self) -> Option<Dispatcher> {
        match EVENT_LOOP.get() {
            Some(Ok(dispatcher)) => Some(dispatcher.clone()),
            _ => None,
        }
    }
}

impl WindowingRuntime for WebviewRuntime {
    type Window = WebviewWindow;

    fn init_logger(&self) {
        init_logging();
    }

    fn start(&self) {
        let started = EVENT_LOOP.get_or_init(|| {
            info!("Starting windowing runtime");
            spawn_event_loop().map_err(|e| e.to_string())
        });
        if let Err(reason) = started {
            error!("Windowing runtime is unavailable: {}", reason);
        }
    }

    fn new_window(&self, options: WindowOptions) -> WebviewWindow {
        let id = WindowId(NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed));
        let dispatcher = self.dispatcher();
        match &dispatcher {
            Some(d) => {
                if let Err(e) = d.send(Command::Create { id, options }) {
                    warn!("Could not create window {:?}: {}", id, e);
                }
            }
            None => warn!("Window {:?} requested before the runtime was started", id),
        }
        WebviewWindow { id, dispatcher }
    }
}

/// Handle to a window living on the event loop thread.
#[derive(Clone)]
pub struct WebviewWindow {
    id: WindowId,
    dispatcher: Option<Dispatcher>,
}

impl WebviewWindow {
    fn send(&self, command: Command) -> Result<(), UiError> {
        self.dispatcher
            .as_ref()
            .ok_or(UiError::NotRunning)?
            .send(command)
    }
}

impl Window for WebviewWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn show(&self) {
        if let Err(e) = self.send(Command::Show(self.id)) {
            warn!("show {:?}: {}", self.id, e);
        }
    }

    fn focus(&self) {
        if let Err(e) = self.send(Command::Focus(self.id)) {
            warn!("focus {:?}: {}", self.id, e);
        }
    }

    fn handle_event(
        &self,
        event: &str,
        mut handler: EventHandler<Self>,
    ) -> Result<SubscriptionId, UiError> {
        let kind: EventKind = event.parse()?;
        let subscription = SubscriptionId(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed));
        let me = self.clone();
        self.send(Command::Subscribe {
            id: self.id,
            kind,
            subscription,
            handler: Box::new(move |result: EventResult| handler(result, &me)),
        })?;
        debug!("Subscribed {:?} to '{}' on {:?}", subscription, kind, self.id);
        Ok(subscription)
    }
}

/// Spawns the event loop thread and waits until it hands back its proxy.
fn spawn_event_loop() -> Result<Dispatcher, UiError> {
    let (ready_tx, ready_rx) = mpsc::channel::<EventLoopProxy<Command>>();

    thread::Builder::new()
        .name(RUNTIME_THREAD_NAME.into())
        .spawn(move || {
            let mut builder = EventLoopBuilder::<Command>::with_user_event();
            allow_any_thread(&mut builder);
            let event_loop = builder.build();
            if ready_tx.send(event_loop.create_proxy()).is_err() {
                return;
            }

            let mut windows = LoopState::default();
            event_loop.run(move |event, target, control_flow| {
                *control_flow = ControlFlow::Wait;
                windows.on_event(event, target);
            });
        })?;

    let proxy = ready_rx.recv().map_err(|_| {
        UiError::Runtime("event loop thread exited before it was ready".into())
    })?;
    info!("Windowing runtime started on thread '{}'", RUNTIME_THREAD_NAME);
    Ok(Dispatcher {
        proxy: Arc::new(Mutex::new(proxy)),
    })
}

#[cfg(any(
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn allow_any_thread(builder: &mut EventLoopBuilder<Command>) {
    use tao::platform::unix::EventLoopBuilderExtUnix;
    builder.with_any_thread(true);
}

#[cfg(target_os = "windows")]
fn allow_any_thread(builder: &mut EventLoopBuilder<Command>) {
    use tao::platform::windows::EventLoopBuilderExtWindows;
    builder.with_any_thread(true);
}

// macOS only runs an event loop on the main thread; building one elsewhere fails
// and start() records the runtime as unavailable.
#[cfg(not(any(
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "windows"
)))]
fn allow_any_thread(_builder: &mut EventLoopBuilder<Command>) {}

/// A native window together with the web view rendering into it.
/// The web view is declared first so it is torn down before its window.
struct Managed {
    _webview: WebView,
    window: NativeWindow,
}

/// Everything the event loop thread owns.
#[derive(Default)]
struct LoopState {
    windows: HashMap<WindowId, Managed>,
    native_ids: HashMap<NativeWindowId, WindowId>,
    handlers: HashMap<WindowId, Vec<(EventKind, SubscriptionId, BoundHandler)>>,
    /// Windows whose native window or web view could not be built.
    failed: HashSet<WindowId>,
}

impl LoopState {
    fn on_event(&mut self, event: Event<'_, Command>, target: &EventLoopWindowTarget<Command>) {
        match event {
            Event::UserEvent(command) => self.apply(command, target),
            Event::WindowEvent {
                window_id, event, ..
            } => {
                let Some(&id) = self.native_ids.get(&window_id) else {
                    return;
                };
                match window_event_kind(&event) {
                    Some(EventKind::Closed) => self.close(id),
                    Some(kind) => self.dispatch(id, kind),
                    None => {}
                }
            }
            _ => {}
        }
    }

    fn apply(&mut self, command: Command, target: &EventLoopWindowTarget<Command>) {
        match command {
            Command::Create { id, options } => match build_window(&options, target) {
                Ok(managed) => {
                    debug!("Created {:?} for {}", id, options.root_url);
                    self.native_ids.insert(managed.window.id(), id);
                    self.windows.insert(id, managed);
                }
                Err(e) => {
                    error!("Failed to create window {:?}: {}", id, e);
                    self.failed.insert(id);
                }
            },
            Command::Show(id) => match self.windows.get(&id) {
                Some(managed) => managed.window.set_visible(true),
                None => warn!("show: no window {:?}", id),
            },
            Command::Focus(id) => match self.windows.get(&id) {
                Some(managed) => managed.window.set_focus(),
                None => warn!("focus: no window {:?}", id),
            },
            Command::Subscribe {
                id,
                kind,
                subscription,
                handler,
            } => self.subscribe(id, kind, subscription, handler),
        }
    }

    /// Handlers for a window that failed to build are dropped unrun, so a
    /// waiter sees its channel disconnect instead of waiting for a close that
    /// can never happen.
    fn subscribe(
        &mut self,
        id: WindowId,
        kind: EventKind,
        subscription: SubscriptionId,
        handler: BoundHandler,
    ) {
        if self.failed.contains(&id) {
            warn!("Dropping {:?} for '{}': window {:?} was never created", subscription, kind, id);
            return;
        }
        self.handlers
            .entry(id)
            .or_default()
            .push((kind, subscription, handler));
    }

    /// Destroys the window and its web view, then tells "closed" subscribers.
    fn close(&mut self, id: WindowId) {
        if let Some(managed) = self.windows.remove(&id) {
            self.native_ids.remove(&managed.window.id());
            drop(managed);
            info!("Window {:?} closed by user", id);
        }
        self.dispatch(id, EventKind::Closed);
        // A closed window never emits again.
        self.handlers.remove(&id);
    }

    fn dispatch(&mut self, id: WindowId, kind: EventKind) {
        let Some(handlers) = self.handlers.get_mut(&id) else {
            return;
        };
        for (_, subscription, handler) in handlers.iter_mut().filter(|(k, ..)| *k == kind) {
            debug!("Dispatching '{}' on {:?} to {:?}", kind, id, subscription);
            handler(EventResult { window: id, kind });
        }
    }
}

/// Native window events that map onto subscribable events.
fn window_event_kind(event: &WindowEvent<'_>) -> Option<EventKind> {
    match event {
        WindowEvent::CloseRequested => Some(EventKind::Closed),
        WindowEvent::Focused(true) => Some(EventKind::Focus),
        WindowEvent::Focused(false) => Some(EventKind::Blur),
        _ => None,
    }
}

fn build_window(
    options: &WindowOptions,
    target: &EventLoopWindowTarget<Command>,
) -> Result<Managed, UiError> {
    let window = WindowBuilder::new()
        .with_title(options.title.as_str())
        .with_inner_size(LogicalSize::new(
            f64::from(options.size.width),
            f64::from(options.size.height),
        ))
        .with_decorations(options.has_frame)
        .with_visible(false)
        .build(target)
        .map_err(|e| UiError::Runtime(format!("native window: {}", e)))?;

    let builder = WebViewBuilder::new().with_url(options.root_url.as_str());
    let webview = attach_webview(builder, &window)?;

    Ok(Managed {
        _webview: webview,
        window,
    })
}

#[cfg(any(
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn attach_webview(builder: WebViewBuilder, window: &NativeWindow) -> Result<WebView, UiError> {
    use tao::platform::unix::WindowExtUnix;
    use wry::WebViewBuilderExtUnix;

    let vbox = window
        .default_vbox()
        .ok_or_else(|| UiError::Runtime("window has no GTK container".into()))?;
    builder
        .build_gtk(vbox)
        .map_err(|e| UiError::Runtime(format!("web view: {}", e)))
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn attach_webview(builder: WebViewBuilder, window: &NativeWindow) -> Result<WebView, UiError> {
    builder
        .build(window)
        .map_err(|e| UiError::Runtime(format!("web view: {}", e)))
}
