//! A deterministic **in‑process stand‑in** for `mos_ui_core::WindowingRuntime`.
//!
//! *  **From the test’s perspective**
//!    * Inspect every call the launcher made via `fake_runtime.calls()`.
//!    * Play the user: `fake_runtime.emit(EventKind::Closed)` fires the
//!      registered handlers on the calling thread, the way the real runtime
//!      fires them on its event loop thread.
//!
//! *  **Why this exists**: It lets tests exercise the launcher's blocking
//!    handoff without a display server or a native event loop.

#![allow(dead_code)]

use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::LevelFilter;
use mos_ui_core::{
    EventHandler, EventKind, EventResult, SubscriptionId, UiError, Window, WindowId,
    WindowOptions, WindowingRuntime,
};

/// One recorded call into the runtime or one of its windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    InitLogger,
    Start,
    NewWindow(WindowOptions),
    Show(WindowId),
    Focus(WindowId),
    HandleEvent(WindowId, String),
}

struct Registered {
    window: FakeWindow,
    kind: EventKind,
    handler: EventHandler<FakeWindow>,
}

#[derive(Default)]
struct Shared {
    calls: Mutex<Vec<Call>>,
    handlers: Mutex<Vec<Registered>>,
    handler_added: Condvar,
    refuse_registration: bool,
    close_on_subscribe: bool,
}

#[derive(Clone, Default)]
pub struct FakeRuntime {
    shared: Arc<Shared>,
}

impl FakeRuntime {
    /// A runtime that only fires events when the test calls `emit`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A runtime whose user closes the window as soon as anybody listens for it.
    pub fn closing_immediately() -> Self {
        Self {
            shared: Arc::new(Shared {
                close_on_subscribe: true,
                ..Shared::default()
            }),
        }
    }

    /// A runtime that rejects every event subscription.
    pub fn refusing_registration() -> Self {
        Self {
            shared: Arc::new(Shared {
                refuse_registration: true,
                ..Shared::default()
            }),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.shared.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.shared.calls.lock().unwrap().push(call);
    }

    /// Blocks until a handler for `kind` is registered, or `timeout` passes.
    pub fn wait_for_handler(&self, kind: EventKind, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut handlers = self.shared.handlers.lock().unwrap();
        while !handlers.iter().any(|r| r.kind == kind) {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            handlers = self
                .shared
                .handler_added
                .wait_timeout(handlers, deadline - now)
                .unwrap()
                .0;
        }
        true
    }

    /// Fires `kind` on every window, returning how many handlers ran.
    pub fn emit(&self, kind: EventKind) -> usize {
        let mut handlers = self.shared.handlers.lock().unwrap();
        let mut fired = 0;
        for registered in handlers.iter_mut().filter(|r| r.kind == kind) {
            let result = EventResult {
                window: registered.window.id,
                kind,
            };
            (registered.handler)(result, &registered.window);
            fired += 1;
        }
        fired
    }

    /// Forgets every handler without firing it, as a crashed event loop would.
    pub fn drop_handlers(&self) {
        self.shared.handlers.lock().unwrap().clear();
    }
}

impl WindowingRuntime for FakeRuntime {
    type Window = FakeWindow;

    fn init_logger(&self) {
        //   Logs will appear only when you run with `-- --nocapture`
        //   or when the test fails.
        let _ = env_logger::Builder::from_default_env()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();
        self.record(Call::InitLogger);
    }

    fn start(&self) {
        self.record(Call::Start);
    }

    fn new_window(&self, options: WindowOptions) -> FakeWindow {
        let mut calls = self.shared.calls.lock().unwrap();
        let created = calls
            .iter()
            .filter(|c| matches!(c, Call::NewWindow(_)))
            .count();
        calls.push(Call::NewWindow(options));
        FakeWindow {
            id: WindowId(created as u64 + 1),
            runtime: self.clone(),
        }
    }
}

#[derive(Clone)]
pub struct FakeWindow {
    id: WindowId,
    runtime: FakeRuntime,
}

impl Window for FakeWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn show(&self) {
        self.runtime.record(Call::Show(self.id));
    }

    fn focus(&self) {
        self.runtime.record(Call::Focus(self.id));
    }

    fn handle_event(
        &self,
        event: &str,
        handler: EventHandler<Self>,
    ) -> Result<SubscriptionId, UiError> {
        self.runtime.record(Call::HandleEvent(self.id, event.to_owned()));
        let shared = &self.runtime.shared;
        if shared.refuse_registration {
            return Err(UiError::Runtime("registration refused by fake runtime".into()));
        }
        let kind: EventKind = event.parse()?;

        let subscription = {
            let mut handlers = shared.handlers.lock().unwrap();
            handlers.push(Registered {
                window: self.clone(),
                kind,
                handler,
            });
            shared.handler_added.notify_all();
            SubscriptionId(handlers.len() as u64)
        };

        // Like a real runtime, deliver on a thread other than the subscriber's.
        if shared.close_on_subscribe && kind == EventKind::Closed {
            let runtime = self.runtime.clone();
            thread::spawn(move || {
                runtime.emit(EventKind::Closed);
            });
        }
        Ok(subscription)
    }
}
