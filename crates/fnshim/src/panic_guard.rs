//! Last-resort response for panics the invoker cannot catch.
//!
//! `catch_unwind` only helps when panics unwind. Under `panic = "abort"`
//! (the `wasm32-wasip1` default) the instance dies inside the handler, so
//! [`PanicGuard`] writes the failure response from the process panic hook
//! before the previous hook runs and the process ends. Panics raised
//! outside the invoker's `catch_unwind` take the same path.
//!
//! The guard carries a delivery flag. The adapter arms it when an
//! invocation starts and marks it once the response has been written, so
//! the hook never produces a second document.

use std::cell::Cell;
use std::io::{self, Write};
use std::panic::{self, PanicHookInfo};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::error;

use crate::channel::ChannelId;
use crate::config::AdapterConfig;
use crate::handler::{Failure, Outcome, panic_message};
use crate::response::Response;
use crate::writer;

thread_local! {
    static CATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Run `f` with this thread marked as inside the invoker's `catch_unwind`.
pub(crate) fn catching<T>(f: impl FnOnce() -> T) -> T {
    let previous = CATCHING.replace(true);
    let result = f();
    CATCHING.set(previous);
    result
}

/// Whether a panic raised on this thread right now will be caught.
fn will_be_caught() -> bool {
    cfg!(panic = "unwind") && CATCHING.get()
}

#[derive(Debug, Clone)]
pub struct PanicGuard {
    delivered: Arc<AtomicBool>,
    config: Arc<AdapterConfig>,
}

impl PanicGuard {
    /// A guard that is not yet hooked into the panic machinery.
    pub fn new(config: &AdapterConfig) -> Self {
        Self {
            delivered: Arc::new(AtomicBool::new(false)),
            config: Arc::new(config.clone()),
        }
    }

    /// Install a panic hook that writes failure responses to stdout.
    pub fn install(config: &AdapterConfig) -> Self {
        Self::install_with(config, io::stdout)
    }

    /// Install a panic hook that writes failure responses to whatever
    /// `output` returns. The previous hook still runs afterwards.
    pub fn install_with<F, W>(config: &AdapterConfig, output: F) -> Self
    where
        F: Fn() -> W + Send + Sync + 'static,
        W: Write,
    {
        let guard = Self::new(config);
        let hook_guard = guard.clone();
        let previous = panic::take_hook();

        panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            if !will_be_caught() {
                hook_guard.deliver(failure_from_hook(info), &mut output());
            }
            previous(info);
        }));
        guard
    }

    /// Start a new invocation: no response has been written yet.
    pub fn arm(&self) {
        self.delivered.store(false, Ordering::SeqCst);
    }

    /// Record that the invocation's response went out.
    pub fn mark_delivered(&self) {
        self.delivered.store(true, Ordering::SeqCst);
    }

    pub fn is_delivered(&self) -> bool {
        self.delivered.load(Ordering::SeqCst)
    }

    /// Write the 500 response for `failure` unless a response was already
    /// delivered. Returns whether this call claimed the delivery.
    pub fn deliver<W: Write + ?Sized>(&self, failure: Failure, output: &mut W) -> bool {
        if self.delivered.swap(true, Ordering::SeqCst) {
            return false;
        }

        error!(error = %failure.message, "uncaught panic, writing failure response");
        let response = Response::from_outcome(Outcome::Failure(failure), &self.config);
        if let Err(e) = writer::write_response(output, &response) {
            error!(channel = %ChannelId::Output, error = %e, "failure response not delivered");
        }
        true
    }
}

fn failure_from_hook(info: &PanicHookInfo<'_>) -> Failure {
    let message = panic_message(info.payload());
    let trace = match info.location() {
        Some(location) => format!("panic at {location}: {message}"),
        None => format!("panic: {message}"),
    };
    Failure::new(message, trace)
}
