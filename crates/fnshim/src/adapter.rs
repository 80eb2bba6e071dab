//! Pipeline orchestration.
//!
//! ```text
//! channel 0 ──► drain ──► Request::normalize ──► invoke ──► Response::from_outcome ──► write ──► channel 1
//!                                                  │
//!                                         diagnostics (channel 2)
//! ```
//!
//! [`Adapter`] keeps configuration and, for process entry points, a
//! [`PanicGuard`]. Each call builds its own request, outcome and response,
//! so one adapter can serve any number of invocations without carrying
//! state between them.

use std::io::{self, Read, Write};

use tracing::{error, info, info_span};

use crate::channel::{self, ChannelId};
use crate::config::AdapterConfig;
use crate::context::Context;
use crate::diagnostics;
use crate::handler::{self, Handler};
use crate::kv::NoopStore;
use crate::panic_guard::PanicGuard;
use crate::request::Request;
use crate::response::Response;
use crate::writer;

#[derive(Debug, Clone, Default)]
pub struct Adapter {
    config: AdapterConfig,
    guard: Option<PanicGuard>,
}

impl Adapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            guard: None,
        }
    }

    /// Report deliveries to `guard` so its panic hook never writes a
    /// second response.
    pub fn with_panic_guard(mut self, guard: PanicGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Build the per-invocation context for this adapter's function.
    pub fn context(&self) -> Context {
        Context::new(NoopStore).with_function_name(&self.config.function_name)
    }

    /// Run the handler over already-drained input and return the response
    /// that would be written. Never fails.
    pub fn respond<H: Handler + ?Sized>(&self, handler: &H, raw: &[u8], ctx: &Context) -> Response {
        let request = Request::normalize(raw, &self.config);
        let outcome = if self.config.catch_panics {
            handler::invoke(handler, &request, ctx)
        } else {
            handler::invoke_uncaught(handler, &request, ctx)
        };
        Response::from_outcome(outcome, &self.config)
    }

    /// One full invocation: drain `input`, call the handler, write one
    /// response to `output`.
    ///
    /// Returns the response that was produced, whether or not writing it
    /// succeeded.
    pub fn run<H, R, W>(&self, handler: &H, ctx: &Context, input: &mut R, output: &mut W) -> Response
    where
        H: Handler + ?Sized,
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let span = info_span!("invocation", function = %self.config.function_name);
        let _entered = span.enter();

        if let Some(guard) = &self.guard {
            guard.arm();
        }

        let raw = channel::drain(input, self.config.chunk_size);
        let response = self.respond(handler, &raw, ctx);

        let written = writer::write_response(output, &response);
        if let Some(guard) = &self.guard {
            guard.mark_delivered();
        }
        match written {
            Ok(bytes) => {
                info!(channel = %ChannelId::Output, status = response.status(), bytes, "response written");
            }
            Err(e) => {
                error!(channel = %ChannelId::Output, status = response.status(), error = %e, "response not delivered");
            }
        }
        response
    }

    /// Run one invocation over the process's stdin and stdout.
    pub fn run_stdio<H: Handler + ?Sized>(&self, handler: &H, ctx: &Context) -> Response {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run(handler, ctx, &mut stdin.lock(), &mut stdout.lock())
    }
}

/// Entry point for a guest function: defaults, diagnostics on stderr,
/// no-op collaborators, a panic guard, one invocation over stdio.
pub fn run<H: Handler>(handler: H) {
    run_with_config(AdapterConfig::default(), handler);
}

/// Like [`run`] with an explicit configuration.
pub fn run_with_config<H: Handler>(config: AdapterConfig, handler: H) {
    diagnostics::init(&config);
    let guard = PanicGuard::install(&config);
    let adapter = Adapter::new(config).with_panic_guard(guard);
    let ctx = adapter.context();
    adapter.run_stdio(&handler, &ctx);
}
