//! `fnshim run`: one invocation over the process's stdio.
//!
//! The built-in handlers exercise each branch of the adapter contract so
//! a host can be tested against a known guest:
//! - `echo`: returns the request body
//! - `inspect`: returns the whole normalized request
//! - `fail`: returns an error (500 response)
//! - `panic`: panics inside the handler (500 response, also when
//!   `catch_panics = false` or the binary is built with `panic = "abort"`)

use anyhow::bail;
use clap::ValueEnum;
use fnshim::{Adapter, AdapterConfig, Context, Handler, PanicGuard, Request};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BuiltinHandler {
    Echo,
    Inspect,
    Fail,
    Panic,
}

impl BuiltinHandler {
    pub fn handler(self) -> &'static dyn Handler {
        match self {
            BuiltinHandler::Echo => &echo,
            BuiltinHandler::Inspect => &inspect,
            BuiltinHandler::Fail => &fail,
            BuiltinHandler::Panic => &explode,
        }
    }
}

fn echo(req: &Request, _: &Context) -> anyhow::Result<Value> {
    Ok(req.body().clone())
}

fn inspect(req: &Request, ctx: &Context) -> anyhow::Result<Value> {
    ctx.log()
        .info(&format!("{} {} with {} header(s)", req.method(), req.uri(), req.headers().len()));
    Ok(serde_json::to_value(req)?)
}

fn fail(req: &Request, _: &Context) -> anyhow::Result<Value> {
    bail!("simulated failure for {} {}", req.method(), req.uri())
}

fn explode(_: &Request, _: &Context) -> anyhow::Result<Value> {
    panic!("simulated panic")
}

pub fn run(
    mut config: AdapterConfig,
    handler: BuiltinHandler,
    runtime_header: Option<String>,
) -> anyhow::Result<()> {
    if let Some(runtime) = runtime_header {
        config = config.with_runtime_header(runtime);
    }

    let guard = PanicGuard::install(&config);
    let adapter = Adapter::new(config).with_panic_guard(guard);
    let ctx = adapter.context();
    let response = adapter.run_stdio(handler.handler(), &ctx);

    info!(?handler, status = response.status(), "invocation finished");
    Ok(())
}
