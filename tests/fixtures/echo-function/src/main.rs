//! Echo guest fixture.
//!
//! Reads the request from channel 0 through fnshim and answers with what
//! it saw. Requests whose body is a `{"visit": "<key>"}` object also
//! touch the key-value store, which is a no-op stub in this runtime.
//!
//! Build (Wasm):   cargo build --target wasm32-wasip1 --release
//! Run (native):   echo '{"body":"hi"}' | cargo run

use fnshim::{Context, Request, Response};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct Visit {
    visit: String,
}

#[derive(Serialize)]
struct Echo<'a> {
    method: &'a str,
    uri: &'a str,
    user_agent: &'a str,
    body: &'a serde_json::Value,
    visits: Option<String>,
}

fn handle(req: &Request, ctx: &Context) -> anyhow::Result<Response> {
    let visits = match req.json::<Visit>() {
        Ok(Visit { visit }) => {
            ctx.kv().set(&visit, "1");
            ctx.kv().get(&visit)
        }
        Err(_) => None,
    };

    let echo = Echo {
        method: req.method(),
        uri: req.uri(),
        user_agent: req.header("User-Agent"),
        body: req.body(),
        visits,
    };

    ctx.log().info(&format!("echoing {} {}", echo.method, echo.uri));
    Ok(Response::json(200, &echo)?.with_header("X-Handler", "echo-function"))
}

fn main() {
    fnshim::run_with_config(
        fnshim::AdapterConfig::default()
            .with_function_name("echo-function")
            .with_runtime_header("fnshim-rust"),
        handle,
    );
}
