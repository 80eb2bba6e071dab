//! fnshim: function invocation adapter for sandboxed guests.
//!
//! A guest function talks to its host only through byte channels:
//! channel 0 carries the request in, channel 1 carries exactly one
//! response out, and channel 2 takes best-effort diagnostics. This crate
//! implements that contract so user code only sees a typed [`Request`]
//! and returns a [`Response`] or a plain value.
//!
//! # Pipeline
//!
//! 1. [`channel::drain`] reads channel 0 to end-of-stream in fixed-size
//!    chunks. Read faults end the stream.
//! 2. [`Request::normalize`] decodes the bytes (lossy UTF-8) and parses
//!    them loosely: a `{body, headers, method, uri}` envelope, any other
//!    JSON document, or raw text.
//! 3. [`handler::invoke`] calls user code exactly once and folds errors,
//!    panics and unusable shapes into an [`Outcome`].
//! 4. [`Response::from_outcome`] coerces the outcome into a response that
//!    always has a status, a `Content-Type` and a text body.
//! 5. [`writer::write_response`] writes the serialized response once.
//!
//! [`run`] also installs a [`PanicGuard`], so a panic that cannot be
//! caught (a `panic = "abort"` build, or a panic outside the handler)
//! still leaves one 500 response on channel 1.
//!
//! # Example
//!
//! ```no_run
//! use fnshim::{Context, Request};
//! use serde_json::{Value, json};
//!
//! fn main() {
//!     fnshim::run(|req: &Request, ctx: &Context| -> anyhow::Result<Value> {
//!         ctx.log().info("greeting");
//!         Ok(json!({ "agent": req.header("User-Agent") }))
//!     });
//! }
//! ```

pub mod adapter;
pub mod channel;
pub mod config;
pub mod context;
pub mod db;
pub mod diagnostics;
pub mod error;
pub mod handler;
mod header;
pub mod kv;
pub mod panic_guard;
mod request;
mod response;
pub mod writer;

pub use adapter::{Adapter, run, run_with_config};
pub use config::{AdapterConfig, LogFormat};
pub use context::Context;
pub use db::{DbClient, NoopDb};
pub use error::{ShimError, ShimResult};
pub use handler::{Failure, Handler, Outcome, Reply};
pub use header::{Header, HeaderMap, MISSING_HEADER, ResponseHeaders};
pub use kv::{KvStore, MemoryStore, NoopStore};
pub use panic_guard::PanicGuard;
pub use request::{ParsedInput, Request};
pub use response::{CONTENT_TYPE, RUNTIME_HEADER, Response};
