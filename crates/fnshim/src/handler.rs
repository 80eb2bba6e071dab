//! User handler contract and the invoker boundary.
//!
//! User code receives the canonical [`Request`] and a per-invocation
//! [`Context`], and returns either a full [`Response`] or a plain value.
//! Whatever happens inside (an `Err`, a panic, an unusable response
//! shape) is folded into an [`Outcome`] here; nothing propagates past
//! [`invoke`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, error};

use crate::context::Context;
use crate::panic_guard;
use crate::request::Request;
use crate::response::Response;

/// Keys a JSON object may carry to be read as a response.
const RESPONSE_KEYS: [&str; 3] = ["status", "headers", "body"];

/// What a handler hands back on success.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Response(Response),
    Value(Value),
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Response(response)
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Value(value)
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Value(Value::String(text))
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Value(Value::String(text.to_string()))
    }
}

/// A failure caught at the invoker boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    pub trace: String,
}

impl Failure {
    pub fn new(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: trace.into(),
        }
    }

    /// Message from the error, trace from its full debug chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self::new(err.to_string(), format!("{err:?}"))
    }

    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = panic_message(payload);
        let trace = format!("panic in handler: {message}");
        Self::new(message, trace)
    }
}

/// Text of a panic payload, for the two payload types `panic!` produces.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string())
}

/// The resolved result of one handler call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Response(Response),
    Value(Value),
    Failure(Failure),
}

impl Outcome {
    /// Resolve a reply by inspecting its shape.
    ///
    /// A JSON object whose keys are a subset of `status`, `headers` and
    /// `body`, and whose `status` is an integer, is read as a response. If
    /// the status is out of range or the headers are not a mapping the
    /// reply becomes a failure. Anything else is a plain value, so
    /// payloads like `{"status": "ok"}` stay values.
    pub fn from_reply(reply: Reply) -> Self {
        let value = match reply {
            Reply::Response(response) => return Outcome::Response(response),
            Reply::Value(value) => value,
        };

        let Value::Object(fields) = &value else {
            return Outcome::Value(value);
        };
        let integer_status = matches!(
            fields.get("status"),
            Some(Value::Number(n)) if n.is_i64() || n.is_u64()
        );
        let response_shaped =
            integer_status && fields.keys().all(|k| RESPONSE_KEYS.contains(&k.as_str()));
        if !response_shaped {
            return Outcome::Value(value);
        }

        match Response::from_fields(fields) {
            Some(response) => Outcome::Response(response),
            None => Outcome::Failure(Failure::new(
                "handler returned an unusable response shape",
                value.to_string(),
            )),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }
}

/// User function contract.
///
/// Implemented for every `Fn(&Request, &Context) -> anyhow::Result<R>`
/// where `R: Into<Reply>`, so plain closures and functions work.
pub trait Handler {
    fn call(&self, request: &Request, ctx: &Context) -> anyhow::Result<Reply>;
}

impl<F, R> Handler for F
where
    F: Fn(&Request, &Context) -> anyhow::Result<R>,
    R: Into<Reply>,
{
    fn call(&self, request: &Request, ctx: &Context) -> anyhow::Result<Reply> {
        self(request, ctx).map(Into::into)
    }
}

/// Call the handler exactly once and resolve what it produced.
///
/// Panics are caught with `catch_unwind`. On targets built with
/// `panic = "abort"` they cannot be; there the
/// [`PanicGuard`](crate::PanicGuard) writes the failure response instead.
pub fn invoke<H: Handler + ?Sized>(handler: &H, request: &Request, ctx: &Context) -> Outcome {
    let result = panic_guard::catching(|| {
        panic::catch_unwind(AssertUnwindSafe(|| handler.call(request, ctx)))
    });

    let outcome = match result {
        Ok(result) => resolve(result),
        Err(payload) => Outcome::Failure(Failure::from_panic(&*payload)),
    };
    log_outcome(&outcome);
    outcome
}

/// Like [`invoke`], but panics propagate to the process panic hook.
pub fn invoke_uncaught<H: Handler + ?Sized>(
    handler: &H,
    request: &Request,
    ctx: &Context,
) -> Outcome {
    let outcome = resolve(handler.call(request, ctx));
    log_outcome(&outcome);
    outcome
}

fn resolve(result: anyhow::Result<Reply>) -> Outcome {
    match result {
        Ok(reply) => Outcome::from_reply(reply),
        Err(err) => Outcome::Failure(Failure::from_error(&err)),
    }
}

fn log_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Failure(failure) => {
            error!(error = %failure.message, "handler failed");
        }
        Outcome::Response(response) => {
            debug!(status = response.status(), "handler returned a response");
        }
        Outcome::Value(_) => debug!("handler returned a value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context as _, bail};
    use serde_json::json;

    fn call<H: Handler>(handler: H) -> Outcome {
        invoke(&handler, &Request::default(), &Context::default())
    }

    #[test]
    fn string_reply_is_a_value() {
        let outcome = call(|_: &Request, _: &Context| -> anyhow::Result<&'static str> {
            Ok("hello")
        });
        assert_eq!(outcome, Outcome::Value(json!("hello")));
    }

    #[test]
    fn response_reply_is_kept() {
        let outcome = call(|_: &Request, _: &Context| -> anyhow::Result<Response> {
            Ok(Response::text(418, "short and stout"))
        });
        let Outcome::Response(resp) = outcome else {
            panic!("expected a response");
        };
        assert_eq!(resp.status(), 418);
    }

    #[test]
    fn error_reply_is_a_failure_with_chain() {
        let outcome = call(|_: &Request, _: &Context| -> anyhow::Result<Value> {
            Err(anyhow::anyhow!("disk full")).context("saving contact")
        });
        let Outcome::Failure(failure) = outcome else {
            panic!("expected a failure");
        };
        assert_eq!(failure.message, "saving contact");
        assert!(failure.trace.contains("disk full"));
    }

    #[test]
    fn bail_is_a_failure() {
        let outcome = call(|req: &Request, _: &Context| -> anyhow::Result<Value> {
            bail!("unsupported method {}", req.method())
        });
        let Outcome::Failure(failure) = outcome else {
            panic!("expected a failure");
        };
        assert_eq!(failure.message, "unsupported method POST");
        assert!(failure.trace.starts_with("unsupported method POST"));
    }

    #[test]
    fn panic_is_caught() {
        let outcome = call(|_: &Request, _: &Context| -> anyhow::Result<Value> {
            panic!("index out of range")
        });
        let Outcome::Failure(failure) = outcome else {
            panic!("expected a failure");
        };
        assert_eq!(failure.message, "index out of range");
        assert!(failure.trace.contains("panic in handler"));
    }

    #[test]
    fn uncaught_invoke_resolves_like_invoke() {
        let handler = |_: &Request, _: &Context| -> anyhow::Result<Value> { bail!("nope") };
        let outcome = invoke_uncaught(&handler, &Request::default(), &Context::default());
        assert!(outcome.is_failure());

        let handler = |_: &Request, _: &Context| -> anyhow::Result<Value> { Ok(json!([1])) };
        let outcome = invoke_uncaught(&handler, &Request::default(), &Context::default());
        assert_eq!(outcome, Outcome::Value(json!([1])));
    }

    #[test]
    fn formatted_panic_message_is_kept() {
        let outcome = call(|_: &Request, _: &Context| -> anyhow::Result<Value> {
            let n = 7;
            panic!("bad item {n}")
        });
        let Outcome::Failure(failure) = outcome else {
            panic!("expected a failure");
        };
        assert_eq!(failure.message, "bad item 7");
    }

    #[test]
    fn response_shaped_value_is_read_as_response() {
        let outcome = Outcome::from_reply(Reply::Value(json!({
            "status": 201,
            "headers": {"Location": "/users/7"},
            "body": "created",
        })));
        let Outcome::Response(resp) = outcome else {
            panic!("expected a response");
        };
        assert_eq!(resp.status(), 201);
        assert_eq!(resp.headers().get("location"), Some("/users/7"));
        assert_eq!(resp.body(), "created");
    }

    #[test]
    fn unusable_response_shape_is_a_failure() {
        let outcome = Outcome::from_reply(Reply::Value(json!({"status": 42, "body": "x"})));
        assert!(outcome.is_failure());

        let outcome = Outcome::from_reply(Reply::Value(json!({"status": 1000})));
        assert!(outcome.is_failure());

        let outcome = Outcome::from_reply(Reply::Value(json!({"status": 200, "headers": [1]})));
        assert!(outcome.is_failure());
    }

    #[test]
    fn text_status_is_a_plain_value() {
        for value in [
            json!({"status": "ok"}),
            json!({"status": "shipped", "body": "order 7"}),
            json!({"status": 200.5}),
        ] {
            let outcome = Outcome::from_reply(Reply::Value(value.clone()));
            assert_eq!(outcome, Outcome::Value(value));
        }
    }

    #[test]
    fn object_with_extra_keys_is_a_plain_value() {
        let value = json!({"status": "active", "user": "ada"});
        let outcome = Outcome::from_reply(Reply::Value(value.clone()));
        assert_eq!(outcome, Outcome::Value(value));
    }

    #[test]
    fn object_without_status_is_a_plain_value() {
        let value = json!({"body": "only"});
        let outcome = Outcome::from_reply(Reply::Value(value.clone()));
        assert_eq!(outcome, Outcome::Value(value));
    }

    #[test]
    fn handler_is_called_once() {
        let calls = std::cell::Cell::new(0);
        let outcome = call(|_: &Request, _: &Context| -> anyhow::Result<Value> {
            calls.set(calls.get() + 1);
            Ok(json!(null))
        });
        assert_eq!(calls.get(), 1);
        assert_eq!(outcome, Outcome::Value(Value::Null));
    }
}
