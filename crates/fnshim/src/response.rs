use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::AdapterConfig;
use crate::error::{ShimError, ShimResult};
use crate::handler::{Failure, Outcome};
use crate::header::ResponseHeaders;

/// Header name the response normalizer guarantees on every response.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Header name stamped when a runtime tag is configured.
pub const RUNTIME_HEADER: &str = "X-Runtime";

/// The canonical response written to the output channel.
///
/// `body` is always text on the wire, even when it carries JSON; hosts
/// that expect structured data parse it a second time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default = "default_status")]
    status: u16,
    #[serde(default)]
    headers: ResponseHeaders,
    #[serde(default)]
    body: String,
}

fn default_status() -> u16 {
    200
}

impl Default for Response {
    fn default() -> Self {
        Self::new(default_status(), ResponseHeaders::new(), "")
    }
}

impl Response {
    pub fn new(status: u16, headers: ResponseHeaders, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// A 200 response with the given body and no headers.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, ResponseHeaders::new(), body)
    }

    /// A `text/plain` response.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, ResponseHeaders::new(), body)
            .with_header(CONTENT_TYPE, "text/plain; charset=utf-8")
    }

    /// An `application/json` response with `value` serialized as the body.
    pub fn json<T: Serialize + ?Sized>(status: u16, value: &T) -> ShimResult<Self> {
        let body = serde_json::to_string(value).map_err(ShimError::Serialize)?;
        Ok(Self::new(status, ResponseHeaders::new(), body)
            .with_header(CONTENT_TYPE, "application/json"))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Coerce a handler outcome into the canonical response.
    ///
    /// The result always carries a status, a `Content-Type` header and a
    /// text body.
    pub fn from_outcome(outcome: Outcome, config: &AdapterConfig) -> Self {
        let mut response = match outcome {
            Outcome::Response(response) => response,
            Outcome::Value(Value::String(text)) => Self::ok(text),
            Outcome::Value(value) => Self::ok(value.to_string()),
            Outcome::Failure(failure) => Self::failure(&failure),
        };

        response
            .headers
            .insert_if_absent(CONTENT_TYPE, &config.default_content_type);
        if let Some(runtime) = &config.runtime_header {
            response.headers.insert_if_absent(RUNTIME_HEADER, runtime);
        }
        response
    }

    fn failure(failure: &Failure) -> Self {
        let message = if failure.message.is_empty() {
            "handler failed"
        } else {
            failure.message.as_str()
        };
        let body = json!({
            "error": message,
            "stack": failure.trace,
        });
        Self::new(500, ResponseHeaders::new(), body.to_string())
    }

    /// Build from the fields of a response-shaped JSON object.
    ///
    /// Returns `None` when `status` is not an integer in `100..=999` or
    /// `headers` is present but not a mapping.
    pub(crate) fn from_fields(fields: &serde_json::Map<String, Value>) -> Option<Self> {
        let status = fields
            .get("status")
            .and_then(Value::as_u64)
            .filter(|s| (100..=999).contains(s))
            .and_then(|s| u16::try_from(s).ok())?;
        let headers = match fields.get("headers") {
            None | Some(Value::Null) => ResponseHeaders::new(),
            Some(value) => ResponseHeaders::from_json(value)?,
        };
        let body = match fields.get("body") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        };
        Some(Self::new(status, headers, body))
    }
}
