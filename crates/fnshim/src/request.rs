use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::AdapterConfig;
use crate::error::{ShimError, ShimResult};
use crate::header::HeaderMap;

/// Result of attempting to read the decoded input as a JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedInput {
    Document(Value),
    /// The text was empty or not valid JSON.
    Unparsed(String),
}

impl ParsedInput {
    pub fn parse(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => ParsedInput::Document(value),
            Err(_) => ParsedInput::Unparsed(text),
        }
    }
}

/// The canonical request handed to user code.
///
/// Built once per invocation from the drained input channel and never
/// mutated afterwards. `headers` is always present, possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    body: Value,
    headers: HeaderMap,
    method: String,
    uri: String,
}

impl Default for Request {
    /// The all-defaults request: empty text body, no headers, `POST /`.
    fn default() -> Self {
        let config = AdapterConfig::default();
        Self {
            body: Value::String(String::new()),
            headers: HeaderMap::new(),
            method: config.default_method,
            uri: config.default_uri,
        }
    }
}

impl Request {
    pub fn new(
        method: impl Into<String>,
        uri: impl Into<String>,
        headers: HeaderMap,
        body: impl Into<Value>,
    ) -> Self {
        Self {
            body: body.into(),
            headers,
            method: method.into(),
            uri: uri.into(),
        }
    }

    /// Normalize drained input bytes into a request.
    ///
    /// Invalid UTF-8 is replaced, never rejected. A JSON object with a
    /// `body` key supplies body, headers, method and uri; any other JSON
    /// value becomes the body as a whole; anything unparseable (including
    /// empty input) becomes a text body verbatim.
    pub fn normalize(raw: &[u8], config: &AdapterConfig) -> Self {
        let text = String::from_utf8_lossy(raw).into_owned();
        Self::from_parsed(ParsedInput::parse(text), config)
    }

    pub fn from_parsed(parsed: ParsedInput, config: &AdapterConfig) -> Self {
        let defaults = |body: Value| Self {
            body,
            headers: HeaderMap::new(),
            method: config.default_method.clone(),
            uri: config.default_uri.clone(),
        };

        match parsed {
            ParsedInput::Document(Value::Object(mut fields)) if fields.contains_key("body") => {
                let body = fields.remove("body").unwrap_or(Value::Null);
                let headers = fields
                    .get("headers")
                    .map(HeaderMap::from_json)
                    .unwrap_or_default();
                let method = non_empty_str(fields.get("method"))
                    .unwrap_or(config.default_method.as_str())
                    .to_string();
                let uri = non_empty_str(fields.get("uri"))
                    .unwrap_or(config.default_uri.as_str())
                    .to_string();
                debug!(%method, %uri, headers = headers.len(), "request envelope parsed");
                Self {
                    body,
                    headers,
                    method,
                    uri,
                }
            }
            ParsedInput::Document(value) => {
                debug!("input document has no body field, using it whole");
                defaults(value)
            }
            ParsedInput::Unparsed(text) => {
                debug!(bytes = text.len(), "input is not a JSON document, using raw text");
                defaults(Value::String(text))
            }
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, or [`MISSING_HEADER`](crate::MISSING_HEADER).
    pub fn header(&self, name: &str) -> &str {
        self.headers.first(name)
    }

    /// Every value of a header, in arrival order.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers.get_all(name)
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// The body as text: strings verbatim, anything else as JSON.
    pub fn body_text(&self) -> Cow<'_, str> {
        match &self.body {
            Value::String(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// Decode the body into `T`.
    ///
    /// A text body is parsed as JSON first; a structured body is
    /// converted directly.
    pub fn json<T: DeserializeOwned>(&self) -> ShimResult<T> {
        match &self.body {
            Value::String(s) => {
                serde_json::from_str(s).map_err(|e| ShimError::Body(e.to_string()))
            }
            other => T::deserialize(other).map_err(|e| ShimError::Body(e.to_string())),
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
