use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Value returned by first-value lookups for a header that is not present.
pub const MISSING_HEADER: &str = "Unknown";

/// A header as a name-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Multi-valued request headers.
///
/// Preserves insertion order and supports repeated names. Lookups are
/// ASCII case-insensitive. The input document may carry each header as a
/// single value or as a sequence; both land here as one entry per value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<Header>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a value. Existing values for the same name are kept.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Header::new(name, value));
    }

    /// All values for `name` in arrival order. Empty when absent.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
            .collect()
    }

    /// The first value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// The first value for `name`, or [`MISSING_HEADER`] when absent.
    pub fn first(&self, name: &str) -> &str {
        self.get(name).unwrap_or(MISSING_HEADER)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build from the loosely-typed `headers` field of an input document.
    ///
    /// Anything other than a mapping yields an empty map. Scalar values
    /// become one value each; sequences contribute their scalar elements
    /// in order. Nulls and nested containers are dropped.
    pub fn from_json(value: &Value) -> Self {
        let mut map = HeaderMap::new();
        let Value::Object(fields) = value else {
            return map;
        };
        for (name, value) in fields {
            match value {
                Value::Array(items) => {
                    for item in items {
                        if let Some(text) = scalar_text(item) {
                            map.append(name.as_str(), text);
                        }
                    }
                }
                other => {
                    if let Some(text) = scalar_text(other) {
                        map.append(name.as_str(), text);
                    }
                }
            }
        }
        map
    }

    /// Distinct names in first-seen order, compared case-insensitively.
    fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for h in &self.entries {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&h.name)) {
                names.push(&h.name);
            }
        }
        names
    }
}

/// Serializes as `{name: [values...]}`, the multi-valued input shape.
impl Serialize for HeaderMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.names();
        let mut map = serializer.serialize_map(Some(names.len()))?;
        for name in names {
            map.serialize_entry(name, &self.get_all(name))?;
        }
        map.end()
    }
}

/// Single-valued response headers.
///
/// Names are unique under ASCII case-insensitive comparison; setting an
/// existing name replaces its value in place, so serialization order is
/// the order in which names were first set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: Vec<Header>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set `name` to `value`, replacing any existing value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let header = Header::new(name, value);
        match self
            .entries
            .iter_mut()
            .find(|h| h.name.eq_ignore_ascii_case(&header.name))
        {
            Some(existing) => *existing = header,
            None => self.entries.push(header),
        }
    }

    /// Set `name` only when it is not already present.
    pub fn insert_if_absent(&mut self, name: &str, value: &str) {
        if !self.contains(name) {
            self.entries.push(Header::new(name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build from a handler-supplied `headers` mapping.
    ///
    /// Sequences are joined with `", "`; other scalars use their text.
    /// Returns `None` when `value` is not a mapping.
    pub fn from_json(value: &Value) -> Option<Self> {
        let Value::Object(fields) = value else {
            return None;
        };
        let mut headers = ResponseHeaders::new();
        for (name, value) in fields {
            if let Some(text) = joined_text(value) {
                headers.insert(name.as_str(), text);
            }
        }
        Some(headers)
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = ResponseHeaders::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl Serialize for ResponseHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for h in &self.entries {
            map.serialize_entry(&h.name, &h.value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ResponseHeaders {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = ResponseHeaders;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of header names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut headers = ResponseHeaders::new();
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    if let Some(text) = joined_text(&value) {
                        headers.insert(name, text);
                    }
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn joined_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        other => scalar_text(other),
    }
}
