//! Adapter configuration.
//!
//! Every field has a default, so an empty TOML document (or no file at
//! all) yields a working adapter.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::channel::DEFAULT_CHUNK_SIZE;
use crate::error::{ShimError, ShimResult};

/// Environment variable that overrides `log_filter` when the runtime
/// exposes environment variables.
pub const LOG_ENV: &str = "FNSHIM_LOG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Name attached to diagnostics emitted by user code.
    pub function_name: String,
    /// Read buffer size for draining the input channel.
    pub chunk_size: usize,
    pub default_method: String,
    pub default_uri: String,
    /// Content-Type injected when a response carries none.
    pub default_content_type: String,
    /// Catch handler panics at the invoker. When off, a panic goes
    /// straight to the process panic hook, which still writes the failure
    /// response if a `PanicGuard` is installed.
    pub catch_panics: bool,
    /// When set, responses without `X-Runtime` get this value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_header: Option<String>,
    /// `EnvFilter` directive for the diagnostic channel.
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            function_name: "function".to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            default_method: "POST".to_string(),
            default_uri: "/".to_string(),
            default_content_type: "application/json".to_string(),
            catch_panics: true,
            runtime_header: None,
            log_filter: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl AdapterConfig {
    pub fn from_file(path: &Path) -> ShimResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ShimError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ShimResult<Self> {
        toml::from_str(content).map_err(|e| ShimError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> ShimResult<String> {
        toml::to_string_pretty(self).map_err(|e| ShimError::Config(e.to_string()))
    }

    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = name.into();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_default_method(mut self, method: impl Into<String>) -> Self {
        self.default_method = method.into();
        self
    }

    pub fn with_default_uri(mut self, uri: impl Into<String>) -> Self {
        self.default_uri = uri.into();
        self
    }

    pub fn with_catch_panics(mut self, catch: bool) -> Self {
        self.catch_panics = catch;
        self
    }

    pub fn with_runtime_header(mut self, runtime: impl Into<String>) -> Self {
        self.runtime_header = Some(runtime.into());
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }
}
