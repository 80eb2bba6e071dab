//! Diagnostic channel (channel 2).
//!
//! Diagnostics are `tracing` events rendered by a `tracing-subscriber`
//! fmt layer onto stderr. The writer swallows every I/O error, and
//! installation is a no-op when a subscriber already exists, so nothing
//! here can disturb the request/response contract on channels 0 and 1.

use std::io::{self, Write};

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AdapterConfig, LOG_ENV, LogFormat};

/// Target used for events emitted by user code through [`FunctionLogger`].
pub const FUNCTION_TARGET: &str = "fnshim::function";

/// Wraps a writer and reports success no matter what it does.
#[derive(Debug)]
pub struct BestEffort<W>(pub W);

impl<W: Write> Write for BestEffort<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _ = self.0.write_all(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = self.0.flush();
        Ok(())
    }
}

/// `MakeWriter` for the process diagnostic channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticChannel;

impl<'a> MakeWriter<'a> for DiagnosticChannel {
    type Writer = BestEffort<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        BestEffort(io::stderr())
    }
}

/// Install the diagnostic subscriber on stderr.
///
/// Returns `false` if a global subscriber was already set; that is not an
/// error.
pub fn init(config: &AdapterConfig) -> bool {
    init_with_writer(config, DiagnosticChannel)
}

/// Install the diagnostic subscriber on an arbitrary writer.
pub fn init_with_writer<W>(config: &AdapterConfig, writer: W) -> bool
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    subscriber(config, writer).try_init().is_ok()
}

/// Build the diagnostic subscriber without installing it.
pub fn subscriber<W>(config: &AdapterConfig, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(config))
        .with_writer(writer)
        .with_ansi(false);

    match config.log_format {
        LogFormat::Text => Box::new(builder.finish()),
        LogFormat::Json => Box::new(builder.json().finish()),
    }
}

fn filter(config: &AdapterConfig) -> EnvFilter {
    let env = std::env::var(LOG_ENV).ok();
    EnvFilter::new(filter_directive(env.as_deref(), config))
}

/// `FNSHIM_LOG` if set and valid, else the configured filter if valid,
/// else `info`.
fn filter_directive<'a>(env: Option<&'a str>, config: &'a AdapterConfig) -> &'a str {
    let valid = |directive: &&str| EnvFilter::try_new(directive).is_ok();
    env.filter(valid)
        .or_else(|| Some(config.log_filter.as_str()).filter(valid))
        .unwrap_or("info")
}

/// Logger handed to user code through the invocation context.
#[derive(Debug, Clone)]
pub struct FunctionLogger {
    function: String,
}

impl Default for FunctionLogger {
    fn default() -> Self {
        Self::new("function")
    }
}

impl FunctionLogger {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn info(&self, message: &str) {
        tracing::info!(target: FUNCTION_TARGET, function = %self.function, "{message}");
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(target: FUNCTION_TARGET, function = %self.function, "{message}");
    }

    pub fn error(&self, message: &str) {
        tracing::error!(target: FUNCTION_TARGET, function = %self.function, "{message}");
    }
}
