//! Byte channels and the input drainer.
//!
//! The host exposes three numbered channels to the guest:
//!
//! ```text
//! 0  input        read until end-of-stream
//! 1  output       exactly one response document
//! 2  diagnostics  line-oriented, best effort
//! ```
//!
//! No framing exists beyond end-of-stream, so the drainer keeps reading
//! fixed-size chunks until a zero-byte read. Read faults are not retried:
//! they end the stream with whatever was collected so far.

use std::fmt;
use std::io::Read;

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use crate::error::ShimError;

/// Default read buffer size for draining the input channel (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Largest read buffer the drainer will allocate (16 MiB).
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// One of the numbered byte channels exposed by the sandbox host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    Input,
    Output,
    Diagnostics,
}

impl ChannelId {
    /// The small integer identifier the host uses for this channel.
    pub fn number(self) -> u32 {
        match self {
            ChannelId::Input => 0,
            ChannelId::Output => 1,
            ChannelId::Diagnostics => 2,
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelId::Input => "input",
            ChannelId::Output => "output",
            ChannelId::Diagnostics => "diagnostics",
        };
        write!(f, "{name}({})", self.number())
    }
}

/// Drain `reader` until end-of-stream and return the bytes in order.
///
/// A zero-byte read ends the stream. Any read error also ends it; the
/// bytes collected before the error are returned and a warning goes to
/// the diagnostic channel. `chunk_size` is clamped to
/// `1..=MAX_CHUNK_SIZE`.
pub fn drain<R: Read + ?Sized>(reader: &mut R, chunk_size: usize) -> Bytes {
    let mut chunk = vec![0u8; chunk_size.clamp(1, MAX_CHUNK_SIZE)];
    let mut raw = BytesMut::new();

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => raw.extend_from_slice(&chunk[..n]),
            Err(e) => {
                let err = ShimError::InputRead(e);
                warn!(
                    channel = %ChannelId::Input,
                    bytes = raw.len(),
                    error = %err,
                    "treating input fault as end of stream"
                );
                break;
            }
        }
    }

    debug!(channel = %ChannelId::Input, bytes = raw.len(), "input drained");
    raw.freeze()
}
