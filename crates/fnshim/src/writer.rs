use std::io::Write;

use crate::error::{ShimError, ShimResult};
use crate::response::Response;

/// Serialize `response` and write it to the output channel once.
///
/// The message is fully serialized before the first byte is written, so
/// a serialization fault never leaves a partial document behind. Write
/// faults are returned, not retried. Returns the number of bytes written.
pub fn write_response<W: Write + ?Sized>(output: &mut W, response: &Response) -> ShimResult<usize> {
    let message = serde_json::to_vec(response).map_err(ShimError::Serialize)?;
    output.write_all(&message).map_err(ShimError::OutputWrite)?;
    output.flush().map_err(ShimError::OutputWrite)?;
    Ok(message.len())
}
