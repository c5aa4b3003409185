use std::io::{ErrorKind, Read};

use tracing::trace;

use crate::codec::{FrameHeader, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// Read exactly one frame header from `reader` (blocking).
///
/// Handles partial reads internally. Reaching EOF before all
/// [`HEADER_SIZE`] bytes arrive is [`FrameError::HeaderTruncated`]; the
/// length is only decoded once the full header is buffered.
pub fn read_header<R: Read + ?Sized>(reader: &mut R) -> Result<FrameHeader> {
    let mut buf = [0u8; HEADER_SIZE];
    let mut filled = 0usize;

    while filled < HEADER_SIZE {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Err(FrameError::HeaderTruncated { received: filled }),
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }

    let header = FrameHeader::decode(buf);
    trace!(length = header.length, "read frame header");
    Ok(header)
}
