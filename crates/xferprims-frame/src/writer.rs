use std::io::{ErrorKind, Write};

use tracing::trace;

use crate::codec::FrameHeader;
use crate::error::{FrameError, Result};

/// Write one frame header to `writer` and flush it (blocking).
///
/// All [`HEADER_SIZE`](crate::HEADER_SIZE) bytes are written before this
/// returns. A zero-length write or any I/O failure is
/// [`FrameError::HeaderWrite`]; a peer that saw part of a header cannot
/// recover framing, so nothing is retried except `Interrupted`.
pub fn write_header<W: Write + ?Sized>(writer: &mut W, header: &FrameHeader) -> Result<()> {
    let bytes = header.encode();

    let mut offset = 0usize;
    while offset < bytes.len() {
        match writer.write(&bytes[offset..]) {
            Ok(0) => {
                return Err(FrameError::HeaderWrite(std::io::Error::new(
                    ErrorKind::WriteZero,
                    format!("connection accepted {offset} of {} header bytes", bytes.len()),
                )))
            }
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::HeaderWrite(err)),
        }
    }

    loop {
        match writer.flush() {
            Ok(()) => break,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::HeaderWrite(err)),
        }
    }

    trace!(length = header.length, "wrote frame header");
    Ok(())
}
