use std::io::{Read, Write};

use tracing::debug;
use xferprims_copy::{copy_buffered, DEFAULT_BUFFER_SIZE};
use xferprims_frame::read_header;

use crate::error::Result;

/// Receive one transfer from `conn` into `sink`.
///
/// Reads the 8-byte header, then copies exactly the declared number of
/// bytes. Anything the peer sends after that is left unread. On failure
/// the sink keeps whatever was already written.
pub fn receive<R, W>(conn: &mut R, sink: &mut W) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let header = read_header(conn)?;
    debug!(size = header.length, "transfer header received");

    let mut buf = vec![0u8; header.length.clamp(1, DEFAULT_BUFFER_SIZE as u64) as usize];
    let received = copy_buffered(sink, conn, header.length, &mut buf)?;
    debug!(bytes = received, "transfer payload received");
    Ok(received)
}
