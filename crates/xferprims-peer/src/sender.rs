use tracing::debug;
use xferprims_copy::{CopyOutcome, CopyStrategy, Sink};
use xferprims_frame::{write_header, FrameHeader};

use crate::error::{Result, TransferError};
use crate::source::FileSource;

/// Send one transfer: the 8-byte length header, then exactly that many
/// payload bytes moved by `strategy`.
///
/// The size is taken once, before anything is written, from the source's
/// current position to its end. Returns the payload byte count; on `Ok`
/// exactly `8 + size` bytes went to `conn`.
pub fn send<S, C>(source: &mut S, conn: &mut C, strategy: &dyn CopyStrategy) -> Result<u64>
where
    S: FileSource,
    C: Sink,
{
    send_outcome(source, conn, strategy).map(|outcome| outcome.bytes)
}

/// [`send`], also reporting the copy path the payload actually took.
pub fn send_outcome<S, C>(
    source: &mut S,
    conn: &mut C,
    strategy: &dyn CopyStrategy,
) -> Result<CopyOutcome>
where
    S: FileSource,
    C: Sink,
{
    let size = source.size().map_err(TransferError::SourceMetadata)?;
    write_header(conn, &FrameHeader::new(size))?;
    debug!(size, strategy = strategy.name(), "transfer header sent");

    let outcome = strategy.copy_with_path(conn, source, size)?;
    debug!(bytes = outcome.bytes, path = outcome.path, "transfer payload sent");
    Ok(outcome)
}
