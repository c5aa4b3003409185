//! Tokio versions of [`send`](crate::send) and [`receive`](crate::receive).
//!
//! Same wire format and error taxonomy; deadlines are left to the caller
//! (`tokio::time::timeout` around either future).

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::FramedRead;
use tracing::debug;
use xferprims_frame::{write_header_async, FrameHeader, TransferCodec, TransferPart};

use crate::error::{Result, TransferError};

/// Send `source`, from its current position to the end, as one transfer.
pub async fn send_async<W>(source: &mut File, conn: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let len = source
        .metadata()
        .await
        .map_err(TransferError::SourceMetadata)?
        .len();
    let position = source
        .stream_position()
        .await
        .map_err(TransferError::SourceMetadata)?;
    let size = len.saturating_sub(position);

    write_header_async(conn, &FrameHeader::new(size)).await?;
    debug!(size, "transfer header sent");

    let mut payload = (&mut *source).take(size);
    let moved = tokio::io::copy(&mut payload, conn).await?;
    if moved < size {
        return Err(TransferError::PayloadTruncated {
            expected: size,
            received: moved,
        });
    }
    conn.flush().await?;

    debug!(bytes = moved, "transfer payload sent");
    Ok(moved)
}

/// Receive one transfer from `conn` into `sink`.
pub async fn receive_async<R, W>(conn: R, sink: &mut W) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut parts = FramedRead::new(conn, TransferCodec::new());
    let mut expected = None;
    let mut received = 0u64;

    while let Some(part) = parts.next().await {
        match part? {
            TransferPart::Header(header) => {
                debug!(size = header.length, "transfer header received");
                expected = Some(header.length);
            }
            TransferPart::Chunk(chunk) => {
                sink.write_all(&chunk).await?;
                received += chunk.len() as u64;
            }
        }
        if parts.decoder().is_done() {
            break;
        }
    }

    if expected.is_none() {
        return Err(TransferError::HeaderTruncated { received: 0 });
    }
    sink.flush().await?;

    debug!(bytes = received, "transfer payload received");
    Ok(received)
}
