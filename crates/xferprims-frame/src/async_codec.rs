//! Async framing over tokio streams.
//!
//! [`TransferCodec`] turns a byte stream into a header item followed by
//! payload chunks, stopping once the declared length has been yielded.
//! Bytes after the payload are never decoded.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Decoder;

use crate::codec::{FrameHeader, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// Largest payload chunk yielded by the decoder by default.
pub const DEFAULT_MAX_CHUNK: usize = 64 * 1024;

/// One decoded piece of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferPart {
    Header(FrameHeader),
    Chunk(Bytes),
}

#[derive(Debug, Clone, Copy)]
enum DecodeState {
    Header,
    Payload { expected: u64, remaining: u64 },
    Done,
}

/// Decoder for a single length-prefixed transfer.
#[derive(Debug)]
pub struct TransferCodec {
    state: DecodeState,
    max_chunk: usize,
}

impl TransferCodec {
    pub fn new() -> Self {
        Self::with_max_chunk(DEFAULT_MAX_CHUNK)
    }

    /// Cap the size of each yielded payload chunk.
    pub fn with_max_chunk(max_chunk: usize) -> Self {
        Self {
            state: DecodeState::Header,
            max_chunk: max_chunk.max(1),
        }
    }

    /// True once the header and the full payload have been yielded.
    pub fn is_done(&self) -> bool {
        matches!(self.state, DecodeState::Done)
    }
}

impl Default for TransferCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for TransferCodec {
    type Item = TransferPart;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<TransferPart>> {
        match self.state {
            DecodeState::Header => {
                let Some(header) = FrameHeader::decode_from(src) else {
                    src.reserve(HEADER_SIZE - src.len());
                    return Ok(None);
                };
                self.state = if header.length == 0 {
                    DecodeState::Done
                } else {
                    DecodeState::Payload {
                        expected: header.length,
                        remaining: header.length,
                    }
                };
                Ok(Some(TransferPart::Header(header)))
            }
            DecodeState::Payload {
                expected,
                remaining,
            } => {
                if src.is_empty() {
                    return Ok(None);
                }
                let take = (src.len() as u64).min(remaining).min(self.max_chunk as u64) as usize;
                let chunk = src.split_to(take).freeze();
                let remaining = remaining - take as u64;
                self.state = if remaining == 0 {
                    DecodeState::Done
                } else {
                    DecodeState::Payload {
                        expected,
                        remaining,
                    }
                };
                Ok(Some(TransferPart::Chunk(chunk)))
            }
            DecodeState::Done => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<TransferPart>> {
        if let Some(part) = self.decode(src)? {
            return Ok(Some(part));
        }
        match self.state {
            DecodeState::Header => Err(FrameError::HeaderTruncated {
                received: src.len(),
            }),
            DecodeState::Payload {
                expected,
                remaining,
            } => Err(FrameError::PayloadTruncated {
                expected,
                received: expected - remaining,
            }),
            DecodeState::Done => Ok(None),
        }
    }
}

/// Write one frame header to an async stream and flush it.
pub async fn write_header_async<W: AsyncWrite + Unpin + ?Sized>(
    writer: &mut W,
    header: &FrameHeader,
) -> Result<()> {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE);
    header.encode_into(&mut buf);
    writer
        .write_all(&buf)
        .await
        .map_err(FrameError::HeaderWrite)?;
    writer.flush().await.map_err(FrameError::HeaderWrite)?;
    Ok(())
}
