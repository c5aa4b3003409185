//! Length-prefixed framing for single-file transfers.
//!
//! Every transfer is framed with one 8-byte little-endian payload length,
//! followed by exactly that many payload bytes. One frame per connection;
//! no magic, checksum or trailer.
//!
//! The blocking helpers here only deal with the header. Moving the payload
//! is the job of a copy strategy (`xferprims-copy`). With the `async`
//! feature, [`TransferCodec`] decodes a whole transfer from a tokio stream.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

pub use codec::{decode_length, encode_length, FrameHeader, HEADER_SIZE};
pub use error::{FrameError, Result};
pub use reader::read_header;
pub use writer::write_header;

#[cfg(feature = "async")]
pub use async_codec::{write_header_async, TransferCodec, TransferPart, DEFAULT_MAX_CHUNK};
