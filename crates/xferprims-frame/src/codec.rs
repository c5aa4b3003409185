use bytes::{Buf, BufMut, BytesMut};

/// Frame header: a single little-endian u64 payload length.
pub const HEADER_SIZE: usize = 8;

/// Encode a payload length into its wire form.
pub fn encode_length(n: u64) -> [u8; HEADER_SIZE] {
    n.to_le_bytes()
}

/// Decode a payload length from its wire form.
pub fn decode_length(buf: [u8; HEADER_SIZE]) -> u64 {
    u64::from_le_bytes(buf)
}

/// The fixed-width header that precedes every transfer payload.
///
/// Wire format:
/// ```text
/// ┌──────────────────────┬──────────────────────┐
/// │ Length (8B LE u64)   │ Payload              │
/// │                      │ (Length bytes)       │
/// └──────────────────────┴──────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Exact number of payload bytes that follow the header.
    pub length: u64,
}

impl FrameHeader {
    pub fn new(length: u64) -> Self {
        Self { length }
    }

    /// The header's wire bytes.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        encode_length(self.length)
    }

    /// Parse a header from exactly [`HEADER_SIZE`] bytes.
    pub fn decode(buf: [u8; HEADER_SIZE]) -> Self {
        Self {
            length: decode_length(buf),
        }
    }

    /// Append the header to a buffer.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        dst.reserve(HEADER_SIZE);
        dst.put_u64_le(self.length);
    }

    /// Consume a header from the front of `src`.
    ///
    /// Returns `None` (leaving `src` untouched) until a full header is buffered.
    pub fn decode_from(src: &mut BytesMut) -> Option<Self> {
        if src.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            length: src.get_u64_le(),
        })
    }
}
