use std::io::{ErrorKind, Read, Write};

use tracing::trace;

use crate::error::{CopyError, Result};
use crate::strategy::{CopyStrategy, Sink, Source};

/// Default staging buffer for [`BufferedCopy`].
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Fixed staging buffer for [`ChunkedCopy`].
pub const CHUNKED_BUFFER_SIZE: usize = 1024;

/// Copy exactly `n` bytes from `src` to `dst`, staging through `buf`.
///
/// Bytes already written stay written when the source ends early; the
/// caller gets [`CopyError::Truncated`] with the count that made it. A
/// zero `n` never touches `src`. `dst` is flushed on success.
pub fn copy_buffered<R, W>(dst: &mut W, src: &mut R, n: u64, buf: &mut [u8]) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    assert!(!buf.is_empty(), "staging buffer must not be empty");

    let mut copied = 0u64;
    while copied < n {
        let want = (n - copied).min(buf.len() as u64) as usize;
        let read = match src.read(&mut buf[..want]) {
            Ok(0) => {
                return Err(CopyError::Truncated {
                    expected: n,
                    copied,
                })
            }
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(CopyError::Io(err)),
        };
        dst.write_all(&buf[..read])?;
        copied += read as u64;
    }
    dst.flush()?;

    Ok(copied)
}

/// Staged read/write copy with a moderate buffer. Works for any endpoints.
#[derive(Debug, Clone)]
pub struct BufferedCopy {
    buffer_size: usize,
}

impl BufferedCopy {
    /// Use a custom staging buffer size (clamped to at least one byte).
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

impl Default for BufferedCopy {
    fn default() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }
}

impl CopyStrategy for BufferedCopy {
    fn name(&self) -> &'static str {
        "buffered"
    }

    fn copy_exact(&self, dst: &mut dyn Sink, src: &mut dyn Source, n: u64) -> Result<u64> {
        // Small payloads do not need the full buffer.
        let size = (self.buffer_size as u64).min(n.max(1)) as usize;
        let mut buf = vec![0u8; size];
        trace!(n, buffer = size, "buffered copy");
        copy_buffered(dst, src, n, &mut buf)
    }
}

/// Staged read/write copy through a fixed 1 KiB buffer.
///
/// Trades many more syscalls for a tiny footprint; kept as a reference
/// point against [`BufferedCopy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkedCopy;

impl CopyStrategy for ChunkedCopy {
    fn name(&self) -> &'static str {
        "chunked"
    }

    fn copy_exact(&self, dst: &mut dyn Sink, src: &mut dyn Source, n: u64) -> Result<u64> {
        let mut buf = [0u8; CHUNKED_BUFFER_SIZE];
        trace!(n, buffer = CHUNKED_BUFFER_SIZE, "chunked copy");
        copy_buffered(dst, src, n, &mut buf)
    }
}
