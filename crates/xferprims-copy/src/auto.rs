use tracing::debug;
use xferprims_transport::{Descriptor, Endpoint};

use crate::buffered::BufferedCopy;
use crate::error::{CopyError, Result};
use crate::strategy::{CopyOutcome, CopyStrategy, Sink, Source, StrategyKind};
use crate::zerocopy::{zero_copy_supported, ZeroCopy};

/// Picks the cheapest copy path per call from the endpoints' capability tags.
///
/// File-backed source plus socket-backed destination on a supporting
/// platform goes through [`ZeroCopy`]; everything else, including a kernel
/// refusal before the first byte, goes through [`BufferedCopy`].
#[derive(Debug, Clone, Default)]
pub struct AutoCopy {
    buffered: BufferedCopy,
}

impl AutoCopy {
    /// Use a custom buffer size for the staged fallback.
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffered: BufferedCopy::with_buffer_size(buffer_size),
        }
    }

    /// The path a copy between these endpoints would take.
    pub fn plan(source: Descriptor, destination: Descriptor) -> StrategyKind {
        if zero_copy_supported() && source.is_file_backed() && destination.is_socket_backed() {
            StrategyKind::ZeroCopy
        } else {
            StrategyKind::Buffered
        }
    }
}

impl CopyStrategy for AutoCopy {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn copy_exact(&self, dst: &mut dyn Sink, src: &mut dyn Source, n: u64) -> Result<u64> {
        self.copy_with_path(dst, src, n).map(|outcome| outcome.bytes)
    }

    fn copy_with_path(
        &self,
        dst: &mut dyn Sink,
        src: &mut dyn Source,
        n: u64,
    ) -> Result<CopyOutcome> {
        let source = src.descriptor();
        let destination = dst.descriptor();

        match Self::plan(source, destination) {
            StrategyKind::ZeroCopy => match ZeroCopy.copy_with_path(dst, src, n) {
                // Both variants guarantee nothing has been sent yet.
                Err(CopyError::ZeroCopyRejected(err)) => {
                    debug!(error = %err, "kernel rejected zero-copy; using buffered copy");
                }
                Err(CopyError::DescriptorUnavailable { side }) => {
                    debug!(side, "descriptor unavailable; using buffered copy");
                }
                other => return other,
            },
            _ => {
                debug!(
                    source = source.kind(),
                    destination = destination.kind(),
                    "zero-copy not possible for endpoint pair; using buffered copy"
                );
            }
        }

        self.buffered.copy_with_path(dst, src, n)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn in_memory_pair_plans_buffered() {
        let src = Cursor::new(b"abc".to_vec());
        let dst = Vec::<u8>::new();

        assert_eq!(
            AutoCopy::plan(src.descriptor(), dst.descriptor()),
            StrategyKind::Buffered
        );
    }

    #[test]
    fn in_memory_copy_falls_back() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 7) as u8).collect();
        let mut src = Cursor::new(data.clone());
        let mut dst = Vec::new();

        let moved = AutoCopy::default()
            .copy_exact(&mut dst, &mut src, data.len() as u64)
            .unwrap();

        assert_eq!(moved, data.len() as u64);
        assert_eq!(dst, data);
    }

    #[test]
    fn in_memory_copy_reports_buffered_path() {
        let mut src = Cursor::new(b"staged".to_vec());
        let mut dst = Vec::new();

        let outcome = AutoCopy::default()
            .copy_with_path(&mut dst, &mut src, 6)
            .unwrap();
        assert_eq!(outcome.bytes, 6);
        assert_eq!(outcome.path, "buffered");
    }

    #[test]
    fn fallback_reports_truncation() {
        let mut src = Cursor::new(vec![1u8; 10]);
        let mut dst = Vec::new();

        let err = AutoCopy::with_buffer_size(4)
            .copy_exact(&mut dst, &mut src, 11)
            .unwrap_err();
        assert!(matches!(err, CopyError::Truncated { copied: 10, .. }));
    }

    #[test]
    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn file_to_socket_plans_zero_copy() {
        use std::io::{Read, Seek, SeekFrom, Write};

        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"zero-copy payload").unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        let (mut left, mut right) = std::os::unix::net::UnixStream::pair().unwrap();

        assert_eq!(
            AutoCopy::plan(file.descriptor(), left.descriptor()),
            StrategyKind::ZeroCopy
        );

        let outcome = AutoCopy::default()
            .copy_with_path(&mut left, &mut file, 17)
            .unwrap();
        drop(left);
        assert_eq!(outcome.path, "zero-copy");

        let mut out = Vec::new();
        right.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"zero-copy payload");
    }

    #[test]
    #[cfg(unix)]
    fn file_to_memory_plans_buffered() {
        let file = tempfile::tempfile().unwrap();
        assert_eq!(
            AutoCopy::plan(file.descriptor(), Vec::<u8>::new().descriptor()),
            StrategyKind::Buffered
        );
    }
}
