//! Kernel-mediated file-to-socket copy via `sendfile(2)`.
//!
//! Linux and Android only. Elsewhere [`ZeroCopy`] always reports
//! [`CopyError::DescriptorUnavailable`] and [`zero_copy_supported`] is
//! false, so selection falls back to a staged copy. [`verify_zero_copy`]
//! checks at runtime that the compiled-in path actually works.

#[cfg(any(target_os = "linux", target_os = "android"))]
use std::io::Write;

#[cfg(any(target_os = "linux", target_os = "android"))]
use tracing::trace;
#[cfg(any(target_os = "linux", target_os = "android"))]
use xferprims_transport::{Descriptor, Endpoint};

use crate::error::{CopyError, Result};
use crate::strategy::{CopyStrategy, Sink, Source};

/// Largest count passed to a single `sendfile` call.
///
/// Matches the kernel's own per-call cap (`MAX_RW_COUNT`).
#[cfg(any(target_os = "linux", target_os = "android"))]
const SENDFILE_CHUNK_SIZE: usize = 0x7fff_f000;

/// Whether this build can use the zero-copy path at all.
pub fn zero_copy_supported() -> bool {
    cfg!(any(target_os = "linux", target_os = "android"))
}

/// Bytes pushed through the kernel path by [`verify_zero_copy`].
#[cfg(any(target_os = "linux", target_os = "android"))]
const SELF_TEST_PAYLOAD: &[u8] = b"xferprims zero-copy self-test";

/// Run one real `sendfile` from a scratch file into a socket pair.
///
/// [`zero_copy_supported`] only says the path was compiled in; this says
/// the running kernel and temp filesystem accept it. The scratch file is
/// created in the system temp directory and unlinked as soon as it is open.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn verify_zero_copy() -> Result<()> {
    use std::fs::OpenOptions;
    use std::io::{ErrorKind, Read, Seek, SeekFrom};
    use std::os::unix::net::UnixStream;
    use std::sync::atomic::{AtomicU64, Ordering};

    static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

    let path = std::env::temp_dir().join(format!(
        ".xferprims-zero-copy-{}-{}",
        std::process::id(),
        SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    let mut file = OpenOptions::new()
        .create_new(true)
        .read(true)
        .write(true)
        .open(&path)?;
    let _ = std::fs::remove_file(&path);
    file.write_all(SELF_TEST_PAYLOAD)?;
    file.seek(SeekFrom::Start(0))?;

    let (mut left, mut right) = UnixStream::pair()?;
    ZeroCopy.copy_exact(&mut left, &mut file, SELF_TEST_PAYLOAD.len() as u64)?;
    drop(left);

    let mut echoed = Vec::with_capacity(SELF_TEST_PAYLOAD.len());
    right.read_to_end(&mut echoed)?;
    if echoed != SELF_TEST_PAYLOAD {
        return Err(CopyError::Io(std::io::Error::new(
            ErrorKind::InvalidData,
            "zero-copy self-test delivered different bytes",
        )));
    }

    trace!("zero-copy self-test passed");
    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn verify_zero_copy() -> Result<()> {
    Err(CopyError::DescriptorUnavailable { side: "platform" })
}

/// Moves file bytes straight into a socket without staging them in
/// process memory.
///
/// Requires a file-backed source and a socket-backed destination. Reads
/// from, and advances, the source's current file position.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroCopy;

impl CopyStrategy for ZeroCopy {
    fn name(&self) -> &'static str {
        "zero-copy"
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn copy_exact(&self, dst: &mut dyn Sink, src: &mut dyn Source, n: u64) -> Result<u64> {
        let src_fd = match src.descriptor() {
            Descriptor::File(fd) => fd,
            _ => return Err(CopyError::DescriptorUnavailable { side: "source" }),
        };
        let dst_fd = match dst.descriptor() {
            Descriptor::Socket(fd) => fd,
            _ => return Err(CopyError::DescriptorUnavailable { side: "destination" }),
        };

        // Anything the sink still buffers must reach the socket before the payload.
        dst.flush()?;
        trace!(n, src_fd, dst_fd, "sendfile copy");
        sendfile_exact(dst_fd, src_fd, n)
    }

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    fn copy_exact(&self, _dst: &mut dyn Sink, _src: &mut dyn Source, _n: u64) -> Result<u64> {
        Err(CopyError::DescriptorUnavailable { side: "platform" })
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn sendfile_exact(dst_fd: std::os::fd::RawFd, src_fd: std::os::fd::RawFd, n: u64) -> Result<u64> {
    let mut sent = 0u64;

    while sent < n {
        let chunk = (n - sent).min(SENDFILE_CHUNK_SIZE as u64) as usize;
        // SAFETY: both descriptors come from endpoints the caller holds mutable
        // borrows of, so they stay open for the duration of the call. A null
        // offset pointer makes the kernel use and advance the file position.
        let rc = unsafe { libc::sendfile(dst_fd, src_fd, std::ptr::null_mut(), chunk) };

        if rc < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            if sent == 0 && is_rejection(&err) {
                return Err(CopyError::ZeroCopyRejected(err));
            }
            return Err(CopyError::Io(err));
        }
        if rc == 0 {
            return Err(CopyError::Truncated {
                expected: n,
                copied: sent,
            });
        }

        sent += rc as u64;
    }

    Ok(sent)
}

/// Errors meaning "this pair of descriptors cannot use sendfile", as opposed
/// to a failure of the transfer itself.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn is_rejection(err: &std::io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc::EINVAL) | Some(libc::ENOSYS) | Some(libc::EOPNOTSUPP)
    )
}

#[cfg(all(test, any(target_os = "linux", target_os = "android")))]
mod tests {
    use std::io::{Read, Seek, SeekFrom};
    use std::os::unix::net::UnixStream;

    use super::*;

    fn temp_file_with(content: &[u8]) -> std::fs::File {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(content).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        file
    }

    fn drain(mut stream: UnixStream) -> std::thread::JoinHandle<Vec<u8>> {
        std::thread::spawn(move || {
            let mut out = Vec::new();
            stream.read_to_end(&mut out).unwrap();
            out
        })
    }

    #[test]
    fn sends_file_into_socket() {
        let content: Vec<u8> = (0..512 * 1024).map(|i| (i % 253) as u8).collect();
        let mut file = temp_file_with(&content);
        let (mut left, right) = UnixStream::pair().unwrap();
        let reader = drain(right);

        let sent = ZeroCopy
            .copy_exact(&mut left, &mut file, content.len() as u64)
            .unwrap();
        drop(left);

        assert_eq!(sent, content.len() as u64);
        assert_eq!(reader.join().unwrap(), content);
    }

    #[test]
    fn advances_file_position() {
        let mut file = temp_file_with(b"headtail");
        let (mut left, right) = UnixStream::pair().unwrap();
        let reader = drain(right);

        ZeroCopy.copy_exact(&mut left, &mut file, 4).unwrap();
        drop(left);

        assert_eq!(file.stream_position().unwrap(), 4);
        assert_eq!(reader.join().unwrap(), b"head");
    }

    #[test]
    fn short_file_is_truncated() {
        let mut file = temp_file_with(b"tiny");
        let (mut left, _right) = UnixStream::pair().unwrap();

        let err = ZeroCopy.copy_exact(&mut left, &mut file, 10).unwrap_err();
        assert!(matches!(
            err,
            CopyError::Truncated {
                expected: 10,
                copied: 4
            }
        ));
    }

    #[test]
    fn in_memory_destination_is_unavailable() {
        let mut file = temp_file_with(b"data");
        let mut dst = Vec::new();

        let err = ZeroCopy.copy_exact(&mut dst, &mut file, 4).unwrap_err();
        assert!(matches!(
            err,
            CopyError::DescriptorUnavailable {
                side: "destination"
            }
        ));
    }

    #[test]
    fn in_memory_source_is_unavailable() {
        let mut src = std::io::Cursor::new(b"data".to_vec());
        let (mut left, _right) = UnixStream::pair().unwrap();

        let err = ZeroCopy.copy_exact(&mut left, &mut src, 4).unwrap_err();
        assert!(matches!(
            err,
            CopyError::DescriptorUnavailable { side: "source" }
        ));
    }

    #[test]
    fn self_test_passes_on_supported_kernel() {
        verify_zero_copy().unwrap();
    }

    #[test]
    fn zero_length_is_noop() {
        let mut file = temp_file_with(b"");
        let (mut left, _right) = UnixStream::pair().unwrap();
        assert_eq!(ZeroCopy.copy_exact(&mut left, &mut file, 0).unwrap(), 0);
    }
}
