use std::io::ErrorKind;

use xferprims_copy::CopyError;
use xferprims_frame::FrameError;
use xferprims_transport::TransportError;

/// Errors that end a single transfer.
///
/// Lower layers convert into this through `From`, so `?` works across
/// the frame, copy and transport crates.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The source's size could not be determined, so no honest header exists.
    #[error("cannot determine source size: {0}")]
    SourceMetadata(std::io::Error),

    /// The 8-byte header could not be written in full.
    #[error("failed to write transfer header: {0}")]
    HeaderWrite(std::io::Error),

    /// The peer closed before all 8 header bytes arrived.
    #[error("header truncated ({received} of 8 bytes received)")]
    HeaderTruncated { received: usize },

    /// The peer closed before the declared payload length was reached.
    #[error("payload truncated ({received} of {expected} bytes received)")]
    PayloadTruncated { expected: u64, received: u64 },

    /// Zero-copy was forced but an endpoint exposes no usable descriptor.
    #[error("zero-copy unavailable: {side} descriptor not exposed")]
    DescriptorUnavailable { side: &'static str },

    /// A configured read or write deadline expired.
    #[error("transfer timed out: {0}")]
    Timeout(std::io::Error),

    /// Listener or dialer failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Any other I/O failure on the source, sink or connection.
    #[error("transfer I/O error: {0}")]
    Io(std::io::Error),
}

impl TransferError {
    /// True for failures caused by the peer closing early.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            TransferError::HeaderTruncated { .. } | TransferError::PayloadTruncated { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransferError::Timeout(_))
    }
}

/// Blocking sockets with `SO_RCVTIMEO`/`SO_SNDTIMEO` report an expired
/// deadline as `WouldBlock` on Unix and `TimedOut` on Windows.
pub(crate) fn is_deadline(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

impl From<std::io::Error> for TransferError {
    fn from(err: std::io::Error) -> Self {
        if is_deadline(&err) {
            TransferError::Timeout(err)
        } else {
            TransferError::Io(err)
        }
    }
}

impl From<FrameError> for TransferError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::HeaderTruncated { received } => TransferError::HeaderTruncated { received },
            FrameError::HeaderWrite(err) if is_deadline(&err) => TransferError::Timeout(err),
            FrameError::HeaderWrite(err) => TransferError::HeaderWrite(err),
            FrameError::PayloadTruncated { expected, received } => {
                TransferError::PayloadTruncated { expected, received }
            }
            FrameError::Io(err) => err.into(),
        }
    }
}

impl From<CopyError> for TransferError {
    fn from(err: CopyError) -> Self {
        match err {
            CopyError::Truncated { expected, copied } => TransferError::PayloadTruncated {
                expected,
                received: copied,
            },
            CopyError::DescriptorUnavailable { side } => {
                TransferError::DescriptorUnavailable { side }
            }
            CopyError::ZeroCopyRejected(err) => TransferError::Io(err),
            CopyError::Io(err) => err.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;
