/// Errors that can occur while writing or reading a transfer frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The stream ended before all 8 header bytes arrived.
    #[error("header truncated ({received} of 8 bytes received)")]
    HeaderTruncated { received: usize },

    /// The header could not be written in full.
    #[error("failed to write frame header: {0}")]
    HeaderWrite(std::io::Error),

    /// The stream ended before the declared payload length was reached.
    #[error("payload truncated ({received} of {expected} bytes received)")]
    PayloadTruncated { expected: u64, received: u64 },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
