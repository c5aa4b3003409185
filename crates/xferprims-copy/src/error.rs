/// Errors raised while moving payload bytes between endpoints.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// The source ran dry before `expected` bytes were moved.
    #[error("copy truncated ({copied} of {expected} bytes moved)")]
    Truncated { expected: u64, copied: u64 },

    /// Zero-copy was requested but an endpoint exposes no usable descriptor.
    #[error("zero-copy unavailable: {side} descriptor not exposed")]
    DescriptorUnavailable { side: &'static str },

    /// The kernel refused the zero-copy path before any byte was moved.
    #[error("zero-copy rejected by kernel: {0}")]
    ZeroCopyRejected(std::io::Error),

    /// Reading the source or writing the destination failed.
    #[error("copy I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CopyError>;
