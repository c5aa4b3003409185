/// Errors raised while setting up or driving a transfer connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind the listening socket.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// Failed to dial the remote address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// An I/O error occurred on an established connection.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// The underlying I/O error, whatever stage it came from.
    pub fn io_error(&self) -> &std::io::Error {
        match self {
            TransportError::Bind { source, .. } | TransportError::Connect { source, .. } => source,
            TransportError::Accept(err) | TransportError::Io(err) => err,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
