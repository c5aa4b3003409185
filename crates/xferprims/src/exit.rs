use std::fmt;
use std::io;

use xferprims_peer::TransferError;
use xferprims_transport::TransportError;

// Exit code constants aligned with rsfulmen/DDR-0002 semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match err.io_error().kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transfer_error(context: &str, err: TransferError) -> CliError {
    match err {
        TransferError::Transport(err) => transport_error(context, err),
        TransferError::SourceMetadata(source)
        | TransferError::HeaderWrite(source)
        | TransferError::Io(source) => io_error(context, source),
        TransferError::HeaderTruncated { .. } | TransferError::PayloadTruncated { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        TransferError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        TransferError::DescriptorUnavailable { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_is_data_invalid() {
        let err = transfer_error(
            "fetch failed",
            TransferError::PayloadTruncated {
                expected: 10,
                received: 9,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("fetch failed: "));
    }

    #[test]
    fn refused_connect_is_transport_error() {
        let err = transfer_error(
            "fetch failed",
            TransferError::Transport(TransportError::Connect {
                addr: "127.0.0.1:1".to_string(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            }),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn denied_bind_is_permission_denied() {
        let err = transport_error(
            "bind failed",
            TransportError::Bind {
                addr: "0.0.0.0:80".to_string(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
        );
        assert_eq!(err.code, PERMISSION_DENIED);
    }

    #[test]
    fn deadline_is_timeout() {
        let err = transfer_error(
            "fetch failed",
            TransferError::Timeout(io::Error::from(io::ErrorKind::WouldBlock)),
        );
        assert_eq!(err.code, TIMEOUT);
    }
}
