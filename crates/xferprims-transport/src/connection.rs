use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use crate::descriptor::{Descriptor, Endpoint};
use crate::error::Result;

/// A connected transfer stream — implements Read + Write.
///
/// One connection carries exactly one transfer. Dropping it closes the
/// underlying socket.
pub struct Connection {
    inner: ConnectionInner,
}

enum ConnectionInner {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            ConnectionInner::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            ConnectionInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            ConnectionInner::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            ConnectionInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            ConnectionInner::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            ConnectionInner::Unix(stream) => stream.flush(),
        }
    }
}

impl Endpoint for Connection {
    fn descriptor(&self) -> Descriptor {
        match &self.inner {
            ConnectionInner::Tcp(stream) => stream.descriptor(),
            #[cfg(unix)]
            ConnectionInner::Unix(stream) => stream.descriptor(),
        }
    }
}

impl Connection {
    /// Wrap an established TCP stream.
    pub fn from_tcp(stream: TcpStream) -> Self {
        Self {
            inner: ConnectionInner::Tcp(stream),
        }
    }

    /// Wrap an established Unix stream (socket pairs, local testing).
    #[cfg(unix)]
    pub fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: ConnectionInner::Unix(stream),
        }
    }

    /// A connected pair of in-process connections.
    #[cfg(unix)]
    pub fn pair() -> Result<(Self, Self)> {
        let (left, right) = std::os::unix::net::UnixStream::pair()?;
        Ok((Self::from_unix(left), Self::from_unix(right)))
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            ConnectionInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            ConnectionInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            ConnectionInner::Tcp(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            ConnectionInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Shut down the write half, signalling end of stream to the peer.
    pub fn shutdown_write(&self) -> Result<()> {
        match &self.inner {
            ConnectionInner::Tcp(stream) => stream.shutdown(Shutdown::Write).map_err(Into::into),
            #[cfg(unix)]
            ConnectionInner::Unix(stream) => stream.shutdown(Shutdown::Write).map_err(Into::into),
        }
    }

    /// Human-readable remote address for logs and reports.
    pub fn peer_label(&self) -> String {
        match &self.inner {
            ConnectionInner::Tcp(stream) => stream
                .peer_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|_| "tcp:unknown".to_string()),
            #[cfg(unix)]
            ConnectionInner::Unix(_) => "unix".to_string(),
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            ConnectionInner::Tcp(_) => "tcp",
            #[cfg(unix)]
            ConnectionInner::Unix(_) => "unix-stream",
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("type", &self.transport_name())
            .field("peer", &self.peer_label())
            .finish()
    }
}
