use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::connection::Connection;
use crate::error::{Result, TransportError};

/// TCP listener/dialer for transfer connections.
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on `addr` (`host:port`; port 0 picks an ephemeral port).
    pub fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
        let local_addr = listener.local_addr().map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;

        info!(%local_addr, "listening for transfer connections");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<Connection> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted connection");
        Ok(Connection::from_tcp(stream))
    }

    /// Dial a listening transfer server (blocking).
    pub fn connect(addr: &str) -> Result<Connection> {
        let stream = TcpStream::connect(addr).map_err(|e| TransportError::Connect {
            addr: addr.to_string(),
            source: e,
        })?;
        debug!(addr, "connected to transfer server");
        Ok(Connection::from_tcp(stream))
    }

    /// Dial with a bound on connection establishment.
    ///
    /// Every resolved address is tried in order; the last error is returned.
    pub fn connect_timeout(addr: &str, timeout: Duration) -> Result<Connection> {
        let connect_err = |source| TransportError::Connect {
            addr: addr.to_string(),
            source,
        };

        let mut last_err = None;
        for candidate in addr.to_socket_addrs().map_err(connect_err)? {
            match TcpStream::connect_timeout(&candidate, timeout) {
                Ok(stream) => {
                    debug!(addr, %candidate, "connected to transfer server");
                    return Ok(Connection::from_tcp(stream));
                }
                Err(err) => last_err = Some(err),
            }
        }

        Err(connect_err(last_err.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "address resolved to no candidates",
            )
        })))
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "tcp"
    }
}
