use std::fs::File;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use xferprims_copy::{select_strategy, CopyStrategy};
use xferprims_transport::{Connection, TcpTransport, TransportError};

use crate::config::TransferConfig;
use crate::error::{Result, TransferError};
use crate::report::{Direction, TransferReport};
use crate::sender::send_outcome;

/// Serves one file to every client that connects, one thread per
/// connection.
///
/// The file is opened per connection, so each transfer reads it from the
/// start and a missing file fails only the transfers that hit it.
pub struct TransferServer {
    transport: TcpTransport,
    source_path: PathBuf,
    config: TransferConfig,
    strategy: Arc<dyn CopyStrategy>,
    next_transfer_id: AtomicU64,
}

impl TransferServer {
    /// Bind a listener on `addr` that will serve `source_path`.
    pub fn bind(
        addr: &str,
        source_path: impl Into<PathBuf>,
        config: TransferConfig,
    ) -> Result<Self> {
        let transport = TcpTransport::bind(addr)?;
        let strategy = select_strategy(config.strategy);
        Ok(Self {
            transport,
            source_path: source_path.into(),
            config,
            strategy,
            next_transfer_id: AtomicU64::new(1),
        })
    }

    /// Replace the resolved copy strategy, e.g. with a custom implementation.
    pub fn with_strategy(mut self, strategy: Arc<dyn CopyStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    /// Loopback form of the bound address, reachable even when bound to a
    /// wildcard address. Dialing it unblocks a pending [`run`](Self::run).
    pub fn wake_addr(&self) -> SocketAddr {
        let mut addr = self.local_addr();
        if addr.ip().is_unspecified() {
            let loopback = match addr.ip() {
                IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            };
            addr.set_ip(loopback);
        }
        addr
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Accept the next connection and start its transfer on a new thread.
    pub fn accept_one(&self) -> Result<JoinHandle<Result<TransferReport>>> {
        let conn = self.transport.accept()?;
        self.spawn_transfer(conn)
    }

    /// Accept and serve connections until `running` clears.
    ///
    /// With `max_transfers`, stops accepting after that many connections.
    /// A failed transfer is logged and never stops the loop. Running out of
    /// descriptors or memory while accepting pauses briefly and retries. Any
    /// other accept failure stops the loop and is returned. Either way,
    /// every transfer thread has finished before this returns. On success
    /// returns the number of connections accepted.
    pub fn run(&self, running: &AtomicBool, max_transfers: Option<u64>) -> Result<u64> {
        self.serve_with(running, max_transfers, || self.transport.accept())
    }

    fn serve_with<A>(
        &self,
        running: &AtomicBool,
        max_transfers: Option<u64>,
        mut accept: A,
    ) -> Result<u64>
    where
        A: FnMut() -> std::result::Result<Connection, TransportError>,
    {
        let mut accepted = 0u64;
        let mut in_flight: Vec<JoinHandle<Result<TransferReport>>> = Vec::new();
        let mut failure: Option<TransferError> = None;

        while running.load(Ordering::SeqCst) {
            if max_transfers.is_some_and(|max| accepted >= max) {
                break;
            }

            let conn = match accept() {
                Ok(conn) => conn,
                Err(TransportError::Accept(err)) => match classify_accept(&err) {
                    AcceptFailure::Transient => {
                        debug!(error = %err, "transient accept failure");
                        continue;
                    }
                    AcceptFailure::Exhausted => {
                        in_flight.retain(|handle| !handle.is_finished());
                        warn!(
                            error = %err,
                            in_flight = in_flight.len(),
                            backoff_ms = ACCEPT_BACKOFF.as_millis() as u64,
                            "accept out of resources; backing off"
                        );
                        thread::sleep(ACCEPT_BACKOFF);
                        continue;
                    }
                    AcceptFailure::Fatal => {
                        failure = Some(TransportError::Accept(err).into());
                        break;
                    }
                },
                Err(err) => {
                    failure = Some(err.into());
                    break;
                }
            };
            if !running.load(Ordering::SeqCst) {
                debug!(peer = %conn.peer_label(), "shutdown requested; dropping connection");
                break;
            }

            accepted += 1;
            match self.spawn_transfer(conn) {
                Ok(handle) => in_flight.push(handle),
                Err(err) => warn!(error = %err, "failed to start transfer"),
            }
            in_flight.retain(|handle| !handle.is_finished());
        }

        let draining = in_flight.len();
        for handle in in_flight {
            if handle.join().is_err() {
                warn!("transfer thread panicked");
            }
        }

        if let Some(err) = failure {
            warn!(error = %err, accepted, draining, "transfer server stopped on accept failure");
            return Err(err);
        }
        info!(accepted, "transfer server stopped");
        Ok(accepted)
    }

    fn spawn_transfer(&self, conn: Connection) -> Result<JoinHandle<Result<TransferReport>>> {
        let id = self.next_transfer_id.fetch_add(1, Ordering::Relaxed);
        let path = self.source_path.clone();
        let config = self.config.clone();
        let strategy = Arc::clone(&self.strategy);

        thread::Builder::new()
            .name(format!("xfer-{id}"))
            .spawn(move || serve_connection(id, conn, &path, &config, strategy.as_ref()))
            .map_err(TransferError::Io)
    }
}

fn serve_connection(
    id: u64,
    mut conn: Connection,
    path: &Path,
    config: &TransferConfig,
    strategy: &dyn CopyStrategy,
) -> Result<TransferReport> {
    let peer = conn.peer_label();
    let started = Instant::now();

    let outcome = config.apply(&conn).and_then(|()| {
        let mut file = File::open(path).map_err(TransferError::Io)?;
        send_outcome(&mut file, &mut conn, strategy)
    });

    match outcome {
        Ok(copied) => {
            let report = TransferReport {
                direction: Direction::Sent,
                peer,
                bytes: copied.bytes,
                strategy: copied.path,
                elapsed: started.elapsed(),
            };
            info!(
                transfer = id,
                peer = %report.peer,
                bytes = report.bytes,
                configured = strategy.name(),
                strategy = report.strategy,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "transfer complete"
            );
            Ok(report)
        }
        Err(err) => {
            warn!(transfer = id, %peer, error = %err, "transfer failed");
            Err(err)
        }
    }
}

/// Pause after an accept fails for lack of descriptors or memory.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcceptFailure {
    /// The peer went away or the call was interrupted; retry at once.
    Transient,
    /// The process or system is out of descriptors or buffers; retry after
    /// [`ACCEPT_BACKOFF`].
    Exhausted,
    /// The listener itself is broken.
    Fatal,
}

fn classify_accept(err: &std::io::Error) -> AcceptFailure {
    match err.kind() {
        ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset | ErrorKind::Interrupted => {
            AcceptFailure::Transient
        }
        ErrorKind::OutOfMemory => AcceptFailure::Exhausted,
        _ if is_resource_exhaustion(err) => AcceptFailure::Exhausted,
        _ => AcceptFailure::Fatal,
    }
}

#[cfg(unix)]
fn is_resource_exhaustion(err: &std::io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc::EMFILE) | Some(libc::ENFILE) | Some(libc::ENOBUFS) | Some(libc::ENOMEM)
    )
}

#[cfg(not(unix))]
fn is_resource_exhaustion(_err: &std::io::Error) -> bool {
    false
}
