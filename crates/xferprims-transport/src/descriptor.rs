//! Capability tags describing what an I/O endpoint is backed by.
//!
//! Copy strategies inspect these tags to decide whether a kernel fast path
//! (file descriptor to socket descriptor) is possible for a given pair of
//! endpoints. Anything that cannot expose a raw descriptor (in-memory
//! buffers, TLS wrappers, test doubles) reports [`Descriptor::Unavailable`].

#[cfg(unix)]
use std::os::fd::{AsRawFd, RawFd};

/// What an endpoint is backed by, as far as the kernel is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    /// A regular file descriptor.
    #[cfg(unix)]
    File(RawFd),
    /// A stream socket descriptor (TCP or Unix).
    #[cfg(unix)]
    Socket(RawFd),
    /// No raw descriptor can be exposed.
    Unavailable,
}

impl Descriptor {
    /// True when the endpoint is a regular file with an exposed descriptor.
    pub fn is_file_backed(&self) -> bool {
        match self {
            #[cfg(unix)]
            Descriptor::File(_) => true,
            _ => false,
        }
    }

    /// True when the endpoint is a socket with an exposed descriptor.
    pub fn is_socket_backed(&self) -> bool {
        match self {
            #[cfg(unix)]
            Descriptor::Socket(_) => true,
            _ => false,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            #[cfg(unix)]
            Descriptor::File(_) => "file",
            #[cfg(unix)]
            Descriptor::Socket(_) => "socket",
            Descriptor::Unavailable => "unavailable",
        }
    }
}

/// An I/O endpoint that can report its [`Descriptor`].
///
/// The default implementation reports [`Descriptor::Unavailable`], so
/// in-memory types opt in with an empty `impl`.
pub trait Endpoint {
    fn descriptor(&self) -> Descriptor {
        Descriptor::Unavailable
    }
}

impl Endpoint for std::fs::File {
    fn descriptor(&self) -> Descriptor {
        #[cfg(unix)]
        {
            // Only regular files qualify; a File may also wrap a pipe or device.
            match self.metadata() {
                Ok(meta) if meta.is_file() => Descriptor::File(self.as_raw_fd()),
                _ => Descriptor::Unavailable,
            }
        }

        #[cfg(not(unix))]
        {
            Descriptor::Unavailable
        }
    }
}

impl Endpoint for std::net::TcpStream {
    fn descriptor(&self) -> Descriptor {
        #[cfg(unix)]
        {
            Descriptor::Socket(self.as_raw_fd())
        }

        #[cfg(not(unix))]
        {
            Descriptor::Unavailable
        }
    }
}

#[cfg(unix)]
impl Endpoint for std::os::unix::net::UnixStream {
    fn descriptor(&self) -> Descriptor {
        Descriptor::Socket(self.as_raw_fd())
    }
}

impl Endpoint for Vec<u8> {}
impl Endpoint for &[u8] {}
impl Endpoint for std::io::Sink {}
impl Endpoint for std::io::Empty {}
impl<T> Endpoint for std::io::Cursor<T> {}

impl<T: Endpoint + ?Sized> Endpoint for &mut T {
    fn descriptor(&self) -> Descriptor {
        (**self).descriptor()
    }
}

impl<T: Endpoint + ?Sized> Endpoint for Box<T> {
    fn descriptor(&self) -> Descriptor {
        (**self).descriptor()
    }
}
