//! TCP connection layer for single-file transfers.
//!
//! Provides the collaborators the transfer core consumes:
//! - [`Connection`], an owned duplex byte stream (TCP, or a Unix stream pair)
//! - [`TcpTransport`], the blocking listener/dialer
//! - [`Descriptor`] / [`Endpoint`], capability tags used to pick a copy path
//!
//! This is the lowest layer of xferprims. Everything else builds on top of
//! the [`Connection`] type provided here.

pub mod connection;
pub mod descriptor;
pub mod error;
pub mod tcp;

pub use connection::Connection;
pub use descriptor::{Descriptor, Endpoint};
pub use error::{Result, TransportError};
pub use tcp::TcpTransport;
