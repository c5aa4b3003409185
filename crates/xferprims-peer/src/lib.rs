//! Single-file transfers over TCP.
//!
//! A sender writes an 8-byte little-endian length and then the file's
//! bytes; a receiver reads the length and copies exactly that many bytes
//! into a sink. [`TransferServer`] serves one file to every client on its
//! own thread and [`fetch`] receives one file into a path.
//!
//! How the sender moves payload bytes is a [`CopyStrategy`] picked through
//! [`TransferConfig::strategy`].
//!
//! [`CopyStrategy`]: xferprims_copy::CopyStrategy

pub mod client;
pub mod config;
pub mod error;
pub mod receiver;
pub mod report;
pub mod sender;
pub mod server;
pub mod source;

#[cfg(feature = "async")]
pub mod asynchronous;

pub use client::fetch;
pub use config::{FetchOptions, TransferConfig};
pub use error::{Result, TransferError};
pub use receiver::receive;
pub use report::{Direction, TransferReport};
pub use sender::{send, send_outcome};
pub use server::TransferServer;
pub use source::FileSource;

#[cfg(feature = "async")]
pub use asynchronous::{receive_async, send_async};
