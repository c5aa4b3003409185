//! Interchangeable strategies for moving a transfer payload.
//!
//! Every strategy implements [`CopyStrategy::copy_exact`]: move exactly `n`
//! bytes from a [`Source`] to a [`Sink`] or fail. Four are provided:
//!
//! - [`BufferedCopy`]: 64 KiB staged read/write, works for any endpoints
//! - [`ChunkedCopy`]: the same loop through a 1 KiB buffer
//! - [`ZeroCopy`]: `sendfile(2)` from a file descriptor into a socket
//! - [`AutoCopy`]: zero-copy when the endpoints' [`Descriptor`] tags allow
//!   it, buffered otherwise (the default)
//!
//! [`Descriptor`]: xferprims_transport::Descriptor

pub mod auto;
pub mod buffered;
pub mod error;
pub mod strategy;
pub mod zerocopy;

pub use auto::AutoCopy;
pub use buffered::{
    copy_buffered, BufferedCopy, ChunkedCopy, CHUNKED_BUFFER_SIZE, DEFAULT_BUFFER_SIZE,
};
pub use error::{CopyError, Result};
pub use strategy::{
    select_strategy, CopyOutcome, CopyStrategy, ParseStrategyError, Sink, Source, StrategyKind,
};
pub use zerocopy::{verify_zero_copy, zero_copy_supported, ZeroCopy};
