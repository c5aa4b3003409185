//! Single-file transfers over TCP with interchangeable payload strategies.
//!
//! A sender frames one file as an 8-byte little-endian length followed by
//! its bytes; a receiver reads exactly that many bytes back out. How the
//! sender moves the payload (staged buffers or kernel `sendfile`) is a
//! runtime choice.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP listener/dialer, connections and descriptor tags
//! - [`frame`]: the 8-byte length header (plus an async codec behind `async`)
//! - [`copy`]: payload copy strategies (buffered, chunked, zero-copy, auto)
//! - [`peer`]: send/receive, the per-connection server and the fetch client

/// Re-export transport types.
pub mod transport {
    pub use xferprims_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use xferprims_frame::*;
}

/// Re-export copy strategy types.
pub mod copy {
    pub use xferprims_copy::*;
}

/// Re-export transfer orchestration types.
pub mod peer {
    pub use xferprims_peer::*;
}
