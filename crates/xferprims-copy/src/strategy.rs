use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use xferprims_transport::Endpoint;

use crate::auto::AutoCopy;
use crate::buffered::{BufferedCopy, ChunkedCopy};
use crate::error::Result;
use crate::zerocopy::{verify_zero_copy, zero_copy_supported, ZeroCopy};

/// Readable side of a copy: any `Read` that can report its descriptor.
pub trait Source: Read + Endpoint {}

impl<T: Read + Endpoint + ?Sized> Source for T {}

/// Writable side of a copy: any `Write` that can report its descriptor.
pub trait Sink: Write + Endpoint {}

impl<T: Write + Endpoint + ?Sized> Sink for T {}

/// A policy for moving exactly `n` bytes from a source to a sink.
///
/// Implementations are stateless and shared across concurrent transfers.
pub trait CopyStrategy: Send + Sync + fmt::Debug {
    /// Stable name for logs and reports.
    fn name(&self) -> &'static str;

    /// Move exactly `n` bytes from `src` to `dst`.
    ///
    /// Returns the number of bytes moved, which is always `n` on success.
    /// Running out of source data first is
    /// [`CopyError::Truncated`](crate::CopyError::Truncated).
    fn copy_exact(&self, dst: &mut dyn Sink, src: &mut dyn Source, n: u64) -> Result<u64>;

    /// Like [`copy_exact`](Self::copy_exact), but also reports which path
    /// the bytes took.
    ///
    /// Fixed strategies report their own name. Strategies that decide per
    /// call, like [`AutoCopy`], report the path they resolved to.
    fn copy_with_path(
        &self,
        dst: &mut dyn Sink,
        src: &mut dyn Source,
        n: u64,
    ) -> Result<CopyOutcome> {
        let bytes = self.copy_exact(dst, src, n)?;
        Ok(CopyOutcome {
            bytes,
            path: self.name(),
        })
    }
}

/// Result of a completed copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOutcome {
    /// Bytes moved.
    pub bytes: u64,
    /// Name of the strategy that actually moved them.
    pub path: &'static str,
}

/// Configurable selection of a [`CopyStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Zero-copy when both endpoints allow it, buffered otherwise.
    #[default]
    Auto,
    /// 64 KiB staged read/write loop.
    Buffered,
    /// 1 KiB staged read/write loop.
    Chunked,
    /// Kernel `sendfile`, failing if the endpoints cannot support it.
    ZeroCopy,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Auto,
        StrategyKind::Buffered,
        StrategyKind::Chunked,
        StrategyKind::ZeroCopy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Auto => "auto",
            StrategyKind::Buffered => "buffered",
            StrategyKind::Chunked => "chunked",
            StrategyKind::ZeroCopy => "zero-copy",
        }
    }

    /// Construct the strategy exactly as named, without capability checks.
    pub fn build(self) -> Arc<dyn CopyStrategy> {
        match self {
            StrategyKind::Auto => Arc::new(AutoCopy::default()),
            StrategyKind::Buffered => Arc::new(BufferedCopy::default()),
            StrategyKind::Chunked => Arc::new(ChunkedCopy),
            StrategyKind::ZeroCopy => Arc::new(ZeroCopy),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a strategy name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown copy strategy '{0}' (expected auto, buffered, chunked or zero-copy)")]
pub struct ParseStrategyError(String);

impl FromStr for StrategyKind {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(StrategyKind::Auto),
            "buffered" => Ok(StrategyKind::Buffered),
            "chunked" => Ok(StrategyKind::Chunked),
            "zero-copy" | "zerocopy" | "sendfile" => Ok(StrategyKind::ZeroCopy),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}

/// Resolve a configured strategy against what this host can do.
///
/// An explicit zero-copy request is checked with [`verify_zero_copy`]. If
/// the kernel path does not work here, it is downgraded to
/// [`StrategyKind::Auto`] instead of failing every transfer.
pub fn select_strategy(kind: StrategyKind) -> Arc<dyn CopyStrategy> {
    let resolved = match kind {
        StrategyKind::ZeroCopy => match verify_zero_copy() {
            Ok(()) => kind,
            Err(err) => {
                warn!(
                    requested = %kind,
                    os = std::env::consts::OS,
                    error = %err,
                    "zero-copy unusable on this host; falling back to auto"
                );
                StrategyKind::Auto
            }
        },
        other => other,
    };

    let strategy = resolved.build();
    info!(
        strategy = strategy.name(),
        zero_copy = zero_copy_supported(),
        "copy strategy selected"
    );
    strategy
}
