use std::time::Duration;

use serde::{Serialize, Serializer};

/// Which side of the transfer produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

/// Summary of one finished transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
    pub direction: Direction,
    /// Remote address of the connection.
    pub peer: String,
    /// Payload bytes moved, excluding the 8-byte header.
    pub bytes: u64,
    pub strategy: &'static str,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl TransferReport {
    /// Payload throughput in bytes per second; zero for instant transfers.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / secs
        } else {
            0.0
        }
    }
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}
