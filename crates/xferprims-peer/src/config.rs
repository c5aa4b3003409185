use std::time::Duration;

use xferprims_copy::StrategyKind;
use xferprims_transport::Connection;

use crate::error::Result;

/// Per-transfer behavior shared by the server and the fetch client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferConfig {
    /// Payload copy strategy. Only the sending side uses it.
    pub strategy: StrategyKind,
    /// Deadline for each blocking read on the connection.
    pub read_timeout: Option<Duration>,
    /// Deadline for each blocking write on the connection.
    pub write_timeout: Option<Duration>,
}

impl TransferConfig {
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Install the configured deadlines on a connection.
    pub fn apply(&self, conn: &Connection) -> Result<()> {
        conn.set_read_timeout(self.read_timeout)?;
        conn.set_write_timeout(self.write_timeout)?;
        Ok(())
    }
}

/// Options for [`fetch`](crate::fetch).
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub config: TransferConfig,
    /// Bound on establishing the connection. `None` uses the OS default.
    pub connect_timeout: Option<Duration>,
    /// Receive into `<dest>.part` and rename over `dest` only on success.
    pub atomic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_deadlines() {
        let config = TransferConfig::default();
        assert_eq!(config.strategy, StrategyKind::Auto);
        assert!(config.read_timeout.is_none());
        assert!(config.write_timeout.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn apply_sets_socket_deadlines() {
        let (left, _right) = Connection::pair().expect("pair should be creatable");
        let config = TransferConfig::default()
            .with_read_timeout(Duration::from_millis(250))
            .with_write_timeout(Duration::from_secs(2));

        config.apply(&left).expect("apply should succeed");
    }

    #[test]
    #[cfg(unix)]
    fn zero_timeout_is_rejected() {
        let (left, _right) = Connection::pair().expect("pair should be creatable");
        let config = TransferConfig::default().with_read_timeout(Duration::ZERO);

        assert!(config.apply(&left).is_err());
    }
}
