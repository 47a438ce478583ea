use super::{ConsoleOperation, OperationError};
use crate::model::DatabaseType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionReport {
    pub url: String,
    pub server_banner: String,
    pub latency_ms: u32,
}

/// Pretends to open a connection to an endpoint. Always succeeds.
#[derive(Debug, Clone)]
pub struct ConnectionProbe {
    pub database_type: DatabaseType,
    pub url: String,
}

impl ConsoleOperation for ConnectionProbe {
    type Output = ConnectionReport;

    fn label(&self) -> &'static str {
        "connection-test"
    }

    fn run(self) -> Result<ConnectionReport, OperationError> {
        let latency_ms = 4 + self.url.bytes().map(u32::from).sum::<u32>() % 40;
        Ok(ConnectionReport {
            server_banner: format!("{} server reachable", self.database_type.label()),
            url: self.url,
            latency_ms,
        })
    }
}
