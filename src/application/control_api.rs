// Control API trait for the backend simulation and mitigation endpoints
use crate::domain::scenario::ControlCommand;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("{command} failed: {source}")]
    Transport {
        command: ControlCommand,
        #[source]
        source: reqwest::Error,
    },
    #[error("{command} rejected with status {status}")]
    Rejected {
        command: ControlCommand,
        status: u16,
    },
}

#[async_trait]
pub trait ControlApi: Send + Sync {
    /// Fire a control command. Success means the backend accepted the request;
    /// nothing is returned beyond that.
    async fn trigger(&self, command: ControlCommand) -> Result<(), TriggerError>;
}
