// HTTP implementation of the control API
use crate::application::control_api::{ControlApi, TriggerError};
use crate::domain::scenario::ControlCommand;
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpControlApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpControlApi {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build control API client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, command: ControlCommand) -> String {
        format!("{}{}", self.base_url, command.path())
    }
}

#[async_trait]
impl ControlApi for HttpControlApi {
    async fn trigger(&self, command: ControlCommand) -> Result<(), TriggerError> {
        let url = self.url_for(command);
        tracing::debug!("Triggering {}", url);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|source| TriggerError::Transport { command, source })?;

        if !response.status().is_success() {
            return Err(TriggerError::Rejected {
                command,
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}
