use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::{ApiError, ServerApi, ServerUpdate};
use crate::app::AppMessage;
use crate::commands::Command;

/// Patch a server and report back with the submission ticket.
///
/// Bounded by `timeout`. If `cancel` fires first nothing is reported.
pub struct UpdateServerCmd {
    api: Arc<dyn ServerApi>,
    server_id: String,
    update: ServerUpdate,
    ticket: u64,
    cancel: CancellationToken,
    timeout: Duration,
}

impl UpdateServerCmd {
    pub fn new(
        api: Arc<dyn ServerApi>,
        server_id: String,
        update: ServerUpdate,
        ticket: u64,
        cancel: CancellationToken,
        timeout: Duration,
    ) -> Self {
        Self {
            api,
            server_id,
            update,
            ticket,
            cancel,
            timeout,
        }
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    pub const fn ticket(&self) -> u64 {
        self.ticket
    }
}

#[async_trait]
impl Command for UpdateServerCmd {
    fn name(&self) -> String {
        format!("Updating server {}", self.server_id)
    }

    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let request = self.api.update_server(&self.server_id, &self.update);
        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                debug!(ticket = self.ticket, "Server update cancelled");
                return Ok(());
            }
            result = tokio::time::timeout(self.timeout, request) => match result {
                Ok(result) => result,
                Err(_) => Err(ApiError::Timeout(self.timeout.as_secs())),
            },
        };

        action_tx.send(AppMessage::ServerUpdated {
            ticket: self.ticket,
            result,
        })?;
        Ok(())
    }
}
