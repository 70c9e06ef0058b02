use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::ServerApi;
use crate::app::AppMessage;
use crate::commands::Command;

/// Load the server list.
pub struct FetchServersCmd {
    api: Arc<dyn ServerApi>,
}

impl FetchServersCmd {
    pub fn new(api: Arc<dyn ServerApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Command for FetchServersCmd {
    fn name(&self) -> String {
        "Loading servers".to_string()
    }

    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let message = match self.api.list_servers().await {
            Ok(servers) => AppMessage::ServersLoaded(servers),
            Err(e) => AppMessage::ServersFailed(e.to_string()),
        };
        action_tx.send(message)?;
        Ok(())
    }
}
