//! Async commands pattern for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! Views and modals return commands, and the App spawns them. Results flow
//! back to the App as [`AppMessage`]s.

mod fetch_servers;
mod update_server;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::AppMessage;

pub use fetch_servers::FetchServersCmd;
pub use update_server::UpdateServerCmd;

/// Async commands that perform side effects.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name used in logs.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>, action_tx: UnboundedSender<AppMessage>) -> Result<()>;
}
