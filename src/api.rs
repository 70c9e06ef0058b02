//! Remote server API.
//!
//! The rest of the application talks to the backend through the
//! [`ServerApi`] trait so the edit dialog can be exercised without a network.

mod client;
mod error;
mod model;

use async_trait::async_trait;

pub use client::HttpServerClient;
pub use error::{ApiError, Result};
pub use model::{Server, ServerUpdate};

/// Operations the application needs from the server backend.
#[async_trait]
pub trait ServerApi: Send + Sync {
    /// Fetch every server visible to the current user.
    async fn list_servers(&self) -> Result<Vec<Server>>;

    /// Patch a server's name and image, returning the updated server.
    async fn update_server(&self, id: &str, update: &ServerUpdate) -> Result<Server>;
}
