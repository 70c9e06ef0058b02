//! Application modals and the store that decides which one is visible.

mod edit_server;
mod server_details;
mod store;

use crate::commands::Command;

pub use edit_server::{EditServerModal, UpdateOutcome};
pub use server_details::ServerDetailsModal;
pub use store::{ModalKind, ModalPayload, ModalState, ModalStore};

/// Message a modal hands back to the App after handling input.
pub enum ModalMsg {
    /// Spawn the given command.
    Run(Box<dyn Command>),
}
