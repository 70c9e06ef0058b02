//! Shared modal visibility state.
//!
//! One [`ModalStore`] is created by the App and cloned into every modal.
//! Modals read a snapshot or subscribe to changes and decide for themselves
//! whether they are visible: `is_open && kind == my_kind`.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::api::Server;

/// Every dialog the store can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    EditServer,
    ServerDetails,
}

/// Data handed to a modal when it is opened.
#[derive(Debug, Clone, Default)]
pub struct ModalPayload {
    pub server: Option<Arc<Server>>,
}

impl ModalPayload {
    pub const fn server(server: Arc<Server>) -> Self {
        Self {
            server: Some(server),
        }
    }
}

/// Snapshot of the store.
///
/// `kind` and `payload` survive `close()`; only `is_open` is cleared.
#[derive(Debug, Clone, Default)]
pub struct ModalState {
    pub is_open: bool,
    pub kind: Option<ModalKind>,
    pub payload: ModalPayload,
    /// Incremented on every `open`, identifies one opening.
    pub revision: u64,
}

impl ModalState {
    /// Whether the modal of `kind` should be on screen.
    pub fn is_showing(&self, kind: ModalKind) -> bool {
        self.is_open && self.kind == Some(kind)
    }
}

/// Handle to the application's modal state.
#[derive(Clone, Debug)]
pub struct ModalStore {
    state: Arc<watch::Sender<ModalState>>,
}

impl Default for ModalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ModalState::default());
        Self {
            state: Arc::new(state),
        }
    }

    pub fn open(&self, kind: ModalKind, payload: ModalPayload) {
        debug!(?kind, "Opening modal");
        self.state.send_modify(|state| {
            state.is_open = true;
            state.kind = Some(kind);
            state.payload = payload;
            state.revision += 1;
        });
    }

    pub fn close(&self) {
        debug!("Closing modal");
        self.state.send_modify(|state| state.is_open = false);
    }

    pub fn read(&self) -> ModalState {
        self.state.borrow().clone()
    }

    /// Receiver that is marked changed on every `open`/`close`.
    pub fn subscribe(&self) -> watch::Receiver<ModalState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> Arc<Server> {
        Arc::new(Server::new("s1", "Old", "http://img/old.png"))
    }

    #[test]
    fn test_starts_closed() {
        let store = ModalStore::new();
        let state = store.read();
        assert!(!state.is_open);
        assert!(state.kind.is_none());
        assert!(state.payload.server.is_none());
    }

    #[test]
    fn test_open_and_close() {
        let store = ModalStore::new();
        store.open(ModalKind::EditServer, ModalPayload::server(server()));
        let state = store.read();
        assert!(state.is_showing(ModalKind::EditServer));
        assert!(!state.is_showing(ModalKind::ServerDetails));
        assert_eq!(state.revision, 1);

        store.close();
        let state = store.read();
        assert!(!state.is_open);
        assert!(!state.is_showing(ModalKind::EditServer));
        // Last kind and payload are remembered.
        assert_eq!(state.kind, Some(ModalKind::EditServer));
        assert!(state.payload.server.is_some());
        assert_eq!(state.revision, 1);
    }

    #[test]
    fn test_subscribers_see_changes() {
        let store = ModalStore::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.open(ModalKind::ServerDetails, ModalPayload::server(server()));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_showing(ModalKind::ServerDetails));
        assert!(!rx.has_changed().unwrap());

        let clone = store.clone();
        clone.close();
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().is_open);
    }
}
