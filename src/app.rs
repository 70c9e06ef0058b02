use std::sync::Arc;
use std::time::Duration;

use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::Theme;
use crate::api::{self, Server, ServerApi};
use crate::cli::Args;
use crate::commands::{Command, FetchServersCmd};
use crate::config::{AppConfig, GlobalAction, KeyResolver};
use crate::modal::{EditServerModal, ModalMsg, ModalStore, ServerDetailsModal, UpdateOutcome};
use crate::servers::ServerListView;
use crate::tui::{Event, Tui};
use crate::ui::{Component, EventResult, Toast, ToastManager, ToastType};

const FRAME_RATE: f64 = 30.0;
const TICK_RATE: f64 = 8.0;

/// Messages flowing back into the App from input handling and commands.
#[derive(Debug)]
pub enum AppMessage {
    // === Lifecycle ===
    Quit,
    Suspend,
    Resume,
    ClearScreen,

    // === Servers ===
    /// Re-fetch the server list.
    RefreshServers,
    ServersLoaded(Vec<Server>),
    ServersFailed(String),
    /// Result of the edit submission identified by `ticket`.
    ServerUpdated {
        ticket: u64,
        result: api::Result<Server>,
    },

    // === Feedback ===
    ShowToast {
        message: String,
        toast_type: ToastType,
    },
}

pub struct App {
    api: Arc<dyn ServerApi>,
    resolver: Arc<KeyResolver>,
    theme: Theme,
    servers: ServerListView,
    edit_modal: EditServerModal,
    details_modal: ServerDetailsModal,
    toasts: ToastManager,
    should_quit: bool,
    should_suspend: bool,
    message_tx: UnboundedSender<AppMessage>,
    message_rx: UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(
        api: Arc<dyn ServerApi>,
        config: &AppConfig,
        resolver: Arc<KeyResolver>,
        theme: Theme,
    ) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let store = ModalStore::new();
        let submit_timeout = Duration::from_secs(config.api.submit_timeout_secs);

        Self {
            servers: ServerListView::new(store.clone(), resolver.clone()),
            edit_modal: EditServerModal::new(
                store.clone(),
                api.clone(),
                resolver.clone(),
                submit_timeout,
            ),
            details_modal: ServerDetailsModal::new(store, resolver.clone()),
            toasts: ToastManager::default(),
            api,
            resolver,
            theme,
            should_quit: false,
            should_suspend: false,
            message_tx,
            message_rx,
        }
    }

    pub fn apply_cli_args(&mut self, args: &Args) {
        if let Some(id) = &args.server {
            info!(server_id = %id, "Opening edit dialog after load");
            self.servers.edit_on_load(id.clone());
        }
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;
        self.message_tx.send(AppMessage::RefreshServers)?;

        loop {
            self.handle_events(&mut tui).await?;
            self.handle_messages(&mut tui)?;
            if self.should_suspend {
                tui.suspend()?;
                self.message_tx.send(AppMessage::Resume)?;
                self.message_tx.send(AppMessage::ClearScreen)?;
                tui.enter()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };

        match event {
            Event::Init => {}
            Event::Quit => self.message_tx.send(AppMessage::Quit)?,
            Event::Error(e) => warn!("Terminal event error: {e}"),
            Event::Tick => self.handle_tick(),
            Event::Render => self.render(tui)?,
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                self.render(tui)?;
            }
            Event::Paste(text) => self.handle_paste(&text)?,
            Event::Key(key) => self.handle_key(key)?,
        }
        Ok(())
    }

    fn sync_modals(&mut self) {
        self.edit_modal.sync();
        self.details_modal.sync();
    }

    /// Route a key to the visible modal, or to the server list.
    fn handle_key(&mut self, key: KeyEvent) -> color_eyre::Result<()> {
        self.sync_modals();

        if self.edit_modal.is_visible() {
            if let EventResult::Event(ModalMsg::Run(cmd)) = self.edit_modal.handle_key(key)? {
                self.spawn(cmd);
            }
        } else if self.details_modal.is_visible() {
            self.details_modal.handle_key(key)?;
        } else if !self.servers.is_searching()
            && self.resolver.matches_global(&key, GlobalAction::Quit)
        {
            self.message_tx.send(AppMessage::Quit)?;
        } else if !self.servers.is_searching()
            && self.resolver.matches_global(&key, GlobalAction::Suspend)
        {
            self.message_tx.send(AppMessage::Suspend)?;
        } else if let EventResult::Event(message) = self.servers.handle_key(key)? {
            self.message_tx.send(message)?;
        }

        self.sync_modals();
        Ok(())
    }

    fn handle_paste(&mut self, text: &str) -> color_eyre::Result<()> {
        self.sync_modals();
        if self.edit_modal.is_visible() {
            if let EventResult::Event(ModalMsg::Run(cmd)) = self.edit_modal.handle_paste(text) {
                self.spawn(cmd);
            }
        } else if !self.details_modal.is_visible()
            && let EventResult::Event(message) = self.servers.handle_paste(text)
        {
            self.message_tx.send(message)?;
        }
        Ok(())
    }

    fn handle_tick(&mut self) {
        self.servers.handle_tick();
        self.edit_modal.handle_tick();
        self.toasts.handle_tick();
    }

    fn spawn(&self, cmd: Box<dyn Command>) {
        let name = cmd.name();
        debug!("Spawning command: {name}");
        let tx = self.message_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = cmd.execute(tx).await {
                error!("Command '{name}' failed: {e}");
            }
        });
    }

    fn handle_messages(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        while let Ok(message) = self.message_rx.try_recv() {
            match message {
                AppMessage::Quit => self.should_quit = true,
                AppMessage::Suspend => self.should_suspend = true,
                AppMessage::Resume => self.should_suspend = false,
                AppMessage::ClearScreen => tui.clear()?,
                other => {
                    if let Some(cmd) = self.update(other)? {
                        self.spawn(cmd);
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply a domain message, returning a command to spawn if one is needed.
    fn update(&mut self, message: AppMessage) -> color_eyre::Result<Option<Box<dyn Command>>> {
        debug!(?message, "Handling message");
        match message {
            AppMessage::RefreshServers => {
                self.servers.set_loading();
                return Ok(Some(Box::new(FetchServersCmd::new(self.api.clone()))));
            }
            AppMessage::ServersLoaded(servers) => {
                self.servers.set_servers(servers);
                self.sync_modals();
            }
            AppMessage::ServersFailed(message) => {
                error!("Failed to load servers: {message}");
                self.servers.set_error(message.clone());
                self.toasts.show(Toast::new(
                    format!("Failed to load servers: {message}"),
                    ToastType::Error,
                ));
            }
            AppMessage::ServerUpdated { ticket, result } => {
                match self.edit_modal.handle_update_result(ticket, result) {
                    UpdateOutcome::Updated(server) => {
                        debug!(server_id = %server.id, "Refreshing after update");
                        self.message_tx.send(AppMessage::RefreshServers)?;
                        self.message_tx.send(AppMessage::ShowToast {
                            message: "Server updated".to_string(),
                            toast_type: ToastType::Success,
                        })?;
                    }
                    UpdateOutcome::Failed | UpdateOutcome::Discarded => {}
                }
                self.sync_modals();
            }
            AppMessage::ShowToast {
                message,
                toast_type,
            } => self.toasts.show(Toast::new(message, toast_type)),
            AppMessage::Quit
            | AppMessage::Suspend
            | AppMessage::Resume
            | AppMessage::ClearScreen => {}
        }
        Ok(None)
    }

    fn render(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        tui.draw(|frame| {
            let area = frame.area();
            self.servers.render(frame, area, &self.theme);
            self.details_modal.render(frame, area, &self.theme);
            self.edit_modal.render(frame, area, &self.theme);
            self.toasts.render(frame, area, &self.theme);
        })?;
        Ok(())
    }
}
