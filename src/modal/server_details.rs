use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};
use tokio::sync::watch;

use crate::Theme;
use crate::api::Server;
use crate::config::{DialogAction, KeyResolver, ServersAction};
use crate::modal::{ModalKind, ModalPayload, ModalState, ModalStore};
use crate::ui::{Component, EventResult, Result};

/// Read-only overlay showing every field of a server.
pub struct ServerDetailsModal {
    store: ModalStore,
    state_rx: watch::Receiver<ModalState>,
    server: Option<Arc<Server>>,
    visible: bool,
    resolver: Arc<KeyResolver>,
}

impl ServerDetailsModal {
    pub fn new(store: ModalStore, resolver: Arc<KeyResolver>) -> Self {
        let state_rx = store.subscribe();
        let mut modal = Self {
            store,
            state_rx,
            server: None,
            visible: false,
            resolver,
        };
        let initial = modal.state_rx.borrow().clone();
        modal.apply(&initial);
        modal
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn sync(&mut self) -> bool {
        if !self.state_rx.has_changed().unwrap_or(false) {
            return false;
        }
        let state = self.state_rx.borrow_and_update().clone();
        self.apply(&state);
        true
    }

    fn apply(&mut self, state: &ModalState) {
        self.visible = state.is_showing(ModalKind::ServerDetails);
        if self.visible {
            self.server.clone_from(&state.payload.server);
        }
    }

    fn rows(server: &Server, theme: &Theme) -> Vec<Line<'static>> {
        let label_style = Style::default().fg(theme.subtext0());
        let value_style = Style::default().fg(theme.text());
        let row = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("{label:<12}"), label_style),
                Span::styled(value, value_style),
            ])
        };
        let missing = || "-".to_string();
        let timestamp = |t: Option<chrono::DateTime<chrono::Utc>>| {
            t.map_or_else(missing, |t| t.format("%Y-%m-%d %H:%M").to_string())
        };

        vec![
            row("Name", server.name.clone()),
            row("ID", server.id.clone()),
            row("Image", server.image_url.clone()),
            row("Invite", server.invite_code.clone().unwrap_or_else(missing)),
            row("Owner", server.profile_id.clone().unwrap_or_else(missing)),
            row("Created", timestamp(server.created_at)),
            row("Updated", timestamp(server.updated_at)),
        ]
    }
}

impl Component for ServerDetailsModal {
    type Output = ();

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if !self.visible {
            return Ok(EventResult::Ignored);
        }

        if self.resolver.matches_dialog(&key, DialogAction::Dismiss) {
            self.visible = false;
            self.store.close();
        } else if self.resolver.matches_servers(&key, ServersAction::Edit)
            && let Some(server) = self.server.clone()
        {
            self.visible = false;
            self.store
                .open(ModalKind::EditServer, ModalPayload::server(server));
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.visible {
            return;
        }
        let Some(server) = &self.server else {
            return;
        };

        let popup_area = area.centered(Constraint::Percentage(60), Constraint::Length(12));
        frame.render_widget(Clear, popup_area);

        let mut lines = Self::rows(server, theme);
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled(
                self.resolver.display_servers(ServersAction::Edit),
                Style::default()
                    .fg(theme.peach())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" edit  ", Style::default().fg(theme.overlay1())),
            Span::styled(
                self.resolver.display_dialog(DialogAction::Dismiss),
                Style::default()
                    .fg(theme.peach())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" close", Style::default().fg(theme.overlay1())),
        ]));

        let block = Block::default()
            .title(format!(" {} ", server.name))
            .title_alignment(Alignment::Center)
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border_focused()))
            .style(Style::default().bg(theme.base()));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }
}
