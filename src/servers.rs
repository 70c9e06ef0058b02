//! The server list screen.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, ListItem, Paragraph};
use tracing::{debug, warn};

use crate::Theme;
use crate::api::Server;
use crate::app::AppMessage;
use crate::config::{GlobalAction, KeyResolver, NavAction, SearchAction, ServersAction};
use crate::modal::{ModalKind, ModalPayload, ModalStore};
use crate::search::Matcher;
use crate::ui::{
    Component, EventResult, List, ListEvent, ListRow, Result, Spinner, TextInput, TextInputEvent,
};

impl ListRow for Arc<Server> {
    fn render_row(&self, theme: &Theme) -> ListItem<'static> {
        ListItem::new(Line::from(vec![
            Span::styled(self.name.clone(), Style::default().fg(theme.text())),
            Span::styled(
                format!("  {}", self.id),
                Style::default().fg(theme.overlay0()),
            ),
        ]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Loading,
    Loaded,
    Failed(String),
}

pub struct ServerListView {
    servers: Vec<Arc<Server>>,
    list: List<Arc<Server>>,
    state: LoadState,
    search: TextInput,
    searching: bool,
    matcher: Matcher,
    spinner: Spinner,
    store: ModalStore,
    resolver: Arc<KeyResolver>,
    /// Server to open for editing once the list arrives.
    pending_edit: Option<String>,
}

impl ServerListView {
    pub fn new(store: ModalStore, resolver: Arc<KeyResolver>) -> Self {
        Self {
            servers: Vec::new(),
            list: List::new(Vec::new(), resolver.clone()),
            state: LoadState::Loading,
            search: TextInput::new("Filter").with_placeholder("type to filter"),
            searching: false,
            matcher: Matcher::new(),
            spinner: Spinner::new().with_label("Loading servers..."),
            store,
            resolver,
            pending_edit: None,
        }
    }

    /// Open the edit dialog for `id` after the next successful load.
    pub fn edit_on_load(&mut self, id: impl Into<String>) {
        self.pending_edit = Some(id.into());
    }

    /// Whether keystrokes are going into the filter field.
    pub const fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn set_loading(&mut self) {
        self.state = LoadState::Loading;
    }

    pub fn set_servers(&mut self, servers: Vec<Server>) {
        debug!(count = servers.len(), "Server list loaded");
        self.servers = servers.into_iter().map(Arc::new).collect();
        self.state = LoadState::Loaded;
        self.apply_filter();

        if let Some(id) = self.pending_edit.take() {
            if self.list.select_where(|s| s.id == id) {
                self.open_selected(ModalKind::EditServer);
            } else {
                warn!(server_id = %id, "Requested server not found");
            }
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.state = LoadState::Failed(message.into());
    }

    fn apply_filter(&mut self) {
        let selected = self.list.selected().map(|s| s.id.clone());
        let filtered = self
            .matcher
            .filter(&self.servers, self.search.value(), |s| {
                vec![s.name.as_str(), s.id.as_str()]
            });
        self.list.set_items(filtered);
        if let Some(id) = selected {
            self.list.select_where(|s| s.id == id);
        }
    }

    fn open_selected(&self, kind: ModalKind) {
        if let Some(server) = self.list.selected() {
            self.store.open(kind, ModalPayload::server(server.clone()));
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<EventResult<AppMessage>> {
        if self.resolver.matches_search(&key, SearchAction::Exit) {
            self.searching = false;
            self.search.set_focused(false);
            self.search.set_value("");
            self.apply_filter();
            return Ok(EventResult::Consumed);
        }

        match self.search.handle_key(key)? {
            EventResult::Event(TextInputEvent::Changed(_)) => self.apply_filter(),
            EventResult::Event(TextInputEvent::Submitted) => {
                self.searching = false;
                self.search.set_focused(false);
            }
            EventResult::Consumed | EventResult::Ignored => {}
        }
        Ok(EventResult::Consumed)
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut spans = vec![Span::styled(
            " Servers",
            Style::default()
                .fg(theme.mauve())
                .add_modifier(Modifier::BOLD),
        )];
        if self.state == LoadState::Loaded {
            spans.push(Span::styled(
                format!(" ({}/{})", self.list.len(), self.servers.len()),
                Style::default().fg(theme.overlay1()),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let key_style = Style::default()
            .fg(theme.peach())
            .add_modifier(Modifier::BOLD);
        let hint_style = Style::default().fg(theme.overlay1());
        let hints = [
            (self.resolver.display_servers(ServersAction::Edit), " edit  "),
            (self.resolver.display_nav(NavAction::Select), " details  "),
            (self.resolver.display_search(SearchAction::Toggle), " filter  "),
            (self.resolver.display_servers(ServersAction::Reload), " reload  "),
            (self.resolver.display_global(GlobalAction::Quit), " quit"),
        ];
        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(format!(" {key}"), key_style),
                    Span::styled(label, hint_style),
                ]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

impl Component for ServerListView {
    type Output = AppMessage;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.searching {
            return self.handle_search_key(key);
        }

        if self.resolver.matches_search(&key, SearchAction::Toggle) {
            self.searching = true;
            self.search.set_focused(true);
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_servers(&key, ServersAction::Reload) {
            return Ok(AppMessage::RefreshServers.into());
        }
        if self.resolver.matches_global(&key, GlobalAction::Back) && !self.search.value().is_empty()
        {
            self.search.set_value("");
            self.apply_filter();
            return Ok(EventResult::Consumed);
        }
        if self.state != LoadState::Loaded {
            return Ok(EventResult::Ignored);
        }
        if self.resolver.matches_servers(&key, ServersAction::Edit) {
            self.open_selected(ModalKind::EditServer);
            return Ok(EventResult::Consumed);
        }

        Ok(match self.list.handle_key(key)? {
            EventResult::Event(ListEvent::Activated(server)) => {
                self.store
                    .open(ModalKind::ServerDetails, ModalPayload::server(server));
                EventResult::Consumed
            }
            EventResult::Event(ListEvent::Changed(_)) | EventResult::Consumed => {
                EventResult::Consumed
            }
            EventResult::Ignored => EventResult::Ignored,
        })
    }

    fn handle_paste(&mut self, text: &str) -> EventResult<Self::Output> {
        if !self.searching {
            return EventResult::Ignored;
        }
        if let EventResult::Event(TextInputEvent::Changed(_)) = self.search.handle_paste(text) {
            self.apply_filter();
        }
        EventResult::Consumed
    }

    fn handle_tick(&mut self) {
        if self.state == LoadState::Loading {
            self.spinner.handle_tick();
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let show_search = self.searching || !self.search.value().is_empty();
        let [header_area, search_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(if show_search { 3 } else { 0 }),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_header(frame, header_area, theme);
        if show_search {
            self.search.render(frame, search_area, theme);
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));
        let inner = block.inner(body_area);
        frame.render_widget(block, body_area);

        match &self.state {
            LoadState::Loading => self.spinner.render(frame, inner, theme),
            LoadState::Failed(message) => {
                let error = Paragraph::new(Span::styled(
                    format!("Failed to load servers: {message}"),
                    Style::default().fg(theme.red()),
                ));
                frame.render_widget(error, inner);
            }
            LoadState::Loaded if self.servers.is_empty() => {
                let empty = Paragraph::new(Span::styled(
                    "No servers yet",
                    Style::default().fg(theme.subtext0()),
                ));
                frame.render_widget(empty, inner);
            }
            LoadState::Loaded => self.list.render(frame, inner, theme),
        }

        self.render_footer(frame, footer_area, theme);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    fn servers() -> Vec<Server> {
        vec![
            Server::new("s1", "Rustaceans", "http://img/1.png"),
            Server::new("s2", "Gaming", "http://img/2.png"),
            Server::new("s3", "Rust Jobs", "http://img/3.png"),
        ]
    }

    fn setup() -> (ModalStore, ServerListView) {
        let store = ModalStore::new();
        let view = ServerListView::new(store.clone(), Arc::new(KeyResolver::default()));
        (store, view)
    }

    fn press(view: &mut ServerListView, code: KeyCode) -> EventResult<AppMessage> {
        view.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn payload_id(store: &ModalStore) -> String {
        store.read().payload.server.unwrap().id.clone()
    }

    #[test]
    fn test_edit_opens_dialog_with_selected_server() {
        let (store, mut view) = setup();
        view.set_servers(servers());
        press(&mut view, KeyCode::Down);
        press(&mut view, KeyCode::Char('e'));

        let state = store.read();
        assert!(state.is_showing(ModalKind::EditServer));
        assert_eq!(payload_id(&store), "s2");
    }

    #[test]
    fn test_enter_opens_details() {
        let (store, mut view) = setup();
        view.set_servers(servers());
        press(&mut view, KeyCode::Enter);
        assert!(store.read().is_showing(ModalKind::ServerDetails));
        assert_eq!(payload_id(&store), "s1");
    }

    #[test]
    fn test_edit_ignored_while_loading() {
        let (store, mut view) = setup();
        assert!(matches!(
            press(&mut view, KeyCode::Char('e')),
            EventResult::Ignored
        ));
        assert!(!store.read().is_open);
    }

    #[test]
    fn test_reload_requests_refresh() {
        let (_store, mut view) = setup();
        assert!(matches!(
            press(&mut view, KeyCode::Char('r')),
            EventResult::Event(AppMessage::RefreshServers)
        ));
    }

    #[test]
    fn test_filter_narrows_list() {
        let (store, mut view) = setup();
        view.set_servers(servers());

        press(&mut view, KeyCode::Char('/'));
        assert!(view.is_searching());
        for c in "gam".chars() {
            press(&mut view, KeyCode::Char(c));
        }
        assert_eq!(view.list.len(), 1);

        press(&mut view, KeyCode::Enter);
        assert!(!view.is_searching());
        press(&mut view, KeyCode::Char('e'));
        assert_eq!(payload_id(&store), "s2");

        // Esc outside the filter field clears it.
        press(&mut view, KeyCode::Esc);
        assert_eq!(view.list.len(), 3);
    }

    #[test]
    fn test_refresh_keeps_selection() {
        let (_store, mut view) = setup();
        view.set_servers(servers());
        press(&mut view, KeyCode::End);

        let mut updated = servers();
        updated[2].name = "Rust Careers".to_string();
        view.set_servers(updated);

        let selected = view.list.selected().unwrap();
        assert_eq!(selected.id, "s3");
        assert_eq!(selected.name, "Rust Careers");
    }

    #[test]
    fn test_edit_on_load_opens_dialog() {
        let (store, mut view) = setup();
        view.edit_on_load("s3");
        view.set_servers(servers());
        assert!(store.read().is_showing(ModalKind::EditServer));
        assert_eq!(payload_id(&store), "s3");
    }

    #[test]
    fn test_failed_load() {
        let (_store, mut view) = setup();
        view.set_error("connection refused");
        assert_eq!(
            view.state,
            LoadState::Failed("connection refused".to_string())
        );
        view.set_loading();
        assert_eq!(view.state, LoadState::Loading);
    }
}
