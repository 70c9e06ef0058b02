//! Dialog that edits a server's name and image.
//!
//! Visibility is derived from the [`ModalStore`] on every store change. A new
//! opening hydrates the form once from the payload server; later store
//! notifications leave in-progress edits alone. Submissions carry a ticket
//! and a cancellation token so a dismissed dialog never applies a late
//! result.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::Theme;
use crate::api::{self, Server, ServerApi, ServerUpdate};
use crate::commands::UpdateServerCmd;
use crate::config::{DialogAction, FormAction, KeyResolver};
use crate::form::{FormController, ServerField, SubmitGate, server_schema};
use crate::modal::{ModalKind, ModalMsg, ModalState, ModalStore};
use crate::ui::{
    Component, EventResult, ImagePicker, ImagePickerEvent, Result, Spinner, TextInput,
    TextInputEvent,
};

const TITLE: &str = " Edit your server ";
const DIALOG_HEIGHT: u16 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Image,
    Name,
    Save,
}

impl Focus {
    const fn next(self) -> Self {
        match self {
            Self::Image => Self::Name,
            Self::Name => Self::Save,
            Self::Save => Self::Image,
        }
    }

    const fn prev(self) -> Self {
        match self {
            Self::Image => Self::Save,
            Self::Name => Self::Image,
            Self::Save => Self::Name,
        }
    }
}

/// The opening whose server the form was last filled from.
struct Hydration {
    revision: u64,
    server: Arc<Server>,
}

impl Hydration {
    fn matches(&self, revision: u64, server: &Arc<Server>) -> bool {
        self.revision == revision && Arc::ptr_eq(&self.server, server)
    }
}

struct InFlight {
    ticket: u64,
    cancel: CancellationToken,
}

/// What a submission result did to the dialog.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Saved; the dialog closed and views should refresh.
    Updated(Server),
    /// The update failed; the dialog stays open with the error shown.
    Failed,
    /// Result of a dismissed or superseded submission, ignored.
    Discarded,
}

pub struct EditServerModal {
    store: ModalStore,
    state_rx: watch::Receiver<ModalState>,
    visible: bool,
    server: Option<Arc<Server>>,
    hydrated: Option<Hydration>,
    form: FormController<ServerField>,
    image: ImagePicker,
    name: TextInput,
    focus: Focus,
    spinner: Spinner,
    in_flight: Option<InFlight>,
    next_ticket: u64,
    api: Arc<dyn ServerApi>,
    submit_timeout: Duration,
    resolver: Arc<KeyResolver>,
}

impl EditServerModal {
    pub fn new(
        store: ModalStore,
        api: Arc<dyn ServerApi>,
        resolver: Arc<KeyResolver>,
        submit_timeout: Duration,
    ) -> Self {
        let state_rx = store.subscribe();
        let initial = state_rx.borrow().clone();
        let mut modal = Self {
            store,
            state_rx,
            visible: false,
            server: None,
            hydrated: None,
            form: FormController::new(server_schema()),
            image: ImagePicker::new(resolver.clone()),
            name: TextInput::new("Server name").with_placeholder("Enter Your Server"),
            focus: Focus::Name,
            spinner: Spinner::new().with_label("Saving..."),
            in_flight: None,
            next_ticket: 0,
            api,
            submit_timeout,
            resolver,
        };
        modal.apply(&initial);
        modal
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn form(&self) -> &FormController<ServerField> {
        &self.form
    }

    /// Pick up the latest store state if it changed since the last call.
    pub fn sync(&mut self) -> bool {
        if !self.state_rx.has_changed().unwrap_or(false) {
            return false;
        }
        let state = self.state_rx.borrow_and_update().clone();
        self.apply(&state);
        true
    }

    fn apply(&mut self, state: &ModalState) {
        let was_visible = self.visible;
        self.visible = state.is_showing(ModalKind::EditServer);

        if !self.visible {
            if was_visible {
                debug!("Edit dialog hidden by another modal");
                self.abandon();
            }
            return;
        }

        self.server.clone_from(&state.payload.server);
        let Some(server) = self.server.clone() else {
            warn!("Edit dialog opened without a server");
            return;
        };

        let stale = self
            .hydrated
            .as_ref()
            .is_none_or(|h| !h.matches(state.revision, &server));
        if stale {
            debug!(server_id = %server.id, revision = state.revision, "Hydrating edit form");
            // A new opening starts a fresh edit session
            self.cancel_in_flight();
            self.form.reset();
            self.form.hydrate(ServerField::values_of(&server));
            self.hydrated = Some(Hydration {
                revision: state.revision,
                server,
            });
            self.focus = Focus::Name;
            self.sync_inputs();
        }
    }

    /// Apply a user edit to one field.
    pub fn set_field(&mut self, field: ServerField, value: impl Into<String>) {
        if self.form.set_value(field, value) {
            self.sync_inputs();
        }
    }

    /// Validate and, if valid, start the update.
    ///
    /// Returns the command to spawn. Nothing is returned when validation
    /// fails or a submission is already in flight.
    pub fn submit(&mut self) -> Option<UpdateServerCmd> {
        if !self.visible {
            return None;
        }
        let Some(server) = self.server.clone() else {
            warn!("Submit without a server, ignoring");
            return None;
        };

        match self.form.begin_submit() {
            SubmitGate::Busy => None,
            SubmitGate::Invalid(issues) => {
                debug!(issues, "Edit form has validation errors");
                self.focus_first_error();
                self.sync_inputs();
                None
            }
            SubmitGate::Ready(values) => {
                self.next_ticket += 1;
                let ticket = self.next_ticket;
                let cancel = CancellationToken::new();
                self.in_flight = Some(InFlight {
                    ticket,
                    cancel: cancel.clone(),
                });
                self.sync_inputs();
                info!(server_id = %server.id, ticket, "Submitting server update");
                Some(UpdateServerCmd::new(
                    self.api.clone(),
                    server.id.clone(),
                    ServerUpdate::from(&values),
                    ticket,
                    cancel,
                    self.submit_timeout,
                ))
            }
        }
    }

    /// Apply the result of the submission identified by `ticket`.
    pub fn handle_update_result(
        &mut self,
        ticket: u64,
        result: api::Result<Server>,
    ) -> UpdateOutcome {
        let current = self.in_flight.as_ref().is_some_and(|f| f.ticket == ticket);
        if !current {
            debug!(ticket, "Discarding result of an abandoned submission");
            return UpdateOutcome::Discarded;
        }
        self.in_flight = None;

        match result {
            Ok(server) => {
                info!(server_id = %server.id, "Server updated");
                self.form.reset();
                self.hydrated = None;
                self.sync_inputs();
                self.visible = false;
                self.store.close();
                UpdateOutcome::Updated(server)
            }
            Err(e) => {
                error!(ticket, "Failed to update server: {e}");
                self.form.finish_submit(Err(e.to_string()));
                self.sync_inputs();
                UpdateOutcome::Failed
            }
        }
    }

    /// Close the dialog, discarding edits and any in-flight submission.
    pub fn dismiss(&mut self) {
        self.abandon();
        self.visible = false;
        self.store.close();
    }

    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!(ticket = in_flight.ticket, "Cancelling in-flight submission");
            in_flight.cancel.cancel();
        }
    }

    fn abandon(&mut self) {
        self.cancel_in_flight();
        self.form.reset();
        self.hydrated = None;
        self.focus = Focus::Name;
        self.sync_inputs();
    }

    fn focus_first_error(&mut self) {
        match self.form.errors().keys().next() {
            Some(ServerField::ImageUrl) => self.focus = Focus::Image,
            Some(ServerField::Name) => self.focus = Focus::Name,
            None => {}
        }
    }

    /// Push form state into the input widgets.
    fn sync_inputs(&mut self) {
        let disabled = self.form.is_submitting();

        let name = self.form.value(ServerField::Name);
        if self.name.value() != name {
            self.name.set_value(name);
        }
        self.name.set_disabled(disabled);
        self.name
            .set_invalid(self.form.error(ServerField::Name).is_some());
        self.name.set_focused(self.focus == Focus::Name);

        let image_url = self.form.value(ServerField::ImageUrl);
        if self.image.value() != image_url {
            self.image.set_value(image_url);
        }
        self.image.set_disabled(disabled);
        self.image
            .set_invalid(self.form.error(ServerField::ImageUrl).is_some());
        self.image.set_focused(self.focus == Focus::Image);
    }

    fn move_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.sync_inputs();
    }

    fn submit_event(&mut self) -> EventResult<ModalMsg> {
        self.submit()
            .map_or(EventResult::Consumed, |cmd| ModalMsg::Run(Box::new(cmd)).into())
    }

    fn on_name(&mut self, result: EventResult<TextInputEvent>) -> EventResult<ModalMsg> {
        match result {
            EventResult::Event(TextInputEvent::Changed(value)) => {
                self.set_field(ServerField::Name, value);
                EventResult::Consumed
            }
            EventResult::Event(TextInputEvent::Submitted) => self.submit_event(),
            EventResult::Consumed | EventResult::Ignored => EventResult::Consumed,
        }
    }

    fn on_image(&mut self, result: EventResult<ImagePickerEvent>) -> EventResult<ModalMsg> {
        match result {
            EventResult::Event(ImagePickerEvent::Changed(value)) => {
                self.set_field(ServerField::ImageUrl, value);
                EventResult::Consumed
            }
            EventResult::Event(ImagePickerEvent::Submitted) => self.submit_event(),
            EventResult::Consumed | EventResult::Ignored => EventResult::Consumed,
        }
    }

    fn render_error(&self, frame: &mut Frame, area: Rect, field: ServerField, theme: &Theme) {
        let line = match (field, self.form.error(field)) {
            (_, Some(message)) => Line::from(Span::styled(
                format!(" {message}"),
                Style::default().fg(theme.red()),
            )),
            (ServerField::ImageUrl, None) => self.image.file_name().map_or_else(Line::default, |name| {
                Line::from(Span::styled(
                    format!(" 🖼 {name}"),
                    Style::default().fg(theme.subtext0()),
                ))
            }),
            (ServerField::Name, None) => Line::default(),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_footer(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [hints_area, button_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(14)]).areas(area);

        let key_style = Style::default()
            .fg(theme.peach())
            .add_modifier(Modifier::BOLD);
        let hint_style = Style::default().fg(theme.overlay1());
        let hints = Line::from(vec![
            Span::styled(self.resolver.display_form(FormAction::Submit), key_style),
            Span::styled(" save  ", hint_style),
            Span::styled(self.resolver.display_form(FormAction::NextField), key_style),
            Span::styled(" next  ", hint_style),
            Span::styled(self.resolver.display_dialog(DialogAction::Dismiss), key_style),
            Span::styled(" cancel", hint_style),
        ]);
        frame.render_widget(Paragraph::new(hints), hints_area);

        if self.form.is_submitting() {
            self.spinner.render(frame, button_area, theme);
            return;
        }

        let button_style = if self.focus == Focus::Save {
            Style::default()
                .fg(theme.base())
                .bg(theme.mauve())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(theme.mauve())
                .add_modifier(Modifier::BOLD)
        };
        let button = Paragraph::new(Span::styled("[ Save ]", button_style))
            .alignment(Alignment::Right);
        frame.render_widget(button, button_area);
    }
}

impl Component for EditServerModal {
    type Output = ModalMsg;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if !self.visible {
            return Ok(EventResult::Ignored);
        }

        if self.resolver.matches_dialog(&key, DialogAction::Dismiss) {
            self.dismiss();
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_form(&key, FormAction::Submit) {
            return Ok(self.submit_event());
        }
        if self.resolver.matches_form(&key, FormAction::NextField) {
            self.move_focus(self.focus.next());
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_form(&key, FormAction::PrevField) {
            self.move_focus(self.focus.prev());
            return Ok(EventResult::Consumed);
        }

        // Controls are disabled while saving
        if self.form.is_submitting() {
            return Ok(EventResult::Consumed);
        }

        Ok(match self.focus {
            Focus::Name => {
                let result = self.name.handle_key(key)?;
                self.on_name(result)
            }
            Focus::Image => {
                let result = self.image.handle_key(key)?;
                self.on_image(result)
            }
            Focus::Save => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.submit_event(),
                _ => EventResult::Consumed,
            },
        })
    }

    fn handle_paste(&mut self, text: &str) -> EventResult<Self::Output> {
        if !self.visible {
            return EventResult::Ignored;
        }
        match self.focus {
            Focus::Name => {
                let result = self.name.handle_paste(text);
                self.on_name(result)
            }
            Focus::Image => {
                let result = self.image.handle_paste(text);
                self.on_image(result)
            }
            Focus::Save => EventResult::Consumed,
        }
    }

    fn handle_tick(&mut self) {
        if self.form.is_submitting() {
            self.spinner.handle_tick();
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.visible {
            return;
        }

        let popup_area = area.centered(Constraint::Percentage(60), Constraint::Length(DIALOG_HEIGHT));
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(TITLE)
            .title_alignment(Alignment::Center)
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.lavender()))
            .style(Style::default().bg(theme.base()));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let [
            _,
            image_area,
            image_error_area,
            name_area,
            name_error_area,
            banner_area,
            footer_area,
        ] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .horizontal_margin(1)
        .areas(inner);

        self.image.render(frame, image_area, theme);
        self.render_error(frame, image_error_area, ServerField::ImageUrl, theme);
        self.name.render(frame, name_area, theme);
        self.render_error(frame, name_error_area, ServerField::Name, theme);

        if let Some(message) = self.form.submit_error() {
            let banner = Paragraph::new(Span::styled(
                format!("✗ Could not save: {message}"),
                Style::default()
                    .fg(theme.red())
                    .add_modifier(Modifier::BOLD),
            ));
            frame.render_widget(banner, banner_area);
        }

        self.render_footer(frame, footer_area, theme);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use crossterm::event::KeyModifiers;
    use tokio::sync::mpsc;

    use super::*;
    use crate::api::ApiError;
    use crate::app::AppMessage;
    use crate::commands::Command;
    use crate::form::{IMAGE_URL_REQUIRED, NAME_REQUIRED};
    use crate::modal::ModalPayload;

    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<(String, ServerUpdate)>>,
        fail: bool,
    }

    #[async_trait]
    impl ServerApi for FakeApi {
        async fn list_servers(&self) -> api::Result<Vec<Server>> {
            Ok(vec![])
        }

        async fn update_server(&self, id: &str, update: &ServerUpdate) -> api::Result<Server> {
            self.calls
                .lock()
                .unwrap()
                .push((id.to_string(), update.clone()));
            if self.fail {
                return Err(ApiError::Status {
                    status: 500,
                    message: "Internal Error".to_string(),
                });
            }
            Ok(Server::new(id, update.name.clone(), update.image_url.clone()))
        }
    }

    fn old_server() -> Arc<Server> {
        Arc::new(Server::new("s1", "Old", "http://img/old.png"))
    }

    fn setup(api: Arc<FakeApi>) -> (ModalStore, EditServerModal) {
        let store = ModalStore::new();
        let modal = EditServerModal::new(
            store.clone(),
            api,
            Arc::new(KeyResolver::default()),
            Duration::from_secs(5),
        );
        (store, modal)
    }

    fn open(store: &ModalStore, modal: &mut EditServerModal, server: Arc<Server>) {
        store.open(ModalKind::EditServer, ModalPayload::server(server));
        assert!(modal.sync());
    }

    async fn run(cmd: UpdateServerCmd) -> (u64, api::Result<Server>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        Box::new(cmd).execute(tx).await.unwrap();
        match rx.recv().await {
            Some(AppMessage::ServerUpdated { ticket, result }) => (ticket, result),
            _ => panic!("expected ServerUpdated"),
        }
    }

    fn press(modal: &mut EditServerModal, code: KeyCode) -> EventResult<ModalMsg> {
        modal
            .handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn test_hidden_until_edit_kind_is_open() {
        let (store, mut modal) = setup(Arc::default());
        assert!(!modal.is_visible());

        store.open(ModalKind::ServerDetails, ModalPayload::server(old_server()));
        modal.sync();
        assert!(!modal.is_visible());
        assert_eq!(modal.form().value(ServerField::Name), "");

        store.open(ModalKind::EditServer, ModalPayload::server(old_server()));
        modal.sync();
        assert!(modal.is_visible());
    }

    #[test]
    fn test_hydrates_once_per_opening() {
        let (store, mut modal) = setup(Arc::default());
        open(&store, &mut modal, old_server());
        assert_eq!(modal.form().value(ServerField::Name), "Old");
        assert_eq!(
            modal.form().value(ServerField::ImageUrl),
            "http://img/old.png"
        );

        modal.set_field(ServerField::Name, "Draft");
        // Re-applying the same opening must not clobber the edit.
        let state = store.read();
        modal.apply(&state);
        assert!(!modal.sync());
        assert_eq!(modal.form().value(ServerField::Name), "Draft");
    }

    #[test]
    fn test_new_server_rehydrates() {
        let (store, mut modal) = setup(Arc::default());
        open(&store, &mut modal, old_server());
        modal.set_field(ServerField::Name, "");
        assert!(modal.submit().is_none());
        assert_eq!(modal.form().error(ServerField::Name), Some(NAME_REQUIRED));

        let other = Arc::new(Server::new("s2", "Other", "http://img/other.png"));
        open(&store, &mut modal, other);
        assert_eq!(modal.form().value(ServerField::Name), "Other");
        assert!(modal.form().error(ServerField::Name).is_none());
        assert!(modal.form().submit_error().is_none());

        // Validation waits for the next submit again.
        modal.set_field(ServerField::Name, "");
        assert!(modal.form().error(ServerField::Name).is_none());
    }

    #[test]
    fn test_new_opening_abandons_in_flight_submission() {
        let (store, mut modal) = setup(Arc::default());
        open(&store, &mut modal, old_server());
        let ticket = modal.submit().unwrap().ticket();

        let other = Arc::new(Server::new("s2", "Other", "http://img/other.png"));
        open(&store, &mut modal, other);
        assert!(!modal.form().is_submitting());

        let late = Ok(Server::new("s1", "Old", "http://img/old.png"));
        assert!(matches!(
            modal.handle_update_result(ticket, late),
            UpdateOutcome::Discarded
        ));
        assert!(store.read().is_open);
        assert_eq!(modal.form().value(ServerField::Name), "Other");
    }

    #[test]
    fn test_reopen_after_dismiss_hydrates_again() {
        let (store, mut modal) = setup(Arc::default());
        let server = old_server();
        open(&store, &mut modal, server.clone());
        modal.dismiss();
        assert_eq!(modal.form().value(ServerField::Name), "");

        open(&store, &mut modal, server);
        assert_eq!(modal.form().value(ServerField::Name), "Old");
    }

    #[test]
    fn test_empty_fields_block_submission() {
        let (store, mut modal) = setup(Arc::default());
        open(&store, &mut modal, old_server());

        modal.set_field(ServerField::Name, "");
        modal.set_field(ServerField::ImageUrl, "");
        assert!(modal.submit().is_none());
        assert_eq!(modal.form().error(ServerField::Name), Some(NAME_REQUIRED));
        assert_eq!(
            modal.form().error(ServerField::ImageUrl),
            Some(IMAGE_URL_REQUIRED)
        );
        assert!(!modal.form().is_submitting());
        assert!(store.read().is_open);
    }

    #[tokio::test]
    async fn test_edit_scenario() {
        let api = Arc::new(FakeApi::default());
        let (store, mut modal) = setup(api.clone());
        open(&store, &mut modal, old_server());
        assert_eq!(modal.form().value(ServerField::Name), "Old");

        modal.set_field(ServerField::Name, "");
        assert!(modal.submit().is_none());
        assert_eq!(modal.form().error(ServerField::Name), Some(NAME_REQUIRED));
        assert!(api.calls.lock().unwrap().is_empty());

        modal.set_field(ServerField::Name, "New");
        assert!(modal.form().error(ServerField::Name).is_none());
        let cmd = modal.submit().expect("valid form submits");
        assert!(modal.form().is_submitting());
        assert_eq!(cmd.server_id(), "s1");

        let (ticket, result) = run(cmd).await;
        assert_eq!(
            *api.calls.lock().unwrap(),
            vec![(
                "s1".to_string(),
                ServerUpdate {
                    name: "New".to_string(),
                    image_url: "http://img/old.png".to_string(),
                }
            )]
        );

        let outcome = modal.handle_update_result(ticket, result);
        assert!(matches!(outcome, UpdateOutcome::Updated(ref s) if s.name == "New"));
        assert_eq!(modal.form().value(ServerField::Name), "");
        assert_eq!(modal.form().value(ServerField::ImageUrl), "");
        assert!(!store.read().is_open);
        assert!(!modal.is_visible());

        // The close notification is consumed without side effects.
        modal.sync();
        assert!(!modal.is_visible());
    }

    #[tokio::test]
    async fn test_failure_keeps_dialog_and_values() {
        let api = Arc::new(FakeApi {
            fail: true,
            ..FakeApi::default()
        });
        let (store, mut modal) = setup(api.clone());
        open(&store, &mut modal, old_server());
        modal.set_field(ServerField::Name, "New");

        let cmd = modal.submit().unwrap();
        let (ticket, result) = run(cmd).await;
        let outcome = modal.handle_update_result(ticket, result);

        assert!(matches!(outcome, UpdateOutcome::Failed));
        assert!(store.read().is_open);
        assert!(modal.is_visible());
        assert!(!modal.form().is_submitting());
        assert_eq!(modal.form().value(ServerField::Name), "New");
        assert!(
            modal
                .form()
                .submit_error()
                .is_some_and(|e| e.contains("Internal Error"))
        );

        // The user can retry.
        assert!(modal.submit().is_some());
        assert_eq!(api.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dismiss_mid_submission_discards_result() {
        let api = Arc::new(FakeApi::default());
        let (store, mut modal) = setup(api);
        open(&store, &mut modal, old_server());

        let cmd = modal.submit().unwrap();
        let ticket = cmd.ticket();
        modal.dismiss();
        assert!(!store.read().is_open);
        assert_eq!(modal.form().value(ServerField::Name), "");
        assert!(!modal.form().is_submitting());

        let (tx, mut rx) = mpsc::unbounded_channel();
        Box::new(cmd).execute(tx).await.unwrap();
        assert!(rx.recv().await.is_none());

        // A result that raced the cancellation is still ignored.
        let late = Ok(Server::new("s1", "Old", "http://img/old.png"));
        assert!(matches!(
            modal.handle_update_result(ticket, late),
            UpdateOutcome::Discarded
        ));
        assert_eq!(modal.form().value(ServerField::Name), "");
    }

    #[test]
    fn test_second_submit_while_in_flight_is_blocked() {
        let (store, mut modal) = setup(Arc::default());
        open(&store, &mut modal, old_server());
        assert!(modal.submit().is_some());
        assert!(modal.submit().is_none());
        assert!(matches!(
            press(&mut modal, KeyCode::Char('x')),
            EventResult::Consumed
        ));
        assert_eq!(modal.form().value(ServerField::Name), "Old");
    }

    #[test]
    fn test_keyboard_editing_and_submit() {
        let (store, mut modal) = setup(Arc::default());
        open(&store, &mut modal, old_server());

        // Name has focus after hydration with the cursor at the end.
        press(&mut modal, KeyCode::Char('!'));
        assert_eq!(modal.form().value(ServerField::Name), "Old!");

        let result = press(&mut modal, KeyCode::Enter);
        assert!(matches!(result, EventResult::Event(ModalMsg::Run(_))));
        assert!(modal.form().is_submitting());
    }

    #[test]
    fn test_tab_moves_to_image_field() {
        let (store, mut modal) = setup(Arc::default());
        open(&store, &mut modal, old_server());

        press(&mut modal, KeyCode::Tab);
        press(&mut modal, KeyCode::Tab);
        // Focus wrapped around to the image field.
        let result = modal.handle_paste("?v=2");
        assert!(matches!(result, EventResult::Consumed));
        assert_eq!(
            modal.form().value(ServerField::ImageUrl),
            "http://img/old.png?v=2"
        );
    }

    #[test]
    fn test_escape_dismisses() {
        let (store, mut modal) = setup(Arc::default());
        open(&store, &mut modal, old_server());
        press(&mut modal, KeyCode::Esc);
        assert!(!store.read().is_open);
        assert!(!modal.is_visible());
        assert_eq!(modal.form().value(ServerField::ImageUrl), "");
    }

    #[test]
    fn test_switching_modal_resets_form() {
        let (store, mut modal) = setup(Arc::default());
        open(&store, &mut modal, old_server());
        modal.set_field(ServerField::Name, "Draft");

        store.open(ModalKind::ServerDetails, ModalPayload::server(old_server()));
        modal.sync();
        assert!(!modal.is_visible());
        assert_eq!(modal.form().value(ServerField::Name), "");
    }
}
