//! Controlled image URL field.
//!
//! Accepts typed or pasted URLs and can pull one from the system clipboard.
//! Uploading files is left to whatever produced the URL.

use std::sync::Arc;

use arboard::Clipboard;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use tracing::warn;

use crate::Theme;
use crate::config::{FormAction, KeyResolver};
use crate::ui::{Component, EventResult, Result, TextInput, TextInputEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePickerEvent {
    Changed(String),
    Submitted,
}

pub struct ImagePicker {
    input: TextInput,
    resolver: Arc<KeyResolver>,
}

impl ImagePicker {
    pub fn new(resolver: Arc<KeyResolver>) -> Self {
        let hint = format!("Paste an image URL ({})", resolver.display_form(FormAction::Paste));
        Self {
            input: TextInput::new("Image URL").with_placeholder(hint),
            resolver,
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.input.set_value(value);
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.input.set_focused(focused);
    }

    pub const fn set_disabled(&mut self, disabled: bool) {
        self.input.set_disabled(disabled);
    }

    pub const fn set_invalid(&mut self, invalid: bool) {
        self.input.set_invalid(invalid);
    }

    /// File name shown next to the field, taken from the URL path.
    pub fn file_name(&self) -> Option<&str> {
        let path = self.value().split(['?', '#']).next()?;
        path.rsplit('/').next().filter(|name| !name.is_empty())
    }

    fn paste_from_clipboard(&mut self) -> EventResult<ImagePickerEvent> {
        let text = Clipboard::new().and_then(|mut clipboard| clipboard.get_text());
        match text {
            Ok(text) => Self::map(self.input.handle_paste(text.trim())),
            Err(e) => {
                warn!("Failed to read clipboard: {e}");
                EventResult::Consumed
            }
        }
    }

    fn map(result: EventResult<TextInputEvent>) -> EventResult<ImagePickerEvent> {
        match result {
            EventResult::Event(TextInputEvent::Changed(value)) => {
                ImagePickerEvent::Changed(value).into()
            }
            EventResult::Event(TextInputEvent::Submitted) => ImagePickerEvent::Submitted.into(),
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => EventResult::Ignored,
        }
    }
}

impl Component for ImagePicker {
    type Output = ImagePickerEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_form(&key, FormAction::Paste) {
            return Ok(self.paste_from_clipboard());
        }
        let result = self.input.handle_key(key)?;
        Ok(Self::map(result))
    }

    fn handle_paste(&mut self, text: &str) -> EventResult<Self::Output> {
        let result = self.input.handle_paste(text.trim());
        Self::map(result)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.input.render(frame, area, theme);
    }
}
