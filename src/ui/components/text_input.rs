use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInputEvent {
    /// The value was edited.
    Changed(String),
    /// Enter was pressed.
    Submitted,
}

/// Single-line text field.
///
/// The owner pushes values in with [`TextInput::set_value`] and receives
/// edits as [`TextInputEvent::Changed`]. Cursor positions count chars.
pub struct TextInput {
    label: String,
    value: String,
    cursor: usize,
    placeholder: Option<String>,
    focused: bool,
    disabled: bool,
    invalid: bool,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            cursor: 0,
            placeholder: None,
            focused: false,
            disabled: false,
            invalid: false,
        }
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value and move the cursor to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.len();
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub const fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub const fn set_invalid(&mut self, invalid: bool) {
        self.invalid = invalid;
    }

    /// Insert text at the cursor, dropping line breaks.
    pub fn insert_str(&mut self, text: &str) -> bool {
        let mut changed = false;
        for c in text.chars().filter(|c| !c.is_control()) {
            self.insert_char(c);
            changed = true;
        }
        changed
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
        true
    }

    fn delete_char_at_cursor(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
        true
    }

    fn delete_word_before_cursor(&mut self) -> bool {
        let chars: Vec<char> = self.value.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1] == ' ' {
            pos -= 1;
        }
        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }
        if pos == self.cursor {
            return false;
        }
        let (start, end) = (self.byte_index(pos), self.byte_index(self.cursor));
        self.value.drain(start..end);
        self.cursor = pos;
        true
    }

    fn clear_line(&mut self) -> bool {
        if self.value.is_empty() {
            return false;
        }
        self.value.clear();
        self.cursor = 0;
        true
    }

    fn changed(&self, changed: bool) -> EventResult<TextInputEvent> {
        if changed {
            TextInputEvent::Changed(self.value.clone()).into()
        } else {
            EventResult::Consumed
        }
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.disabled {
            return Ok(EventResult::Ignored);
        }

        Ok(match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) => TextInputEvent::Submitted.into(),

            (KeyCode::Backspace, KeyModifiers::ALT)
            | (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                let changed = self.delete_word_before_cursor();
                self.changed(changed)
            }
            (KeyCode::Backspace, _) => {
                let changed = self.delete_char_before_cursor();
                self.changed(changed)
            }
            (KeyCode::Delete, _) => {
                let changed = self.delete_char_at_cursor();
                self.changed(changed)
            }

            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.len());
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len();
                EventResult::Consumed
            }

            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                let changed = self.clear_line();
                self.changed(changed)
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                self.changed(true)
            }

            _ => EventResult::Ignored,
        })
    }

    fn handle_paste(&mut self, text: &str) -> EventResult<Self::Output> {
        if self.disabled {
            return EventResult::Ignored;
        }
        let changed = self.insert_str(text);
        self.changed(changed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let input_style = if self.disabled {
            Style::default().fg(theme.overlay1())
        } else {
            Style::default().fg(theme.text())
        };
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);
        let placeholder_style = Style::default().fg(theme.overlay0());
        let show_cursor = self.focused && !self.disabled;

        let line = if self.value.is_empty() {
            let placeholder = self.placeholder.clone().unwrap_or_default();
            let mut spans = Vec::new();
            if show_cursor {
                spans.push(Span::styled(" ", cursor_style));
            }
            spans.push(Span::styled(placeholder, placeholder_style));
            Line::from(spans)
        } else if show_cursor {
            let before: String = self.value.chars().take(self.cursor).collect();
            let cursor_char = self.value.chars().nth(self.cursor).unwrap_or(' ');
            let after: String = self.value.chars().skip(self.cursor + 1).collect();
            Line::from(vec![
                Span::styled(before, input_style),
                Span::styled(cursor_char.to_string(), cursor_style),
                Span::styled(after, input_style),
            ])
        } else {
            Line::from(Span::styled(self.value.clone(), input_style))
        };

        let border_color = if self.invalid {
            theme.red()
        } else if self.focused {
            theme.border_focused()
        } else {
            theme.border()
        };

        let block = Block::default()
            .title(format!(" {} ", self.label))
            .title_style(
                Style::default()
                    .fg(theme.subtext1())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));

        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}
