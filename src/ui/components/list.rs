use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Modifier, Style};
use ratatui::widgets::{List as RatatuiList, ListItem, ListState};

use crate::Theme;
use crate::config::{KeyResolver, NavAction};
use crate::ui::{Component, EventResult, Result};

const PAGE_STEP: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent<T> {
    Changed(T),
    Activated(T),
}

pub trait ListRow {
    fn render_row(&self, theme: &Theme) -> ListItem<'static>;
}

pub struct List<T: ListRow + Clone> {
    items: Vec<T>,
    state: ListState,
    resolver: Arc<KeyResolver>,
}

impl<T: ListRow + Clone> List<T> {
    pub fn new(items: Vec<T>, resolver: Arc<KeyResolver>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self {
            items,
            state,
            resolver,
        }
    }

    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    /// Select the first item matching `predicate`. Returns whether one was found.
    pub fn select_where(&mut self, predicate: impl Fn(&T) -> bool) -> bool {
        let index = self.items.iter().position(predicate);
        if index.is_some() {
            self.state.select(index);
        }
        index.is_some()
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;

        if self.items.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.items.len() {
                self.state.select(Some(self.items.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    pub const fn len(&self) -> usize {
        self.items.len()
    }

    fn get_change_event(&self, before: Option<usize>) -> EventResult<ListEvent<T>> {
        if let Some(selected) = self.state.selected()
            && Some(selected) != before
            && let Some(item) = self.items.get(selected)
        {
            return ListEvent::Changed(item.clone()).into();
        }
        EventResult::Consumed
    }
}

impl<T: ListRow + Clone> Component for List<T> {
    type Output = ListEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.items.is_empty() {
            return Ok(EventResult::Ignored);
        }
        let before = self.state.selected();
        let last = self.items.len() - 1;

        if self.resolver.matches_nav(&key, NavAction::Down) {
            self.state.select(Some(before.map_or(0, |i| (i + 1).min(last))));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Up) {
            self.state.select(Some(before.map_or(0, |i| i.saturating_sub(1))));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Home) {
            self.state.select(Some(0));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::End) {
            self.state.select(Some(last));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::PageDown) {
            self.state
                .select(Some(before.map_or(0, |i| (i + PAGE_STEP).min(last))));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::PageUp) {
            self.state
                .select(Some(before.map_or(0, |i| i.saturating_sub(PAGE_STEP))));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Select) {
            if let Some(item) = self.selected() {
                return Ok(ListEvent::Activated(item.clone()).into());
            }
            return Ok(EventResult::Ignored);
        }

        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let items: Vec<ListItem> = self.items.iter().map(|i| i.render_row(theme)).collect();

        let list = RatatuiList::new(items)
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row(&'static str);

    impl ListRow for Row {
        fn render_row(&self, _theme: &Theme) -> ListItem<'static> {
            ListItem::new(self.0)
        }
    }

    fn list() -> List<Row> {
        List::new(
            vec![Row("a"), Row("b"), Row("c")],
            Arc::new(KeyResolver::default()),
        )
    }

    fn press(list: &mut List<Row>, code: KeyCode) -> EventResult<ListEvent<Row>> {
        list.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn test_navigation_clamps() {
        let mut list = list();
        assert_eq!(press(&mut list, KeyCode::Up), EventResult::Consumed);
        assert_eq!(
            press(&mut list, KeyCode::Down),
            ListEvent::Changed(Row("b")).into()
        );
        press(&mut list, KeyCode::End);
        assert_eq!(list.selected(), Some(&Row("c")));
        assert_eq!(press(&mut list, KeyCode::Down), EventResult::Consumed);
    }

    #[test]
    fn test_select_activates() {
        let mut list = list();
        press(&mut list, KeyCode::Down);
        assert_eq!(
            press(&mut list, KeyCode::Enter),
            ListEvent::Activated(Row("b")).into()
        );
    }

    #[test]
    fn test_set_items_keeps_selection_in_range() {
        let mut list = list();
        press(&mut list, KeyCode::End);
        list.set_items(vec![Row("x")]);
        assert_eq!(list.selected(), Some(&Row("x")));
        list.set_items(vec![]);
        assert_eq!(list.selected(), None);
        assert_eq!(press(&mut list, KeyCode::Down), EventResult::Ignored);
    }

    #[test]
    fn test_select_where() {
        let mut list = list();
        assert!(list.select_where(|row| row.0 == "c"));
        assert_eq!(list.selected(), Some(&Row("c")));
        assert!(!list.select_where(|row| row.0 == "z"));
        assert_eq!(list.selected(), Some(&Row("c")));
    }
}
