use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::*;
use crate::config::keybindings::KeybindingsConfig;

pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
            GlobalAction::Suspend => kb.suspend.matches(event),
            GlobalAction::Back => kb.back.matches(event),
        }
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.display(),
            GlobalAction::Suspend => kb.suspend.display(),
            GlobalAction::Back => kb.back.display(),
        }
    }

    // Navigation actions
    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.matches(event),
            NavAction::Down => kb.down.matches(event),
            NavAction::PageUp => kb.page_up.matches(event),
            NavAction::PageDown => kb.page_down.matches(event),
            NavAction::Home => kb.home.matches(event),
            NavAction::End => kb.end.matches(event),
            NavAction::Select => kb.select.matches(event),
        }
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.display(),
            NavAction::Down => kb.down.display(),
            NavAction::PageUp => kb.page_up.display(),
            NavAction::PageDown => kb.page_down.display(),
            NavAction::Home => kb.home.display(),
            NavAction::End => kb.end.display(),
            NavAction::Select => kb.select.display(),
        }
    }

    // Search actions
    pub fn matches_search(&self, event: &KeyEvent, action: SearchAction) -> bool {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Toggle => kb.toggle.matches(event),
            SearchAction::Exit => kb.exit.matches(event),
        }
    }

    pub fn display_search(&self, action: SearchAction) -> String {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Toggle => kb.toggle.display(),
            SearchAction::Exit => kb.exit.display(),
        }
    }

    // Server list actions
    pub fn matches_servers(&self, event: &KeyEvent, action: ServersAction) -> bool {
        let kb = &self.keybindings.servers;
        match action {
            ServersAction::Edit => kb.edit.matches(event),
            ServersAction::Reload => kb.reload.matches(event),
        }
    }

    pub fn display_servers(&self, action: ServersAction) -> String {
        let kb = &self.keybindings.servers;
        match action {
            ServersAction::Edit => kb.edit.display(),
            ServersAction::Reload => kb.reload.display(),
        }
    }

    // Form actions
    pub fn matches_form(&self, event: &KeyEvent, action: FormAction) -> bool {
        let kb = &self.keybindings.form;
        match action {
            FormAction::NextField => kb.next_field.matches(event),
            FormAction::PrevField => kb.prev_field.matches(event),
            FormAction::Submit => kb.submit.matches(event),
            FormAction::Paste => kb.paste.matches(event),
        }
    }

    pub fn display_form(&self, action: FormAction) -> String {
        let kb = &self.keybindings.form;
        match action {
            FormAction::NextField => kb.next_field.display(),
            FormAction::PrevField => kb.prev_field.display(),
            FormAction::Submit => kb.submit.display(),
            FormAction::Paste => kb.paste.display(),
        }
    }

    // Dialog actions
    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Dismiss => kb.dismiss.matches(event),
        }
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Dismiss => kb.dismiss.display(),
        }
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}
