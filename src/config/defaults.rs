use crossterm::event::KeyCode;

use crate::config::key::{Key, KeyBinding};
use crate::config::keybindings::*;

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::new(KeyCode::Char('q')).into(),
            suspend: Key::with_ctrl(KeyCode::Char('z')).into(),
            back: Key::new(KeyCode::Esc).into(),
        }
    }
}

impl Default for NavigationKeybindings {
    fn default() -> Self {
        Self {
            up: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('k')),
                Key::new(KeyCode::Up),
            ]),
            down: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('j')),
                Key::new(KeyCode::Down),
            ]),
            page_up: Key::new(KeyCode::PageUp).into(),
            page_down: Key::new(KeyCode::PageDown).into(),
            home: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('g')),
                Key::new(KeyCode::Home),
            ]),
            end: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('G')),
                Key::new(KeyCode::End),
            ]),
            select: Key::new(KeyCode::Enter).into(),
        }
    }
}

impl Default for SearchKeybindings {
    fn default() -> Self {
        Self {
            toggle: Key::new(KeyCode::Char('/')).into(),
            exit: Key::new(KeyCode::Esc).into(),
        }
    }
}

impl Default for ServerListKeybindings {
    fn default() -> Self {
        Self {
            edit: Key::new(KeyCode::Char('e')).into(),
            reload: Key::new(KeyCode::Char('r')).into(),
        }
    }
}

impl Default for FormKeybindings {
    fn default() -> Self {
        Self {
            next_field: Key::new(KeyCode::Tab).into(),
            prev_field: Key::new(KeyCode::BackTab).into(),
            submit: Key::with_ctrl(KeyCode::Char('s')).into(),
            paste: Key::with_ctrl(KeyCode::Char('v')).into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            dismiss: Key::new(KeyCode::Esc).into(),
        }
    }
}
