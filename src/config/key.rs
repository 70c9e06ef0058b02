//! Key descriptions as written in the config file, e.g. `ctrl+s` or `shift+Tab`.

use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

/// Named keys, matched case-insensitively. The first name listed for a code
/// is the one displayed.
const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("Enter", KeyCode::Enter),
    ("Return", KeyCode::Enter),
    ("Esc", KeyCode::Esc),
    ("Escape", KeyCode::Esc),
    ("Tab", KeyCode::Tab),
    ("BackTab", KeyCode::BackTab),
    ("Backspace", KeyCode::Backspace),
    ("Delete", KeyCode::Delete),
    ("Del", KeyCode::Delete),
    ("Insert", KeyCode::Insert),
    ("Ins", KeyCode::Insert),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
    ("PageUp", KeyCode::PageUp),
    ("PgUp", KeyCode::PageUp),
    ("PageDown", KeyCode::PageDown),
    ("PgDn", KeyCode::PageDown),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
    ("Space", KeyCode::Char(' ')),
];

/// Display order matters: `ctrl+alt+shift+x`.
const MODIFIERS: &[(&str, KeyModifiers)] = &[
    ("ctrl", KeyModifiers::CONTROL),
    ("control", KeyModifiers::CONTROL),
    ("alt", KeyModifiers::ALT),
    ("shift", KeyModifiers::SHIFT),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn with_ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        normalized(self.code, self.modifiers) == normalized(event.code, event.modifiers)
    }

    pub fn display(&self) -> String {
        self.to_string()
    }
}

/// Terminals disagree on whether SHIFT accompanies characters and BackTab,
/// so it is dropped for those and letters compare case-insensitively.
fn normalized(code: KeyCode, modifiers: KeyModifiers) -> (KeyCode, KeyModifiers) {
    match code {
        KeyCode::Char(c) => (
            KeyCode::Char(c.to_ascii_lowercase()),
            modifiers.difference(KeyModifiers::SHIFT),
        ),
        KeyCode::BackTab => (code, modifiers.difference(KeyModifiers::SHIFT)),
        _ => (code, modifiers),
    }
}

fn parse_modifier(name: &str) -> Result<KeyModifiers, String> {
    let name = name.trim();
    MODIFIERS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, m)| m)
        .ok_or_else(|| format!("Unknown modifier: {name}"))
}

fn parse_code(name: &str) -> Result<KeyCode, String> {
    if let Some(&(_, code)) = NAMED_KEYS.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
        return Ok(code);
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        // Case is kept so "G" binds the shifted letter.
        (Some(c), None) => Ok(KeyCode::Char(c)),
        (Some('f' | 'F'), Some(_)) => name[1..]
            .parse()
            .map(KeyCode::F)
            .map_err(|_| format!("Invalid function key: {name}")),
        _ => Err(format!("Unknown key: {name}")),
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (prefix, name) = match s.rsplit_once('+') {
            Some((prefix, name)) => (Some(prefix), name),
            None => (None, s),
        };

        let mut modifiers = KeyModifiers::NONE;
        for part in prefix.into_iter().flat_map(|p| p.split('+')) {
            modifiers |= parse_modifier(part)?;
        }

        let mut code = parse_code(name.trim())?;
        if code == KeyCode::Tab && modifiers.contains(KeyModifiers::SHIFT) {
            code = KeyCode::BackTab;
            modifiers.remove(KeyModifiers::SHIFT);
        }
        Ok(Self { code, modifiers })
    }
}

impl TryFrom<String> for Key {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shown = KeyModifiers::NONE;
        for &(name, flag) in MODIFIERS {
            if self.modifiers.contains(flag) && !shown.contains(flag) {
                write!(f, "{name}+")?;
                shown |= flag;
            }
        }
        match self.code {
            KeyCode::BackTab => f.write_str("shift+Tab"),
            KeyCode::F(n) => write!(f, "F{n}"),
            KeyCode::Char(c) if c != ' ' => write!(f, "{c}"),
            code => {
                let name = NAMED_KEYS
                    .iter()
                    .find(|&&(_, k)| k == code)
                    .map_or("?", |&(n, _)| n);
                f.write_str(name)
            }
        }
    }
}

/// One key or a list of alternatives, e.g. `["Tab", "ctrl+n"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyBinding {
    Single(Key),
    Multiple(Vec<Key>),
}

impl KeyBinding {
    pub fn multiple(keys: Vec<Key>) -> Self {
        Self::Multiple(keys)
    }

    fn keys(&self) -> &[Key] {
        match self {
            Self::Single(key) => std::slice::from_ref(key),
            Self::Multiple(keys) => keys,
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.keys().iter().any(|k| k.matches(event))
    }

    pub fn display(&self) -> String {
        self.keys()
            .iter()
            .map(Key::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl From<Key> for KeyBinding {
    fn from(key: Key) -> Self {
        Self::Single(key)
    }
}
