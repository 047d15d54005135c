//! Key alphabet understood by the typing engine
//!
//! Keys arrive either from the terminal listener or as browser-style key
//! names ("a", "Backspace", "Enter", "Shift", "ArrowLeft", ...).

use std::fmt;

/// Name of the explicit auto-type trigger input
pub const AI_TRIGGER: &str = "AI_TRIGGER";

/// Modifier keys: highlighted on the keyboard, never printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Shift,
    Control,
    Alt,
    Meta,
    CapsLock,
    Tab,
}

impl Modifier {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Shift" => Some(Modifier::Shift),
            "Control" => Some(Modifier::Control),
            "Alt" => Some(Modifier::Alt),
            "Meta" => Some(Modifier::Meta),
            "CapsLock" => Some(Modifier::CapsLock),
            "Tab" => Some(Modifier::Tab),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Modifier::Shift => "shift",
            Modifier::Control => "control",
            Modifier::Alt => "alt",
            Modifier::Meta => "meta",
            Modifier::CapsLock => "capslock",
            Modifier::Tab => "tab",
        }
    }
}

/// A single key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character (space included)
    Char(char),
    Backspace,
    Enter,
    Escape,
    Modifier(Modifier),
    /// Explicit request to auto-type, same as Ctrl+Enter
    AiTrigger,
    /// Arrows, function keys and anything else with a multi-character name
    Other(String),
}

impl Key {
    /// Parse a browser-style key name
    ///
    /// Single characters are printable unless they are control characters.
    pub fn from_name(name: &str) -> Self {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Key::from_char(c);
        }

        match name {
            "Backspace" => Key::Backspace,
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            "Space" => Key::Char(' '),
            AI_TRIGGER => Key::AiTrigger,
            other => match Modifier::from_name(other) {
                Some(modifier) => Key::Modifier(modifier),
                None => Key::Other(other.to_string()),
            },
        }
    }

    /// Map a raw character, folding control characters onto their keys
    pub fn from_char(c: char) -> Self {
        match c {
            '\n' | '\r' => Key::Enter,
            '\t' => Key::Modifier(Modifier::Tab),
            '\u{8}' | '\u{7f}' => Key::Backspace,
            '\u{1b}' => Key::Escape,
            c if c.is_control() => Key::Other(c.to_string()),
            c => Key::Char(c),
        }
    }

    /// Lowercase label used by the keyboard highlight
    pub fn label(&self) -> String {
        match self {
            Key::Char(' ') => "space".to_string(),
            Key::Char(c) => c.to_lowercase().collect(),
            Key::Backspace => "backspace".to_string(),
            Key::Enter => "enter".to_string(),
            Key::Escape => "escape".to_string(),
            Key::Modifier(m) => m.name().to_string(),
            Key::AiTrigger => "ai".to_string(),
            Key::Other(name) => name.to_lowercase(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{:?}", c),
            other => write!(f, "{}", other.label()),
        }
    }
}

/// A key together with the shortcut modifier state
///
/// `ctrl` is true when Control (or Command on macOS) was held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub ctrl: bool,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self { key, ctrl: false }
    }

    pub fn with_ctrl(key: Key) -> Self {
        Self { key, ctrl: true }
    }

    /// Parse a key name, e.g. `KeyInput::named("Enter", true)` for Ctrl+Enter
    pub fn named(name: &str, ctrl: bool) -> Self {
        Self {
            key: Key::from_name(name),
            ctrl,
        }
    }

    /// Ctrl+Enter or the explicit trigger
    pub fn is_auto_type_trigger(&self) -> bool {
        matches!(self.key, Key::AiTrigger) || (self.ctrl && self.key == Key::Enter)
    }

    /// Ctrl+<c>, case-insensitive
    pub fn is_shortcut(&self, c: char) -> bool {
        self.ctrl && matches!(self.key, Key::Char(k) if k.eq_ignore_ascii_case(&c))
    }
}

impl From<Key> for KeyInput {
    fn from(key: Key) -> Self {
        KeyInput::new(key)
    }
}

impl From<char> for KeyInput {
    fn from(c: char) -> Self {
        KeyInput::new(Key::from_char(c))
    }
}
