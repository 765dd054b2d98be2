//! Core types for the keymap system: KeyChord, Modifiers, KeyCode

use std::fmt;

/// Modifier keys as a bitfield for efficient storage and comparison
///
/// Bit order doubles as the canonical display order: cmd, ctrl, alt, shift.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CMD: Modifiers = Modifiers(0b0001); // Cmd on macOS, Super/Win elsewhere
    pub const CTRL: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const SHIFT: Modifiers = Modifiers(0b1000);

    /// Create modifiers from individual flags
    pub const fn new(cmd: bool, ctrl: bool, alt: bool, shift: bool) -> Self {
        let mut bits = 0u8;
        if cmd {
            bits |= 0b0001;
        }
        if ctrl {
            bits |= 0b0010;
        }
        if alt {
            bits |= 0b0100;
        }
        if shift {
            bits |= 0b1000;
        }
        Modifiers(bits)
    }

    #[inline]
    pub const fn cmd(self) -> bool {
        self.0 & 0b0001 != 0
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0010 != 0
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0100 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b1000 != 0
    }

    /// Check if no modifiers are held
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    /// Check if this contains all modifiers in other
    #[inline]
    pub const fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    /// The platform "primary" modifier: Cmd on macOS, Ctrl elsewhere
    pub fn platform_primary() -> Modifiers {
        if cfg!(target_os = "macos") {
            Modifiers::CMD
        } else {
            Modifiers::CTRL
        }
    }

    /// Modifier names in canonical order
    fn names(self) -> impl Iterator<Item = (&'static str, &'static str)> {
        [
            (self.cmd(), "cmd", "Cmd"),
            (self.ctrl(), "ctrl", "Ctrl"),
            (self.alt(), "alt", "Alt"),
            (self.shift(), "shift", "Shift"),
        ]
        .into_iter()
        .filter(|(held, _, _)| *held)
        .map(|(_, token, label)| (token, label))
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.names().map(|(token, _)| token).collect();
        write!(f, "{}", parts.join("-"))
    }
}

/// The base key of a chord
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    /// A printable character key (letters normalized to lowercase)
    Char(char),

    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,

    Up,
    Down,
    Left,
    Right,

    Home,
    End,
    PageUp,
    PageDown,

    F(u8), // F1-F24
}

impl KeyCode {
    /// Label used in menu accelerators (`Cmd+Shift+W`)
    fn accelerator_label(self) -> String {
        match self {
            KeyCode::Char(c) => c.to_uppercase().to_string(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Escape => "Escape".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::Backspace => "Backspace".into(),
            KeyCode::Delete => "Delete".into(),
            KeyCode::Space => "Space".into(),
            KeyCode::Up => "Up".into(),
            KeyCode::Down => "Down".into(),
            KeyCode::Left => "Left".into(),
            KeyCode::Right => "Right".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::PageUp => "PageUp".into(),
            KeyCode::PageDown => "PageDown".into(),
            KeyCode::F(n) => format!("F{}", n),
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::Enter => write!(f, "enter"),
            KeyCode::Escape => write!(f, "escape"),
            KeyCode::Tab => write!(f, "tab"),
            KeyCode::Backspace => write!(f, "backspace"),
            KeyCode::Delete => write!(f, "delete"),
            KeyCode::Space => write!(f, "space"),
            KeyCode::Up => write!(f, "up"),
            KeyCode::Down => write!(f, "down"),
            KeyCode::Left => write!(f, "left"),
            KeyCode::Right => write!(f, "right"),
            KeyCode::Home => write!(f, "home"),
            KeyCode::End => write!(f, "end"),
            KeyCode::PageUp => write!(f, "pageup"),
            KeyCode::PageDown => write!(f, "pagedown"),
            KeyCode::F(n) => write!(f, "f{}", n),
        }
    }
}

/// A normalized key combination: modifier set plus one base key
///
/// Two textual encodings that normalize to the same modifiers and key
/// (`Cmd+W`, `cmd-w`) compare equal and hash identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: KeyCode,
    pub mods: Modifiers,
}

impl KeyChord {
    pub const fn new(key: KeyCode, mods: Modifiers) -> Self {
        Self { key, mods }
    }

    /// Create a chord with no modifiers
    pub const fn key(key: KeyCode) -> Self {
        Self {
            key,
            mods: Modifiers::NONE,
        }
    }

    /// Create a chord with a character key and modifiers
    pub fn char_with_mods(c: char, mods: Modifiers) -> Self {
        Self {
            key: KeyCode::Char(c.to_ascii_lowercase()),
            mods,
        }
    }

    /// Render in menu accelerator form, e.g. `Cmd+Shift+W`
    pub fn to_accelerator(&self) -> String {
        let mut parts: Vec<String> = self
            .mods
            .names()
            .map(|(_, label)| label.to_string())
            .collect();
        parts.push(self.key.accelerator_label());
        parts.join("+")
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}-{}", self.mods, self.key)
        }
    }
}

impl PartialOrd for KeyChord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyChord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.mods.0.cmp(&other.mods.0))
    }
}
