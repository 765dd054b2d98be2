//! YAML configuration parsing for mapping tables
//!
//! A table is an ordered list of groups, each an optional context
//! expression plus a chord → action map:
//!
//! ```yaml
//! - bindings:
//!     cmd-w: session::closeTab
//! - context: drawerFocused && drawerOpen
//!   bindings:
//!     cmd-w: drawer::closeTab
//!     cmd-k: null   # unbind
//! ```
//!
//! JSON tables parse too, since JSON is valid YAML.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use super::binding::GroupSource;
use super::command::ActionIdError;
use super::expr::ExprError;
use super::types::{KeyCode, KeyChord, Modifiers};

/// A binding group as written in a mapping table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    #[serde(default)]
    pub context: Option<String>,
    /// Chord text → action id, in source order; `None` unbinds the chord
    #[serde(default, deserialize_with = "ordered_bindings")]
    pub bindings: Vec<(String, Option<String>)>,
}

impl GroupConfig {
    /// Unconditional group
    pub fn global() -> Self {
        Self::default()
    }

    /// Group scoped by a context expression
    pub fn when(context: &str) -> Self {
        Self {
            context: Some(context.to_string()),
            bindings: Vec::new(),
        }
    }

    /// Add a binding (builder pattern)
    pub fn bind(mut self, chord: &str, action: &str) -> Self {
        self.bindings
            .push((chord.to_string(), Some(action.to_string())));
        self
    }

    /// Add an explicit unbind (builder pattern)
    pub fn unbind(mut self, chord: &str) -> Self {
        self.bindings.push((chord.to_string(), None));
        self
    }
}

/// Root structure of a mapping file: a bare list, or `{ groups: [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TableConfig {
    Groups(Vec<GroupConfig>),
    Wrapped { groups: Vec<GroupConfig> },
}

/// Deserialize a map into ordered pairs, keeping duplicates for validation
fn ordered_bindings<'de, D>(deserializer: D) -> Result<Vec<(String, Option<String>)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, Option<String>)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of key chords to action ids")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((chord, action)) = map.next_entry::<String, Option<String>>()? {
                pairs.push((chord, action));
            }
            Ok(pairs)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(PairsVisitor)
}

/// Errors that can occur when loading or building mapping tables
#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse mapping table: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{table} group #{group}: invalid context `{context}`: {source}")]
    Expr {
        table: GroupSource,
        group: usize,
        context: String,
        #[source]
        source: ExprError,
    },
    #[error("{table} group #{group}: invalid key chord `{chord}`: {source}")]
    InvalidChord {
        table: GroupSource,
        group: usize,
        chord: String,
        #[source]
        source: ChordError,
    },
    #[error("{table} group #{group}: chord `{chord}` is bound more than once")]
    DuplicateChord {
        table: GroupSource,
        group: usize,
        chord: KeyChord,
    },
    #[error("{table} group #{group}: {source}")]
    InvalidAction {
        table: GroupSource,
        group: usize,
        #[source]
        source: ActionIdError,
    },
}

impl KeymapError {
    /// Which table the error came from, if it is a table-building error
    pub fn table(&self) -> Option<GroupSource> {
        match self {
            KeymapError::Expr { table, .. }
            | KeymapError::InvalidChord { table, .. }
            | KeymapError::DuplicateChord { table, .. }
            | KeymapError::InvalidAction { table, .. } => Some(*table),
            KeymapError::Io { .. } | KeymapError::Parse(_) => None,
        }
    }

    /// True when a context expression named a flag that does not exist
    pub fn is_unknown_flag(&self) -> bool {
        matches!(
            self,
            KeymapError::Expr {
                source: ExprError::UnknownFlag { .. },
                ..
            }
        )
    }
}

/// Errors from parsing chord text like `cmd-shift-w`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordError {
    #[error("empty chord")]
    Empty,
    #[error("no key after modifiers")]
    MissingKey,
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    #[error("modifier `{0}` repeated")]
    RepeatedModifier(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

/// Load groups from a YAML (or JSON) file
pub fn load_table_file(path: &Path) -> Result<Vec<GroupConfig>, KeymapError> {
    let content = std::fs::read_to_string(path).map_err(|source| KeymapError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_table_yaml(&content)
}

/// Parse groups from a YAML string
///
/// An empty document is an empty table.
pub fn parse_table_yaml(yaml: &str) -> Result<Vec<GroupConfig>, KeymapError> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }

    let config: TableConfig = serde_yaml::from_str(yaml)?;
    Ok(match config {
        TableConfig::Groups(groups) | TableConfig::Wrapped { groups } => groups,
    })
}

/// Parse a chord string like `cmd-shift-w` or `Ctrl+Alt+Left`
///
/// Modifiers come first, separated from each other and from the key by
/// `-` or `+`. The key itself may be `-` or `+` (`cmd--` is cmd + minus).
pub fn parse_chord(text: &str) -> Result<KeyChord, ChordError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ChordError::Empty);
    }

    let mut mods = Modifiers::NONE;
    let mut rest = text;

    // A separator at index 0 is the key itself, never a separator
    while let Some((idx, _)) = rest
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '-' || c == '+')
    {
        if idx + 1 == rest.len() {
            return Err(ChordError::MissingKey);
        }

        let token = &rest[..idx];
        let modifier =
            parse_modifier(token).ok_or_else(|| ChordError::UnknownModifier(token.to_string()))?;
        if mods.contains(modifier) {
            return Err(ChordError::RepeatedModifier(token.to_string()));
        }
        mods = mods | modifier;
        rest = &rest[idx + 1..];
    }

    Ok(KeyChord::new(parse_key_code(rest)?, mods))
}

fn parse_modifier(token: &str) -> Option<Modifiers> {
    match token.to_lowercase().as_str() {
        "cmd" | "command" | "meta" | "super" => Some(Modifiers::CMD),
        "ctrl" | "control" => Some(Modifiers::CTRL),
        "alt" | "option" | "opt" => Some(Modifiers::ALT),
        "shift" => Some(Modifiers::SHIFT),
        "mod" | "cmdorctrl" | "cmdorcontrol" => Some(Modifiers::platform_primary()),
        _ => None,
    }
}

/// Parse a key code from string
fn parse_key_code(key: &str) -> Result<KeyCode, ChordError> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_whitespace() || c.is_control() {
            return Err(ChordError::UnknownKey(key.to_string()));
        }
        return Ok(KeyCode::Char(c.to_ascii_lowercase()));
    }

    let lower = key.to_lowercase();
    match lower.as_str() {
        "enter" | "return" => Ok(KeyCode::Enter),
        "escape" | "esc" => Ok(KeyCode::Escape),
        "tab" => Ok(KeyCode::Tab),
        "backspace" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "space" => Ok(KeyCode::Space),

        "up" | "arrowup" => Ok(KeyCode::Up),
        "down" | "arrowdown" => Ok(KeyCode::Down),
        "left" | "arrowleft" => Ok(KeyCode::Left),
        "right" | "arrowright" => Ok(KeyCode::Right),

        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "pgup" => Ok(KeyCode::PageUp),
        "pagedown" | "pgdown" | "pgdn" => Ok(KeyCode::PageDown),

        "minus" => Ok(KeyCode::Char('-')),
        "plus" => Ok(KeyCode::Char('+')),
        "equal" | "equals" => Ok(KeyCode::Char('=')),
        "backquote" | "backtick" => Ok(KeyCode::Char('`')),

        _ => lower
            .strip_prefix('f')
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=24).contains(n))
            .map(KeyCode::F)
            .ok_or_else(|| ChordError::UnknownKey(key.to_string())),
    }
}

impl std::str::FromStr for KeyChord {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_chord(s)
    }
}
