//! Binding groups: a context expression paired with a chord → action table

use std::collections::HashMap;
use std::fmt;

use super::command::Action;
use super::config::{parse_chord, GroupConfig, KeymapError};
use super::context::ActiveContextSet;
use super::expr::{evaluate, ContextExpr};
use super::types::KeyChord;

/// Which table a group was declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupSource {
    Default,
    User,
}

impl fmt::Display for GroupSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupSource::Default => write!(f, "default"),
            GroupSource::User => write!(f, "user"),
        }
    }
}

/// Identity of a group within a mapping table, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupRef {
    pub source: GroupSource,
    /// Index within its source table
    pub index: usize,
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} group #{}", self.source, self.index)
    }
}

/// What a chord does inside one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Action(Action),
    /// Explicitly unbound: stops resolution without an action
    Unbound,
}

impl Binding {
    pub fn action(&self) -> Option<&Action> {
        match self {
            Binding::Action(action) => Some(action),
            Binding::Unbound => None,
        }
    }
}

/// A compiled, validated binding group
#[derive(Debug, Clone)]
pub struct BindingGroup {
    id: GroupRef,
    context: Option<ContextExpr>,
    bindings: HashMap<KeyChord, Binding>,
}

impl BindingGroup {
    /// Compile a group from its textual form
    ///
    /// Fails on a malformed or unknown-flag context, an unparsable chord,
    /// a malformed action id, or the same chord bound twice in this group.
    pub fn compile(id: GroupRef, config: &GroupConfig) -> Result<Self, KeymapError> {
        let context = config
            .context
            .as_deref()
            .map(|text| {
                ContextExpr::parse(text).map_err(|source| KeymapError::Expr {
                    table: id.source,
                    group: id.index,
                    context: text.to_string(),
                    source,
                })
            })
            .transpose()?;

        let mut bindings = HashMap::with_capacity(config.bindings.len());
        for (chord_text, action_text) in &config.bindings {
            let chord = parse_chord(chord_text).map_err(|source| KeymapError::InvalidChord {
                table: id.source,
                group: id.index,
                chord: chord_text.clone(),
                source,
            })?;

            let binding = match action_text.as_deref().map(str::trim) {
                None | Some("unbound") => Binding::Unbound,
                Some(text) => {
                    let action = text.parse::<Action>().map_err(|source| {
                        KeymapError::InvalidAction {
                            table: id.source,
                            group: id.index,
                            source,
                        }
                    })?;
                    if !action.is_builtin() {
                        tracing::debug!("{}: `{}` is not a built-in action", id, action);
                    }
                    Binding::Action(action)
                }
            };

            if bindings.insert(chord, binding).is_some() {
                return Err(KeymapError::DuplicateChord {
                    table: id.source,
                    group: id.index,
                    chord,
                });
            }
        }

        Ok(Self {
            id,
            context,
            bindings,
        })
    }

    pub fn id(&self) -> GroupRef {
        self.id
    }

    pub fn context(&self) -> Option<&ContextExpr> {
        self.context.as_ref()
    }

    /// Whether this group's context holds (absent context always holds)
    pub fn is_active(&self, active: &ActiveContextSet) -> bool {
        evaluate(self.context.as_ref(), active)
    }

    pub fn get(&self, chord: &KeyChord) -> Option<&Binding> {
        self.bindings.get(chord)
    }

    /// Bindings in canonical chord order
    pub fn bindings(&self) -> Vec<(KeyChord, &Binding)> {
        let mut entries: Vec<_> = self
            .bindings
            .iter()
            .map(|(chord, binding)| (*chord, binding))
            .collect();
        entries.sort_by_key(|(chord, _)| *chord);
        entries
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
