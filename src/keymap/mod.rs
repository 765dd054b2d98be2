//! Context-aware keybinding engine
//!
//! Maps a key chord plus the current UI state to at most one action:
//! - Context flags are derived from a snapshot of UI state
//! - Binding groups carry an optional boolean context expression
//! - User groups are appended after the defaults; later groups win
//! - A null binding unbinds a chord and stops resolution
//!
//! # Architecture
//!
//! ```text
//! StateSnapshot → ActiveContextSet ─┐
//!                                   ├→ MappingTable::resolve() → Option<Action>
//! key event → KeyChord ─────────────┘                  │
//!                                                      └→ ActionRouter::dispatch()
//! ```
//!
//! # Loading Keymaps
//!
//! ```ignore
//! // Defaults only
//! let table = build_table(&default_groups()?, &[])?;
//!
//! // Defaults merged with the user file, falling back on error
//! let loaded = load_mapping_table(config_paths::mappings_file().as_deref());
//! ```

mod binding;
mod command;
mod config;
mod context;
mod defaults;
mod expr;
#[allow(clippy::module_inception)]
mod keymap;
mod router;
mod shared;
mod types;

pub use binding::{Binding, BindingGroup, GroupRef, GroupSource};
pub use command::{Action, ActionIdError};
pub use config::{
    load_table_file, parse_chord, parse_table_yaml, ChordError, GroupConfig, KeymapError,
};
pub use context::{
    compute_active_contexts, ActiveContextSet, ContextFlag, FocusedEntity, FocusedView,
    StateSnapshot,
};
pub use defaults::{default_groups, get_default_keymap_yaml, load_mapping_table, LoadedKeymap};
pub use expr::{evaluate, ContextExpr, ExprError};
pub use keymap::{build_table, EffectiveBinding, MappingTable, Resolution};
pub use router::{ActionRouter, Dispatch};
pub use shared::{KeymapVersion, SharedKeymap};
pub use types::{KeyChord, KeyCode, Modifiers};
