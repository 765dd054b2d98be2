//! shellflow-keys - context-aware keybinding engine
//!
//! This crate maps key chords to namespaced actions depending on which
//! parts of the UI are focused or open, with user tables layered over
//! built-in defaults.

pub mod cli;
pub mod config_paths;
pub mod fs_watcher;
pub mod keymap;
pub mod tracing;

// Re-export commonly used types
pub use keymap::{
    compute_active_contexts, Action, ActiveContextSet, ContextExpr, KeyChord, MappingTable,
    SharedKeymap, StateSnapshot,
};
