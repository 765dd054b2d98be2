//! The live mapping table, shared between the input path and the reloader
//!
//! Readers take a cheap `Arc` snapshot; the writer builds a complete new
//! table and swaps the reference, so a reader never sees a partial table.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::command::Action;
use super::config::KeymapError;
use super::context::ActiveContextSet;
use super::defaults::load_mapping_table;
use super::keymap::MappingTable;
use super::types::KeyChord;

/// Identifies which table is live; bumped on every swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeymapVersion(pub u64);

#[derive(Debug)]
pub struct SharedKeymap {
    current: RwLock<Arc<MappingTable>>,
    version: AtomicU64,
    user_path: Option<PathBuf>,
}

impl SharedKeymap {
    /// Wrap an already-built table, with no user file to reload from
    pub fn new(table: MappingTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
            version: AtomicU64::new(0),
            user_path: None,
        }
    }

    /// Load defaults merged with the user table at `user_path`
    ///
    /// Returns the error that forced a default-only table, if any.
    pub fn load(user_path: Option<PathBuf>) -> (Self, Option<KeymapError>) {
        let loaded = load_mapping_table(user_path.as_deref());
        let shared = Self {
            current: RwLock::new(Arc::new(loaded.table)),
            version: AtomicU64::new(0),
            user_path,
        };
        (shared, loaded.user_error)
    }

    /// Snapshot of the live table
    pub fn current(&self) -> Arc<MappingTable> {
        Arc::clone(&self.current.read())
    }

    pub fn version(&self) -> KeymapVersion {
        KeymapVersion(self.version.load(Ordering::Acquire))
    }

    pub fn user_path(&self) -> Option<&Path> {
        self.user_path.as_deref()
    }

    /// Swap in a new table wholesale
    pub fn replace(&self, table: MappingTable) -> KeymapVersion {
        let table = Arc::new(table);
        let mut current = self.current.write();
        *current = table;
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!("Swapped keymap, now version {}", version);
        KeymapVersion(version)
    }

    /// Rebuild from defaults and the user file, then swap
    ///
    /// Always swaps: on a broken user file the live table becomes the
    /// default-only table and the error is returned for reporting.
    pub fn reload(&self) -> Option<KeymapError> {
        let loaded = load_mapping_table(self.user_path.as_deref());
        self.replace(loaded.table);
        loaded.user_error
    }

    /// Resolve against the live table
    pub fn resolve(&self, chord: &KeyChord, active: &ActiveContextSet) -> Option<Action> {
        self.current().resolve(chord, active).cloned()
    }
}
