//! Default mapping table and user-table loading
//!
//! The default table ships embedded in the binary. A user table is merged
//! on top of it; a broken user table degrades to defaults only.

use std::path::Path;

use super::config::{load_table_file, parse_table_yaml, GroupConfig, KeymapError};
use super::keymap::{build_table, MappingTable};

/// Default mapping YAML embedded at compile time
const DEFAULT_KEYMAP_YAML: &str = include_str!("../../keymap.yaml");

/// Raw text of the embedded default table
pub fn get_default_keymap_yaml() -> &'static str {
    DEFAULT_KEYMAP_YAML
}

/// Parse the embedded default groups
pub fn default_groups() -> Result<Vec<GroupConfig>, KeymapError> {
    parse_table_yaml(DEFAULT_KEYMAP_YAML)
}

/// A loaded table plus any error that made us fall back to defaults
#[derive(Debug)]
pub struct LoadedKeymap {
    pub table: MappingTable,
    /// Why the user table was not applied, for user-visible reporting
    pub user_error: Option<KeymapError>,
}

/// Load defaults and merge the user table at `user_path`, if any
///
/// A missing user file is not an error. An unreadable or invalid user file
/// yields the default-only table together with the error.
pub fn load_mapping_table(user_path: Option<&Path>) -> LoadedKeymap {
    let defaults = match default_groups() {
        Ok(groups) => groups,
        Err(e) => {
            tracing::error!("Failed to parse embedded keymap: {}", e);
            Vec::new()
        }
    };

    let default_table = || match build_table(&defaults, &[]) {
        Ok(table) => table,
        Err(e) => {
            tracing::error!("Embedded keymap is invalid: {}", e);
            MappingTable::empty()
        }
    };

    let Some(path) = user_path.filter(|path| path.exists()) else {
        if let Some(path) = user_path {
            tracing::debug!("No user mappings at {}, using defaults", path.display());
        }
        let table = default_table();
        tracing::info!("Loaded default keymap ({} groups)", table.groups().len());
        return LoadedKeymap {
            table,
            user_error: None,
        };
    };

    match load_table_file(path).and_then(|user| build_table(&defaults, &user)) {
        Ok(table) => {
            tracing::info!(
                "Merged user mappings from {} ({} groups)",
                path.display(),
                table.user_group_count()
            );
            LoadedKeymap {
                table,
                user_error: None,
            }
        }
        Err(e) => {
            tracing::warn!(
                "Ignoring user mappings from {}: {}; using defaults",
                path.display(),
                e
            );
            LoadedKeymap {
                table: default_table(),
                user_error: Some(e),
            }
        }
    }
}
