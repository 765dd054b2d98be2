//! Configuration system tests
//!
//! Tests for config paths and mappings-file loading, fallback and reload.

use std::fs;

use shellflow_keys::config_paths;
use shellflow_keys::keymap::{
    load_mapping_table, load_table_file, Action, ActiveContextSet, ContextFlag, GroupSource,
    KeyChord, KeymapError, Modifiers, SharedKeymap,
};
use tempfile::tempdir;

fn cmd(c: char) -> KeyChord {
    KeyChord::char_with_mods(c, Modifiers::CMD)
}

fn drawer() -> ActiveContextSet {
    ActiveContextSet::new()
        .with(ContextFlag::DrawerFocused)
        .with(ContextFlag::DrawerOpen)
}

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_dir_returns_some() {
    assert!(config_paths::config_dir().is_some());
}

#[test]
fn test_config_dir_contains_shellflow() {
    let dir = config_paths::config_dir().unwrap();
    assert!(dir.ends_with("shellflow"));
}

#[test]
fn test_config_dir_uses_dot_config_on_unix() {
    #[cfg(not(target_os = "windows"))]
    {
        if std::env::var_os("XDG_CONFIG_HOME").is_some_and(|v| !v.is_empty()) {
            return;
        }
        let dir = config_paths::config_dir().unwrap();
        assert!(
            dir.to_string_lossy().contains(".config"),
            "Expected .config in path, got: {}",
            dir.display()
        );
    }
}

#[test]
fn test_mappings_file_is_in_config_dir() {
    let config = config_paths::config_dir().unwrap();
    let path = config_paths::mappings_file().unwrap();
    assert!(path.starts_with(&config));
    assert!(path.to_string_lossy().ends_with("mappings.yaml"));
}

#[test]
fn test_logs_dir_is_subdir_of_config() {
    let config = config_paths::config_dir().unwrap();
    let logs = config_paths::logs_dir().unwrap();
    assert!(logs.starts_with(&config));
}

// ========================================================================
// Mappings File Loading Tests
// ========================================================================

#[test]
fn test_missing_user_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let loaded = load_mapping_table(Some(&dir.path().join("mappings.yaml")));

    assert!(loaded.user_error.is_none());
    assert_eq!(loaded.table.user_group_count(), 0);
    assert_eq!(
        loaded.table.resolve(&cmd('q'), &ActiveContextSet::EMPTY),
        Some(&Action::Quit)
    );
}

#[test]
fn test_user_file_is_merged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mappings.yaml");
    fs::write(
        &path,
        r#"
- context: drawerFocused
  bindings:
    cmd-k: drawer::closeTab
    cmd-w: null
"#,
    )
    .unwrap();

    let loaded = load_mapping_table(Some(&path));
    assert!(loaded.user_error.is_none());
    assert_eq!(loaded.table.user_group_count(), 1);
    assert_eq!(
        loaded.table.resolve(&cmd('k'), &drawer()),
        Some(&Action::CloseDrawerTab)
    );
    assert_eq!(loaded.table.resolve(&cmd('w'), &drawer()), None);
}

#[test]
fn test_wrapped_groups_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mappings.yaml");
    fs::write(
        &path,
        "groups:\n  - bindings:\n      cmd-k: palette::toggle\n",
    )
    .unwrap();

    let groups = load_table_file(&path).unwrap();
    assert_eq!(groups.len(), 1);
    assert!(groups[0].context.is_none());
}

#[test]
fn test_json_mappings_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mappings.json");
    fs::write(
        &path,
        r#"[{"context": "pickerOpen", "bindings": {"ctrl-g": "app::dismiss"}}]"#,
    )
    .unwrap();

    let loaded = load_mapping_table(Some(&path));
    assert!(loaded.user_error.is_none());
    let picker = ActiveContextSet::new().with(ContextFlag::PickerOpen);
    let ctrl_g = KeyChord::char_with_mods('g', Modifiers::CTRL);
    assert_eq!(
        loaded.table.resolve(&ctrl_g, &picker),
        Some(&Action::DismissOverlay)
    );
}

#[test]
fn test_invalid_context_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mappings.yaml");
    fs::write(
        &path,
        r#"
- bindings:
    cmd-q: null
- context: drawerFocused &&
  bindings:
    cmd-w: drawer::closeTab
"#,
    )
    .unwrap();

    let loaded = load_mapping_table(Some(&path));
    let error = loaded.user_error.expect("broken file should report an error");
    assert!(matches!(error, KeymapError::Expr { .. }), "{error}");
    assert_eq!(error.table(), Some(GroupSource::User));

    // None of the user groups were admitted, including the valid first one
    assert_eq!(loaded.table.user_group_count(), 0);
    assert_eq!(
        loaded.table.resolve(&cmd('q'), &ActiveContextSet::EMPTY),
        Some(&Action::Quit)
    );
}

#[test]
fn test_malformed_yaml_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mappings.yaml");
    fs::write(&path, "- bindings: [not, a, map\n").unwrap();

    let loaded = load_mapping_table(Some(&path));
    assert!(matches!(loaded.user_error, Some(KeymapError::Parse(_))));
    assert!(!loaded.table.is_empty());
}

#[test]
fn test_invalid_chord_and_action_are_reported() {
    let dir = tempdir().unwrap();

    let chord_path = dir.path().join("chord.yaml");
    fs::write(&chord_path, "- bindings:\n    hyper-k: app::quit\n").unwrap();
    let error = load_mapping_table(Some(&chord_path)).user_error.unwrap();
    assert!(matches!(error, KeymapError::InvalidChord { .. }), "{error}");

    let action_path = dir.path().join("action.yaml");
    fs::write(&action_path, "- bindings:\n    cmd-k: quit\n").unwrap();
    let error = load_mapping_table(Some(&action_path)).user_error.unwrap();
    assert!(matches!(error, KeymapError::InvalidAction { .. }), "{error}");
}

#[test]
fn test_unreadable_path_is_io_error() {
    let dir = tempdir().unwrap();
    // A directory exists but can't be read as a file
    let error = load_table_file(dir.path()).unwrap_err();
    assert!(matches!(error, KeymapError::Io { .. }), "{error}");
}

// ========================================================================
// Reload Tests
// ========================================================================

#[test]
fn test_shared_keymap_reload_picks_up_edits() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mappings.yaml");
    fs::write(&path, "- bindings:\n    cmd-k: palette::toggle\n").unwrap();

    let (keymap, error) = SharedKeymap::load(Some(path.clone()));
    assert!(error.is_none());
    assert_eq!(
        keymap.resolve(&cmd('k'), &ActiveContextSet::EMPTY),
        Some(Action::TogglePalette)
    );

    fs::write(&path, "- bindings:\n    cmd-k: task::run\n").unwrap();
    assert!(keymap.reload().is_none());
    assert_eq!(
        keymap.resolve(&cmd('k'), &ActiveContextSet::EMPTY),
        Some(Action::RunTask)
    );
}

#[test]
fn test_shared_keymap_reload_of_broken_file_reverts_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mappings.yaml");
    fs::write(&path, "- bindings:\n    cmd-k: palette::toggle\n").unwrap();

    let (keymap, _) = SharedKeymap::load(Some(path.clone()));
    let before = keymap.version();

    fs::write(&path, "- context: nope\n  bindings:\n    cmd-k: task::run\n").unwrap();
    let error = keymap.reload().expect("broken file should report an error");
    assert!(error.is_unknown_flag());
    assert!(keymap.version() > before);

    assert_eq!(keymap.resolve(&cmd('k'), &ActiveContextSet::EMPTY), None);
    assert_eq!(
        keymap.resolve(&cmd('q'), &ActiveContextSet::EMPTY),
        Some(Action::Quit)
    );
}
