//! Context system for conditional keybindings
//!
//! Application state is reduced to a set of named boolean flags. Binding
//! groups are scoped by expressions over these flags (see `expr`).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use strum::{EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Named boolean facts about the current UI state
///
/// The set is closed: adding a flag is a schema change. Names are the
/// camelCase identifiers used in context expressions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumString,
    IntoStaticStr,
    EnumIter,
    EnumCount,
)]
#[strum(serialize_all = "camelCase")]
pub enum ContextFlag {
    // Entity focus (at most one)
    ScratchFocused,
    WorktreeFocused,
    ProjectFocused,

    // View focus (at most one)
    MainFocused,
    DrawerFocused,
    RightPanelFocused,

    // Panels
    DrawerOpen,
    DrawerExpanded,
    RightPanelOpen,

    // Overlays
    PickerOpen,
    ModalOpen,
    PaletteOpen,
    DiffViewOpen,

    // Derived
    HasMultipleEntities,
    HasPreviousView,
    CanGoBack,
    CanGoForward,
    HasChangedFiles,
}

const _: () = assert!(ContextFlag::COUNT <= 32);

impl ContextFlag {
    /// The identifier used in context expressions
    pub fn name(self) -> &'static str {
        self.into()
    }

    #[inline]
    const fn bit(self) -> u32 {
        1 << self as u32
    }
}

impl fmt::Display for ContextFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The flags considered true at one instant, stored as a bitset
///
/// The raw bits double as a cheap signature for memoizing evaluations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ActiveContextSet(u32);

impl ActiveContextSet {
    pub const EMPTY: ActiveContextSet = ActiveContextSet(0);

    pub fn new() -> Self {
        Self::EMPTY
    }

    #[inline]
    pub fn contains(&self, flag: ContextFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, flag: ContextFlag) {
        self.0 |= flag.bit();
    }

    #[inline]
    pub fn remove(&mut self, flag: ContextFlag) {
        self.0 &= !flag.bit();
    }

    /// Set or clear a flag
    pub fn set(&mut self, flag: ContextFlag, value: bool) {
        if value {
            self.insert(flag);
        } else {
            self.remove(flag);
        }
    }

    /// Builder-style variant of `insert`
    pub fn with(mut self, flag: ContextFlag) -> Self {
        self.insert(flag);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Active flags in declaration order
    pub fn iter(&self) -> impl Iterator<Item = ContextFlag> + '_ {
        ContextFlag::iter().filter(move |flag| self.contains(*flag))
    }
}

impl FromIterator<ContextFlag> for ActiveContextSet {
    fn from_iter<I: IntoIterator<Item = ContextFlag>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

impl fmt::Display for ActiveContextSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(ContextFlag::name).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Which kind of entity owns keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusedEntity {
    Scratch,
    Worktree,
    Project,
    /// Any entity kind this build doesn't know; sets no focus flag
    #[serde(other)]
    Unknown,
}

/// Which view inside the focused entity owns keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusedView {
    Main,
    Drawer,
    RightPanel,
    /// Any view this build doesn't know; sets no focus flag
    #[serde(other)]
    Unknown,
}

/// Boolean UI state supplied by the host application
///
/// Every field defaults, so a partial (or empty) snapshot is valid input.
/// Unknown fields are ignored, unknown focus values map to `Unknown` and
/// `null` reads as the field's default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StateSnapshot {
    pub focused_entity: Option<FocusedEntity>,
    pub focused_view: Option<FocusedView>,
    #[serde(deserialize_with = "null_as_default")]
    pub drawer_open: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub drawer_expanded: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub right_panel_open: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub picker_open: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub modal_open: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub palette_open: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub diff_view_open: bool,
    /// Number of open projects, worktrees and scratch terminals
    #[serde(deserialize_with = "null_as_default")]
    pub entity_count: usize,
    #[serde(deserialize_with = "null_as_default")]
    pub has_previous_view: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub can_go_back: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub can_go_forward: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub changed_file_count: usize,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Compute the active flag set for a state snapshot
///
/// Total: any snapshot yields a well-defined set. At most one entity-focus
/// flag and at most one view-focus flag is ever set. Focus on a closed
/// drawer or right panel falls back to the main view.
pub fn compute_active_contexts(state: &StateSnapshot) -> ActiveContextSet {
    let mut active = ActiveContextSet::new();

    let entity_flag = state.focused_entity.and_then(|entity| match entity {
        FocusedEntity::Scratch => Some(ContextFlag::ScratchFocused),
        FocusedEntity::Worktree => Some(ContextFlag::WorktreeFocused),
        FocusedEntity::Project => Some(ContextFlag::ProjectFocused),
        FocusedEntity::Unknown => None,
    });

    let drawer_open = state.drawer_open || state.drawer_expanded;
    let view_flag = state.focused_view.and_then(|view| match view {
        FocusedView::Unknown => None,
        FocusedView::Drawer if drawer_open => Some(ContextFlag::DrawerFocused),
        FocusedView::RightPanel if state.right_panel_open => {
            Some(ContextFlag::RightPanelFocused)
        }
        _ => Some(ContextFlag::MainFocused),
    });

    for flag in entity_flag.into_iter().chain(view_flag) {
        active.insert(flag);
    }

    active.set(ContextFlag::DrawerOpen, drawer_open);
    active.set(ContextFlag::DrawerExpanded, state.drawer_expanded);
    active.set(ContextFlag::RightPanelOpen, state.right_panel_open);
    active.set(ContextFlag::PickerOpen, state.picker_open);
    active.set(ContextFlag::ModalOpen, state.modal_open);
    active.set(ContextFlag::PaletteOpen, state.palette_open);
    active.set(ContextFlag::DiffViewOpen, state.diff_view_open);
    active.set(ContextFlag::HasMultipleEntities, state.entity_count > 1);
    active.set(ContextFlag::HasPreviousView, state.has_previous_view);
    active.set(ContextFlag::CanGoBack, state.can_go_back);
    active.set(ContextFlag::CanGoForward, state.can_go_forward);
    active.set(ContextFlag::HasChangedFiles, state.changed_file_count > 0);

    active
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTITY_FOCUS: [ContextFlag; 3] = [
        ContextFlag::ScratchFocused,
        ContextFlag::WorktreeFocused,
        ContextFlag::ProjectFocused,
    ];

    const VIEW_FOCUS: [ContextFlag; 3] = [
        ContextFlag::MainFocused,
        ContextFlag::DrawerFocused,
        ContextFlag::RightPanelFocused,
    ];

    fn count_of(active: ActiveContextSet, flags: &[ContextFlag]) -> usize {
        flags.iter().filter(|f| active.contains(**f)).count()
    }

    #[test]
    fn test_flag_names_are_camel_case() {
        assert_eq!(ContextFlag::DrawerFocused.name(), "drawerFocused");
        assert_eq!(ContextFlag::HasMultipleEntities.name(), "hasMultipleEntities");
        assert_eq!(
            "rightPanelOpen".parse::<ContextFlag>(),
            Ok(ContextFlag::RightPanelOpen)
        );
        assert!("DrawerFocused".parse::<ContextFlag>().is_err());
    }

    #[test]
    fn test_empty_snapshot_yields_empty_set() {
        let active = compute_active_contexts(&StateSnapshot::default());
        assert!(active.is_empty());
    }

    #[test]
    fn test_focus_flags_are_exclusive() {
        let entities = [
            None,
            Some(FocusedEntity::Scratch),
            Some(FocusedEntity::Worktree),
            Some(FocusedEntity::Project),
        ];
        let views = [
            None,
            Some(FocusedView::Main),
            Some(FocusedView::Drawer),
            Some(FocusedView::RightPanel),
        ];

        for entity in entities {
            for view in views {
                for drawer_open in [false, true] {
                    let state = StateSnapshot {
                        focused_entity: entity,
                        focused_view: view,
                        drawer_open,
                        right_panel_open: !drawer_open,
                        ..Default::default()
                    };
                    let active = compute_active_contexts(&state);
                    assert_eq!(count_of(active, &ENTITY_FOCUS), entity.is_some() as usize);
                    assert_eq!(count_of(active, &VIEW_FOCUS), view.is_some() as usize);
                }
            }
        }
    }

    #[test]
    fn test_drawer_focus_requires_open_drawer() {
        let state = StateSnapshot {
            focused_view: Some(FocusedView::Drawer),
            ..Default::default()
        };
        let active = compute_active_contexts(&state);
        assert!(!active.contains(ContextFlag::DrawerFocused));
        assert!(active.contains(ContextFlag::MainFocused));

        let state = StateSnapshot {
            focused_view: Some(FocusedView::Drawer),
            drawer_open: true,
            ..Default::default()
        };
        let active = compute_active_contexts(&state);
        assert!(active.contains(ContextFlag::DrawerFocused));
        assert!(active.contains(ContextFlag::DrawerOpen));
    }

    #[test]
    fn test_expanded_drawer_implies_open() {
        let state = StateSnapshot {
            drawer_expanded: true,
            ..Default::default()
        };
        let active = compute_active_contexts(&state);
        assert!(active.contains(ContextFlag::DrawerOpen));
        assert!(active.contains(ContextFlag::DrawerExpanded));
    }

    #[test]
    fn test_derived_flags() {
        let state = StateSnapshot {
            entity_count: 1,
            ..Default::default()
        };
        assert!(!compute_active_contexts(&state).contains(ContextFlag::HasMultipleEntities));

        let state = StateSnapshot {
            entity_count: 3,
            changed_file_count: 2,
            can_go_back: true,
            ..Default::default()
        };
        let active = compute_active_contexts(&state);
        assert!(active.contains(ContextFlag::HasMultipleEntities));
        assert!(active.contains(ContextFlag::HasChangedFiles));
        assert!(active.contains(ContextFlag::CanGoBack));
        assert!(!active.contains(ContextFlag::CanGoForward));
    }

    #[test]
    fn test_partial_json_snapshot() {
        let state: StateSnapshot = serde_json::from_str(
            r#"{"focusedEntity": "worktree", "modalOpen": true, "unknown": 1}"#,
        )
        .unwrap();
        let active = compute_active_contexts(&state);
        assert_eq!(
            active,
            ActiveContextSet::from_iter([ContextFlag::WorktreeFocused, ContextFlag::ModalOpen])
        );
    }

    #[test]
    fn test_unrecognized_and_null_values_are_lenient() {
        let state: StateSnapshot = serde_json::from_str(
            r#"{
                "focusedEntity": "terminal",
                "focusedView": "sidebar",
                "drawerOpen": null,
                "entityCount": null,
                "modalOpen": true
            }"#,
        )
        .unwrap();
        assert_eq!(state.focused_entity, Some(FocusedEntity::Unknown));
        assert_eq!(state.focused_view, Some(FocusedView::Unknown));
        assert!(!state.drawer_open);
        assert_eq!(state.entity_count, 0);

        let active = compute_active_contexts(&state);
        assert_eq!(active, ActiveContextSet::new().with(ContextFlag::ModalOpen));
    }

    #[test]
    fn test_null_focus_is_no_focus() {
        let state: StateSnapshot =
            serde_json::from_str(r#"{"focusedEntity": null, "focusedView": null}"#).unwrap();
        assert!(compute_active_contexts(&state).is_empty());
    }

    #[test]
    fn test_set_display_and_iteration() {
        let active = ActiveContextSet::new()
            .with(ContextFlag::ModalOpen)
            .with(ContextFlag::DrawerFocused);
        assert_eq!(active.len(), 2);
        assert_eq!(active.to_string(), "{drawerFocused, modalOpen}");

        let mut active = active;
        active.remove(ContextFlag::ModalOpen);
        assert_eq!(active.iter().collect::<Vec<_>>(), vec![ContextFlag::DrawerFocused]);
    }
}
