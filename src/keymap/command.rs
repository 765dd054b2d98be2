//! Action enum representing every namespaced action a binding can name
//!
//! Actions are opaque `namespace::verb` identifiers. The built-in set is
//! closed; anything else parses to [`Action::Unregistered`] so user tables
//! can name experimental or host-defined actions.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error for action ids that are not of the form `namespace::verb`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid action id `{0}`: expected `namespace::verb`")]
pub struct ActionIdError(pub String);

macro_rules! actions {
    ($($(#[$meta:meta])* $variant:ident => $id:literal,)*) => {
        /// All actions that can be bound to key chords
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum Action {
            $($(#[$meta])* $variant,)*
            /// Well-formed id outside the built-in set
            Unregistered(String),
        }

        impl Action {
            /// Every built-in action, in declaration order
            pub const BUILTIN: &'static [Action] = &[$(Action::$variant,)*];

            /// The namespaced identifier, e.g. `drawer::closeTab`
            pub fn as_str(&self) -> &str {
                match self {
                    $(Action::$variant => $id,)*
                    Action::Unregistered(id) => id,
                }
            }

            fn builtin(id: &str) -> Option<Action> {
                match id {
                    $($id => Some(Action::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

actions! {
    // App
    Quit => "app::quit",
    AddProject => "app::addProject",
    OpenInFinder => "app::openInFinder",
    OpenInTerminal => "app::openInTerminal",
    OpenInEditor => "app::openInEditor",
    OpenSettings => "app::openSettings",
    OpenMappings => "app::openMappings",
    HelpDocs => "app::helpDocs",
    HelpReportIssue => "app::helpReportIssue",
    HelpReleaseNotes => "app::helpReleaseNotes",
    /// Close whichever overlay (picker, modal, palette) is open
    DismissOverlay => "app::dismiss",

    // Palette and pickers
    TogglePalette => "palette::toggle",
    ProjectSwitcher => "palette::projectSwitcher",

    // Entities
    NewScratch => "scratch::new",
    CloseScratch => "scratch::close",
    NewWorktree => "worktree::new",
    MergeWorktree => "worktree::merge",
    DeleteWorktree => "worktree::delete",
    CloseProject => "project::close",

    // Session tabs in the main view
    NewTab => "session::newTab",
    CloseTab => "session::closeTab",

    // Drawer
    ToggleDrawer => "drawer::toggle",
    ExpandDrawer => "drawer::expand",
    NewDrawerTab => "drawer::newTab",
    CloseDrawerTab => "drawer::closeTab",
    NextDrawerTab => "drawer::nextTab",
    PrevDrawerTab => "drawer::prevTab",

    ToggleRightPanel => "rightPanel::toggle",

    // Tasks
    RunTask => "task::run",
    TaskSwitcher => "task::switcher",

    // View
    ZoomIn => "view::zoomIn",
    ZoomOut => "view::zoomOut",
    ZoomReset => "view::zoomReset",

    // Navigation
    NavigatePrev => "navigate::prev",
    NavigateNext => "navigate::next",
    NavigateBack => "navigate::back",
    NavigateForward => "navigate::forward",
    ToEntity1 => "navigate::toEntity1",
    ToEntity2 => "navigate::toEntity2",
    ToEntity3 => "navigate::toEntity3",
    ToEntity4 => "navigate::toEntity4",
    ToEntity5 => "navigate::toEntity5",
    ToEntity6 => "navigate::toEntity6",
    ToEntity7 => "navigate::toEntity7",
    ToEntity8 => "navigate::toEntity8",
    ToEntity9 => "navigate::toEntity9",
    SwitchFocus => "focus::switch",

    // Diff view
    NextChangedFile => "diff::nextFile",
    PrevChangedFile => "diff::prevFile",

    // Terminal clipboard, usually handled outside the router
    TerminalCopy => "terminal::copy",
    TerminalPaste => "terminal::paste",
}

impl Action {
    /// The namespace part of the id (`drawer` in `drawer::closeTab`)
    pub fn namespace(&self) -> &str {
        self.as_str()
            .split_once("::")
            .map_or("", |(namespace, _)| namespace)
    }

    /// The verb part of the id (`closeTab` in `drawer::closeTab`)
    pub fn verb(&self) -> &str {
        self.as_str().split_once("::").map_or("", |(_, verb)| verb)
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Action::Unregistered(_))
    }
}

fn is_id_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for Action {
    type Err = ActionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        if let Some(action) = Action::builtin(id) {
            return Ok(action);
        }

        match id.split_once("::") {
            Some((namespace, verb)) if is_id_segment(namespace) && is_id_segment(verb) => {
                Ok(Action::Unregistered(id.to_string()))
            }
            _ => Err(ActionIdError(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_round_trip() {
        for action in Action::BUILTIN {
            assert_eq!(action.as_str().parse::<Action>().as_ref(), Ok(action));
        }
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let mut ids: Vec<&str> = Action::BUILTIN.iter().map(Action::as_str).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Action::BUILTIN.len());
    }

    #[test]
    fn test_namespace_and_verb() {
        assert_eq!(Action::CloseDrawerTab.namespace(), "drawer");
        assert_eq!(Action::CloseDrawerTab.verb(), "closeTab");
        assert_eq!(Action::ToggleRightPanel.namespace(), "rightPanel");
    }

    #[test]
    fn test_unknown_id_is_unregistered() {
        let action: Action = "experiment::doThing".parse().unwrap();
        assert_eq!(action, Action::Unregistered("experiment::doThing".into()));
        assert!(!action.is_builtin());
        assert_eq!(action.to_string(), "experiment::doThing");
        assert_eq!(action.verb(), "doThing");
    }

    #[test]
    fn test_malformed_ids_rejected() {
        for bad in ["close", "::close", "app::", "app:close", "app::close::tab", "1app::x", ""] {
            assert!(bad.parse::<Action>().is_err(), "{bad} should be rejected");
        }
    }
}
