//! MappingTable: merged binding groups and chord resolution

use std::collections::BTreeSet;

use super::binding::{Binding, BindingGroup, GroupRef, GroupSource};
use super::command::Action;
use super::config::{GroupConfig, KeymapError};
use super::context::ActiveContextSet;
use super::types::KeyChord;

/// The outcome of resolving one chord, with the group that decided it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub group: GroupRef,
    pub binding: &'a Binding,
}

impl<'a> Resolution<'a> {
    /// The resolved action; `None` if the deciding group unbinds the chord
    pub fn action(&self) -> Option<&'a Action> {
        self.binding.action()
    }
}

/// A chord and the binding that wins for it under some active set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveBinding<'a> {
    pub chord: KeyChord,
    pub resolution: Resolution<'a>,
}

/// Ordered binding groups: defaults first, then user groups
///
/// Immutable once built. Reloading builds a new table.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    groups: Vec<BindingGroup>,
}

/// Build a mapping table from default and user groups
///
/// User groups are appended after the defaults. The whole call fails on
/// the first invalid group, so a table is never partially admitted.
pub fn build_table(
    defaults: &[GroupConfig],
    user: &[GroupConfig],
) -> Result<MappingTable, KeymapError> {
    let sources = defaults
        .iter()
        .enumerate()
        .map(|(index, config)| (GroupSource::Default, index, config))
        .chain(
            user.iter()
                .enumerate()
                .map(|(index, config)| (GroupSource::User, index, config)),
        );

    let mut groups = Vec::with_capacity(defaults.len() + user.len());
    for (source, index, config) in sources {
        groups.push(BindingGroup::compile(GroupRef { source, index }, config)?);
    }

    Ok(MappingTable { groups })
}

impl MappingTable {
    /// Table with no bindings; every chord passes through
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve a chord to an action
    ///
    /// Groups are scanned from last to first; the first group whose context
    /// holds and which binds the chord decides. `None` means pass the event
    /// through.
    pub fn resolve(&self, chord: &KeyChord, active: &ActiveContextSet) -> Option<&Action> {
        self.resolve_traced(chord, active)?.action()
    }

    /// Like `resolve`, but also reports which group decided
    ///
    /// Returns `None` only when no group matched at all; an explicit unbind
    /// yields a resolution without an action.
    pub fn resolve_traced(
        &self,
        chord: &KeyChord,
        active: &ActiveContextSet,
    ) -> Option<Resolution<'_>> {
        let resolution = self.groups.iter().rev().find_map(|group| {
            let binding = group.get(chord)?;
            group.is_active(active).then_some(Resolution {
                group: group.id(),
                binding,
            })
        });

        match &resolution {
            Some(resolution) => tracing::trace!(
                "{} in {} -> {:?} ({})",
                chord,
                active,
                resolution.action().map(Action::as_str),
                resolution.group
            ),
            None => tracing::trace!("{} in {} -> no match", chord, active),
        }

        resolution
    }

    /// Every bound chord with the binding that wins under `active`
    ///
    /// Chords whose groups are all inactive are omitted.
    pub fn effective_bindings(&self, active: &ActiveContextSet) -> Vec<EffectiveBinding<'_>> {
        let chords: BTreeSet<KeyChord> = self
            .groups
            .iter()
            .flat_map(|group| group.bindings().into_iter().map(|(chord, _)| chord))
            .collect();

        chords
            .into_iter()
            .filter_map(|chord| {
                self.resolve_traced(&chord, active)
                    .map(|resolution| EffectiveBinding { chord, resolution })
            })
            .collect()
    }

    /// Chords bound to `action`, latest declaration first
    ///
    /// A binding is left out when a later unconditional group rebinds or
    /// unbinds its chord, since it can then never win.
    pub fn chords_for(&self, action: &Action) -> Vec<KeyChord> {
        let mut chords = Vec::new();
        for (index, group) in self.groups.iter().enumerate().rev() {
            for (chord, binding) in group.bindings() {
                if binding.action() == Some(action)
                    && !chords.contains(&chord)
                    && !self.shadowed_after(index, &chord)
                {
                    chords.push(chord);
                }
            }
        }
        chords
    }

    /// Menu accelerator for an action, from its highest-priority unconditional binding
    ///
    /// Only chords that still trigger `action` with no context active count.
    pub fn accelerator_for(&self, action: &Action) -> Option<String> {
        self.groups
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, group)| group.context().is_none())
            .find_map(|(index, group)| {
                group
                    .bindings()
                    .into_iter()
                    .find(|(chord, binding)| {
                        binding.action() == Some(action) && !self.shadowed_after(index, chord)
                    })
                    .map(|(chord, _)| chord.to_accelerator())
            })
    }

    /// True if an unconditional group after `index` binds or unbinds `chord`
    fn shadowed_after(&self, index: usize, chord: &KeyChord) -> bool {
        self.groups[index + 1..]
            .iter()
            .any(|group| group.context().is_none() && group.get(chord).is_some())
    }

    pub fn groups(&self) -> &[BindingGroup] {
        &self.groups
    }

    /// Number of groups from the user table
    pub fn user_group_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|group| group.id().source == GroupSource::User)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(BindingGroup::is_empty)
    }
}
