//! Mutation gate: tells host-driven DOM changes apart from our own writes.
//!
//! Every icon injection produces mutation notifications of its own. Without a
//! filter, each pass would schedule the next one forever. Two signals are used:
//!
//! - an explicit [`MutationGate`] that is open for exactly the synchronous span
//!   of one row's injection
//! - [`is_self_caused`], a pure heuristic over a notification batch
//!
//! Notifications are delivered asynchronously, after the gate has already
//! closed again, so the heuristic is the authoritative filter.

use std::cell::Cell;

// =============================================================================
// Change Records
// =============================================================================

/// What kind of change a record describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    /// Children were added and/or removed
    ChildList,
    /// An attribute changed
    Attributes { name: Option<String> },
    /// Text content changed
    CharacterData,
}

/// DOM-free summary of one mutation record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    /// Node names of added nodes, as reported by the DOM (e.g. "IMG", "#text")
    pub added: Vec<String>,
    /// Number of removed nodes
    pub removed: usize,
}

impl ChangeRecord {
    pub fn child_list(added: impl IntoIterator<Item = impl Into<String>>, removed: usize) -> Self {
        Self {
            kind: ChangeKind::ChildList,
            added: added.into_iter().map(Into::into).collect(),
            removed,
        }
    }

    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Attributes {
                name: Some(name.into()),
            },
            added: Vec::new(),
            removed: 0,
        }
    }

    pub fn character_data() -> Self {
        Self {
            kind: ChangeKind::CharacterData,
            added: Vec::new(),
            removed: 0,
        }
    }
}

/// Decide whether a notification batch was produced by icon injection alone.
///
/// Self-caused means at least one record adds an icon node and no record adds
/// anything else. Attribute, text and removal-only records are neutral: the
/// injection itself flips a marker class and swaps out the previous icon.
pub fn is_self_caused(batch: &[ChangeRecord], icon_node: &str) -> bool {
    let mut saw_icon = false;

    for record in batch {
        for name in &record.added {
            if name.eq_ignore_ascii_case(icon_node) {
                saw_icon = true;
            } else {
                return false;
            }
        }
    }

    saw_icon
}

// =============================================================================
// MutationGate
// =============================================================================

/// Gate state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    Idle,
    SelfMutating,
}

/// Reentrancy guard around the engine's own DOM writes.
///
/// Backed by a depth counter so nested guards keep the gate open until the
/// outermost one drops.
#[derive(Debug, Default)]
pub struct MutationGate {
    depth: Cell<u32>,
}

impl MutationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate until the returned guard is dropped.
    pub fn enter(&self) -> GateGuard<'_> {
        self.depth.set(self.depth.get() + 1);
        GateGuard { gate: self }
    }

    pub fn state(&self) -> GateState {
        if self.depth.get() == 0 {
            GateState::Idle
        } else {
            GateState::SelfMutating
        }
    }

    #[inline]
    pub fn is_self_mutating(&self) -> bool {
        self.state() == GateState::SelfMutating
    }
}

/// Closes the gate on drop, including when injection returns early with an error.
pub struct GateGuard<'a> {
    gate: &'a MutationGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        let depth = self.gate.depth.get();
        self.gate.depth.set(depth.saturating_sub(1));
    }
}
