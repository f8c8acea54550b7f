//! Per-page-session context.
//!
//! Owns the state that lives exactly as long as one page load: the mutation
//! gate and the style flag. Passed explicitly to the synchronizer and to
//! provider callbacks instead of living in globals.

use std::cell::Cell;

use crate::gate::{ChangeRecord, MutationGate, is_self_caused};
use crate::style::StyleOnce;

#[derive(Debug, Default)]
pub struct Session {
    gate: MutationGate,
    style: StyleOnce,
    suppressed: Cell<u64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gate(&self) -> &MutationGate {
        &self.gate
    }

    pub fn style(&self) -> &StyleOnce {
        &self.style
    }

    /// Whether a notification batch should trigger a new pass.
    ///
    /// Rejects batches that arrive while the gate is open and batches the
    /// heuristic attributes to icon injection.
    pub fn admits(&self, batch: &[ChangeRecord], icon_node: &str) -> bool {
        let admitted = !self.gate.is_self_mutating() && !is_self_caused(batch, icon_node);
        if !admitted {
            self.suppressed.set(self.suppressed.get() + 1);
        }
        admitted
    }

    /// Number of notification batches rejected so far.
    pub fn suppressed_batches(&self) -> u64 {
        self.suppressed.get()
    }
}
