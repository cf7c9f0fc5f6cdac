//! Permanent combat records.
//!
//! An append-only tally of what happened between pairs of units across the
//! whole game. Entries are appended through reversible actions so the
//! turnwheel can pop them again; queries scan the entry list.

use super::UnitId;

/// What a record entry tallies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RecordKind {
    Hit,
    Miss,
    Crit,
    Damage,
    Kill,
    Death,
}

/// One tally entry keyed by the acting/receiving pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecordEntry {
    pub kind: RecordKind,
    pub actor: UnitId,
    pub target: UnitId,
    /// Damage amount for `Damage` entries, 1 otherwise.
    pub value: i32,
}

/// The permanent records store.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecordBook {
    entries: Vec<RecordEntry>,
}

impl RecordBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: RecordEntry) {
        self.entries.push(entry);
    }

    /// Removes and returns the most recent entry. Used only by action
    /// reversal, which processes entries in exact reverse order.
    pub fn pop(&mut self) -> Option<RecordEntry> {
        self.entries.pop()
    }

    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    /// Total tally of `kind` performed by `actor` against `target`.
    pub fn tally(&self, kind: RecordKind, actor: UnitId, target: UnitId) -> i32 {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind && entry.actor == actor && entry.target == target)
            .map(|entry| entry.value)
            .sum()
    }

    /// Total kills credited to a unit.
    pub fn kills(&self, actor: UnitId) -> i32 {
        self.entries
            .iter()
            .filter(|entry| entry.kind == RecordKind::Kill && entry.actor == actor)
            .map(|entry| entry.value)
            .sum()
    }
}
