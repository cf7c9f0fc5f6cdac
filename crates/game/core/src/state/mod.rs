//! Mutable game state: units and everything they carry.
//!
//! The state is a pure value: cloning it snapshots the world, and comparing
//! two states (including the RNG stream position and the records book) is
//! how rewind correctness is verified. All mutation during combat flows
//! through reversible [`crate::turnwheel::Action`]s.

mod item;
mod records;
mod skill;
mod unit;

pub use item::{ItemState, SavedComponent, SavedItem};
pub use records::{RecordBook, RecordEntry, RecordKind};
pub use skill::{RemovalRequest, SavedSkill, SkillState, SourceInfo, SourceKind};
pub use unit::{CoreStats, StatKind, Team, UnitState};

use std::collections::BTreeMap;

use crate::rng::RngStream;

/// Unique identifier for a unit.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct UnitId(pub u32);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier for an item or skill instance.
///
/// Allocated once per instantiation and never reused; templates carry
/// [`InstanceId::UNBOUND`] until instantiated.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct InstanceId(pub u64);

impl InstanceId {
    pub const UNBOUND: InstanceId = InstanceId(0);
}

/// Board position.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position.
    pub fn distance(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// The full mutable game state.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    units: BTreeMap<UnitId, UnitState>,
    next_unit: u32,
    next_instance: u64,
    /// The combat random stream. Owned by the state so that snapshots and
    /// rewinds capture the stream position alongside everything else.
    pub rng: RngStream,
    /// Permanent combat records (hit/miss/crit/damage/kill/death tallies).
    pub records: RecordBook,
}

impl GameState {
    /// Creates an empty state with the combat stream seeded from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            units: BTreeMap::new(),
            next_unit: 0,
            next_instance: 1,
            rng: RngStream::new("combat", seed),
            records: RecordBook::new(),
        }
    }

    /// Registers a unit, assigning it a fresh id.
    pub fn add_unit(&mut self, mut unit: UnitState) -> UnitId {
        let id = UnitId(self.next_unit);
        self.next_unit += 1;
        unit.id = id;
        self.units.insert(id, unit);
        id
    }

    /// Allocates a fresh instance id for an item or skill.
    pub fn allocate_instance(&mut self) -> InstanceId {
        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        id
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitState> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut UnitState> {
        self.units.get_mut(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitState> {
        self.units.values()
    }

    /// Returns the living unit standing at `pos`, if any.
    pub fn unit_at(&self, pos: Position) -> Option<UnitId> {
        self.units
            .values()
            .find(|unit| !unit.dead && unit.position == pos)
            .map(|unit| unit.id)
    }

    /// Finds the item instance with the given id, wherever it is held.
    pub fn find_item(&self, uid: InstanceId) -> Option<(&UnitState, &ItemState)> {
        self.units.values().find_map(|unit| {
            unit.items
                .iter()
                .find(|item| item.uid == uid)
                .map(|item| (unit, item))
        })
    }
}
