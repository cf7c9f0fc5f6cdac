//! Reversible units of game-state mutation.
//!
//! Each variant stores the values it needs to undo itself exactly (old and
//! new, or the removed instance), so `reverse` never recomputes anything:
//! clamping, displacement, and other policy decisions happen when the
//! action is *built*, and the action itself is a dumb, exact transition.

use crate::rng::RngSnapshot;
use crate::state::{GameState, InstanceId, ItemState, RecordEntry, SkillState, StatKind, UnitId};

use super::TurnwheelError;

/// A reversible unit of game-state mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// HP transition. `new` is pre-clamped by the builder.
    ChangeHp { unit: UnitId, old: i32, new: i32 },

    /// Mana transition.
    ChangeMana { unit: UnitId, old: i32, new: i32 },

    /// Experience transition.
    GainExp { unit: UnitId, old: i32, new: i32 },

    /// Weapon-proficiency transition for one weapon type. `old` is `None`
    /// when the unit had no entry for that type, so reversal restores the
    /// map bit-identically.
    GainWexp {
        unit: UnitId,
        weapon_type: String,
        old: Option<i32>,
        new: i32,
    },

    /// Stat transition.
    ChangeStat {
        unit: UnitId,
        stat: StatKind,
        old: i32,
        new: i32,
    },

    /// Appends an item to the unit's inventory.
    GiveItem { unit: UnitId, item: ItemState },

    /// Removes the item at `index`. The removed instance rides along so
    /// reversal restores it at the same slot; `was_equipped` restores the
    /// equipped marker, which removal clears.
    RemoveItem {
        unit: UnitId,
        index: usize,
        item: ItemState,
        was_equipped: bool,
    },

    /// Appends a skill to the unit.
    AddSkill { unit: UnitId, skill: SkillState },

    /// Removes the skill at `index`, keeping the instance for reversal.
    RemoveSkill {
        unit: UnitId,
        index: usize,
        skill: SkillState,
    },

    /// Charge-meter transition on an item's use-metering component.
    UseCharge {
        unit: UnitId,
        item: InstanceId,
        old: i64,
        new: i64,
    },

    /// Marks a unit dead. HP changes are separate actions.
    Die { unit: UnitId },

    /// Appends one permanent-records entry.
    Record { entry: RecordEntry },

    /// One whole combat session as a single rewind unit.
    ///
    /// The sub-actions were already applied one-by-one while the session
    /// ran; the composite is recorded once at session end. Reversing it
    /// undoes every sub-action in reverse order and restores the RNG stream
    /// to its pre-session position, so a rewound combat replays bit-for-bit.
    CombatSession {
        rng_before: RngSnapshot,
        rng_after: RngSnapshot,
        actions: Vec<Action>,
    },
}

impl Action {
    /// Applies this action without logging it.
    ///
    /// Used for effects that must happen but are not individually
    /// user-rewindable (every strike inside a combat session).
    pub fn execute(&self, state: &mut GameState) -> Result<(), TurnwheelError> {
        match self {
            Action::ChangeHp { unit, new, .. } => {
                unit_mut(state, *unit)?.hp = *new;
            }
            Action::ChangeMana { unit, new, .. } => {
                unit_mut(state, *unit)?.mana = *new;
            }
            Action::GainExp { unit, new, .. } => {
                unit_mut(state, *unit)?.exp = *new;
            }
            Action::GainWexp {
                unit,
                weapon_type,
                new,
                ..
            } => {
                unit_mut(state, *unit)?
                    .wexp
                    .insert(weapon_type.clone(), *new);
            }
            Action::ChangeStat {
                unit, stat, new, ..
            } => {
                unit_mut(state, *unit)?.stats.set(*stat, *new);
            }
            Action::GiveItem { unit, item } => {
                let mut item = item.clone();
                item.owner = Some(*unit);
                unit_mut(state, *unit)?.items.push(item);
            }
            Action::RemoveItem { unit, index, .. } => {
                let holder = unit_mut(state, *unit)?;
                if *index >= holder.items.len() {
                    return Err(TurnwheelError::ItemNotFound(*unit));
                }
                holder.items.remove(*index);
                // Keep the equipped index pointing at the same item.
                if let Some(equipped) = holder.equipped {
                    if equipped == *index {
                        holder.equipped = None;
                    } else if equipped > *index {
                        holder.equipped = Some(equipped - 1);
                    }
                }
            }
            Action::AddSkill { unit, skill } => {
                let mut skill = skill.clone();
                skill.owner = Some(*unit);
                unit_mut(state, *unit)?.skills.push(skill);
            }
            Action::RemoveSkill { unit, index, .. } => {
                let holder = unit_mut(state, *unit)?;
                if *index >= holder.skills.len() {
                    return Err(TurnwheelError::SkillSlotMismatch(*unit));
                }
                holder.skills.remove(*index);
            }
            Action::UseCharge {
                unit, item, new, ..
            } => {
                set_charges(state, *unit, *item, *new)?;
            }
            Action::Die { unit } => {
                unit_mut(state, *unit)?.dead = true;
            }
            Action::Record { entry } => {
                state.records.push(*entry);
            }
            Action::CombatSession {
                rng_after, actions, ..
            } => {
                for action in actions {
                    action.execute(state)?;
                }
                state.rng.restore(*rng_after);
            }
        }
        Ok(())
    }

    /// Undoes this action. Called only by the log's rewind, in strict
    /// reverse chronological order.
    pub fn reverse(&self, state: &mut GameState) -> Result<(), TurnwheelError> {
        match self {
            Action::ChangeHp { unit, old, .. } => {
                unit_mut(state, *unit)?.hp = *old;
            }
            Action::ChangeMana { unit, old, .. } => {
                unit_mut(state, *unit)?.mana = *old;
            }
            Action::GainExp { unit, old, .. } => {
                unit_mut(state, *unit)?.exp = *old;
            }
            Action::GainWexp {
                unit,
                weapon_type,
                old,
                ..
            } => {
                let holder = unit_mut(state, *unit)?;
                match old {
                    Some(old) => {
                        holder.wexp.insert(weapon_type.clone(), *old);
                    }
                    None => {
                        holder.wexp.remove(weapon_type);
                    }
                }
            }
            Action::ChangeStat {
                unit, stat, old, ..
            } => {
                unit_mut(state, *unit)?.stats.set(*stat, *old);
            }
            Action::GiveItem { unit, item } => {
                let holder = unit_mut(state, *unit)?;
                let index = holder
                    .items
                    .iter()
                    .rposition(|held| held.uid == item.uid)
                    .ok_or(TurnwheelError::ItemNotFound(*unit))?;
                holder.items.remove(index);
            }
            Action::RemoveItem {
                unit,
                index,
                item,
                was_equipped,
            } => {
                let holder = unit_mut(state, *unit)?;
                let mut item = item.clone();
                item.owner = Some(*unit);
                holder.items.insert(*index, item);
                if *was_equipped {
                    holder.equipped = Some(*index);
                } else if let Some(equipped) = holder.equipped {
                    if equipped >= *index {
                        holder.equipped = Some(equipped + 1);
                    }
                }
            }
            Action::AddSkill { unit, skill } => {
                let holder = unit_mut(state, *unit)?;
                let index = holder
                    .skills
                    .iter()
                    .rposition(|held| held.uid == skill.uid)
                    .ok_or(TurnwheelError::SkillSlotMismatch(*unit))?;
                holder.skills.remove(index);
            }
            Action::RemoveSkill { unit, index, skill } => {
                let holder = unit_mut(state, *unit)?;
                let mut skill = skill.clone();
                skill.owner = Some(*unit);
                holder.skills.insert(*index, skill);
            }
            Action::UseCharge {
                unit, item, old, ..
            } => {
                set_charges(state, *unit, *item, *old)?;
            }
            Action::Die { unit } => {
                unit_mut(state, *unit)?.dead = false;
            }
            Action::Record { .. } => {
                state.records.pop();
            }
            Action::CombatSession {
                rng_before,
                actions,
                ..
            } => {
                for action in actions.iter().rev() {
                    action.reverse(state)?;
                }
                state.rng.restore(*rng_before);
            }
        }
        Ok(())
    }
}

fn unit_mut(
    state: &mut GameState,
    unit: UnitId,
) -> Result<&mut crate::state::UnitState, TurnwheelError> {
    state.unit_mut(unit).ok_or(TurnwheelError::UnitNotFound(unit))
}

fn set_charges(
    state: &mut GameState,
    unit: UnitId,
    item: InstanceId,
    charges: i64,
) -> Result<(), TurnwheelError> {
    let holder = unit_mut(state, unit)?;
    let item = holder
        .item_mut(item)
        .ok_or(TurnwheelError::ItemNotFound(unit))?;
    for component in &mut item.components {
        if component.charges().is_some() {
            component.set_charges(charges);
            return Ok(());
        }
    }
    Err(TurnwheelError::ItemNotFound(unit))
}
