//! Post-combat bookkeeping passes.
//!
//! Every pass is a pure function of the finished playback log plus the
//! post-strike game state: it reads, never mutates, and emits reversible
//! actions for the session to apply. Running a pass twice over the same log
//! yields the same output, which is what keeps the session rewindable as a
//! single unit. Each pass is independently toggleable in [`GameConfig`].

use std::collections::BTreeSet;

use tracing::debug;

use crate::component::{accumulate, fire_event, unique_gate, weapon_type, Hook, HookContext};
use crate::config::GameConfig;
use crate::env::CombatEnv;
use crate::state::{GameState, InstanceId, RecordEntry, RecordKind, UnitId};
use crate::turnwheel::Action;

use super::{CombatError, PlaybackEvent};

/// Actions and generated events produced by the bookkeeping passes.
#[derive(Debug, Default, PartialEq)]
pub struct BookkeepingOutput {
    pub actions: Vec<Action>,
    /// Events generated by bookkeeping itself (broken items, drops), ordered
    /// after the combat's own events.
    pub playback: Vec<PlaybackEvent>,
}

/// Runs every enabled pass over the finished playback log.
///
/// Pass order: experience, weapon experience, mana, broken items, item
/// drops, records. Assist-partner experience is folded into the experience
/// pass at half rate.
pub fn run(
    state: &GameState,
    env: &CombatEnv<'_>,
    attacker: UnitId,
    playback: &[PlaybackEvent],
) -> Result<BookkeepingOutput, CombatError> {
    let config = env.config()?;
    let mut out = BookkeepingOutput::default();

    if config.exp.enabled {
        experience(state, env, config, attacker, playback, &mut out);
    }
    if config.wexp.enabled {
        weapon_experience(state, env, config, playback, &mut out);
    }
    if config.mana_enabled {
        mana(state, env, playback, &mut out);
    }
    broken_items(state, env, playback, &mut out);
    item_drops(state, playback, &mut out);
    if config.records_enabled {
        records(playback, &mut out);
    }

    Ok(out)
}

/// Every unit that resolved at least one strike, in first-appearance order.
fn actors(playback: &[PlaybackEvent]) -> Vec<UnitId> {
    let mut seen = BTreeSet::new();
    let mut ordered = Vec::new();
    for event in playback {
        if let PlaybackEvent::MarkHit { attacker, .. }
        | PlaybackEvent::MarkCrit { attacker, .. }
        | PlaybackEvent::MarkMiss { attacker, .. } = event
        {
            if seen.insert(*attacker) {
                ordered.push(*attacker);
            }
        }
    }
    ordered
}

/// The item a unit struck with this session, from its mark events.
fn used_item(playback: &[PlaybackEvent], actor: UnitId) -> Option<InstanceId> {
    playback.iter().find_map(|event| match event {
        PlaybackEvent::MarkHit {
            attacker, item, ..
        }
        | PlaybackEvent::MarkCrit {
            attacker, item, ..
        }
        | PlaybackEvent::MarkMiss {
            attacker, item, ..
        } if *attacker == actor => Some(*item),
        _ => None,
    })
}

fn kills_by(playback: &[PlaybackEvent], actor: UnitId) -> u32 {
    playback
        .iter()
        .filter(|event| {
            matches!(event, PlaybackEvent::UnitDeath { killer: Some(killer), .. } if *killer == actor)
        })
        .count() as u32
}

// ===== experience =====

/// Curve-scaled experience per actor: one level-difference award per
/// distinct damaged defender, flat awards for heals, statuses, and kills,
/// plus `exp` hook contributions from the used item. The session attacker's
/// assist partner earns at half rate. The total is clamped to the configured
/// bounds before a single gain action is emitted.
fn experience(
    state: &GameState,
    env: &CombatEnv<'_>,
    config: &GameConfig,
    attacker: UnitId,
    playback: &[PlaybackEvent],
    out: &mut BookkeepingOutput,
) {
    let partner = state.unit(attacker).and_then(|unit| unit.partner);

    for actor in actors(playback) {
        let Some(actor_state) = state.unit(actor) else {
            continue;
        };
        if !actor_state.is_alive() {
            continue;
        }

        let mut total = 0.0f64;
        let mut damaged = BTreeSet::new();
        for event in playback {
            match event {
                PlaybackEvent::DamageHit {
                    attacker: by,
                    defender,
                    dealt,
                    ..
                }
                | PlaybackEvent::DamageCrit {
                    attacker: by,
                    defender,
                    dealt,
                    ..
                } if *by == actor && *dealt > 0 => {
                    if damaged.insert(*defender) {
                        let level_diff = state
                            .unit(*defender)
                            .map(|unit| f64::from(unit.level - actor_state.level))
                            .unwrap_or(0.0);
                        total += config.exp.curve.eval(level_diff);
                    }
                }
                PlaybackEvent::HealHit { healer, healed, .. }
                    if *healer == actor && *healed > 0 =>
                {
                    total += f64::from(config.exp.heal_exp);
                }
                PlaybackEvent::StatusHit { attacker: by, .. } if *by == actor => {
                    total += f64::from(config.exp.status_exp);
                }
                _ => {}
            }
        }
        total += f64::from(config.exp.kill_exp) * f64::from(kills_by(playback, actor));

        if let Some(item) = used_item(playback, actor).and_then(|uid| actor_state.item(uid)) {
            let ctx = HookContext {
                state,
                env,
                owner: actor,
                target: None,
            };
            total += accumulate(&item.components, Hook::Exp, &ctx) as f64;
        }

        if total <= 0.0 {
            continue;
        }
        if Some(actor) == partner {
            total /= 2.0;
        }

        let gained = (total.round() as i32).clamp(config.exp.min_exp, config.exp.max_exp);
        debug!(unit = %actor, gained, "experience awarded");
        out.actions.push(Action::GainExp {
            unit: actor,
            old: actor_state.exp,
            new: actor_state.exp + gained,
        });
    }
}

// ===== weapon experience =====

fn weapon_experience(
    state: &GameState,
    env: &CombatEnv<'_>,
    config: &GameConfig,
    playback: &[PlaybackEvent],
    out: &mut BookkeepingOutput,
) {
    for actor in actors(playback) {
        let Some(actor_state) = state.unit(actor) else {
            continue;
        };
        if !actor_state.is_alive() {
            continue;
        }
        let Some(item) = used_item(playback, actor).and_then(|uid| actor_state.item(uid)) else {
            continue;
        };
        let Some(kind) = weapon_type(&item.components) else {
            continue;
        };
        let kind = kind.to_string();

        let mut hits = 0i32;
        let mut crits = 0i32;
        for event in playback {
            match event {
                PlaybackEvent::MarkHit { attacker, .. } if *attacker == actor => hits += 1,
                PlaybackEvent::MarkCrit { attacker, .. } if *attacker == actor => {
                    hits += 1;
                    crits += 1;
                }
                _ => {}
            }
        }
        if hits == 0 {
            continue;
        }

        let killed = kills_by(playback, actor) > 0;
        let mut gained = hits * config.wexp.hit_wexp + crits * config.wexp.crit_wexp;
        if killed {
            gained += config.wexp.kill_wexp;
            if config.wexp.double_on_kill {
                gained *= 2;
            }
        }
        let ctx = HookContext {
            state,
            env,
            owner: actor,
            target: None,
        };
        gained += accumulate(&item.components, Hook::Wexp, &ctx) as i32;
        if gained <= 0 {
            continue;
        }

        let old = actor_state.wexp.get(&kind).copied();
        out.actions.push(Action::GainWexp {
            unit: actor,
            weapon_type: kind,
            old,
            new: old.unwrap_or(0) + gained,
        });
    }
}

// ===== mana =====

/// Mana from `mana` hook contributions, once per landed strike.
fn mana(
    state: &GameState,
    env: &CombatEnv<'_>,
    playback: &[PlaybackEvent],
    out: &mut BookkeepingOutput,
) {
    for actor in actors(playback) {
        let Some(actor_state) = state.unit(actor) else {
            continue;
        };
        if !actor_state.is_alive() {
            continue;
        }
        let Some(item) = used_item(playback, actor).and_then(|uid| actor_state.item(uid)) else {
            continue;
        };

        let landed = playback
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    PlaybackEvent::MarkHit { attacker, .. }
                    | PlaybackEvent::MarkCrit { attacker, .. } if *attacker == actor
                )
            })
            .count() as i64;
        if landed == 0 {
            continue;
        }

        let ctx = HookContext {
            state,
            env,
            owner: actor,
            target: None,
        };
        let gained = accumulate(&item.components, Hook::Mana, &ctx) * landed;
        if gained == 0 {
            continue;
        }
        out.actions.push(Action::ChangeMana {
            unit: actor,
            old: actor_state.mana,
            new: actor_state.mana + gained as i32,
        });
    }
}

// ===== broken items =====

/// An item whose `is_broken` gate turned true this session (charges spent)
/// fires its `on_broken` hooks and leaves its holder's inventory.
fn broken_items(
    state: &GameState,
    env: &CombatEnv<'_>,
    playback: &[PlaybackEvent],
    out: &mut BookkeepingOutput,
) {
    let mut used: Vec<InstanceId> = Vec::new();
    for event in playback {
        if let PlaybackEvent::MarkHit { item, .. }
        | PlaybackEvent::MarkCrit { item, .. }
        | PlaybackEvent::MarkMiss { item, .. } = event
        {
            if !used.contains(item) {
                used.push(*item);
            }
        }
    }

    for uid in used {
        let Some((holder, item)) = state.find_item(uid) else {
            continue;
        };
        // A dying holder's inventory is handled by the drop pass.
        if !holder.is_alive() {
            continue;
        }
        let ctx = HookContext {
            state,
            env,
            owner: holder.id,
            target: None,
        };
        if !unique_gate(&item.components, Hook::IsBroken, &ctx) {
            continue;
        }

        debug!(unit = %holder.id, item = %item.nid, "item broke");
        out.playback.push(PlaybackEvent::ItemBroken {
            unit: holder.id,
            item: uid,
        });
        fire_event(&item.components, Hook::OnBroken, &ctx, &mut out.actions);

        if let Some(index) = holder.items.iter().position(|held| held.uid == uid) {
            out.actions.push(Action::RemoveItem {
                unit: holder.id,
                index,
                item: item.clone(),
                was_equipped: holder.equipped == Some(index),
            });
        }
    }
}

// ===== item drops =====

/// Droppable items leave a dying unit's inventory and pass to the killer
/// when one exists. Drops are re-injected as generated playback events so
/// their ordering matches other triggered events.
fn item_drops(state: &GameState, playback: &[PlaybackEvent], out: &mut BookkeepingOutput) {
    for event in playback {
        let PlaybackEvent::UnitDeath { unit, killer } = event else {
            continue;
        };
        let Some(dead) = state.unit(*unit) else {
            continue;
        };

        let receiver = killer
            .and_then(|killer| state.unit(killer))
            .filter(|unit| unit.is_alive())
            .map(|unit| unit.id);

        // Highest index first so earlier removals do not shift later ones.
        for index in (0..dead.items.len()).rev() {
            let item = &dead.items[index];
            if !item.droppable {
                continue;
            }
            out.playback.push(PlaybackEvent::DropItem {
                unit: *unit,
                item: item.uid,
            });
            out.actions.push(Action::RemoveItem {
                unit: *unit,
                index,
                item: item.clone(),
                was_equipped: dead.equipped == Some(index),
            });
            if let Some(receiver) = receiver {
                out.actions.push(Action::GiveItem {
                    unit: receiver,
                    item: item.clone(),
                });
            }
        }
    }
}

// ===== records =====

/// One permanent-records entry per mark, damage, kill, and death.
fn records(playback: &[PlaybackEvent], out: &mut BookkeepingOutput) {
    let mut push = |entry: RecordEntry| {
        out.actions.push(Action::Record { entry });
    };

    for event in playback {
        match event {
            PlaybackEvent::MarkHit {
                attacker, defender, ..
            } => push(RecordEntry {
                kind: RecordKind::Hit,
                actor: *attacker,
                target: *defender,
                value: 1,
            }),
            PlaybackEvent::MarkCrit {
                attacker, defender, ..
            } => push(RecordEntry {
                kind: RecordKind::Crit,
                actor: *attacker,
                target: *defender,
                value: 1,
            }),
            PlaybackEvent::MarkMiss {
                attacker, defender, ..
            } => push(RecordEntry {
                kind: RecordKind::Miss,
                actor: *attacker,
                target: *defender,
                value: 1,
            }),
            PlaybackEvent::DamageHit {
                attacker,
                defender,
                dealt,
                ..
            }
            | PlaybackEvent::DamageCrit {
                attacker,
                defender,
                dealt,
                ..
            } if *dealt > 0 => push(RecordEntry {
                kind: RecordKind::Damage,
                actor: *attacker,
                target: *defender,
                value: *dealt,
            }),
            PlaybackEvent::UnitDeath { unit, killer } => {
                if let Some(killer) = killer {
                    push(RecordEntry {
                        kind: RecordKind::Kill,
                        actor: *killer,
                        target: *unit,
                        value: 1,
                    });
                }
                push(RecordEntry {
                    kind: RecordKind::Death,
                    actor: *unit,
                    target: killer.unwrap_or(*unit),
                    value: 1,
                });
            }
            _ => {}
        }
    }
}
