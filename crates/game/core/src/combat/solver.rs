//! The per-strike combat state machine.
//!
//! One solver drives one combat session: it schedules rounds of strikes
//! (attacker exchange, counters, doubling, assist), resolves each strike's
//! hit/crit/miss outcome, and fires the struck item's strike hooks. The
//! solver never mutates unit state itself; it returns each strike's actions
//! for the session to apply, and reads the applied state back when deciding
//! whether later strikes still happen.

use std::collections::VecDeque;

use tracing::debug;

use crate::component::{
    accumulate, all_true, available, fire_strike, unique_gate, unique_scalar, Hook, HookContext,
    StrikeContext, StrikeMode,
};
use crate::env::CombatEnv;
use crate::state::{GameState, InstanceId, ItemState, UnitId, UnitState};
use crate::turnwheel::Action;

use super::script::CombatScript;
use super::{CombatError, ForcedOutcome, PlaybackEvent};

/// Which schedule slot a strike belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StrikerSlot {
    Attacker,
    Defender,
    /// Assist-partner guard strike, scheduled after the main exchange when
    /// pairing is enabled.
    Assist,
}

/// One fully resolved strike.
#[derive(Debug)]
pub struct StrikeResult {
    pub striker: UnitId,
    pub defender: UnitId,
    pub item: InstanceId,
    pub slot: StrikerSlot,
    pub mode: StrikeMode,
    /// Reversible mutations for this strike, in application order.
    pub actions: Vec<Action>,
    /// Outcome record for presentation and bookkeeping.
    pub playback: Vec<PlaybackEvent>,
}

#[derive(Clone, Copy, Debug)]
struct ScheduledStrike {
    striker: UnitId,
    defender: UnitId,
    slot: StrikerSlot,
}

/// Drives `total_rounds` full exchanges between the attacker and its
/// defenders, one strike at a time.
#[derive(Debug)]
pub struct CombatPhaseSolver {
    attacker: UnitId,
    item: InstanceId,
    defenders: Vec<UnitId>,
    splash: Vec<UnitId>,
    script: CombatScript,
    total_rounds: u32,
    rounds_run: u32,
    queue: VecDeque<ScheduledStrike>,
    done: bool,
}

impl CombatPhaseSolver {
    /// Inputs are fixed at construction; the defender list is already
    /// deduplicated by the session.
    pub fn new(
        attacker: UnitId,
        item: InstanceId,
        defenders: Vec<UnitId>,
        splash: Vec<UnitId>,
        script: CombatScript,
        total_rounds: u32,
    ) -> Self {
        Self {
            attacker,
            item,
            defenders,
            splash,
            script,
            total_rounds,
            rounds_run: 0,
            queue: VecDeque::new(),
            done: false,
        }
    }

    /// Externally shortens the combat. Setting 0 aborts before the next
    /// strike; strikes already resolved stay resolved.
    pub fn set_total_rounds(&mut self, rounds: u32) {
        self.total_rounds = rounds;
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Resolves the next scheduled strike, or returns `None` when the
    /// combat is over.
    ///
    /// Strikes whose striker or defender has died since scheduling are
    /// skipped without consuming a script token or recording a miss.
    pub fn next_strike(
        &mut self,
        state: &mut GameState,
        env: &CombatEnv<'_>,
    ) -> Result<Option<StrikeResult>, CombatError> {
        loop {
            if self.done {
                return Ok(None);
            }
            if self.rounds_run >= self.total_rounds {
                self.done = true;
                return Ok(None);
            }

            let Some(strike) = self.queue.pop_front() else {
                self.schedule_round(state, env)?;
                self.rounds_run += 1;
                continue;
            };

            if !self.strike_still_live(state, env, strike) {
                continue;
            }

            return self.resolve_strike(state, env, strike).map(Some);
        }
    }

    // ===== scheduling =====

    /// Builds one round's strike schedule from the current state.
    ///
    /// Per defender: the attacker's strikes, the defender's counter when it
    /// has a usable weapon in range, then doubling strikes for whichever
    /// side has the attack-speed advantage. Vantage flips the defender's
    /// counter ahead of the attacker's strikes for that round only. Splash
    /// units are struck once each after the main exchanges and never
    /// counter; the assist partner adds one guard strike at the end.
    fn schedule_round(
        &mut self,
        state: &GameState,
        env: &CombatEnv<'_>,
    ) -> Result<(), CombatError> {
        let config = env.config()?;
        let attacker = unit(state, self.attacker)?;
        let Some(item) = attacker.item(self.item) else {
            return Ok(());
        };

        for idx in 0..self.defenders.len() {
            let defender_id = self.defenders[idx];
            let Some(defender) = state.unit(defender_id) else {
                continue;
            };
            if !attacker.is_alive() || !defender.is_alive() {
                continue;
            }

            let attack = ScheduledStrike {
                striker: self.attacker,
                defender: defender_id,
                slot: StrikerSlot::Attacker,
            };
            let counter = ScheduledStrike {
                striker: defender_id,
                defender: self.attacker,
                slot: StrikerSlot::Defender,
            };

            let attacker_strikes = strike_count(state, env, attacker, item, defender_id);
            let counters = if self.can_counter(state, env, attacker, item, defender) {
                // The defender counters with its own equipped weapon.
                let counter_item = defender
                    .equipped_item()
                    .ok_or(CombatError::NoValidItem(defender_id))?;
                strike_count(state, env, defender, counter_item, self.attacker)
            } else {
                0
            };

            let vantage = has_vantage(state, env, defender, self.attacker);
            if vantage && counters > 0 {
                self.push_strikes(counter, counters);
                self.push_strikes(attack, attacker_strikes);
            } else {
                self.push_strikes(attack, attacker_strikes);
                self.push_strikes(counter, counters);
            }

            // Doubling follows the full exchange.
            match doubling_side(state, env, config, attacker, item, defender) {
                Some(StrikerSlot::Attacker) => self.push_strikes(attack, attacker_strikes),
                Some(StrikerSlot::Defender) if counters > 0 => {
                    self.push_strikes(counter, counters);
                }
                _ => {}
            }
        }

        for &splash_id in &self.splash {
            self.queue.push_back(ScheduledStrike {
                striker: self.attacker,
                defender: splash_id,
                slot: StrikerSlot::Attacker,
            });
        }

        if config.pairing_enabled {
            if let Some(partner_id) = attacker.partner {
                if let Some(&first_defender) = self.defenders.first() {
                    self.queue.push_back(ScheduledStrike {
                        striker: partner_id,
                        defender: first_defender,
                        slot: StrikerSlot::Assist,
                    });
                }
            }
        }

        Ok(())
    }

    fn push_strikes(&mut self, strike: ScheduledStrike, count: u32) {
        for _ in 0..count {
            self.queue.push_back(strike);
        }
    }

    /// May the defender counter this exchange at all?
    ///
    /// Requires a usable equipped weapon in range of the attacker, the
    /// attacker's item permitting counters, and the defender's weapon
    /// permitting them.
    fn can_counter(
        &self,
        state: &GameState,
        env: &CombatEnv<'_>,
        attacker: &UnitState,
        item: &ItemState,
        defender: &UnitState,
    ) -> bool {
        let Some(counter_item) = defender.equipped_item() else {
            return false;
        };

        let attacker_ctx = HookContext {
            state,
            env,
            owner: attacker.id,
            target: Some(defender.id),
        };
        let defender_ctx = HookContext {
            state,
            env,
            owner: defender.id,
            target: Some(attacker.id),
        };

        if !unique_gate(&counter_item.components, Hook::IsWeapon, &defender_ctx)
            || !available(&counter_item.components, &defender_ctx)
        {
            return false;
        }
        if !all_true(&item.components, Hook::CanBeCountered, &attacker_ctx)
            || !all_true(&counter_item.components, Hook::CanCounter, &defender_ctx)
            || !skill_veto(defender, Hook::CanCounter, &defender_ctx)
        {
            return false;
        }

        let distance = i64::from(defender.position.distance(attacker.position));
        let min = unique_scalar(&counter_item.components, Hook::MinRange, &defender_ctx);
        let max = unique_scalar(&counter_item.components, Hook::MaxRange, &defender_ctx);
        (min..=max).contains(&distance)
    }

    /// A strike scheduled earlier may have been invalidated by deaths since.
    fn strike_still_live(
        &self,
        state: &GameState,
        env: &CombatEnv<'_>,
        strike: ScheduledStrike,
    ) -> bool {
        let (Some(striker), Some(defender)) =
            (state.unit(strike.striker), state.unit(strike.defender))
        else {
            return false;
        };
        if !striker.is_alive() {
            debug!(striker = %strike.striker, "skipping strike, striker is down");
            return false;
        }
        if !defender.is_alive() {
            debug!(defender = %strike.defender, "skipping strike, defender is down");
            return false;
        }

        let Some(item) = self.strike_item(striker, strike) else {
            return false;
        };
        let ctx = HookContext {
            state,
            env,
            owner: strike.striker,
            target: Some(strike.defender),
        };
        available(&item.components, &ctx)
    }

    fn strike_item<'s>(
        &self,
        striker: &'s UnitState,
        strike: ScheduledStrike,
    ) -> Option<&'s ItemState> {
        match strike.slot {
            StrikerSlot::Attacker => striker.item(self.item),
            StrikerSlot::Defender | StrikerSlot::Assist => striker.equipped_item(),
        }
    }

    // ===== strike resolution =====

    fn resolve_strike(
        &mut self,
        state: &mut GameState,
        env: &CombatEnv<'_>,
        strike: ScheduledStrike,
    ) -> Result<StrikeResult, CombatError> {
        let config = env.config()?;

        // Chances come out of a read-only pass so the RNG roll below can
        // borrow the state mutably.
        let (item_uid, hit_chance, crit_chance, may_crit) = {
            let striker = unit(state, strike.striker)?;
            let defender = unit(state, strike.defender)?;
            let item = self
                .strike_item(striker, strike)
                .ok_or(CombatError::NoValidItem(strike.striker))?;

            let ctx = HookContext {
                state: &*state,
                env,
                owner: strike.striker,
                target: Some(strike.defender),
            };
            let may_crit = config.crit_enabled
                && all_true(&item.components, Hook::CanCrit, &ctx)
                && skill_veto(striker, Hook::CanCrit, &ctx)
                && skill_veto(defender, Hook::CanCrit, &ctx);
            (
                item.uid,
                hit_chance(state, env, striker, item, defender),
                crit_chance(state, env, striker, item, defender),
                may_crit,
            )
        };

        let mode = match self.script.next_for(strike.slot) {
            Some(ForcedOutcome::Hit) => StrikeMode::Hit,
            Some(ForcedOutcome::Crit) => StrikeMode::Crit,
            Some(ForcedOutcome::Miss) => StrikeMode::Miss,
            None => {
                if i64::from(state.rng.roll_d100()) > hit_chance {
                    StrikeMode::Miss
                } else if may_crit && i64::from(state.rng.roll_d100()) <= crit_chance {
                    StrikeMode::Crit
                } else {
                    StrikeMode::Hit
                }
            }
        };

        let mut playback = vec![match mode {
            StrikeMode::Hit => PlaybackEvent::MarkHit {
                attacker: strike.striker,
                defender: strike.defender,
                item: item_uid,
            },
            StrikeMode::Crit => PlaybackEvent::MarkCrit {
                attacker: strike.striker,
                defender: strike.defender,
                item: item_uid,
            },
            StrikeMode::Miss => PlaybackEvent::MarkMiss {
                attacker: strike.striker,
                defender: strike.defender,
                item: item_uid,
            },
        }];

        let hook = match mode {
            StrikeMode::Hit => Hook::OnHit,
            StrikeMode::Crit => Hook::OnCrit,
            StrikeMode::Miss => Hook::OnMiss,
        };

        let mut output = crate::component::StrikeOutput::default();
        {
            let striker = unit(state, strike.striker)?;
            let item = self
                .strike_item(striker, strike)
                .ok_or(CombatError::NoValidItem(strike.striker))?;
            let ctx = StrikeContext {
                state: &*state,
                env,
                attacker: strike.striker,
                defender: strike.defender,
                item,
                mode,
            };
            if let Err(err) = fire_strike(&item.components, hook, &ctx, &mut output) {
                // Abort the rest of this round; later rounds still run.
                self.queue.clear();
                return Err(err.into());
            }
        }
        playback.extend(output.playback);

        Ok(StrikeResult {
            striker: strike.striker,
            defender: strike.defender,
            item: item_uid,
            slot: strike.slot,
            mode,
            actions: output.actions,
            playback,
        })
    }
}

// ===== formulas =====

fn unit(state: &GameState, id: UnitId) -> Result<&UnitState, CombatError> {
    state.unit(id).ok_or(CombatError::UnitNotFound(id))
}

/// Any one skill gating `vantage` true gives the holder precedence.
fn has_vantage(
    state: &GameState,
    env: &CombatEnv<'_>,
    holder: &UnitState,
    opponent: UnitId,
) -> bool {
    let ctx = HookContext {
        state,
        env,
        owner: holder.id,
        target: Some(opponent),
    };
    holder
        .skills
        .iter()
        .any(|skill| unique_gate(&skill.components, Hook::Vantage, &ctx))
}

/// AllTrue veto across every skill the unit holds.
fn skill_veto(holder: &UnitState, hook: Hook, ctx: &HookContext<'_>) -> bool {
    holder
        .skills
        .iter()
        .all(|skill| all_true(&skill.components, hook, ctx))
}

/// Sum contribution across every skill the unit holds.
fn skill_sum(holder: &UnitState, hook: Hook, ctx: &HookContext<'_>) -> i64 {
    holder
        .skills
        .iter()
        .map(|skill| accumulate(&skill.components, hook, ctx))
        .sum()
}

/// Strikes this item delivers per scheduled block. Brave weapons set
/// `strike_count` to 2; dynamic contributions add on top. Always at least 1.
fn strike_count(
    state: &GameState,
    env: &CombatEnv<'_>,
    striker: &UnitState,
    item: &ItemState,
    defender: UnitId,
) -> u32 {
    let ctx = HookContext {
        state,
        env,
        owner: striker.id,
        target: Some(defender),
    };
    let count = unique_scalar(&item.components, Hook::StrikeCount, &ctx)
        + accumulate(&item.components, Hook::DynamicMultiattacks, &ctx)
        + skill_sum(striker, Hook::DynamicMultiattacks, &ctx);
    count.max(1) as u32
}

/// Which side, if any, earns doubling strikes this round.
fn doubling_side(
    state: &GameState,
    env: &CombatEnv<'_>,
    config: &crate::config::GameConfig,
    attacker: &UnitState,
    item: &ItemState,
    defender: &UnitState,
) -> Option<StrikerSlot> {
    let attacker_ctx = HookContext {
        state,
        env,
        owner: attacker.id,
        target: Some(defender.id),
    };
    let defender_ctx = HookContext {
        state,
        env,
        owner: defender.id,
        target: Some(attacker.id),
    };

    let attacker_speed = attack_speed(attacker, item, &attacker_ctx);
    let defender_speed = defender
        .equipped_item()
        .map(|counter_item| attack_speed(defender, counter_item, &defender_ctx))
        .unwrap_or_else(|| i64::from(defender.stats.speed));

    if attacker_speed - defender_speed >= config.double_threshold
        && all_true(&item.components, Hook::CanDouble, &attacker_ctx)
        && skill_veto(attacker, Hook::CanDouble, &attacker_ctx)
    {
        Some(StrikerSlot::Attacker)
    } else if defender_speed - attacker_speed >= config.double_threshold
        && defender.equipped_item().is_some_and(|counter_item| {
            all_true(&counter_item.components, Hook::CanDouble, &defender_ctx)
        })
        && skill_veto(defender, Hook::CanDouble, &defender_ctx)
    {
        Some(StrikerSlot::Defender)
    } else {
        None
    }
}

fn attack_speed(holder: &UnitState, item: &ItemState, ctx: &HookContext<'_>) -> i64 {
    i64::from(holder.stats.speed) + unique_scalar(&item.components, Hook::AttackSpeed, ctx)
}

/// Accuracy formula: item hit rate plus accuracy modifiers plus twice the
/// striker's skill stat, against the defender's avoid plus speed.
fn hit_chance(
    state: &GameState,
    env: &CombatEnv<'_>,
    striker: &UnitState,
    item: &ItemState,
    defender: &UnitState,
) -> i64 {
    let strike_ctx = HookContext {
        state,
        env,
        owner: striker.id,
        target: Some(defender.id),
    };
    let dodge_ctx = HookContext {
        state,
        env,
        owner: defender.id,
        target: Some(striker.id),
    };

    let accuracy = unique_scalar(&item.components, Hook::Hit, &strike_ctx)
        + accumulate(&item.components, Hook::ModifyAccuracy, &strike_ctx)
        + accumulate(&item.components, Hook::DynamicAccuracy, &strike_ctx)
        + skill_sum(striker, Hook::ModifyAccuracy, &strike_ctx)
        + i64::from(striker.stats.skill) * 2;

    let avoid = defender
        .equipped_item()
        .map(|held| unique_scalar(&held.components, Hook::Avoid, &dodge_ctx))
        .unwrap_or_else(|| Hook::Avoid.default_scalar())
        + skill_sum(defender, Hook::ModifyAvoid, &dodge_ctx)
        + i64::from(defender.stats.speed);

    (accuracy - avoid).clamp(0, 100)
}

/// Crit formula: item crit rate plus crit modifiers plus half the striker's
/// skill stat, against the defender's crit avoid plus luck.
fn crit_chance(
    state: &GameState,
    env: &CombatEnv<'_>,
    striker: &UnitState,
    item: &ItemState,
    defender: &UnitState,
) -> i64 {
    let strike_ctx = HookContext {
        state,
        env,
        owner: striker.id,
        target: Some(defender.id),
    };
    let dodge_ctx = HookContext {
        state,
        env,
        owner: defender.id,
        target: Some(striker.id),
    };

    let accuracy = unique_scalar(&item.components, Hook::Crit, &strike_ctx)
        + accumulate(&item.components, Hook::ModifyCritAccuracy, &strike_ctx)
        + skill_sum(striker, Hook::ModifyCritAccuracy, &strike_ctx)
        + i64::from(striker.stats.skill) / 2;

    let avoid = defender
        .equipped_item()
        .map(|held| unique_scalar(&held.components, Hook::CritAvoid, &dodge_ctx))
        .unwrap_or_else(|| Hook::CritAvoid.default_scalar())
        + skill_sum(defender, Hook::ModifyCritAvoid, &dodge_ctx)
        + i64::from(defender.stats.luck);

    (accuracy - avoid).clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ComponentValue, StrikeOutput};
    use crate::config::GameConfig;
    use crate::state::{CoreStats, Position, Team};

    /// Minimal weapon: gates `is_weapon`, deals a flat HP loss on hit.
    #[derive(Clone, Debug)]
    struct TestWeapon {
        damage: i64,
        strike_count: i64,
    }

    impl Component for TestWeapon {
        fn nid(&self) -> &'static str {
            "test_weapon"
        }

        fn defines(&self, hook: Hook) -> bool {
            matches!(
                hook,
                Hook::IsWeapon | Hook::Damage | Hook::StrikeCount | Hook::OnHit
            )
        }

        fn gate(&self, _hook: Hook, _ctx: &HookContext<'_>) -> bool {
            true
        }

        fn scalar(&self, hook: Hook, _ctx: &HookContext<'_>) -> i64 {
            match hook {
                Hook::Damage => self.damage,
                Hook::StrikeCount => self.strike_count,
                _ => 0,
            }
        }

        fn value(&self) -> ComponentValue {
            ComponentValue::Int(self.damage)
        }

        fn strike(&self, ctx: &StrikeContext<'_>, out: &mut StrikeOutput) -> Result<(), String> {
            if ctx.mode == StrikeMode::Miss {
                return Ok(());
            }
            let defender = ctx
                .state
                .unit(ctx.defender)
                .ok_or_else(|| "defender missing".to_string())?;
            let dealt = (self.damage as i32).min(defender.hp);
            out.actions.push(Action::ChangeHp {
                unit: ctx.defender,
                old: defender.hp,
                new: defender.hp - dealt,
            });
            Ok(())
        }

        fn boxed_clone(&self) -> Box<dyn Component> {
            Box::new(self.clone())
        }
    }

    fn armed_unit(state: &mut GameState, pos: Position, team: Team, damage: i64) -> UnitId {
        let mut unit = UnitState::new("fighter", team, CoreStats::new(30, 5, 4, 6, 3, 1, 2), pos);
        let mut item = ItemState::new("iron_sword", "Iron Sword").with_component(Box::new(
            TestWeapon {
                damage,
                strike_count: 1,
            },
        ));
        unit.items.push(item.clone());
        unit.equipped = Some(0);
        let id = state.add_unit(unit);
        item.uid = state.allocate_instance();
        state.unit_mut(id).unwrap().items[0].uid = item.uid;
        id
    }

    fn drive(
        solver: &mut CombatPhaseSolver,
        state: &mut GameState,
        env: &CombatEnv<'_>,
    ) -> Vec<StrikeResult> {
        let mut strikes = Vec::new();
        while let Some(strike) = solver.next_strike(state, env).unwrap() {
            for action in &strike.actions {
                action.execute(state).unwrap();
            }
            strikes.push(strike);
        }
        strikes
    }

    #[test]
    fn two_rounds_single_strike_weapons_give_four_strikes() {
        let mut state = GameState::new(7);
        let attacker = armed_unit(&mut state, Position::new(0, 0), Team::Player, 3);
        let defender = armed_unit(&mut state, Position::new(0, 1), Team::Enemy, 3);
        let config = GameConfig::default();
        let env = CombatEnv::empty().with_config(&config);

        let item = state.unit(attacker).unwrap().items[0].uid;
        let script = CombatScript::parse(&["hit1", "hit2", "hit1", "hit2"]).unwrap();
        let mut solver =
            CombatPhaseSolver::new(attacker, item, vec![defender], vec![], script, 2);

        let strikes = drive(&mut solver, &mut state, &env);
        assert_eq!(strikes.len(), 4);
        assert_eq!(
            strikes.iter().map(|s| s.striker).collect::<Vec<_>>(),
            vec![attacker, defender, attacker, defender]
        );
        assert!(strikes.iter().all(|s| s.mode == StrikeMode::Hit));
    }

    #[test]
    fn strikes_against_dead_defender_are_skipped_not_missed() {
        let mut state = GameState::new(7);
        // Overkill damage: the defender dies to the first strike.
        let attacker = armed_unit(&mut state, Position::new(0, 0), Team::Player, 99);
        let defender = armed_unit(&mut state, Position::new(0, 1), Team::Enemy, 3);
        let config = GameConfig::default();
        let env = CombatEnv::empty().with_config(&config);

        let item = state.unit(attacker).unwrap().items[0].uid;
        let script = CombatScript::parse(&["hit1"]).unwrap();
        let mut solver =
            CombatPhaseSolver::new(attacker, item, vec![defender], vec![], script, 2);

        let strikes = drive(&mut solver, &mut state, &env);
        assert_eq!(strikes.len(), 1);
        assert!(!strikes
            .iter()
            .flat_map(|s| &s.playback)
            .any(|event| matches!(event, PlaybackEvent::MarkMiss { .. })));
        assert_eq!(state.unit(defender).unwrap().hp, 0);
    }

    #[test]
    fn zero_total_rounds_aborts_immediately() {
        let mut state = GameState::new(7);
        let attacker = armed_unit(&mut state, Position::new(0, 0), Team::Player, 3);
        let defender = armed_unit(&mut state, Position::new(0, 1), Team::Enemy, 3);
        let config = GameConfig::default();
        let env = CombatEnv::empty().with_config(&config);

        let item = state.unit(attacker).unwrap().items[0].uid;
        let mut solver = CombatPhaseSolver::new(
            attacker,
            item,
            vec![defender],
            vec![],
            CombatScript::default(),
            1,
        );
        solver.set_total_rounds(0);

        assert!(solver.next_strike(&mut state, &env).unwrap().is_none());
        assert!(solver.is_done());
    }

    #[test]
    fn brave_weapon_strikes_twice_before_the_counter() {
        let mut state = GameState::new(7);
        let attacker = armed_unit(&mut state, Position::new(0, 0), Team::Player, 3);
        let defender = armed_unit(&mut state, Position::new(0, 1), Team::Enemy, 3);
        state.unit_mut(attacker).unwrap().items[0]
            .components
            .clear();
        state.unit_mut(attacker).unwrap().items[0]
            .components
            .push(Box::new(TestWeapon {
                damage: 3,
                strike_count: 2,
            }));
        let config = GameConfig::default();
        let env = CombatEnv::empty().with_config(&config);

        let item = state.unit(attacker).unwrap().items[0].uid;
        let script = CombatScript::parse(&["hit1", "hit1", "hit2"]).unwrap();
        let mut solver =
            CombatPhaseSolver::new(attacker, item, vec![defender], vec![], script, 1);

        let strikes = drive(&mut solver, &mut state, &env);
        assert_eq!(
            strikes.iter().map(|s| s.striker).collect::<Vec<_>>(),
            vec![attacker, attacker, defender]
        );
    }

    #[test]
    fn vantage_skill_gives_the_defender_the_first_strike() {
        #[derive(Clone, Debug)]
        struct VantageGate;
        impl Component for VantageGate {
            fn nid(&self) -> &'static str {
                "vantage_gate"
            }
            fn defines(&self, hook: Hook) -> bool {
                hook == Hook::Vantage
            }
            fn gate(&self, _hook: Hook, _ctx: &HookContext<'_>) -> bool {
                true
            }
            fn boxed_clone(&self) -> Box<dyn Component> {
                Box::new(self.clone())
            }
        }

        let mut state = GameState::new(7);
        let attacker = armed_unit(&mut state, Position::new(0, 0), Team::Player, 3);
        let defender = armed_unit(&mut state, Position::new(0, 1), Team::Enemy, 3);
        let skill = crate::state::SkillState::new("vantage", "Vantage")
            .with_component(Box::new(VantageGate));
        state.unit_mut(defender).unwrap().skills.push(skill);
        let config = GameConfig::default();
        let env = CombatEnv::empty().with_config(&config);

        let item = state.unit(attacker).unwrap().items[0].uid;
        let script = CombatScript::parse(&["hit2", "hit1"]).unwrap();
        let mut solver =
            CombatPhaseSolver::new(attacker, item, vec![defender], vec![], script, 1);

        let strikes = drive(&mut solver, &mut state, &env);
        assert_eq!(
            strikes.iter().map(|s| s.striker).collect::<Vec<_>>(),
            vec![defender, attacker]
        );
    }

    #[test]
    fn out_of_range_defender_cannot_counter() {
        let mut state = GameState::new(7);
        let attacker = armed_unit(&mut state, Position::new(0, 0), Team::Player, 3);
        // Three tiles away: inside no melee weapon's counter range.
        let defender = armed_unit(&mut state, Position::new(0, 3), Team::Enemy, 3);
        let config = GameConfig::default();
        let env = CombatEnv::empty().with_config(&config);

        let item = state.unit(attacker).unwrap().items[0].uid;
        let script = CombatScript::parse(&["hit1"]).unwrap();
        let mut solver =
            CombatPhaseSolver::new(attacker, item, vec![defender], vec![], script, 1);

        let strikes = drive(&mut solver, &mut state, &env);
        assert_eq!(strikes.len(), 1);
        assert_eq!(strikes[0].striker, attacker);
    }
}
