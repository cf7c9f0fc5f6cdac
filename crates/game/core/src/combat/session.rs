//! The combat orchestrator: one session end-to-end.
//!
//! A session resolves targets, fires start-of-combat hooks, drives the
//! phase solver applying every strike's actions immediately, runs the
//! bookkeeping passes, fires end/cleanup hooks, and records the whole thing
//! as one composite action in the log. Combat is not step-by-step
//! rewindable: the session is the rewind unit, and its composite action
//! carries the RNG snapshots that make a rewound combat replay bit-for-bit.

use tracing::{debug, info};

use crate::component::{
    available, fire_event, resolve_splash, target_restrict, valid_targets, Hook, HookContext,
};
use crate::env::CombatEnv;
use crate::state::{GameState, InstanceId, Position, UnitId};
use crate::turnwheel::{Action, ActionLog};

use super::script::CombatScript;
use super::solver::CombatPhaseSolver;
use super::{bookkeeping, CombatError, PlaybackEvent};

/// What a finished session reports back to the caller.
#[derive(Debug)]
pub struct CombatOutcome {
    /// Every event in resolution order, bookkeeping-generated events last.
    pub playback: Vec<PlaybackEvent>,
    pub defenders: Vec<UnitId>,
    pub splash: Vec<UnitId>,
}

/// One combat, from target resolution to the recorded composite action.
#[derive(Debug)]
pub struct CombatSession {
    attacker: UnitId,
    item: InstanceId,
    target: Position,
    script: CombatScript,
    total_rounds: u32,
}

impl CombatSession {
    pub fn new(attacker: UnitId, item: InstanceId, target: Position) -> Self {
        Self {
            attacker,
            item,
            target,
            script: CombatScript::default(),
            total_rounds: 1,
        }
    }

    /// Forces strike outcomes for scripted or mock combats.
    pub fn with_script(mut self, script: CombatScript) -> Self {
        self.script = script;
        self
    }

    /// More than one round repeats the full strike schedule.
    pub fn with_total_rounds(mut self, rounds: u32) -> Self {
        self.total_rounds = rounds;
        self
    }

    /// Runs the session to completion.
    ///
    /// Every applied action rides in one composite log entry together with
    /// the RNG snapshots taken before and after; rewinding past the entry
    /// undoes the entire combat.
    pub fn resolve(
        mut self,
        state: &mut GameState,
        env: &CombatEnv<'_>,
        log: &mut ActionLog,
    ) -> Result<CombatOutcome, CombatError> {
        let script = std::mem::take(&mut self.script);
        let (defenders, splash) = self.resolve_targets(state, env)?;
        info!(
            attacker = %self.attacker,
            defenders = defenders.len(),
            splash = splash.len(),
            "combat session starting"
        );

        let rng_before = state.rng.snapshot();
        let mut applied: Vec<Action> = Vec::new();
        let mut playback: Vec<PlaybackEvent> = Vec::new();

        let participants: Vec<UnitId> = std::iter::once(self.attacker)
            .chain(defenders.iter().copied())
            .chain(splash.iter().copied())
            .collect();
        for &unit in &participants {
            self.fire_unit_event(state, env, unit, Hook::StartCombat, &mut applied)?;
        }

        let mut solver = CombatPhaseSolver::new(
            self.attacker,
            self.item,
            defenders.clone(),
            splash.clone(),
            script,
            self.total_rounds,
        );
        while let Some(strike) = solver.next_strike(state, env)? {
            for action in strike.actions {
                action.execute(state)?;
                applied.push(action);
            }
            playback.extend(strike.playback);
            self.check_death(state, env, strike.defender, strike.striker, &mut applied, &mut playback)?;
            self.check_death(state, env, strike.striker, strike.defender, &mut applied, &mut playback)?;
        }

        for &unit in &participants {
            self.fire_unit_event(state, env, unit, Hook::EndCombat, &mut applied)?;
        }

        let books = bookkeeping::run(state, env, self.attacker, &playback)?;
        for action in books.actions {
            action.execute(state)?;
            applied.push(action);
        }
        playback.extend(books.playback);

        for &unit in &participants {
            self.fire_unit_event(state, env, unit, Hook::CleanupCombat, &mut applied)?;
        }

        let rng_after = state.rng.snapshot();
        log.record(Action::CombatSession {
            rng_before,
            rng_after,
            actions: applied,
        });

        debug!(events = playback.len(), "combat session complete");
        Ok(CombatOutcome {
            playback,
            defenders,
            splash,
        })
    }

    /// Resolves the targeted position into defenders and splash units.
    ///
    /// The item's targeting components are consulted first: every
    /// restricting component must accept the position, and when any
    /// component nominates valid targets the position must be in their
    /// union. The splash-defining components then nominate the main target
    /// and secondary positions; without any, the targeted position is the
    /// single main target. Defenders are deduplicated, and splash units that
    /// are already defenders (or the attacker) are dropped.
    fn resolve_targets(
        &self,
        state: &GameState,
        env: &CombatEnv<'_>,
    ) -> Result<(Vec<UnitId>, Vec<UnitId>), CombatError> {
        let attacker = state
            .unit(self.attacker)
            .ok_or(CombatError::UnitNotFound(self.attacker))?;
        if !attacker.is_alive() {
            return Err(CombatError::DeadUnit(self.attacker));
        }
        let item = attacker
            .item(self.item)
            .ok_or(CombatError::NoValidItem(self.attacker))?;

        let ctx = HookContext {
            state,
            env,
            owner: self.attacker,
            target: None,
        };
        if !available(&item.components, &ctx) {
            return Err(CombatError::NoValidItem(self.attacker));
        }

        if !target_restrict(&item.components, &ctx, self.target) {
            return Err(CombatError::NoTarget(self.target));
        }
        let nominates_targets = item
            .components
            .iter()
            .any(|component| component.defines(Hook::ValidTargets));
        if nominates_targets && !valid_targets(&item.components, &ctx).contains(&self.target) {
            return Err(CombatError::NoTarget(self.target));
        }

        let (main, splash_positions) = resolve_splash(&item.components, &ctx, self.target);

        let mut defenders: Vec<UnitId> = Vec::new();
        if let Some(main) = main {
            if let Some(unit) = state.unit_at(main) {
                defenders.push(unit);
            }
        }
        let mut splash: Vec<UnitId> = Vec::new();
        for pos in splash_positions {
            let Some(unit) = state.unit_at(pos) else {
                continue;
            };
            if unit == self.attacker || defenders.contains(&unit) || splash.contains(&unit) {
                continue;
            }
            splash.push(unit);
        }

        if defenders.is_empty() && splash.is_empty() {
            return Err(CombatError::NoTarget(self.target));
        }
        Ok((defenders, splash))
    }

    /// Fires an event hook over a unit's equipped item and every skill,
    /// applying the emitted actions immediately.
    fn fire_unit_event(
        &self,
        state: &mut GameState,
        env: &CombatEnv<'_>,
        unit: UnitId,
        hook: Hook,
        applied: &mut Vec<Action>,
    ) -> Result<(), CombatError> {
        let mut emitted: Vec<Action> = Vec::new();
        {
            let Some(holder) = state.unit(unit) else {
                return Ok(());
            };
            let ctx = HookContext {
                state: &*state,
                env,
                owner: unit,
                target: None,
            };
            if let Some(item) = holder.equipped_item() {
                fire_event(&item.components, hook, &ctx, &mut emitted);
            }
            for skill in &holder.skills {
                fire_event(&skill.components, hook, &ctx, &mut emitted);
            }
        }
        for action in emitted {
            action.execute(state)?;
            applied.push(action);
        }
        Ok(())
    }

    /// Marks a unit dead the moment its HP reaches zero, firing `on_death`
    /// hooks. Dead units no longer act for the rest of the session.
    fn check_death(
        &self,
        state: &mut GameState,
        env: &CombatEnv<'_>,
        unit: UnitId,
        killer: UnitId,
        applied: &mut Vec<Action>,
        playback: &mut Vec<PlaybackEvent>,
    ) -> Result<(), CombatError> {
        let Some(fallen) = state.unit(unit) else {
            return Ok(());
        };
        if fallen.dead || fallen.hp > 0 {
            return Ok(());
        }

        debug!(unit = %unit, killer = %killer, "unit fell in combat");
        let die = Action::Die { unit };
        die.execute(state)?;
        applied.push(die);
        playback.push(PlaybackEvent::UnitDeath {
            unit,
            killer: Some(killer),
        });
        self.fire_unit_event(state, env, unit, Hook::OnDeath, applied)?;
        Ok(())
    }
}
