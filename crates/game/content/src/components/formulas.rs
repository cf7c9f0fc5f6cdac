//! Combat formula components: the scalar hooks feeding the solver's rolls,
//! and the damage strike effect itself.

use tactics_core::component::{accumulate, unique_scalar};
use tactics_core::turnwheel::Action;
use tactics_core::{
    Component, ComponentValue, Hook, HookContext, PlaybackEvent, StrikeContext, StrikeMode,
    StrikeOutput,
};

/// Might of the item plus the damage-dealing strike effect.
///
/// On a landed strike, the dealt amount is the item's `damage` scalar plus
/// every damage modifier plus the striker's strength, reduced by the
/// defender's defense, floored at zero. Crits multiply by the item's
/// `crit_multiplier`.
#[derive(Clone, Debug)]
pub struct Damage {
    might: i64,
}

impl Damage {
    pub fn new(might: i64) -> Self {
        Self { might }
    }
}

impl Component for Damage {
    fn nid(&self) -> &'static str {
        "damage"
    }

    fn value(&self) -> ComponentValue {
        ComponentValue::Int(self.might)
    }

    fn defines(&self, hook: Hook) -> bool {
        matches!(hook, Hook::Damage | Hook::OnHit)
    }

    fn scalar(&self, _hook: Hook, _ctx: &HookContext<'_>) -> i64 {
        self.might
    }

    fn strike(&self, ctx: &StrikeContext<'_>, out: &mut StrikeOutput) -> Result<(), String> {
        if ctx.mode == StrikeMode::Miss {
            return Ok(());
        }
        let striker = ctx
            .state
            .unit(ctx.attacker)
            .ok_or_else(|| format!("striker {} missing", ctx.attacker))?;
        let defender = ctx
            .state
            .unit(ctx.defender)
            .ok_or_else(|| format!("defender {} missing", ctx.defender))?;

        let strike_ctx = HookContext {
            state: ctx.state,
            env: ctx.env,
            owner: ctx.attacker,
            target: Some(ctx.defender),
        };
        let guard_ctx = HookContext {
            state: ctx.state,
            env: ctx.env,
            owner: ctx.defender,
            target: Some(ctx.attacker),
        };

        let attack = unique_scalar(&ctx.item.components, Hook::Damage, &strike_ctx)
            + accumulate(&ctx.item.components, Hook::ModifyDamage, &strike_ctx)
            + accumulate(&ctx.item.components, Hook::DynamicDamage, &strike_ctx)
            + i64::from(striker.stats.strength);
        let guard = defender
            .equipped_item()
            .map(|held| unique_scalar(&held.components, Hook::Defense, &guard_ctx))
            .unwrap_or(0)
            + i64::from(defender.stats.defense);

        let mut amount = (attack - guard).max(0);
        if ctx.mode == StrikeMode::Crit {
            amount *= unique_scalar(&ctx.item.components, Hook::CritMultiplier, &strike_ctx);
        }

        let amount = amount as i32;
        let dealt = amount.min(defender.hp);
        out.actions.push(Action::ChangeHp {
            unit: ctx.defender,
            old: defender.hp,
            new: defender.hp - dealt,
        });
        out.playback.push(match ctx.mode {
            StrikeMode::Crit => PlaybackEvent::DamageCrit {
                attacker: ctx.attacker,
                item: ctx.item.uid,
                defender: ctx.defender,
                amount,
                dealt,
            },
            _ => PlaybackEvent::DamageHit {
                attacker: ctx.attacker,
                item: ctx.item.uid,
                defender: ctx.defender,
                amount,
                dealt,
            },
        });
        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Base hit rate of the item.
#[derive(Clone, Debug)]
pub struct HitRate {
    rate: i64,
}

impl HitRate {
    pub fn new(rate: i64) -> Self {
        Self { rate }
    }
}

impl Component for HitRate {
    fn nid(&self) -> &'static str {
        "hit"
    }

    fn value(&self) -> ComponentValue {
        ComponentValue::Int(self.rate)
    }

    fn defines(&self, hook: Hook) -> bool {
        hook == Hook::Hit
    }

    fn scalar(&self, _hook: Hook, _ctx: &HookContext<'_>) -> i64 {
        self.rate
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Base crit rate of the item.
#[derive(Clone, Debug)]
pub struct CritRate {
    rate: i64,
}

impl CritRate {
    pub fn new(rate: i64) -> Self {
        Self { rate }
    }
}

impl Component for CritRate {
    fn nid(&self) -> &'static str {
        "crit"
    }

    fn value(&self) -> ComponentValue {
        ComponentValue::Int(self.rate)
    }

    fn defines(&self, hook: Hook) -> bool {
        hook == Hook::Crit
    }

    fn scalar(&self, _hook: Hook, _ctx: &HookContext<'_>) -> i64 {
        self.rate
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}
