//! Strike effect components beyond plain damage: healing, status
//! infliction, and splash targeting.

use tactics_core::state::{Position, SkillState, SourceInfo, SourceKind};
use tactics_core::turnwheel::grant_skill;
use tactics_core::{
    Component, ComponentValue, Hook, HookContext, PlaybackEvent, SplashNomination, StrikeContext,
    StrikeMode, StrikeOutput,
};

/// Restores HP to the struck unit instead of harming it.
#[derive(Clone, Debug)]
pub struct HealOnHit {
    amount: i64,
}

impl HealOnHit {
    pub fn new(amount: i64) -> Self {
        Self { amount }
    }
}

impl Component for HealOnHit {
    fn nid(&self) -> &'static str {
        "heal_on_hit"
    }

    fn value(&self) -> ComponentValue {
        ComponentValue::Int(self.amount)
    }

    fn defines(&self, hook: Hook) -> bool {
        hook == Hook::OnHit
    }

    fn strike(&self, ctx: &StrikeContext<'_>, out: &mut StrikeOutput) -> Result<(), String> {
        if ctx.mode == StrikeMode::Miss {
            return Ok(());
        }
        let target = ctx
            .state
            .unit(ctx.defender)
            .ok_or_else(|| format!("heal target {} missing", ctx.defender))?;

        let amount = self.amount as i32;
        let healed = amount.min(target.stats.hp_max - target.hp);
        out.actions.push(tactics_core::Action::ChangeHp {
            unit: ctx.defender,
            old: target.hp,
            new: target.hp + healed,
        });
        out.playback.push(PlaybackEvent::HealHit {
            healer: ctx.attacker,
            item: ctx.item.uid,
            target: ctx.defender,
            amount,
            healed,
        });
        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Grants a status skill to the struck unit on a landed strike.
///
/// The skill template comes from the environment's skill oracle; an unknown
/// template degrades to a visible placeholder rather than failing the
/// strike. The granted copy is item-sourced so only an item-kind removal can
/// clear it.
#[derive(Clone, Debug)]
pub struct StatusOnHit {
    skill: String,
}

impl StatusOnHit {
    pub fn new(skill: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
        }
    }
}

impl Component for StatusOnHit {
    fn nid(&self) -> &'static str {
        "status_on_hit"
    }

    fn value(&self) -> ComponentValue {
        ComponentValue::Str(self.skill.clone())
    }

    fn defines(&self, hook: Hook) -> bool {
        hook == Hook::OnHit
    }

    fn strike(&self, ctx: &StrikeContext<'_>, out: &mut StrikeOutput) -> Result<(), String> {
        if ctx.mode == StrikeMode::Miss {
            return Ok(());
        }
        let oracle = ctx.env.skills().map_err(|err| err.to_string())?;
        let skill = oracle
            .template(&self.skill)
            .unwrap_or_else(|| SkillState::placeholder(&self.skill))
            .with_source(SourceInfo::with_source(SourceKind::Item, &ctx.item.nid));

        out.actions
            .extend(grant_skill(ctx.state, ctx.defender, skill));
        out.playback.push(PlaybackEvent::StatusHit {
            attacker: ctx.attacker,
            item: ctx.item.uid,
            defender: ctx.defender,
            status: self.skill.clone(),
        });
        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Blast targeting: the struck position stays the main target and every
/// tile within the radius (Manhattan) becomes splash.
#[derive(Clone, Debug)]
pub struct Blast {
    radius: i64,
}

impl Blast {
    pub fn new(radius: i64) -> Self {
        Self { radius }
    }
}

impl Component for Blast {
    fn nid(&self) -> &'static str {
        "blast"
    }

    fn value(&self) -> ComponentValue {
        ComponentValue::Int(self.radius)
    }

    fn defines(&self, hook: Hook) -> bool {
        hook == Hook::Splash
    }

    fn splash(&self, ctx: &HookContext<'_>, pos: Position) -> Option<SplashNomination> {
        let radius = self.radius as i32;
        let mut splash = Vec::new();
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if dx.abs() + dy.abs() > radius {
                    continue;
                }
                let tile = Position::new(pos.x + dx, pos.y + dy);
                // Without a board oracle every tile is assumed in bounds.
                if let Ok(board) = ctx.env.board() {
                    if !board.in_bounds(tile) {
                        continue;
                    }
                }
                splash.push(tile);
            }
        }
        Some(SplashNomination {
            main: Some(pos),
            splash,
        })
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}
