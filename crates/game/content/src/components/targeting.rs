//! Targeting components: restrictions and nominations consulted before a
//! session resolves its defenders.

use tactics_core::state::Position;
use tactics_core::{Component, Hook, HookContext};

/// Restricts the item to units missing HP. Typical on staves: a full-health
/// ally is not a legal target.
#[derive(Clone, Copy, Debug, Default)]
pub struct WoundedOnly;

impl Component for WoundedOnly {
    fn nid(&self) -> &'static str {
        "wounded_only"
    }

    fn defines(&self, hook: Hook) -> bool {
        hook == Hook::TargetRestrict
    }

    fn target_restrict(&self, ctx: &HookContext<'_>, pos: Position) -> bool {
        ctx.state
            .unit_at(pos)
            .and_then(|id| ctx.state.unit(id))
            .is_some_and(|unit| unit.hp < unit.stats.hp_max)
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(*self)
    }
}

/// Nominates the positions of living allied units as the item's valid
/// targets. The holder itself is not a nominee.
#[derive(Clone, Copy, Debug, Default)]
pub struct TargetsAllies;

impl Component for TargetsAllies {
    fn nid(&self) -> &'static str {
        "targets_allies"
    }

    fn defines(&self, hook: Hook) -> bool {
        hook == Hook::ValidTargets
    }

    fn valid_targets(&self, ctx: &HookContext<'_>) -> Vec<Position> {
        let Some(holder) = ctx.state.unit(ctx.owner) else {
            return Vec::new();
        };
        ctx.state
            .units()
            .filter(|unit| unit.is_alive() && unit.team == holder.team && unit.id != ctx.owner)
            .map(|unit| unit.position)
            .collect()
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(*self)
    }
}
