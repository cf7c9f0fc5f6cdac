//! Charge metering: limited-use items and their broken state.

use tactics_core::turnwheel::Action;
use tactics_core::{
    Component, ComponentValue, Hook, HookContext, StrikeContext, StrikeOutput,
};

/// Meters item uses. Every resolved strike (hit or miss) spends one charge
/// through a reversible action; at zero charges the item is unavailable and
/// its `is_broken` gate turns true, which the post-combat broken-item pass
/// picks up.
#[derive(Clone, Debug)]
pub struct Uses {
    charges: i64,
}

impl Uses {
    pub fn new(charges: i64) -> Self {
        Self { charges }
    }
}

impl Component for Uses {
    fn nid(&self) -> &'static str {
        "uses"
    }

    fn value(&self) -> ComponentValue {
        ComponentValue::Int(self.charges)
    }

    fn defines(&self, hook: Hook) -> bool {
        matches!(
            hook,
            Hook::IsBroken | Hook::Available | Hook::OnHit | Hook::OnMiss
        )
    }

    fn gate(&self, _hook: Hook, _ctx: &HookContext<'_>) -> bool {
        self.charges <= 0
    }

    fn available(&self, _ctx: &HookContext<'_>) -> bool {
        self.charges > 0
    }

    fn strike(&self, ctx: &StrikeContext<'_>, out: &mut StrikeOutput) -> Result<(), String> {
        out.actions.push(Action::UseCharge {
            unit: ctx.attacker,
            item: ctx.item.uid,
            old: self.charges,
            new: self.charges - 1,
        });
        Ok(())
    }

    fn charges(&self) -> Option<i64> {
        Some(self.charges)
    }

    fn set_charges(&mut self, charges: i64) {
        self.charges = charges;
    }

    fn save(&self) -> ComponentValue {
        ComponentValue::Int(self.charges)
    }

    fn restore(&mut self, value: ComponentValue) {
        if let Some(charges) = value.as_int() {
            self.charges = charges;
        }
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}
