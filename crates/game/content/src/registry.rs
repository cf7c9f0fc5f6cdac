//! The component catalog.
//!
//! Explicit registration only: every component the engine can restore from a
//! save is listed here by its stable id. There is no runtime discovery; a
//! component missing from this table is dropped on restore with a warning
//! from the persistence layer.

use tactics_core::{Component, ComponentRegistry, ComponentValue};
use tracing::warn;

use crate::components::{
    Blast, Brave, CannotBeCountered, CritRate, Damage, ExpBoost, HealOnHit, HitRate, Range,
    StatusOnHit, TargetsAllies, Uses, Vantage, Weapon, WexpBoost, WoundedOnly,
};

/// Catalog of the standard component set.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardRegistry;

impl StandardRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl ComponentRegistry for StandardRegistry {
    fn build(&self, nid: &str, value: ComponentValue) -> Option<Box<dyn Component>> {
        let component: Box<dyn Component> = match nid {
            "weapon" => Box::new(Weapon::new(value.as_str()?)),
            "range" => {
                let ComponentValue::List(bounds) = &value else {
                    return malformed(nid, &value);
                };
                let (Some(min), Some(max)) = (
                    bounds.first().and_then(ComponentValue::as_int),
                    bounds.get(1).and_then(ComponentValue::as_int),
                ) else {
                    return malformed(nid, &value);
                };
                Box::new(Range::new(min, max))
            }
            "brave" => Box::new(Brave::new(value.as_int()?)),
            "blast" => Box::new(Blast::new(value.as_int()?)),
            "cannot_be_countered" => Box::new(CannotBeCountered),
            "damage" => Box::new(Damage::new(value.as_int()?)),
            "hit" => Box::new(HitRate::new(value.as_int()?)),
            "crit" => Box::new(CritRate::new(value.as_int()?)),
            "heal_on_hit" => Box::new(HealOnHit::new(value.as_int()?)),
            "wounded_only" => Box::new(WoundedOnly),
            "targets_allies" => Box::new(TargetsAllies),
            "status_on_hit" => Box::new(StatusOnHit::new(value.as_str()?)),
            "uses" => Box::new(Uses::new(value.as_int()?)),
            "vantage" => Box::new(Vantage),
            "exp_boost" => Box::new(ExpBoost::new(value.as_int()?)),
            "wexp_boost" => Box::new(WexpBoost::new(value.as_int()?)),
            _ => return None,
        };
        Some(component)
    }
}

fn malformed(nid: &str, value: &ComponentValue) -> Option<Box<dyn Component>> {
    warn!(component = nid, ?value, "malformed component value");
    None
}
