//! Weapon identity components: what makes an item a weapon, its range, and
//! its counter/multi-strike behavior.

use tactics_core::{Component, ComponentValue, Hook, HookContext};

/// Marks an item as an equippable weapon training one proficiency class.
#[derive(Clone, Debug)]
pub struct Weapon {
    kind: String,
}

impl Weapon {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

impl Component for Weapon {
    fn nid(&self) -> &'static str {
        "weapon"
    }

    fn value(&self) -> ComponentValue {
        ComponentValue::Str(self.kind.clone())
    }

    fn defines(&self, hook: Hook) -> bool {
        matches!(hook, Hook::IsWeapon | Hook::Equippable | Hook::WeaponType)
    }

    fn gate(&self, _hook: Hook, _ctx: &HookContext<'_>) -> bool {
        true
    }

    fn weapon_type(&self) -> Option<&str> {
        Some(&self.kind)
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Strike range in board tiles, inclusive on both ends.
#[derive(Clone, Debug)]
pub struct Range {
    min: i64,
    max: i64,
}

impl Range {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn melee() -> Self {
        Self::new(1, 1)
    }
}

impl Component for Range {
    fn nid(&self) -> &'static str {
        "range"
    }

    fn value(&self) -> ComponentValue {
        ComponentValue::List(vec![
            ComponentValue::Int(self.min),
            ComponentValue::Int(self.max),
        ])
    }

    fn defines(&self, hook: Hook) -> bool {
        matches!(hook, Hook::MinRange | Hook::MaxRange)
    }

    fn scalar(&self, hook: Hook, _ctx: &HookContext<'_>) -> i64 {
        match hook {
            Hook::MinRange => self.min,
            Hook::MaxRange => self.max,
            _ => 0,
        }
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Brave weapons strike multiple consecutive times per scheduled block.
#[derive(Clone, Debug)]
pub struct Brave {
    strikes: i64,
}

impl Brave {
    pub fn new(strikes: i64) -> Self {
        Self { strikes }
    }
}

impl Default for Brave {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Component for Brave {
    fn nid(&self) -> &'static str {
        "brave"
    }

    fn value(&self) -> ComponentValue {
        ComponentValue::Int(self.strikes)
    }

    fn defines(&self, hook: Hook) -> bool {
        hook == Hook::StrikeCount
    }

    fn scalar(&self, _hook: Hook, _ctx: &HookContext<'_>) -> i64 {
        self.strikes
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// The defender may not counter strikes from this item.
#[derive(Clone, Copy, Debug, Default)]
pub struct CannotBeCountered;

impl Component for CannotBeCountered {
    fn nid(&self) -> &'static str {
        "cannot_be_countered"
    }

    fn defines(&self, hook: Hook) -> bool {
        hook == Hook::CanBeCountered
    }

    fn veto(&self, _hook: Hook, _ctx: &HookContext<'_>) -> bool {
        false
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(*self)
    }
}
