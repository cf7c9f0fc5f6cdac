//! Skill-side components: combat precedence and bookkeeping contributors.

use tactics_core::{Component, ComponentValue, Hook, HookContext};

/// Grants the holder the first strike when defending.
#[derive(Clone, Copy, Debug, Default)]
pub struct Vantage;

impl Component for Vantage {
    fn nid(&self) -> &'static str {
        "vantage"
    }

    fn defines(&self, hook: Hook) -> bool {
        hook == Hook::Vantage
    }

    fn gate(&self, _hook: Hook, _ctx: &HookContext<'_>) -> bool {
        true
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(*self)
    }
}

/// Flat bonus experience contributed by the used item or a held skill.
#[derive(Clone, Debug)]
pub struct ExpBoost {
    bonus: i64,
}

impl ExpBoost {
    pub fn new(bonus: i64) -> Self {
        Self { bonus }
    }
}

impl Component for ExpBoost {
    fn nid(&self) -> &'static str {
        "exp_boost"
    }

    fn value(&self) -> ComponentValue {
        ComponentValue::Int(self.bonus)
    }

    fn defines(&self, hook: Hook) -> bool {
        hook == Hook::Exp
    }

    fn contribute(&self, _hook: Hook, _ctx: &HookContext<'_>) -> i64 {
        self.bonus
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Flat bonus weapon experience per session.
#[derive(Clone, Debug)]
pub struct WexpBoost {
    bonus: i64,
}

impl WexpBoost {
    pub fn new(bonus: i64) -> Self {
        Self { bonus }
    }
}

impl Component for WexpBoost {
    fn nid(&self) -> &'static str {
        "wexp_boost"
    }

    fn value(&self) -> ComponentValue {
        ComponentValue::Int(self.bonus)
    }

    fn defines(&self, hook: Hook) -> bool {
        hook == Hook::Wexp
    }

    fn contribute(&self, _hook: Hook, _ctx: &HookContext<'_>) -> i64 {
        self.bonus
    }

    fn boxed_clone(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}
