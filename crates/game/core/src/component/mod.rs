//! Components: independently authored behavior units attached to items and
//! skills.
//!
//! A component implements zero or more named hooks; the dispatcher discovers
//! what a component implements through the explicit [`Component::defines`]
//! capability query and aggregates results per the hook's
//! [`DispatchPolicy`]. Components carry per-instance mutable state (e.g.
//! remaining charges), so instantiating an item from its template deep-copies
//! every component; they are never shared between instances.

mod dispatch;
mod hook;

pub use dispatch::{
    accumulate, all_true, available, fire_event, fire_strike, resolve_splash, target_restrict,
    unique_gate, unique_scalar, valid_targets, weapon_type,
};
pub use hook::{DispatchPolicy, Hook};

use std::collections::BTreeMap;

use crate::combat::PlaybackEvent;
use crate::env::CombatEnv;
use crate::state::{GameState, ItemState, Position, UnitId};
use crate::turnwheel::Action;

/// Typed value carried by a component instance.
///
/// Values round-trip through [`Component::save`] / [`Component::restore`],
/// which is how per-instance state survives serialization.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ComponentValue {
    None,
    Int(i64),
    Bool(bool),
    Str(String),
    List(Vec<ComponentValue>),
    Map(BTreeMap<String, ComponentValue>),
}

impl ComponentValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }
}

/// Read-only context handed to non-strike hooks.
#[derive(Clone, Copy)]
pub struct HookContext<'a> {
    pub state: &'a GameState,
    pub env: &'a CombatEnv<'a>,
    /// Unit holding the item/skill whose components are being dispatched.
    pub owner: UnitId,
    pub target: Option<UnitId>,
}

/// Which outcome a strike hook is reacting to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrikeMode {
    Hit,
    Crit,
    Miss,
}

/// Read-only context for `on_hit` / `on_crit` / `on_miss` hooks.
#[derive(Clone, Copy)]
pub struct StrikeContext<'a> {
    pub state: &'a GameState,
    pub env: &'a CombatEnv<'a>,
    pub attacker: UnitId,
    pub defender: UnitId,
    /// The struck item whose components are being dispatched.
    pub item: &'a ItemState,
    pub mode: StrikeMode,
}

/// Actions and playback events produced by one strike's component hooks.
///
/// Actions are reversible state mutations applied by the combat session;
/// playback events are the immutable outcome records consumed by
/// presentation and bookkeeping.
#[derive(Debug, Default)]
pub struct StrikeOutput {
    pub actions: Vec<Action>,
    pub playback: Vec<PlaybackEvent>,
}

/// A component's nomination during splash resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplashNomination {
    /// Nominated main target, if this component claims one.
    pub main: Option<Position>,
    /// Secondary positions affected alongside the main target.
    pub splash: Vec<Position>,
}

/// A strike hook failed inside a component.
///
/// Carries enough context to diagnose authored-content bugs: which
/// component, on which item/skill, held by which unit. Treated as fatal for
/// the in-progress combat step; never retried.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("component `{component}` on `{holder}` held by unit {unit} failed in `{hook}`: {message}")]
pub struct HookError {
    pub hook: Hook,
    pub component: String,
    /// Template nid of the item/skill the component is attached to.
    pub holder: String,
    pub unit: UnitId,
    pub message: String,
}

impl crate::error::EngineError for HookError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        "HOOK_FAILED"
    }
}

/// A named, versioned behavior unit attached to an item or skill.
///
/// Implementations override only the entry points for hooks they declare via
/// [`Component::defines`]; the dispatcher never calls an entry point for a
/// hook the component does not define. Hook absence is the normal case, not
/// an error.
pub trait Component: std::fmt::Debug + Send + Sync {
    /// Stable identifier, registered in the component catalog.
    fn nid(&self) -> &'static str;

    /// The component's authored value.
    fn value(&self) -> ComponentValue {
        ComponentValue::None
    }

    /// Capability query: does this component implement `hook`?
    fn defines(&self, hook: Hook) -> bool;

    /// `UniqueGate` hooks (`is_weapon`, `equippable`, ...).
    fn gate(&self, _hook: Hook, _ctx: &HookContext<'_>) -> bool {
        false
    }

    /// `AllTrue` veto hooks (`can_counter`, `can_double`, ...).
    fn veto(&self, _hook: Hook, _ctx: &HookContext<'_>) -> bool {
        true
    }

    /// `UniqueScalar` hooks (`damage`, `hit`, `strike_count`, ...).
    fn scalar(&self, _hook: Hook, _ctx: &HookContext<'_>) -> i64 {
        0
    }

    /// `Sum` hooks (`modify_*`, `dynamic_*`, `exp`, `wexp`, ...).
    fn contribute(&self, _hook: Hook, _ctx: &HookContext<'_>) -> i64 {
        0
    }

    /// `Event` hooks (`on_upkeep`, `start_combat`, ...). Emitted actions are
    /// applied by the caller through the action log.
    fn event(&self, _hook: Hook, _ctx: &HookContext<'_>, _out: &mut Vec<Action>) {}

    /// `on_hit` / `on_crit` / `on_miss`. The mode is in the context; an
    /// error here aborts the remainder of the current round.
    fn strike(&self, _ctx: &StrikeContext<'_>, _out: &mut StrikeOutput) -> Result<(), String> {
        Ok(())
    }

    /// `available`: may this item/skill be used at all right now?
    fn available(&self, _ctx: &HookContext<'_>) -> bool {
        true
    }

    /// `target_restrict`: is this position an acceptable target?
    fn target_restrict(&self, _ctx: &HookContext<'_>, _pos: Position) -> bool {
        true
    }

    /// `valid_targets`: positions this component offers as targets.
    fn valid_targets(&self, _ctx: &HookContext<'_>) -> Vec<Position> {
        Vec::new()
    }

    /// `splash`: this component's main-target/splash nomination for an
    /// attack on `pos`.
    fn splash(&self, _ctx: &HookContext<'_>, _pos: Position) -> Option<SplashNomination> {
        None
    }

    /// `weapon_type`: proficiency class this item trains.
    fn weapon_type(&self) -> Option<&str> {
        None
    }

    /// Remaining charges, for components that meter item uses.
    fn charges(&self) -> Option<i64> {
        None
    }

    /// Sets remaining charges. Only meaningful when [`Component::charges`]
    /// returns `Some`; the reversible use-charge action goes through this.
    fn set_charges(&mut self, _charges: i64) {}

    /// Persistable per-instance state. Defaults to the authored value.
    fn save(&self) -> ComponentValue {
        self.value()
    }

    /// Restores per-instance state captured by [`Component::save`].
    fn restore(&mut self, _value: ComponentValue) {}

    /// Deep copy for template instantiation. Components own mutable state,
    /// so a fresh instance must never alias the template's.
    fn boxed_clone(&self) -> Box<dyn Component>;
}

impl Clone for Box<dyn Component> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// The component catalog: maps a component's stable id to its constructor.
///
/// Populated by explicit registration at startup (see the content crate);
/// there is no runtime discovery of implementations.
pub trait ComponentRegistry {
    /// Builds a fresh component from its catalog id and authored value.
    ///
    /// Returns `None` for unknown ids; the caller decides whether that
    /// degrades (persistence drops the component with a warning) or fails.
    fn build(&self, nid: &str, value: ComponentValue) -> Option<Box<dyn Component>>;
}
