//! The hook vocabulary and its aggregation policies.
//!
//! A hook is a named behavior a component may optionally implement. The hook
//! *name* determines how results from multiple components are aggregated;
//! the call site never chooses a policy. Dispatch functions in
//! [`crate::component::dispatch`] are parameterized by [`DispatchPolicy`]
//! and debug-assert that the hook they were handed actually carries the
//! policy they implement.

use strum::{Display, EnumIter};

/// How results from multiple defining components are combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchPolicy {
    /// First defining component wins; `false` if none define the hook.
    ///
    /// Authoring contract: exactly one component per item is expected to own
    /// a gate hook. Not enforced.
    UniqueGate,

    /// Any defining component returning `false` fails the hook; `true` if
    /// none define it.
    AllTrue,

    /// First defining component wins; falls back to a per-hook static
    /// default ([`Hook::default_scalar`]).
    UniqueScalar,

    /// Every defining component contributes; contributions are summed.
    /// Zero if none define it. Order-independent.
    Sum,

    /// Every defining component fires for side effects; component list
    /// order; no return value.
    Event,

    /// Bespoke aggregation with its own dispatch function (`available`,
    /// `target_restrict`, splash resolution, strike effects).
    Bespoke,
}

/// Every hook a component may implement.
///
/// The stable string form (snake_case) is the cross-subsystem contract used
/// in logs and authored-content diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Hook {
    // ----- boolean gates (UniqueGate) -----
    IsWeapon,
    IsSpell,
    IsAccessory,
    Equippable,
    CanUse,
    Locked,
    Vantage,
    IsBroken,

    // ----- boolean vetoes (AllTrue) -----
    CanCounter,
    CanBeCountered,
    CanDouble,
    CanCrit,

    // ----- scalar lookups (UniqueScalar) -----
    Damage,
    Hit,
    Crit,
    Avoid,
    CritAvoid,
    AttackSpeed,
    Defense,
    Resist,
    CritMultiplier,
    MinRange,
    MaxRange,
    StrikeCount,

    // ----- accumulators (Sum) -----
    ModifyDamage,
    ModifyAccuracy,
    ModifyCritAccuracy,
    ModifyAvoid,
    ModifyCritAvoid,
    ModifyResist,
    DynamicDamage,
    DynamicAccuracy,
    DynamicMultiattacks,
    Exp,
    Wexp,
    Mana,

    // ----- events (fire-all, no return) -----
    OnEquip,
    OnUnequip,
    OnUpkeep,
    OnEndstep,
    StartCombat,
    EndCombat,
    CleanupCombat,
    OnBroken,
    OnDeath,

    // ----- bespoke -----
    Available,
    TargetRestrict,
    ValidTargets,
    Splash,
    OnHit,
    OnCrit,
    OnMiss,
    WeaponType,
}

impl Hook {
    /// Returns the aggregation policy this hook name carries.
    pub const fn policy(self) -> DispatchPolicy {
        use Hook::*;
        match self {
            IsWeapon | IsSpell | IsAccessory | Equippable | CanUse | Locked | Vantage
            | IsBroken => DispatchPolicy::UniqueGate,

            CanCounter | CanBeCountered | CanDouble | CanCrit => DispatchPolicy::AllTrue,

            Damage | Hit | Crit | Avoid | CritAvoid | AttackSpeed | Defense | Resist
            | CritMultiplier | MinRange | MaxRange | StrikeCount => DispatchPolicy::UniqueScalar,

            ModifyDamage | ModifyAccuracy | ModifyCritAccuracy | ModifyAvoid | ModifyCritAvoid
            | ModifyResist | DynamicDamage | DynamicAccuracy | DynamicMultiattacks | Exp | Wexp
            | Mana => DispatchPolicy::Sum,

            OnEquip | OnUnequip | OnUpkeep | OnEndstep | StartCombat | EndCombat
            | CleanupCombat | OnBroken | OnDeath => DispatchPolicy::Event,

            Available | TargetRestrict | ValidTargets | Splash | OnHit | OnCrit | OnMiss
            | WeaponType => DispatchPolicy::Bespoke,
        }
    }

    /// Static default for scalar lookups when no component defines the hook.
    ///
    /// # Panics
    ///
    /// Panics if called on a hook outside the `UniqueScalar` policy; that is
    /// a dispatch-table bug, not authored content.
    pub const fn default_scalar(self) -> i64 {
        use Hook::*;
        match self {
            Damage | Crit | Avoid | CritAvoid | AttackSpeed | Defense | Resist => 0,
            Hit => 75,
            CritMultiplier => 2,
            MinRange => 1,
            MaxRange => 1,
            StrikeCount => 1,
            _ => panic!("default_scalar called on a non-scalar hook"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_scalar_hook_has_a_default() {
        for hook in Hook::iter() {
            if hook.policy() == DispatchPolicy::UniqueScalar {
                // Must not panic.
                let _ = hook.default_scalar();
            }
        }
    }

    #[test]
    fn stable_snake_case_names() {
        assert_eq!(Hook::ModifyAccuracy.to_string(), "modify_accuracy");
        assert_eq!(Hook::OnHit.to_string(), "on_hit");
        assert_eq!(Hook::CanCounter.to_string(), "can_counter");
    }
}
