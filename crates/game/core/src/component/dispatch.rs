//! Generic hook dispatch across an ordered component list.
//!
//! Each function implements one aggregation policy and debug-asserts that
//! the hook it was handed actually carries that policy; the hook name, not
//! the call site, decides how results combine. Dispatch never errors on
//! hook absence. A strike hook that fails inside a component is wrapped
//! with component/holder/unit context and propagated.

use std::collections::BTreeSet;

use super::hook::{DispatchPolicy, Hook};
use super::{Component, HookContext, HookError, StrikeContext, StrikeOutput};
#[cfg(test)]
use super::SplashNomination;
use crate::state::Position;

type Components = [Box<dyn Component>];

/// Exclusive-first-false: first defining component wins; `false` if none.
pub fn unique_gate(components: &Components, hook: Hook, ctx: &HookContext<'_>) -> bool {
    debug_assert_eq!(hook.policy(), DispatchPolicy::UniqueGate);
    components
        .iter()
        .find(|component| component.defines(hook))
        .map(|component| component.gate(hook, ctx))
        .unwrap_or(false)
}

/// All-true-required: any defining component returning `false` fails the
/// hook; `true` if none define it.
pub fn all_true(components: &Components, hook: Hook, ctx: &HookContext<'_>) -> bool {
    debug_assert_eq!(hook.policy(), DispatchPolicy::AllTrue);
    components
        .iter()
        .filter(|component| component.defines(hook))
        .all(|component| component.veto(hook, ctx))
}

/// Exclusive-first-with-default: first defining component wins; falls back
/// to the hook's static default.
pub fn unique_scalar(components: &Components, hook: Hook, ctx: &HookContext<'_>) -> i64 {
    debug_assert_eq!(hook.policy(), DispatchPolicy::UniqueScalar);
    components
        .iter()
        .find(|component| component.defines(hook))
        .map(|component| component.scalar(hook, ctx))
        .unwrap_or_else(|| hook.default_scalar())
}

/// Accumulate-sum: every defining component contributes; 0 if none.
pub fn accumulate(components: &Components, hook: Hook, ctx: &HookContext<'_>) -> i64 {
    debug_assert_eq!(hook.policy(), DispatchPolicy::Sum);
    components
        .iter()
        .filter(|component| component.defines(hook))
        .map(|component| component.contribute(hook, ctx))
        .sum()
}

/// Fire-all: every defining component fires in list order; no aggregation.
/// Emitted actions accumulate in `out` for the caller to apply.
pub fn fire_event(
    components: &Components,
    hook: Hook,
    ctx: &HookContext<'_>,
    out: &mut Vec<crate::turnwheel::Action>,
) {
    debug_assert_eq!(hook.policy(), DispatchPolicy::Event);
    for component in components.iter().filter(|component| component.defines(hook)) {
        component.event(hook, ctx, out);
    }
}

/// `available`: AND across all defining components; any explicit `false`
/// vetoes use of the item/skill.
pub fn available(components: &Components, ctx: &HookContext<'_>) -> bool {
    components
        .iter()
        .filter(|component| component.defines(Hook::Available))
        .all(|component| component.available(ctx))
}

/// `target_restrict`: every restricting component must accept the position.
pub fn target_restrict(components: &Components, ctx: &HookContext<'_>, pos: Position) -> bool {
    components
        .iter()
        .filter(|component| component.defines(Hook::TargetRestrict))
        .all(|component| component.target_restrict(ctx, pos))
}

/// `valid_targets`: set union across all defining components.
pub fn valid_targets(components: &Components, ctx: &HookContext<'_>) -> BTreeSet<Position> {
    components
        .iter()
        .filter(|component| component.defines(Hook::ValidTargets))
        .flat_map(|component| component.valid_targets(ctx))
        .collect()
}

/// `weapon_type`: first defining component wins; `None` if the item trains
/// no proficiency.
pub fn weapon_type<'c>(components: &'c Components) -> Option<&'c str> {
    components
        .iter()
        .find(|component| component.defines(Hook::WeaponType))
        .and_then(|component| component.weapon_type())
}

/// Splash resolution across all defining components.
///
/// Components may each contribute a main target and splash positions. When
/// more than one component nominates a main target, every nominee collapses
/// into splash and the main target becomes undefined. That is the documented
/// fallback for multi-nomination, not an error.
pub fn resolve_splash(
    components: &Components,
    ctx: &HookContext<'_>,
    pos: Position,
) -> (Option<Position>, Vec<Position>) {
    let mut main: Option<Position> = None;
    let mut main_count = 0usize;
    let mut splash: Vec<Position> = Vec::new();

    let mut nominated = false;
    for component in components.iter().filter(|component| component.defines(Hook::Splash)) {
        let Some(nomination) = component.splash(ctx, pos) else {
            continue;
        };
        nominated = true;
        if let Some(nominee) = nomination.main {
            main_count += 1;
            if main_count > 1 {
                // Demote the earlier nominee too.
                if let Some(previous) = main.take() {
                    splash.push(previous);
                }
                splash.push(nominee);
            } else {
                main = Some(nominee);
            }
        }
        splash.extend(nomination.splash);
    }

    if !nominated {
        // No splash-aware component: the targeted position is the main target.
        return (Some(pos), Vec::new());
    }

    splash.sort();
    splash.dedup();
    (main, splash)
}

/// Fire all components that define the given strike hook.
///
/// `on_crit` falls back per component: a component with no dedicated
/// `on_crit` fires its `on_hit` instead. A component error aborts dispatch
/// and propagates with full context.
pub fn fire_strike(
    components: &Components,
    hook: Hook,
    ctx: &StrikeContext<'_>,
    out: &mut StrikeOutput,
) -> Result<(), HookError> {
    debug_assert!(matches!(hook, Hook::OnHit | Hook::OnCrit | Hook::OnMiss));

    for component in components.iter() {
        let fired = match hook {
            Hook::OnCrit => {
                component.defines(Hook::OnCrit)
                    || (!component.defines(Hook::OnCrit) && component.defines(Hook::OnHit))
            }
            other => component.defines(other),
        };
        if !fired {
            continue;
        }

        component.strike(ctx, out).map_err(|message| HookError {
            hook,
            component: component.nid().to_string(),
            holder: ctx.item.nid.clone(),
            unit: ctx.attacker,
            message,
        })?;
    }

    Ok(())
}
