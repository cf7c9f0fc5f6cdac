//! Combat resolution.
//!
//! The [`CombatSession`] orchestrates one combat end-to-end: it resolves
//! targets and splash, drives the [`CombatPhaseSolver`] strike by strike,
//! applies each strike's reversible actions immediately, runs the
//! post-combat bookkeeping passes, and records the whole session as a
//! single rewind unit in the action log.

pub mod bookkeeping;
mod playback;
mod script;
mod session;
mod solver;

pub use playback::PlaybackEvent;
pub use script::{CombatScript, ForcedOutcome, ScriptError};
pub use session::{CombatOutcome, CombatSession};
pub use solver::{CombatPhaseSolver, StrikeResult, StrikerSlot};

use crate::component::HookError;
use crate::env::EnvError;
use crate::state::{Position, UnitId};
use crate::turnwheel::TurnwheelError;

/// Errors surfaced by combat setup and resolution.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    /// Session refused to start: the attacker does not exist.
    #[error("unit {0} not found")]
    UnitNotFound(UnitId),

    /// Session refused to start: the attacker is dead.
    #[error("unit {0} is dead and cannot fight")]
    DeadUnit(UnitId),

    /// Session refused to start: no usable equipped item.
    #[error("unit {0} has no usable item equipped")]
    NoValidItem(UnitId),

    /// Session refused to start: nothing to strike at the targeted position.
    #[error("no valid target at ({},{})", .0.x, .0.y)]
    NoTarget(Position),

    /// A component hook raised mid-strike. Fatal for the combat step;
    /// already-applied actions for prior strikes remain applied.
    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Turnwheel(#[from] TurnwheelError),
}

impl crate::error::EngineError for CombatError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        use crate::error::ErrorSeverity;
        match self {
            Self::UnitNotFound(_) | Self::NoTarget(_) => ErrorSeverity::Validation,
            Self::DeadUnit(_) | Self::NoValidItem(_) => ErrorSeverity::Recoverable,
            Self::Hook(inner) => inner.severity(),
            Self::Env(inner) => inner.severity(),
            Self::Turnwheel(inner) => inner.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnitNotFound(_) => "COMBAT_UNIT_NOT_FOUND",
            Self::DeadUnit(_) => "COMBAT_DEAD_UNIT",
            Self::NoValidItem(_) => "COMBAT_NO_VALID_ITEM",
            Self::NoTarget(_) => "COMBAT_NO_TARGET",
            Self::Hook(_) => "COMBAT_HOOK_FAILED",
            Self::Env(_) => "COMBAT_ENV",
            Self::Turnwheel(_) => "COMBAT_TURNWHEEL",
        }
    }
}
