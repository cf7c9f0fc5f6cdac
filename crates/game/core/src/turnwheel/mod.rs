//! The reversible command substrate behind the rewind feature.
//!
//! Every rewind-candidate state mutation is expressed as an [`Action`] with
//! apply/reverse semantics and flows through the [`ActionLog`]. Rewinding
//! means reversing logged actions in exact reverse chronological order;
//! reversing an action immediately after applying it restores all
//! observable state, including the RNG stream position, bit-identical.

mod action;
mod log;

pub use action::Action;
pub use log::ActionLog;

use crate::state::{GameState, SkillState, UnitId};

/// Turnwheel integrity and bookkeeping errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnwheelError {
    /// An action referenced a unit that is not in the state. Actions are
    /// built from live state, so this is a data-integrity bug.
    #[error("unit {0} not found while applying action")]
    UnitNotFound(UnitId),

    /// An action referenced an item instance its unit no longer holds.
    #[error("item instance not found on unit {0}")]
    ItemNotFound(UnitId),

    /// A skill slot an action expected was missing or held a different skill.
    #[error("skill slot mismatch on unit {0}")]
    SkillSlotMismatch(UnitId),

    /// Rewind target lies before the earliest rewindable point.
    #[error("cannot rewind to {target}: earliest rewindable position is {first_free}")]
    PastIrreversible { target: usize, first_free: usize },

    /// Rewind target lies beyond the current log position.
    #[error("rewind target {target} is beyond current position {cursor}")]
    TargetAhead { target: usize, cursor: usize },
}

impl crate::error::EngineError for TurnwheelError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        use crate::error::ErrorSeverity;
        match self {
            Self::UnitNotFound(_) | Self::ItemNotFound(_) | Self::SkillSlotMismatch(_) => {
                ErrorSeverity::Fatal
            }
            Self::PastIrreversible { .. } | Self::TargetAhead { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnitNotFound(_) => "TURNWHEEL_UNIT_NOT_FOUND",
            Self::ItemNotFound(_) => "TURNWHEEL_ITEM_NOT_FOUND",
            Self::SkillSlotMismatch(_) => "TURNWHEEL_SKILL_SLOT_MISMATCH",
            Self::PastIrreversible { .. } => "TURNWHEEL_PAST_IRREVERSIBLE",
            Self::TargetAhead { .. } => "TURNWHEEL_TARGET_AHEAD",
        }
    }
}

/// Builds the actions that grant `skill` to `unit`, honoring displacement.
///
/// A displaceable (Default-sourced) copy of the same skill already on the
/// unit is silently replaced; any other existing copy is left alone and the
/// new instance stacks alongside it.
pub fn grant_skill(state: &GameState, unit: UnitId, skill: SkillState) -> Vec<Action> {
    let mut actions = Vec::new();

    if let Some(holder) = state.unit(unit) {
        let displaced = holder
            .skills
            .iter()
            .enumerate()
            .find(|(_, existing)| existing.nid == skill.nid && existing.source.displaceable());
        if let Some((index, existing)) = displaced {
            actions.push(Action::RemoveSkill {
                unit,
                index,
                skill: existing.clone(),
            });
        }
    }

    actions.push(Action::AddSkill { unit, skill });
    actions
}
