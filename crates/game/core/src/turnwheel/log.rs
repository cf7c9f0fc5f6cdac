//! The global action log.
//!
//! A single ordered sequence of executed actions with a movable position
//! cursor. One log, one writer: the currently running combat session or
//! turn step. Rewinding reverses actions back to a target position in exact
//! reverse order; `mark_irreversible` pins the earliest rewindable point at
//! chapter boundaries so the turnwheel never crosses an irreversible
//! external event.

use crate::state::GameState;

use super::{Action, TurnwheelError};

/// Ordered log of executed actions with rewind support.
#[derive(Clone, Debug, Default)]
pub struct ActionLog {
    actions: Vec<Action>,
    /// Position of the next append. Everything before it has been applied.
    cursor: usize,
    /// Earliest position the turnwheel may rewind to.
    first_free: usize,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current log position. Capture before a span of work to rewind back
    /// to it later.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Earliest position rewinding may reach.
    pub fn first_free_position(&self) -> usize {
        self.first_free
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions[..self.cursor]
    }

    /// Applies `action` and appends it to the log.
    ///
    /// Anything previously rewound past (entries beyond the cursor) is
    /// discarded; a new timeline replaces the old one.
    pub fn do_action(&mut self, state: &mut GameState, action: Action) -> Result<(), TurnwheelError> {
        action.execute(state)?;
        self.actions.truncate(self.cursor);
        self.actions.push(action);
        self.cursor += 1;
        Ok(())
    }

    /// Appends an action that has already been applied.
    ///
    /// The combat session applies its sub-actions one strike at a time and
    /// records the composite once at session end.
    pub fn record(&mut self, action: Action) {
        self.actions.truncate(self.cursor);
        self.actions.push(action);
        self.cursor += 1;
    }

    /// Marks the current position as the earliest rewindable point.
    ///
    /// Used at chapter boundaries to prevent rewinding across irreversible
    /// external events such as map transitions.
    pub fn mark_irreversible(&mut self) {
        self.first_free = self.cursor;
    }

    /// Rewinds to `target`, reversing every action after it in exact
    /// reverse chronological order.
    ///
    /// Refuses to cross the irreversible marker rather than risking a
    /// partial, state-corrupting rewind.
    pub fn rewind_to(
        &mut self,
        state: &mut GameState,
        target: usize,
    ) -> Result<(), TurnwheelError> {
        if target > self.cursor {
            return Err(TurnwheelError::TargetAhead {
                target,
                cursor: self.cursor,
            });
        }
        if target < self.first_free {
            return Err(TurnwheelError::PastIrreversible {
                target,
                first_free: self.first_free,
            });
        }

        while self.cursor > target {
            self.actions[self.cursor - 1].reverse(state)?;
            self.cursor -= 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CoreStats, Position, Team, UnitState};
    use crate::turnwheel::Action;

    fn fixture() -> (GameState, crate::state::UnitId) {
        let mut state = GameState::new(42);
        let unit = state.add_unit(UnitState::new(
            "soldier",
            Team::Player,
            CoreStats::new(20, 5, 4, 6, 3, 1, 2),
            Position::new(0, 0),
        ));
        (state, unit)
    }

    #[test]
    fn reverse_after_do_restores_state_exactly() {
        let (mut state, unit) = fixture();
        let before = state.clone();
        let mut log = ActionLog::new();

        log.do_action(
            &mut state,
            Action::ChangeHp {
                unit,
                old: 20,
                new: 12,
            },
        )
        .unwrap();
        log.do_action(
            &mut state,
            Action::GainExp {
                unit,
                old: 0,
                new: 31,
            },
        )
        .unwrap();
        log.do_action(
            &mut state,
            Action::GainWexp {
                unit,
                weapon_type: "sword".into(),
                old: None,
                new: 2,
            },
        )
        .unwrap();
        assert_ne!(state, before);

        log.rewind_to(&mut state, 0).unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn rewind_refuses_to_cross_irreversible_marker() {
        let (mut state, unit) = fixture();
        let mut log = ActionLog::new();

        log.do_action(
            &mut state,
            Action::ChangeHp {
                unit,
                old: 20,
                new: 15,
            },
        )
        .unwrap();
        log.mark_irreversible();
        log.do_action(
            &mut state,
            Action::ChangeHp {
                unit,
                old: 15,
                new: 10,
            },
        )
        .unwrap();

        let err = log.rewind_to(&mut state, 0).unwrap_err();
        assert_eq!(
            err,
            TurnwheelError::PastIrreversible {
                target: 0,
                first_free: 1
            }
        );

        // Rewinding to the marker itself is fine.
        log.rewind_to(&mut state, 1).unwrap();
        assert_eq!(state.unit(unit).unwrap().hp, 15);
    }

    #[test]
    fn do_after_rewind_discards_the_old_branch() {
        let (mut state, unit) = fixture();
        let mut log = ActionLog::new();

        log.do_action(
            &mut state,
            Action::ChangeHp {
                unit,
                old: 20,
                new: 15,
            },
        )
        .unwrap();
        log.do_action(
            &mut state,
            Action::ChangeHp {
                unit,
                old: 15,
                new: 10,
            },
        )
        .unwrap();
        log.rewind_to(&mut state, 1).unwrap();

        log.do_action(
            &mut state,
            Action::ChangeHp {
                unit,
                old: 15,
                new: 18,
            },
        )
        .unwrap();
        assert_eq!(log.position(), 2);
        assert_eq!(state.unit(unit).unwrap().hp, 18);
    }

    #[test]
    fn skill_add_remove_round_trip() {
        let (mut state, unit) = fixture();
        let mut log = ActionLog::new();

        let mut skill = crate::state::SkillState::new("focus", "Focus");
        skill.uid = state.allocate_instance();
        let before = state.clone();

        for action in crate::turnwheel::grant_skill(&state, unit, skill) {
            log.do_action(&mut state, action).unwrap();
        }
        assert!(state.unit(unit).unwrap().skill("focus").is_some());

        log.rewind_to(&mut state, 0).unwrap();
        assert_eq!(state, before);
    }
}
