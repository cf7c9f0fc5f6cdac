//! Traits describing read-only world data consumed by combat.
//!
//! Oracles expose item/skill template catalogs and board queries. The
//! [`CombatEnv`] aggregate bundles them so combat resolution can reach
//! everything it needs without hard coupling to concrete implementations —
//! combat is a pure function of its inputs plus the RNG stream, never a
//! reader of globals.

use crate::config::GameConfig;
use crate::state::{ItemState, Position, SkillState};

/// An oracle the caller needed was not provided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
    #[error("item oracle not available")]
    ItemsNotAvailable,
    #[error("skill oracle not available")]
    SkillsNotAvailable,
    #[error("board oracle not available")]
    BoardNotAvailable,
    #[error("config not available")]
    ConfigNotAvailable,
}

impl crate::error::EngineError for EnvError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ItemsNotAvailable => "ENV_ITEMS_NOT_AVAILABLE",
            Self::SkillsNotAvailable => "ENV_SKILLS_NOT_AVAILABLE",
            Self::BoardNotAvailable => "ENV_BOARD_NOT_AVAILABLE",
            Self::ConfigNotAvailable => "ENV_CONFIG_NOT_AVAILABLE",
        }
    }
}

/// Item template catalog.
pub trait ItemOracle {
    /// Returns a fresh (unbound) instance of the template, or `None` for an
    /// unknown nid. Callers that must not fail use
    /// [`crate::state::ItemState::placeholder`] on `None`.
    fn template(&self, nid: &str) -> Option<ItemState>;
}

/// Skill template catalog.
pub trait SkillOracle {
    fn template(&self, nid: &str) -> Option<SkillState>;
}

/// Board/pathfinding query surface. Consumed as a capability; tile and
/// occupancy bookkeeping live outside this engine.
pub trait BoardOracle {
    fn in_bounds(&self, pos: Position) -> bool;

    /// Line of sight between two positions. Defaults to unobstructed.
    fn line_of_sight(&self, _from: Position, _to: Position) -> bool {
        true
    }
}

/// Aggregates the read-only oracles combat resolution needs.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    items: Option<&'a dyn ItemOracle>,
    skills: Option<&'a dyn SkillOracle>,
    board: Option<&'a dyn BoardOracle>,
    config: Option<&'a GameConfig>,
}

impl<'a> CombatEnv<'a> {
    pub fn empty() -> Self {
        Self {
            items: None,
            skills: None,
            board: None,
            config: None,
        }
    }

    pub fn with_items(mut self, items: &'a dyn ItemOracle) -> Self {
        self.items = Some(items);
        self
    }

    pub fn with_skills(mut self, skills: &'a dyn SkillOracle) -> Self {
        self.skills = Some(skills);
        self
    }

    pub fn with_board(mut self, board: &'a dyn BoardOracle) -> Self {
        self.board = Some(board);
        self
    }

    pub fn with_config(mut self, config: &'a GameConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Returns the item oracle, or an error if not available.
    pub fn items(&self) -> Result<&'a dyn ItemOracle, EnvError> {
        self.items.ok_or(EnvError::ItemsNotAvailable)
    }

    /// Returns the skill oracle, or an error if not available.
    pub fn skills(&self) -> Result<&'a dyn SkillOracle, EnvError> {
        self.skills.ok_or(EnvError::SkillsNotAvailable)
    }

    /// Returns the board oracle, or an error if not available.
    pub fn board(&self) -> Result<&'a dyn BoardOracle, EnvError> {
        self.board.ok_or(EnvError::BoardNotAvailable)
    }

    /// Returns the game configuration, or an error if not available.
    pub fn config(&self) -> Result<&'a GameConfig, EnvError> {
        self.config.ok_or(EnvError::ConfigNotAvailable)
    }
}
