//! Deterministic combat resolution for a tactical RPG.
//!
//! `tactics-core` defines the canonical rules: the component hook dispatch
//! protocol, the multi-round combat phase solver, the reversible action log
//! ("turnwheel"), and the deterministic RNG stream that makes a rewound
//! combat replay bit-for-bit. The engine is pure and I/O free; world data
//! reaches it through the oracle traits in [`env`], and concrete components
//! live in the content crate.
pub mod combat;
pub mod component;
pub mod config;
pub mod env;
pub mod error;
pub mod rng;
pub mod state;
pub mod turnwheel;

pub use combat::{
    CombatError, CombatOutcome, CombatPhaseSolver, CombatScript, CombatSession, ForcedOutcome,
    PlaybackEvent, ScriptError, StrikeResult, StrikerSlot,
};
pub use component::{
    Component, ComponentRegistry, ComponentValue, DispatchPolicy, Hook, HookContext, HookError,
    SplashNomination, StrikeContext, StrikeMode, StrikeOutput,
};
pub use config::{ExpConfig, ExpCurve, GameConfig, WexpConfig};
pub use env::{BoardOracle, CombatEnv, EnvError, ItemOracle, SkillOracle};
pub use error::{EngineError, ErrorSeverity};
pub use rng::{RngSnapshot, RngStream};
pub use state::{
    CoreStats, GameState, InstanceId, ItemState, Position, RecordBook, RecordEntry, RecordKind,
    RemovalRequest, SavedComponent, SavedItem, SavedSkill, SkillState, SourceInfo, SourceKind,
    StatKind, Team, UnitId, UnitState,
};
pub use turnwheel::{grant_skill, Action, ActionLog, TurnwheelError};
