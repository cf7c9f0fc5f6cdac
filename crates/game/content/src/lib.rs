//! Authored content for the combat engine.
//!
//! `tactics-content` provides the standard component set, the explicit
//! component catalog used to restore saved instances, and in-memory item and
//! skill template books implementing the engine's oracle traits. The engine
//! itself never references a concrete component; everything here plugs in
//! through `tactics-core`'s trait seams.
pub mod books;
pub mod components;
pub mod registry;

pub use books::{ItemBook, SkillBook};
pub use registry::StandardRegistry;
