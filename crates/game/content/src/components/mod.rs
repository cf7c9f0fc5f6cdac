//! The standard component set.
//!
//! Each component implements a small slice of the hook vocabulary; items and
//! skills are assembled from them in authored content. Construction goes
//! either through the typed constructors here or through the
//! [`crate::registry::StandardRegistry`] when restoring from saved values.

mod effects;
mod formulas;
mod skills;
mod targeting;
mod uses;
mod weapon;

pub use effects::{Blast, HealOnHit, StatusOnHit};
pub use formulas::{CritRate, Damage, HitRate};
pub use skills::{ExpBoost, Vantage, WexpBoost};
pub use targeting::{TargetsAllies, WoundedOnly};
pub use uses::Uses;
pub use weapon::{Brave, CannotBeCountered, Range, Weapon};
