//! Playback events: the immutable outcome record of a combat session.
//!
//! Every resolved strike appends events in resolution order. The stream is
//! a stable contract consumed twice: by the presentation layer (animation,
//! banners) and by post-combat bookkeeping (exp, wexp, records). Events are
//! append-only per session and never mutated by consumers.

use crate::state::{InstanceId, UnitId};

/// One thing that happened during combat.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PlaybackEvent {
    /// A strike connected.
    MarkHit {
        attacker: UnitId,
        defender: UnitId,
        item: InstanceId,
    },

    /// A strike connected critically.
    MarkCrit {
        attacker: UnitId,
        defender: UnitId,
        item: InstanceId,
    },

    /// A strike missed.
    MarkMiss {
        attacker: UnitId,
        defender: UnitId,
        item: InstanceId,
    },

    /// Damage was dealt. `amount` is the computed damage, `dealt` the HP
    /// actually lost (overkill clamps at zero HP).
    DamageHit {
        attacker: UnitId,
        item: InstanceId,
        defender: UnitId,
        amount: i32,
        dealt: i32,
    },

    /// Critical damage was dealt.
    DamageCrit {
        attacker: UnitId,
        item: InstanceId,
        defender: UnitId,
        amount: i32,
        dealt: i32,
    },

    /// Healing landed. `healed` is capped at missing HP.
    HealHit {
        healer: UnitId,
        item: InstanceId,
        target: UnitId,
        amount: i32,
        healed: i32,
    },

    /// A status skill was inflicted.
    StatusHit {
        attacker: UnitId,
        item: InstanceId,
        defender: UnitId,
        status: String,
    },

    /// An item ran out of charges this session.
    ItemBroken { unit: UnitId, item: InstanceId },

    /// A unit died. `killer` is the last unit to damage it, when known.
    UnitDeath {
        unit: UnitId,
        killer: Option<UnitId>,
    },

    /// A dying unit dropped an item.
    DropItem { unit: UnitId, item: InstanceId },
}

impl PlaybackEvent {
    /// The unit acting in this event, if the event has an actor.
    pub fn actor(&self) -> Option<UnitId> {
        match self {
            Self::MarkHit { attacker, .. }
            | Self::MarkCrit { attacker, .. }
            | Self::MarkMiss { attacker, .. }
            | Self::DamageHit { attacker, .. }
            | Self::DamageCrit { attacker, .. }
            | Self::StatusHit { attacker, .. } => Some(*attacker),
            Self::HealHit { healer, .. } => Some(*healer),
            Self::ItemBroken { .. } | Self::DropItem { .. } => None,
            Self::UnitDeath { killer, .. } => *killer,
        }
    }
}
