//! Game configuration constants and tunable parameters.
//!
//! Every post-combat bookkeeping pass is independently toggleable here, and
//! the experience curve shape is selected per game configuration. The config
//! is always passed into combat explicitly; nothing in the engine reads a
//! global.

/// Shape of the experience-over-level-difference curve.
///
/// Exactly one shape is active per game configuration. Both evaluate to an
/// unclamped floating value; callers clamp to [`ExpConfig::min_exp`] /
/// [`ExpConfig::max_exp`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ExpCurve {
    /// Classical exponential curve: `magnitude * e^(curve * (diff + offset))`,
    /// floored at `min`.
    Classical {
        magnitude: f64,
        curve: f64,
        offset: f64,
        min: f64,
    },

    /// Bounded Gompertz curve: `min + magnitude * e^(-e^(-slope * (diff - offset)))`.
    ///
    /// `offset` is pre-solved from the asymptote parameters; construct via
    /// [`ExpCurve::gompertz`] rather than writing it by hand.
    Gompertz {
        min: f64,
        magnitude: f64,
        slope: f64,
        offset: f64,
    },
}

impl ExpCurve {
    /// Builds a Gompertz curve from its asymptote parameters.
    ///
    /// `min` is the lower asymptote, `min + magnitude` the upper, and
    /// `standard` the value the curve must take at a level difference of 0.
    /// The horizontal offset follows analytically:
    ///
    /// ```text
    /// offset = ln(-ln((standard - min) / magnitude)) / slope
    /// ```
    ///
    /// `standard` must lie strictly between the asymptotes.
    pub fn gompertz(min: f64, magnitude: f64, slope: f64, standard: f64) -> Self {
        let ratio = ((standard - min) / magnitude).clamp(f64::EPSILON, 1.0 - f64::EPSILON);
        let offset = (-ratio.ln()).ln() / slope;
        Self::Gompertz {
            min,
            magnitude,
            slope,
            offset,
        }
    }

    /// Evaluates the curve at the given level difference
    /// (defender level minus attacker level).
    pub fn eval(&self, level_diff: f64) -> f64 {
        match *self {
            Self::Classical {
                magnitude,
                curve,
                offset,
                min,
            } => (magnitude * (curve * (level_diff + offset)).exp()).max(min),
            Self::Gompertz {
                min,
                magnitude,
                slope,
                offset,
            } => min + magnitude * (-(-slope * (level_diff - offset)).exp()).exp(),
        }
    }
}

/// Experience gain parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExpConfig {
    pub enabled: bool,
    /// Hard floor on total exp awarded per combat session.
    pub min_exp: i32,
    /// Hard cap on total exp awarded per combat session.
    pub max_exp: i32,
    /// Flat exp for a heal that restored at least one point.
    pub heal_exp: i32,
    /// Flat exp for landing a status.
    pub status_exp: i32,
    /// Extra exp when the session killed the defender.
    pub kill_exp: i32,
    pub curve: ExpCurve,
}

/// Weapon experience gain parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WexpConfig {
    pub enabled: bool,
    /// Wexp per landed strike (crit marks count as landed strikes too).
    pub hit_wexp: i32,
    /// Extra wexp per crit mark.
    pub crit_wexp: i32,
    /// Flat bonus when the session killed the defender.
    pub kill_wexp: i32,
    /// Double all wexp earned in a session that killed the defender.
    pub double_on_kill: bool,
}

/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GameConfig {
    /// Whether critical hits exist at all in this game.
    pub crit_enabled: bool,
    /// Whether assist partners participate in combat.
    pub pairing_enabled: bool,
    /// Attack-speed advantage required to strike twice.
    pub double_threshold: i64,
    pub exp: ExpConfig,
    pub wexp: WexpConfig,
    /// Mana gain from combat.
    pub mana_enabled: bool,
    /// Permanent hit/miss/crit/damage/kill/death record logging.
    pub records_enabled: bool,
}

impl GameConfig {
    pub const DEFAULT_DOUBLE_THRESHOLD: i64 = 4;

    pub fn new() -> Self {
        Self {
            crit_enabled: true,
            pairing_enabled: false,
            double_threshold: Self::DEFAULT_DOUBLE_THRESHOLD,
            exp: ExpConfig {
                enabled: true,
                min_exp: 1,
                max_exp: 100,
                heal_exp: 10,
                status_exp: 15,
                kill_exp: 20,
                curve: ExpCurve::Classical {
                    magnitude: 10.0,
                    curve: 0.2,
                    offset: 0.0,
                    min: 1.0,
                },
            },
            wexp: WexpConfig {
                enabled: true,
                hit_wexp: 1,
                crit_wexp: 1,
                kill_wexp: 2,
                double_on_kill: false,
            },
            mana_enabled: false,
            records_enabled: true,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classical_curve_floors_at_min() {
        let curve = ExpCurve::Classical {
            magnitude: 10.0,
            curve: 0.25,
            offset: 0.0,
            min: 1.0,
        };
        // Far below the attacker's level the exponential vanishes; the floor holds.
        assert_eq!(curve.eval(-40.0), 1.0);
        assert!(curve.eval(0.0) > curve.eval(-5.0));
    }

    #[test]
    fn gompertz_offset_solves_standard_value() {
        let curve = ExpCurve::gompertz(1.0, 29.0, 0.4, 10.0);
        let at_zero = curve.eval(0.0);
        assert!((at_zero - 10.0).abs() < 1e-9);
    }

    #[test]
    fn gompertz_stays_within_asymptotes() {
        let curve = ExpCurve::gompertz(1.0, 29.0, 0.4, 10.0);
        for diff in -50..=50 {
            let value = curve.eval(f64::from(diff));
            assert!(value >= 1.0 && value <= 30.0);
        }
    }
}
