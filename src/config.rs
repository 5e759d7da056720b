//! Engine configuration
//!
//! Thresholds and rates for the stabilizers and the energy simulation.
//! Defaults match the tuned values of the original session loop.

use serde::{Deserialize, Serialize};

/// Hold window before a gesture candidate is confirmed (ms).
pub const DEFAULT_GESTURE_HOLD_MS: u64 = 500;

/// Eyes closed this long enters meditation (ms).
pub const DEFAULT_MEDITATION_ENTER_MS: u64 = 1000;

/// Eyes open this long exits meditation (ms); wider than entry to absorb
/// camera noise.
pub const DEFAULT_MEDITATION_EXIT_MS: u64 = 2000;

/// Identical announcements are suppressed within this window (ms).
pub const DEFAULT_ANNOUNCE_COOLDOWN_MS: u64 = 10_000;

/// How long a detected beat stays visible (ms).
pub const DEFAULT_PULSE_WIDTH_MS: u64 = 100;

/// Aura intensity change per tick.
pub const DEFAULT_AURA_STEP: f64 = 0.08;

/// Per-tick energy integration rates, all applied under a [0, 1] clamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyRates {
    /// Uniform rise per channel while meditating
    pub meditation_rise: f64,
    /// Baseline rise per channel while any gesture is held
    pub gesture_base_rise: f64,
    /// Extra rise on the channels a gesture targets
    pub gesture_boost: f64,
    /// Uniform decay per channel while idle
    pub idle_decay: f64,
}

impl Default for EnergyRates {
    fn default() -> Self {
        Self {
            meditation_rise: 0.02,
            gesture_base_rise: 0.001,
            gesture_boost: 0.005,
            idle_decay: 0.01,
        }
    }
}

/// Tunable parameters for a [`crate::session::SessionEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub gesture_hold_ms: u64,
    pub meditation_enter_ms: u64,
    pub meditation_exit_ms: u64,
    pub announce_cooldown_ms: u64,
    pub pulse_width_ms: u64,
    pub aura_step: f64,
    pub rates: EnergyRates,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gesture_hold_ms: DEFAULT_GESTURE_HOLD_MS,
            meditation_enter_ms: DEFAULT_MEDITATION_ENTER_MS,
            meditation_exit_ms: DEFAULT_MEDITATION_EXIT_MS,
            announce_cooldown_ms: DEFAULT_ANNOUNCE_COOLDOWN_MS,
            pulse_width_ms: DEFAULT_PULSE_WIDTH_MS,
            aura_step: DEFAULT_AURA_STEP,
            rates: EnergyRates::default(),
        }
    }
}
