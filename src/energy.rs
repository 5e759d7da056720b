//! Energy vector simulation
//!
//! Integrates the 7-channel energy vector once per tick based on the session
//! mode. Meditation lifts every channel quickly, a held gesture lifts them
//! slowly plus a larger boost on the channels that gesture targets, and idle
//! decays everything. All channels stay clamped to [0, 1].

use crate::config::EnergyRates;
use crate::types::{SessionMode, CHAKRA_COUNT};

/// Channel indices each known gesture boosts.
const GESTURE_BOOSTS: &[(&str, &[usize])] = &[
    // Root and crown
    ("Gyan Mudra", &[0, 6]),
    // Heart
    ("Namaste / Anjali Mudra", &[3]),
];

fn boosted_channels(label: &str) -> Option<&'static [usize]> {
    GESTURE_BOOSTS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, channels)| *channels)
}

/// Owns and integrates the bounded energy vector.
#[derive(Debug)]
pub struct EnergySimulator {
    rates: EnergyRates,
    energies: [f64; CHAKRA_COUNT],
    balanced: bool,
}

impl Default for EnergySimulator {
    fn default() -> Self {
        Self::new(EnergyRates::default())
    }
}

impl EnergySimulator {
    pub fn new(rates: EnergyRates) -> Self {
        Self {
            rates,
            energies: [0.0; CHAKRA_COUNT],
            balanced: false,
        }
    }

    /// Integrate one tick. Returns true when the balance event fires: the
    /// first tick all channels sit at the ceiling under meditation, latched
    /// until the predicate drops again.
    pub fn tick(&mut self, mode: &SessionMode) -> bool {
        match mode {
            SessionMode::Meditating => {
                for energy in &mut self.energies {
                    *energy = (*energy + self.rates.meditation_rise).min(1.0);
                }
            }
            SessionMode::Gesture(label) => {
                for energy in &mut self.energies {
                    *energy = (*energy + self.rates.gesture_base_rise).min(1.0);
                }
                if let Some(channels) = boosted_channels(label) {
                    for &channel in channels {
                        self.energies[channel] =
                            (self.energies[channel] + self.rates.gesture_boost).min(1.0);
                    }
                }
            }
            SessionMode::Idle => {
                for energy in &mut self.energies {
                    *energy = (*energy - self.rates.idle_decay).max(0.0);
                }
            }
        }

        // Full balance is only reachable under sustained meditation.
        let balanced_now = matches!(mode, SessionMode::Meditating)
            && self.energies.iter().all(|&energy| energy == 1.0);
        let fired = balanced_now && !self.balanced;
        self.balanced = balanced_now;
        fired
    }

    pub fn energies(&self) -> &[f64; CHAKRA_COUNT] {
        &self.energies
    }

    #[cfg(test)]
    fn set_energies(&mut self, energies: [f64; CHAKRA_COUNT]) {
        self.energies = energies;
    }
}
