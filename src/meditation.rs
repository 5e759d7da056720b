//! Meditation hysteresis
//!
//! Eyes-closed classification flickers with camera noise, so entry and exit
//! use asymmetric thresholds: a short closed window to enter, a wider open
//! window to leave. Only one of the two timers runs at a time.

use crate::config::{DEFAULT_MEDITATION_ENTER_MS, DEFAULT_MEDITATION_EXIT_MS};

/// Transition produced by [`MeditationHysteresis::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeditationTransition {
    Started,
    /// Annotated with whether a gesture was active at exit, which selects the
    /// announcement wording (exiting into a held pose vs. into idle).
    Ended { gesture_active: bool },
}

/// Stabilizes per-tick eyes-closed booleans into a confirmed meditation flag.
#[derive(Debug)]
pub struct MeditationHysteresis {
    enter_ms: u64,
    exit_ms: u64,
    closed_since_ms: Option<u64>,
    open_since_ms: Option<u64>,
    meditating: bool,
}

impl Default for MeditationHysteresis {
    fn default() -> Self {
        Self::new(DEFAULT_MEDITATION_ENTER_MS, DEFAULT_MEDITATION_EXIT_MS)
    }
}

impl MeditationHysteresis {
    pub fn new(enter_ms: u64, exit_ms: u64) -> Self {
        Self {
            enter_ms,
            exit_ms,
            closed_since_ms: None,
            open_since_ms: None,
            meditating: false,
        }
    }

    /// Observe this tick's eyes state. Returns a transition when the confirmed
    /// flag flips on this call.
    pub fn observe(
        &mut self,
        eyes_closed: bool,
        gesture_active: bool,
        now_ms: u64,
    ) -> Option<MeditationTransition> {
        if eyes_closed {
            self.open_since_ms = None;
            let since = *self.closed_since_ms.get_or_insert(now_ms);
            if !self.meditating && now_ms.saturating_sub(since) > self.enter_ms {
                self.meditating = true;
                return Some(MeditationTransition::Started);
            }
        } else {
            self.closed_since_ms = None;
            if self.meditating {
                let since = *self.open_since_ms.get_or_insert(now_ms);
                if now_ms.saturating_sub(since) > self.exit_ms {
                    self.meditating = false;
                    self.open_since_ms = None;
                    return Some(MeditationTransition::Ended { gesture_active });
                }
            }
        }
        None
    }

    /// The confirmed meditation flag.
    pub fn meditating(&self) -> bool {
        self.meditating
    }

    /// Whether the closed-eye timer is currently running.
    pub fn eyes_closing(&self) -> bool {
        self.closed_since_ms.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_after_threshold_not_before() {
        let mut hysteresis = MeditationHysteresis::default();
        assert_eq!(hysteresis.observe(true, false, 0), None);
        assert_eq!(hysteresis.observe(true, false, 1_000), None);
        assert!(!hysteresis.meditating());

        assert_eq!(
            hysteresis.observe(true, false, 1_001),
            Some(MeditationTransition::Started)
        );
        assert!(hysteresis.meditating());

        // Staying closed does not re-emit.
        assert_eq!(hysteresis.observe(true, false, 5_000), None);
    }

    #[test]
    fn test_blink_resets_entry_timer() {
        let mut hysteresis = MeditationHysteresis::default();
        hysteresis.observe(true, false, 0);
        hysteresis.observe(false, false, 800);
        hysteresis.observe(true, false, 900);
        // 1001 is past the original window but only 101ms into the new one.
        assert_eq!(hysteresis.observe(true, false, 1_001), None);
        assert_eq!(
            hysteresis.observe(true, false, 1_901),
            Some(MeditationTransition::Started)
        );
    }

    #[test]
    fn test_exit_into_idle() {
        let mut hysteresis = MeditationHysteresis::default();
        hysteresis.observe(true, false, 0);
        hysteresis.observe(true, false, 1_001);
        assert!(hysteresis.meditating());

        assert_eq!(hysteresis.observe(false, false, 2_000), None);
        assert_eq!(hysteresis.observe(false, false, 4_000), None);
        assert_eq!(
            hysteresis.observe(false, false, 4_001),
            Some(MeditationTransition::Ended {
                gesture_active: false
            })
        );
        assert!(!hysteresis.meditating());
    }

    #[test]
    fn test_exit_into_active_pose() {
        let mut hysteresis = MeditationHysteresis::default();
        hysteresis.observe(true, false, 0);
        hysteresis.observe(true, false, 1_001);

        hysteresis.observe(false, true, 2_000);
        assert_eq!(
            hysteresis.observe(false, true, 4_001),
            Some(MeditationTransition::Ended {
                gesture_active: true
            })
        );
    }

    #[test]
    fn test_noise_flicker_does_not_exit() {
        let mut hysteresis = MeditationHysteresis::default();
        hysteresis.observe(true, false, 0);
        hysteresis.observe(true, false, 1_001);

        // Open blips shorter than the exit window, interrupted by closures.
        hysteresis.observe(false, false, 2_000);
        hysteresis.observe(false, false, 3_500);
        hysteresis.observe(true, false, 3_900);
        hysteresis.observe(false, false, 4_500);
        assert_eq!(hysteresis.observe(false, false, 6_400), None);
        assert!(hysteresis.meditating());
    }

    #[test]
    fn test_not_meditating_stays_false_on_open() {
        let mut hysteresis = MeditationHysteresis::default();
        for now in (0..10_000).step_by(33) {
            assert_eq!(hysteresis.observe(false, false, now), None);
        }
        assert!(!hysteresis.meditating());
    }
}
