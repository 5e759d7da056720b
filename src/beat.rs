//! Heartbeat detection
//!
//! Some firmware reports an explicit beat flag; most only streams a heart
//! rate. When the flag is absent, a beat is derived from the expected
//! inter-beat interval (`60000 / bpm` ms). Either way the beat stays visible
//! for one pulse width and then clears on its own; the clear is polled, not
//! scheduled on a timer, so the detector is fully deterministic.

use crate::config::DEFAULT_PULSE_WIDTH_MS;
use crate::types::Reading;

/// Confirms discrete heartbeat events from a reading stream.
#[derive(Debug)]
pub struct BeatDetector {
    pulse_width_ms: u64,
    last_beat_ms: u64,
    clear_at_ms: Option<u64>,
    visible: bool,
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new(DEFAULT_PULSE_WIDTH_MS)
    }
}

impl BeatDetector {
    pub fn new(pulse_width_ms: u64) -> Self {
        Self {
            pulse_width_ms,
            last_beat_ms: 0,
            clear_at_ms: None,
            visible: false,
        }
    }

    /// Observe one reading. Returns whether a beat fired on this call.
    ///
    /// An explicit flag is authoritative and skips the interval computation;
    /// `heart_rate = 0` with no flag never fires.
    pub fn observe(&mut self, reading: &Reading, now_ms: u64) -> bool {
        let fired = if reading.beat {
            true
        } else if reading.heart_rate > 0.0 {
            let expected_interval_ms = 60_000.0 / reading.heart_rate;
            now_ms.saturating_sub(self.last_beat_ms) as f64 > expected_interval_ms
        } else {
            false
        };

        if fired {
            self.last_beat_ms = now_ms;
            self.visible = true;
            self.clear_at_ms = Some(now_ms + self.pulse_width_ms);
        }
        fired
    }

    /// Beat flag as visible at `now_ms`, expiring the pulse if it is due.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if let Some(clear_at) = self.clear_at_ms {
            if now_ms >= clear_at {
                self.visible = false;
                self.clear_at_ms = None;
            }
        }
        self.visible
    }
}
