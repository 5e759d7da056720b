//! Gesture debouncing
//!
//! The vision model reclassifies every frame, so raw labels flicker. A
//! candidate must persist for the hold window before it becomes the active
//! gesture; losing the candidate is immediate and never debounced.

use crate::config::DEFAULT_GESTURE_HOLD_MS;

/// Stabilizes per-tick gesture labels into a confirmed active gesture.
#[derive(Debug)]
pub struct GestureDebouncer {
    hold_ms: u64,
    pending: Option<String>,
    pending_since_ms: u64,
    active: Option<String>,
}

impl Default for GestureDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_GESTURE_HOLD_MS)
    }
}

impl GestureDebouncer {
    pub fn new(hold_ms: u64) -> Self {
        Self {
            hold_ms,
            pending: None,
            pending_since_ms: 0,
            active: None,
        }
    }

    /// Observe this tick's candidate label.
    ///
    /// Returns the newly confirmed label when a promotion happens on this
    /// call; re-confirming an already-active gesture returns `None`.
    pub fn observe(&mut self, candidate: Option<&str>, now_ms: u64) -> Option<String> {
        let Some(label) = candidate else {
            self.pending = None;
            self.pending_since_ms = 0;
            return None;
        };

        if self.pending.as_deref() != Some(label) {
            self.pending = Some(label.to_string());
            self.pending_since_ms = now_ms;
            return None;
        }

        if now_ms.saturating_sub(self.pending_since_ms) > self.hold_ms
            && self.active.as_deref() != Some(label)
        {
            self.active = Some(label.to_string());
            return Some(label.to_string());
        }
        None
    }

    /// The confirmed, externally visible gesture.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }
}
