//! Announcement throttling
//!
//! Every spoken line goes through this gate: nothing is dispatched while the
//! speech engine is busy, and an identical text is suppressed within the
//! cool-down window so transitions near a boundary don't nag.

use crate::config::DEFAULT_ANNOUNCE_COOLDOWN_MS;

/// Injected speech capability; the engine never touches a platform speech
/// API directly.
pub trait SpeechSink: Send {
    fn speak(&mut self, text: &str);

    /// Whether an utterance is currently in flight.
    fn is_speaking(&self) -> bool {
        false
    }
}

/// A sink that discards everything. Useful for headless runs and tests.
#[derive(Debug, Default)]
pub struct NullSpeech;

impl SpeechSink for NullSpeech {
    fn speak(&mut self, _text: &str) {}
}

/// Deduplicating, rate-limiting gate in front of a [`SpeechSink`].
#[derive(Debug)]
pub struct AnnouncementThrottle {
    cooldown_ms: u64,
    last_text: String,
    last_at_ms: u64,
    speaking: bool,
}

impl Default for AnnouncementThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_ANNOUNCE_COOLDOWN_MS)
    }
}

impl AnnouncementThrottle {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            last_text: String::new(),
            last_at_ms: 0,
            speaking: false,
        }
    }

    /// Mirror the external speech engine's busy flag.
    pub fn set_speaking(&mut self, speaking: bool) {
        self.speaking = speaking;
    }

    /// Whether `text` may be dispatched now. Accepting records text and time.
    pub fn try_announce(&mut self, text: &str, now_ms: u64) -> bool {
        if self.speaking {
            return false;
        }
        if text == self.last_text && now_ms.saturating_sub(self.last_at_ms) <= self.cooldown_ms {
            return false;
        }
        self.last_text = text.to_string();
        self.last_at_ms = now_ms;
        true
    }
}
