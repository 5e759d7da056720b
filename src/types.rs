//! Core types for the ChakraFlow session engine
//!
//! This module defines the data structures that flow through the engine:
//! sensor readings, connection and session state, transition events, and the
//! per-tick snapshot handed back to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of energy channels (chakras, base to crown).
pub const CHAKRA_COUNT: usize = 7;

/// Channel names, index 0 = base, index 6 = crown.
pub const CHAKRA_NAMES: [&str; CHAKRA_COUNT] = [
    "Root",
    "Sacral",
    "Solar Plexus",
    "Heart",
    "Throat",
    "Third Eye",
    "Crown",
];

/// One decoded biometric sample.
///
/// Zero means "field absent in this record", not a physiological zero; absent
/// fields never overwrite the last known good value when merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Heart rate (bpm), 0 = absent
    pub heart_rate: f64,
    /// Blood oxygen saturation (percentage, 0-100), 0 = absent
    pub spo2: f64,
    /// Explicit beat flag from the sensor firmware
    pub beat: bool,
}

impl Reading {
    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.heart_rate <= 0.0 && self.spo2 <= 0.0 && !self.beat
    }
}

/// Transport connection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reading,
    /// Transient: a read error was observed; always followed by Disconnected.
    Error(String),
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reading => "reading",
            ConnectionState::Error(_) => "error",
        }
    }
}

/// Mode the energy simulation runs under for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    Meditating,
    /// A gesture candidate is present this tick (raw, pre-debounce label).
    Gesture(String),
    Idle,
}

/// Stable state transitions observed during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum TransitionEvent {
    /// A gesture candidate survived the hold window and became active.
    GestureConfirmed(String),
    /// Eyes stayed closed past the entry threshold.
    MeditationStarted,
    /// Eyes stayed open past the exit threshold while meditating.
    MeditationEnded {
        /// Whether a gesture candidate was active at exit (changes wording).
        gesture_active: bool,
    },
    /// All energy channels reached the ceiling under meditation.
    Balanced,
}

/// Per-frame classification input supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Gesture label from the vision model, if any
    pub gesture: Option<String>,
    /// Eyes-closed classification for this frame
    pub eyes_closed: bool,
    /// Monotonic timestamp (milliseconds)
    pub now_ms: u64,
}

/// Session mood shown in the top bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Peaceful,
    Focused,
    Calm,
    Relaxed,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Peaceful => "Peaceful",
            Mood::Focused => "Focused",
            Mood::Calm => "Calm",
            Mood::Relaxed => "Relaxed",
        }
    }
}

/// Derived bio-analytics values for the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BioSummary {
    /// Mean of all energy channels (0-1)
    pub energy_level: f64,
    /// Inverse of the heart channel (0-1)
    pub stress_level: f64,
    /// Third-eye channel (0-1)
    pub focus_score: f64,
}

/// Session provenance and elapsed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub elapsed_minutes: f64,
    pub mood: Mood,
}

/// Last known good vitals, merged across readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub heart_rate: f64,
    pub spo2: f64,
}

/// Immutable event delivered to the single engine-owner task.
///
/// Producers (the read loop, the frame source) only construct these; all
/// session state mutation happens on the consumer side, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A parsed sensor record from the read loop
    Reading(Reading),
    /// One evaluation tick from the frame source
    Frame(TickInput),
    /// The transport went away; vitals return to the absent state
    ReadingsReset,
}

/// Externally observed session state after one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    /// Confirmed (debounced) gesture, if any
    pub active_gesture: Option<String>,
    /// Confirmed meditation flag
    pub meditating: bool,
    /// Energy channels, each in [0, 1]
    pub energies: [f64; CHAKRA_COUNT],
    /// Background aura intensity (0-1)
    pub aura: f64,
    pub mood: Mood,
    /// Whether a heartbeat pulse is visible this tick
    pub beat_visible: bool,
    pub vitals: Vitals,
    pub bio: BioSummary,
    pub summary: SessionSummary,
    /// Transitions that fired during this tick, in order
    pub events: Vec<TransitionEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_is_empty() {
        assert!(Reading::default().is_empty());
        assert!(!Reading {
            heart_rate: 72.0,
            ..Default::default()
        }
        .is_empty());
        assert!(!Reading {
            beat: true,
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_transition_event_serialization() {
        let event = TransitionEvent::MeditationEnded {
            gesture_active: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("meditation_ended"));
        let back: TransitionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_connection_state_as_str() {
        assert_eq!(ConnectionState::Disconnected.as_str(), "disconnected");
        assert_eq!(ConnectionState::Error("boom".to_string()).as_str(), "error");
    }
}
