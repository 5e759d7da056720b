//! Session engine
//!
//! Composes the stabilizers, the beat detector, the energy simulation and the
//! announcement gate into one per-tick `update()`. The engine is a plain
//! owned struct driven by externally supplied monotonic timestamps, so every
//! timing rule is testable without a render loop or a runtime.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::announce::{AnnouncementThrottle, SpeechSink};
use crate::beat::BeatDetector;
use crate::coach;
use crate::config::SessionConfig;
use crate::energy::EnergySimulator;
use crate::gesture::GestureDebouncer;
use crate::meditation::{MeditationHysteresis, MeditationTransition};
use crate::types::{
    BioSummary, Reading, SessionMode, SessionSummary, TickInput, TickSnapshot, TransitionEvent,
    Vitals, CHAKRA_COUNT,
};

/// Single live session state machine.
pub struct SessionEngine {
    config: SessionConfig,
    beat: BeatDetector,
    gesture: GestureDebouncer,
    meditation: MeditationHysteresis,
    energy: EnergySimulator,
    throttle: AnnouncementThrottle,
    vitals: Vitals,
    aura: f64,
    session_id: Uuid,
    started_at: DateTime<Utc>,
    started_ms: Option<u64>,
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEngine {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            beat: BeatDetector::new(config.pulse_width_ms),
            gesture: GestureDebouncer::new(config.gesture_hold_ms),
            meditation: MeditationHysteresis::new(
                config.meditation_enter_ms,
                config.meditation_exit_ms,
            ),
            energy: EnergySimulator::new(config.rates),
            throttle: AnnouncementThrottle::new(config.announce_cooldown_ms),
            vitals: Vitals::default(),
            aura: 0.0,
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            started_ms: None,
            config,
        }
    }

    /// Merge one sensor reading into the session vitals and run the beat
    /// detector. Returns whether a beat fired.
    ///
    /// Zero fields are absent, not physiological zeros; they never overwrite
    /// the last known good value.
    pub fn ingest_reading(&mut self, reading: Reading, now_ms: u64) -> bool {
        if reading.heart_rate > 0.0 {
            self.vitals.heart_rate = reading.heart_rate;
        }
        if reading.spo2 > 0.0 {
            self.vitals.spo2 = reading.spo2;
        }
        self.beat.observe(&reading, now_ms)
    }

    /// Reset vitals to the absent state (on disconnect).
    pub fn reset_readings(&mut self) {
        self.vitals = Vitals::default();
    }

    pub fn vitals(&self) -> Vitals {
        self.vitals
    }

    /// Apply one evaluation tick and return the stable session snapshot.
    pub fn update(&mut self, input: &TickInput, sink: &mut dyn SpeechSink) -> TickSnapshot {
        let now_ms = input.now_ms;
        let started_ms = *self.started_ms.get_or_insert(now_ms);
        self.throttle.set_speaking(sink.is_speaking());

        let candidate = input.gesture.as_deref();
        let mut events = Vec::new();

        match self
            .meditation
            .observe(input.eyes_closed, candidate.is_some(), now_ms)
        {
            Some(MeditationTransition::Started) => events.push(TransitionEvent::MeditationStarted),
            Some(MeditationTransition::Ended { gesture_active }) => {
                events.push(TransitionEvent::MeditationEnded { gesture_active })
            }
            None => {}
        }

        if let Some(label) = self.gesture.observe(candidate, now_ms) {
            events.push(TransitionEvent::GestureConfirmed(label));
        }

        // Meditation wins; gesture loss falls to Idle the same tick.
        let meditating = self.meditation.meditating();
        let mode = if meditating {
            SessionMode::Meditating
        } else if let Some(label) = candidate {
            SessionMode::Gesture(label.to_string())
        } else {
            SessionMode::Idle
        };

        let yoga_mode = meditating || candidate.is_some();
        self.aura = if yoga_mode {
            (self.aura + self.config.aura_step).min(1.0)
        } else {
            (self.aura - self.config.aura_step).max(0.0)
        };

        if self.energy.tick(&mode) {
            events.push(TransitionEvent::Balanced);
        }

        let energies = *self.energy.energies();
        for event in &events {
            let message = coach::message_for(event, &energies);
            if self.throttle.try_announce(&message, now_ms) {
                sink.speak(&message);
            }
        }

        let active_gesture = self.gesture.active().map(str::to_string);
        let mood = coach::mood(
            meditating,
            active_gesture.is_some(),
            self.meditation.eyes_closing(),
        );

        TickSnapshot {
            active_gesture,
            meditating,
            energies,
            aura: self.aura,
            mood,
            beat_visible: self.beat.poll(now_ms),
            vitals: self.vitals,
            bio: bio_summary(&energies),
            summary: SessionSummary {
                session_id: self.session_id,
                started_at: self.started_at,
                elapsed_minutes: now_ms.saturating_sub(started_ms) as f64 / 60_000.0,
                mood,
            },
            events,
        }
    }
}

fn bio_summary(energies: &[f64; CHAKRA_COUNT]) -> BioSummary {
    BioSummary {
        energy_level: energies.iter().sum::<f64>() / CHAKRA_COUNT as f64,
        stress_level: (1.0 - energies[3]).max(0.0),
        focus_score: energies[5],
    }
}
