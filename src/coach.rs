//! Coach feedback text
//!
//! Maps transition events to the spoken/displayed lines, and derives the
//! session mood. Wording is bilingual in places, matching the original
//! coaching voice.

use crate::types::{Mood, TransitionEvent, CHAKRA_COUNT, CHAKRA_NAMES};

pub const MEDITATION_STARTED: &str = "Deep meditation detected. Your energy is rising rapidly.";
pub const MEDITATION_ENDED_IDLE: &str = "Yoga band ho gaya hai. Meditation stopped.";
pub const MEDITATION_ENDED_POSE: &str = "Meditation ended. Maintaining Yoga pose.";
pub const BALANCED: &str = "All Chakras are perfectly balanced. You are in harmony.";

/// The line to speak for a transition event.
pub fn message_for(event: &TransitionEvent, energies: &[f64; CHAKRA_COUNT]) -> String {
    match event {
        TransitionEvent::GestureConfirmed(label) => gesture_message(label, energies),
        TransitionEvent::MeditationStarted => MEDITATION_STARTED.to_string(),
        TransitionEvent::MeditationEnded { gesture_active: false } => {
            MEDITATION_ENDED_IDLE.to_string()
        }
        TransitionEvent::MeditationEnded { gesture_active: true } => {
            MEDITATION_ENDED_POSE.to_string()
        }
        TransitionEvent::Balanced => BALANCED.to_string(),
    }
}

fn gesture_message(label: &str, energies: &[f64; CHAKRA_COUNT]) -> String {
    match label {
        "Gyan Mudra" => format!(
            "Gyan Mudra detected. Channeling energy into {} and {}.",
            CHAKRA_NAMES[0], CHAKRA_NAMES[6]
        ),
        "Namaste / Anjali Mudra" => format!(
            "Namaste. Anjali Mudra opens the {} chakra.",
            CHAKRA_NAMES[3]
        ),
        other => format!(
            "{} detected. Focus on your {} chakra.",
            other,
            CHAKRA_NAMES[weakest_channel(energies)]
        ),
    }
}

fn weakest_channel(energies: &[f64; CHAKRA_COUNT]) -> usize {
    let mut weakest = 0;
    for channel in 1..CHAKRA_COUNT {
        if energies[channel] < energies[weakest] {
            weakest = channel;
        }
    }
    weakest
}

/// Session mood for the top bar.
pub fn mood(meditating: bool, gesture_active: bool, eyes_closing: bool) -> Mood {
    if meditating {
        Mood::Peaceful
    } else if gesture_active {
        Mood::Focused
    } else if eyes_closing {
        Mood::Calm
    } else {
        Mood::Relaxed
    }
}
