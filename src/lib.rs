//! ChakraFlow - Real-time biometric and gesture session engine
//!
//! ChakraFlow turns two noisy live inputs - a fragmented serial stream of
//! heart-rate/SpO2 samples and a per-frame gesture/eyes classification - into
//! a stable session state: confirmed gestures, confirmed meditation, a
//! bounded 7-channel energy vector, and throttled announcements.
//!
//! ## Pipeline
//!
//! - **Sensor path**: transport chunks → [`framer::LineFramer`] →
//!   [`parser::parse_record`] → [`beat::BeatDetector`] → readings
//! - **Frame path**: per-tick `{gesture, eyes_closed}` →
//!   [`gesture::GestureDebouncer`] + [`meditation::MeditationHysteresis`] →
//!   [`energy::EnergySimulator`] → snapshot
//!
//! Both paths deliver into a single owner task ([`runtime::EngineRuntime`])
//! so the debounce and hysteresis rules stay strictly sequential.

pub mod announce;
pub mod beat;
pub mod coach;
pub mod config;
pub mod energy;
pub mod error;
pub mod framer;
pub mod gesture;
pub mod link;
pub mod meditation;
pub mod parser;
pub mod runtime;
pub mod session;
pub mod types;

pub use announce::{AnnouncementThrottle, NullSpeech, SpeechSink};
pub use config::{EnergyRates, SessionConfig};
pub use error::ConnectError;
pub use framer::LineFramer;
pub use link::{ChannelTransport, SensorLink, Transport, UnsupportedTransport};
pub use parser::parse_record;
pub use runtime::EngineRuntime;
pub use session::SessionEngine;
pub use types::{
    ConnectionState, Mood, Reading, SessionEvent, TickInput, TickSnapshot, TransitionEvent,
    CHAKRA_COUNT, CHAKRA_NAMES,
};

/// Engine version embedded in session provenance
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for session payloads
pub const PRODUCER_NAME: &str = "chakraflow";
