//! Engine runtime
//!
//! One task exclusively owns the mutable session state and applies events
//! strictly in arrival order; the read loop and the frame source only produce
//! immutable [`SessionEvent`] values onto its channel. Snapshots flow back
//! through a `watch` channel, so no lock guards any session state.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::announce::SpeechSink;
use crate::error::ConnectError;
use crate::link::{SensorLink, Transport};
use crate::session::SessionEngine;
use crate::types::{ConnectionState, SessionEvent, TickInput, TickSnapshot};

/// Monotonic millisecond clock used to stamp reading events.
pub type Clock = Box<dyn Fn() -> u64 + Send>;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Handle to a running engine: the single-owner task, the sensor link, and
/// the channels connecting them.
pub struct EngineRuntime {
    link: SensorLink,
    events_tx: mpsc::Sender<SessionEvent>,
    snapshot_rx: watch::Receiver<Option<TickSnapshot>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl EngineRuntime {
    /// Spawn the engine with a monotonic clock anchored at startup.
    pub fn spawn(engine: SessionEngine, sink: Box<dyn SpeechSink>) -> Self {
        let start = std::time::Instant::now();
        Self::spawn_with_clock(engine, sink, Box::new(move || start.elapsed().as_millis() as u64))
    }

    /// Spawn the engine with an injected clock (deterministic in tests).
    pub fn spawn_with_clock(
        engine: SessionEngine,
        sink: Box<dyn SpeechSink>,
        clock: Clock,
    ) -> Self {
        log::info!(
            "{} engine {} starting",
            crate::PRODUCER_NAME,
            crate::ENGINE_VERSION
        );
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(engine_task(
            engine,
            sink,
            clock,
            events_rx,
            snapshot_tx,
            cancel.clone(),
        ));

        Self {
            link: SensorLink::new(),
            events_tx,
            snapshot_rx,
            cancel,
            task: Some(task),
        }
    }

    /// Connect the biometric transport and start streaming readings into the
    /// engine.
    pub fn connect(&mut self, transport: &mut dyn Transport) -> Result<(), ConnectError> {
        self.link.connect(transport, self.events_tx.clone())
    }

    /// Stop the read loop and release the transport. No-op when already
    /// disconnected.
    pub async fn disconnect(&mut self) {
        self.link.disconnect().await;
    }

    pub fn connection(&self) -> ConnectionState {
        self.link.state().borrow().clone()
    }

    pub fn connection_watch(&self) -> watch::Receiver<ConnectionState> {
        self.link.state()
    }

    /// Deliver one evaluation tick to the engine.
    pub async fn tick(&self, input: TickInput) {
        if self
            .events_tx
            .send(SessionEvent::Frame(input))
            .await
            .is_err()
        {
            log::warn!("engine task gone, dropping frame");
        }
    }

    /// Most recent snapshot, if any tick has completed.
    pub fn snapshot(&self) -> Option<TickSnapshot> {
        self.snapshot_rx.borrow().clone()
    }

    /// Snapshot stream for callers that want change notifications.
    pub fn snapshot_watch(&self) -> watch::Receiver<Option<TickSnapshot>> {
        self.snapshot_rx.clone()
    }

    /// Shut the whole engine down: cancel the read loop, drop the transport,
    /// stop the owner task. Leaves the connection Disconnected.
    pub async fn shutdown(mut self) {
        self.link.disconnect().await;
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if task.await.is_err() {
                log::warn!("engine task panicked during shutdown");
            }
        }
    }
}

async fn engine_task(
    mut engine: SessionEngine,
    mut sink: Box<dyn SpeechSink>,
    clock: Clock,
    mut events: mpsc::Receiver<SessionEvent>,
    snapshot_tx: watch::Sender<Option<TickSnapshot>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Some(SessionEvent::Reading(reading)) => {
                    engine.ingest_reading(reading, clock());
                }
                Some(SessionEvent::Frame(input)) => {
                    let snapshot = engine.update(&input, sink.as_mut());
                    for event in &snapshot.events {
                        log::debug!(
                            "transition: {}",
                            serde_json::to_string(event).unwrap_or_default()
                        );
                    }
                    snapshot_tx.send_replace(Some(snapshot));
                }
                Some(SessionEvent::ReadingsReset) => {
                    log::info!("sensor gone, resetting vitals");
                    engine.reset_readings();
                }
                None => break,
            }
        }
    }
    log::info!("engine task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announce::NullSpeech;
    use crate::link::ChannelTransport;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn fixed_clock(now: Arc<AtomicU64>) -> Clock {
        Box::new(move || now.load(Ordering::SeqCst))
    }

    fn frame(gesture: Option<&str>, eyes_closed: bool, now_ms: u64) -> TickInput {
        TickInput {
            gesture: gesture.map(str::to_string),
            eyes_closed,
            now_ms,
        }
    }

    #[tokio::test]
    async fn test_readings_reach_snapshot_vitals() {
        let now = Arc::new(AtomicU64::new(0));
        let runtime = EngineRuntime::spawn_with_clock(
            SessionEngine::new(),
            Box::new(NullSpeech),
            fixed_clock(now.clone()),
        );
        let mut runtime = runtime;

        let (mut transport, chunks) = ChannelTransport::new(16);
        runtime.connect(&mut transport).unwrap();
        chunks
            .send(Ok("BPM:60,SpO2:98\n".to_string()))
            .await
            .unwrap();

        // Readings and frames land on the same channel; poll until the
        // reading has been applied, advancing the frame clock as we go.
        let mut vitals_seen = false;
        for i in 1..=100u64 {
            now.store(i * 10, Ordering::SeqCst);
            runtime.tick(frame(None, false, i * 10)).await;
            tokio::time::sleep(Duration::from_millis(2)).await;
            if let Some(snapshot) = runtime.snapshot() {
                if snapshot.vitals.heart_rate == 60.0 {
                    vitals_seen = true;
                    break;
                }
            }
        }
        assert!(vitals_seen, "reading never reached the session vitals");

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_frames_produce_snapshots_in_order() {
        let now = Arc::new(AtomicU64::new(0));
        let runtime = EngineRuntime::spawn_with_clock(
            SessionEngine::new(),
            Box::new(NullSpeech),
            fixed_clock(now),
        );

        let mut watch_rx = runtime.snapshot_watch();
        for tick_ms in (0..700).step_by(100) {
            runtime.tick(frame(Some("Gyan Mudra"), false, tick_ms)).await;
        }

        // Wait for the last frame's snapshot to land.
        let mut confirmed = None;
        for _ in 0..100 {
            if watch_rx.changed().await.is_err() {
                break;
            }
            let snapshot = watch_rx.borrow_and_update().clone();
            if let Some(snapshot) = snapshot {
                if snapshot.active_gesture.is_some() {
                    confirmed = snapshot.active_gesture;
                    break;
                }
            }
        }
        assert_eq!(confirmed.as_deref(), Some("Gyan Mudra"));

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_leaves_disconnected() {
        let runtime =
            EngineRuntime::spawn(SessionEngine::new(), Box::new(NullSpeech));
        let mut runtime = runtime;

        let (mut transport, _chunks) = ChannelTransport::new(16);
        runtime.connect(&mut transport).unwrap();

        let connection = runtime.connection_watch();
        runtime.shutdown().await;
        assert_eq!(*connection.borrow(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_resets_vitals() {
        let now = Arc::new(AtomicU64::new(0));
        let mut runtime = EngineRuntime::spawn_with_clock(
            SessionEngine::new(),
            Box::new(NullSpeech),
            fixed_clock(now.clone()),
        );

        let (mut transport, chunks) = ChannelTransport::new(16);
        runtime.connect(&mut transport).unwrap();
        chunks.send(Ok("BPM:72\n".to_string())).await.unwrap();

        let mut vitals_seen = false;
        for i in 1..=100u64 {
            now.store(i * 10, Ordering::SeqCst);
            runtime.tick(frame(None, false, i * 10)).await;
            tokio::time::sleep(Duration::from_millis(2)).await;
            if runtime.snapshot().is_some_and(|s| s.vitals.heart_rate == 72.0) {
                vitals_seen = true;
                break;
            }
        }
        assert!(vitals_seen);

        runtime.disconnect().await;
        // The reset event is already queued ahead of the next frames.
        let mut vitals_cleared = false;
        for i in 101..=200u64 {
            runtime.tick(frame(None, false, i * 10)).await;
            tokio::time::sleep(Duration::from_millis(2)).await;
            if runtime.snapshot().is_some_and(|s| s.vitals.heart_rate == 0.0) {
                vitals_cleared = true;
                break;
            }
        }
        assert!(vitals_cleared, "vitals were not reset after disconnect");

        runtime.shutdown().await;
    }
}
