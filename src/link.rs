//! Connection lifecycle
//!
//! `SensorLink` owns the transport handle and the read-loop task. The
//! transport itself is an injected capability: it hands back a stream of raw
//! text chunks and is released when that stream is dropped. The read loop
//! frames and parses chunks, and forwards each decoded reading onto the
//! session event channel; it never mutates session state itself.
//!
//! Transitions: Disconnected → Connecting → Connected → Reading. Any read
//! error or end-of-stream lands back in Disconnected with vitals reset; the
//! error case passes through a transient `Error` state so callers can surface
//! a status string.

use std::io;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ConnectError;
use crate::framer::LineFramer;
use crate::parser::parse_record;
use crate::types::{ConnectionState, SessionEvent};

/// Raw text chunks produced by an open transport. Dropping the receiver
/// releases the transport.
pub type ChunkStream = mpsc::Receiver<io::Result<String>>;

/// Injected transport capability (serial port, socket, replay file).
pub trait Transport: Send {
    fn open(&mut self) -> Result<ChunkStream, ConnectError>;
}

/// Transport stand-in for platforms without serial support: `connect()`
/// fails immediately with a capability-missing error.
#[derive(Debug)]
pub struct UnsupportedTransport {
    reason: String,
}

impl UnsupportedTransport {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Transport for UnsupportedTransport {
    fn open(&mut self) -> Result<ChunkStream, ConnectError> {
        Err(ConnectError::Unsupported(self.reason.clone()))
    }
}

/// Transport fed from an in-process channel. Used by tests and by the CLI to
/// replay captured streams.
#[derive(Debug)]
pub struct ChannelTransport {
    stream: Option<ChunkStream>,
}

impl ChannelTransport {
    /// Returns the transport and the sender that feeds it chunks.
    pub fn new(capacity: usize) -> (Self, mpsc::Sender<io::Result<String>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { stream: Some(rx) }, tx)
    }
}

impl Transport for ChannelTransport {
    fn open(&mut self) -> Result<ChunkStream, ConnectError> {
        self.stream
            .take()
            .ok_or_else(|| ConnectError::Open("channel transport already consumed".to_string()))
    }
}

/// Owns the transport read loop and the connection state machine.
pub struct SensorLink {
    state_tx: watch::Sender<ConnectionState>,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl Default for SensorLink {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorLink {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            state_tx,
            cancel: None,
            task: None,
        }
    }

    /// Read-only view of the connection state.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Open the transport and start the read loop, forwarding readings onto
    /// `events`. Fails with [`ConnectError::Busy`] while a loop is running.
    pub fn connect(
        &mut self,
        transport: &mut dyn Transport,
        events: mpsc::Sender<SessionEvent>,
    ) -> Result<(), ConnectError> {
        // Reap a loop that ended on its own (error or end-of-stream).
        if self.task.as_ref().is_some_and(JoinHandle::is_finished) {
            self.task = None;
            self.cancel = None;
        }
        if self.task.is_some() {
            return Err(ConnectError::Busy);
        }

        self.state_tx.send_replace(ConnectionState::Connecting);
        let chunks = match transport.open() {
            Ok(chunks) => chunks,
            Err(err) => {
                log::warn!("sensor connect failed: {err}");
                self.state_tx.send_replace(ConnectionState::Disconnected);
                return Err(err);
            }
        };
        self.state_tx.send_replace(ConnectionState::Connected);

        let cancel = CancellationToken::new();
        let task = tokio::spawn(read_loop(
            chunks,
            events,
            self.state_tx.clone(),
            cancel.clone(),
        ));
        self.cancel = Some(cancel);
        self.task = Some(task);
        log::info!("sensor connected, read loop started");
        Ok(())
    }

    /// Cancel the read loop and release the transport. A no-op when already
    /// disconnected.
    pub async fn disconnect(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(task) = self.task.take() {
            if task.await.is_err() {
                log::warn!("sensor read loop panicked");
            }
        }
        self.state_tx.send_replace(ConnectionState::Disconnected);
    }
}

async fn read_loop(
    mut chunks: ChunkStream,
    events: mpsc::Sender<SessionEvent>,
    state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
) {
    state.send_replace(ConnectionState::Reading);
    let mut framer = LineFramer::new();

    'read: loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                log::info!("sensor read loop cancelled");
                break 'read;
            }
            chunk = chunks.recv() => match chunk {
                Some(Ok(text)) => {
                    for record in framer.feed(&text) {
                        let Some(reading) = parse_record(&record) else {
                            continue;
                        };
                        if events.send(SessionEvent::Reading(reading)).await.is_err() {
                            log::warn!("session engine gone, stopping read loop");
                            break 'read;
                        }
                    }
                }
                Some(Err(err)) => {
                    log::error!("sensor read failed: {err}");
                    state.send_replace(ConnectionState::Error(err.to_string()));
                    break 'read;
                }
                None => {
                    log::info!("sensor stream ended");
                    break 'read;
                }
            }
        }
    }

    // Dropping `chunks` here releases the transport.
    state.send_replace(ConnectionState::Disconnected);
    let _ = events.send(SessionEvent::ReadingsReset).await;
}
