//! Error types for the ChakraFlow engine
//!
//! Parse errors are deliberately absent: malformed records and fields are
//! skipped in place and never surface as errors.

use thiserror::Error;

/// Errors surfaced by the connection lifecycle.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The platform has no usable serial transport.
    #[error("serial transport not supported: {0}")]
    Unsupported(String),

    /// Opening the transport failed (device missing, permission denied, ...).
    #[error("failed to open transport: {0}")]
    Open(String),

    /// A connection is already active; disconnect first.
    #[error("already connected")]
    Busy,
}

impl ConnectError {
    /// Whether reconnecting later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConnectError::Open(_) | ConnectError::Busy)
    }
}
