//! Error types for probes and the collector transport.

use thiserror::Error;

/// Errors a probe can report for a single collection cycle.
///
/// Both variants are non-fatal: the snapshot assembler converts them into
/// the field's documented placeholder and keeps the cycle going.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The underlying command or API is missing or exited with an error.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The source produced output, but it did not match the expected shape.
    #[error("unexpected output: {0}")]
    Parse(String),
}

impl ProbeError {
    /// Create an `Unavailable` error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a `Parse` error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// Errors from the collector transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No connection is currently established.
    #[error("not connected to collector")]
    NotConnected,

    /// The connection dropped or the write failed mid-frame.
    #[error("write to collector failed: {0}")]
    WriteFailed(String),

    /// Snapshot could not be encoded to JSON. The snapshot schema is fixed,
    /// so this indicates a programming defect rather than a runtime
    /// condition.
    #[error("failed to encode snapshot: {0}")]
    EncodeFailed(#[from] serde_json::Error),
}
