//! Error types for the event layer.

/// Why a suspension point ended without producing a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WaitError {
    /// The watchdog expired before a matching event arrived.
    #[error("no matching event within {after_ms} ms")]
    Stalled {
        /// Watchdog duration in milliseconds.
        after_ms: u64,
    },

    /// The session was reset while waiting.
    #[error("wait cancelled by session reset")]
    Cancelled,
}

impl From<tokio::sync::oneshot::error::RecvError> for WaitError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::Cancelled
    }
}

/// A subscriber failed while handling an event.
///
/// The bus reports the failure and keeps delivering to the remaining
/// subscribers.
#[derive(Debug, thiserror::Error)]
#[error("handler `{handler}` failed on event #{seq}: {source}")]
pub struct HandlerError {
    /// Name of the failing handler.
    pub handler: String,
    /// Sequence number of the event being handled.
    pub seq: u64,
    /// Underlying failure.
    #[source]
    pub source: anyhow::Error,
}
