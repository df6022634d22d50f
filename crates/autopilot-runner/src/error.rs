//! Error types for the autopilot runner.
//!
//! Uses `thiserror` for typed errors surfacing from startup and the NATS
//! bridge: configuration, reference data, connectivity, payload codecs.

use autopilot_core::ConfigError;

/// Errors that can occur while running the autopilot.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Failed to connect to or communicate with the NATS server.
    #[error("NATS error: {0}")]
    Nats(String),

    /// An inbound payload could not be decoded into a notification.
    #[error("payload parse error: {0}")]
    Parse(String),

    /// Configuration or reference data is invalid or missing.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
