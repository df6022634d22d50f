//! NATS pub/sub integration for notification intake and command egress.
//!
//! The game client publishes each decoded server notification on
//! `autopilot.{account}.notification`. The runner turns every command a
//! session sends into a publish on `autopilot.{account}.command.{name}`,
//! where `name` is the command's snake-case name. Payloads are JSON.

use autopilot_types::{Command, Notification};
use tracing::{debug, info};

use crate::error::RunnerError;

/// Root of every subject the runner uses.
const SUBJECT_ROOT: &str = "autopilot";

/// NATS client wrapper for the autopilot.
///
/// Manages a single NATS connection shared by every account session.
#[derive(Clone)]
pub struct NatsBridge {
    client: async_nats::Client,
}

impl NatsBridge {
    /// Connect to a NATS server.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Nats`] if the connection cannot be established.
    pub async fn connect(url: &str) -> Result<Self, RunnerError> {
        info!(url = url, "connecting to NATS server");
        let client = async_nats::connect(url)
            .await
            .map_err(|e| RunnerError::Nats(format!("failed to connect to {url}: {e}")))?;
        info!("NATS connection established");
        Ok(Self { client })
    }

    /// Subject carrying the notifications of `account`.
    pub fn notification_subject(account: &str) -> String {
        format!("{SUBJECT_ROOT}.{account}.notification")
    }

    /// Subject a command of `account` is published on.
    pub fn command_subject(account: &str, command: &Command) -> String {
        format!("{SUBJECT_ROOT}.{account}.command.{}", command.name())
    }

    /// Extract the account from a notification or command subject.
    pub fn account_from_subject(subject: &str) -> Option<&str> {
        let mut parts = subject.split('.');
        if parts.next() != Some(SUBJECT_ROOT) {
            return None;
        }
        let account = parts.next().filter(|a| !a.is_empty())?;
        parts.next()?;
        Some(account)
    }

    /// Subscribe to the notifications of one account.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Nats`] if the subscription fails.
    pub async fn subscribe_notifications(
        &self,
        account: &str,
    ) -> Result<async_nats::Subscriber, RunnerError> {
        let subject = Self::notification_subject(account);
        debug!(subject = subject, "subscribing to notification subject");
        self.client
            .subscribe(subject.clone())
            .await
            .map_err(|e| RunnerError::Nats(format!("failed to subscribe to {subject}: {e}")))
    }

    /// Publish one outbound command.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Serde`] if serialization fails and
    /// [`RunnerError::Nats`] if publishing fails.
    pub async fn publish_command(&self, account: &str, command: &Command) -> Result<(), RunnerError> {
        let subject = Self::command_subject(account, command);
        let payload = Self::encode_command(command)?;
        debug!(subject = subject, account = account, "publishing command");
        self.client
            .publish(subject.clone(), payload.into())
            .await
            .map_err(|e| RunnerError::Nats(format!("failed to publish to {subject}: {e}")))
    }

    /// Serialize a command into its JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Serde`] if serialization fails.
    pub fn encode_command(command: &Command) -> Result<Vec<u8>, RunnerError> {
        Ok(serde_json::to_vec(command)?)
    }

    /// Deserialize a NATS message payload into a [`Notification`].
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Parse`] if deserialization fails.
    pub fn deserialize_notification(data: &[u8]) -> Result<Notification, RunnerError> {
        serde_json::from_slice(data)
            .map_err(|e| RunnerError::Parse(format!("failed to deserialize notification: {e}")))
    }

    /// Flush all pending publishes to the NATS server.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Nats`] if the flush operation fails.
    pub async fn flush(&self) -> Result<(), RunnerError> {
        self.client
            .flush()
            .await
            .map_err(|e| RunnerError::Nats(format!("flush failed: {e}")))
    }
}

impl std::fmt::Debug for NatsBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsBridge")
            .field("connected", &true)
            .finish()
    }
}
