//! Per-account session loop.
//!
//! Each configured account gets one [`AccountSession`] fed by its own NATS
//! subscription. Three pieces run per account: the intake task decoding
//! notifications, the egress task publishing commands, and the session
//! itself publishing notifications on its bus in arrival order.

use std::sync::Arc;

use autopilot_core::{
    AccountConfig, AccountSession, ChannelSink, Collaborators, GameDataProvider,
    InMemoryPreferences, SessionSettings,
};
use autopilot_types::{Command, Notification};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::RunnerError;
use crate::nats::NatsBridge;

/// Capacity of the per-account notification queue.
const INBOUND_QUEUE: usize = 256;

/// Drives one account until `shutdown` fires or its subscription ends.
pub struct AccountRunner {
    bridge: NatsBridge,
    account: AccountConfig,
    settings: SessionSettings,
    data: Arc<dyn GameDataProvider>,
}

impl AccountRunner {
    /// Create a runner for `account`.
    pub const fn new(
        bridge: NatsBridge,
        account: AccountConfig,
        settings: SessionSettings,
        data: Arc<dyn GameDataProvider>,
    ) -> Self {
        Self {
            bridge,
            account,
            settings,
            data,
        }
    }

    /// Run the session loop.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Nats`] if the notification subscription
    /// cannot be established.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), RunnerError> {
        let username = self.account.username.clone();
        let subscriber = self.bridge.subscribe_notifications(&username).await?;

        let (sink, commands) = ChannelSink::new(username.clone());
        let collaborators = Collaborators {
            sink: Arc::new(sink),
            data: self.data,
            preferences: Arc::new(InMemoryPreferences::new(self.account.creation)),
        };
        let session = AccountSession::new(username.clone(), self.settings, collaborators, &shutdown);

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_QUEUE);
        let intake = tokio::spawn(intake(
            subscriber,
            inbound_tx,
            username.clone(),
            shutdown.clone(),
        ));
        let egress = tokio::spawn(egress(self.bridge.clone(), commands, username.clone()));

        info!(account = %username, session = %session.id(), "account session started");
        session.run(inbound_rx, shutdown).await;

        intake.abort();
        // Dropping the session closes the command channel, so egress drains
        // what is left and exits.
        drop(session);
        if let Err(e) = egress.await {
            warn!(account = %username, error = %e, "command egress task failed");
        }
        if let Err(e) = self.bridge.flush().await {
            warn!(account = %username, error = %e, "failed to flush pending commands");
        }
        info!(account = %username, "account session ended");
        Ok(())
    }
}

/// Decode notifications off the subscription and queue them for the session.
async fn intake(
    mut subscriber: async_nats::Subscriber,
    inbound: mpsc::Sender<Notification>,
    account: String,
    shutdown: CancellationToken,
) {
    loop {
        let message = tokio::select! {
            () = shutdown.cancelled() => break,
            next = subscriber.next() => match next {
                Some(message) => message,
                None => break,
            },
        };

        let subject = message.subject.to_string();
        if NatsBridge::account_from_subject(&subject) != Some(account.as_str()) {
            debug!(subject = subject, account = %account, "ignoring message for another account");
            continue;
        }
        match NatsBridge::deserialize_notification(&message.payload) {
            Ok(notification) => {
                debug!(account = %account, kind = ?notification.kind(), "received notification");
                if inbound.send(notification).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(subject = subject, error = %e, "failed to deserialize notification, skipping");
            }
        }
    }
    debug!(account = %account, "notification intake stopped");
}

/// Publish every command the session sends, in order.
async fn egress(bridge: NatsBridge, mut commands: mpsc::UnboundedReceiver<Command>, account: String) {
    while let Some(command) = commands.recv().await {
        if let Err(e) = bridge.publish_command(&account, &command).await {
            warn!(
                account = %account,
                command = command.name(),
                error = %e,
                "failed to publish command"
            );
        }
    }
    debug!(account = %account, "command egress stopped");
}

impl std::fmt::Debug for AccountRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountRunner")
            .field("account", &self.account.username)
            .finish_non_exhaustive()
    }
}
