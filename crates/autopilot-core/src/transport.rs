//! Outbound command seam.

use autopilot_types::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Fire-and-forget command transport. Sending never blocks and never
/// reports an outcome; results arrive later as notifications.
pub trait CommandSink: Send + Sync {
    /// Hand `command` to the transport.
    fn send(&self, command: Command);
}

/// [`CommandSink`] backed by an unbounded channel, drained by the
/// transport task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    account: String,
    tx: mpsc::UnboundedSender<Command>,
}

impl ChannelSink {
    /// Create a sink and the receiver the transport drains.
    pub fn new(account: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                account: account.into(),
                tx,
            },
            rx,
        )
    }
}

impl CommandSink for ChannelSink {
    fn send(&self, command: Command) {
        debug!(account = %self.account, command = command.name(), "Sending command");
        if let Err(err) = self.tx.send(command) {
            warn!(
                account = %self.account,
                command = err.0.name(),
                "Command transport closed, dropping command"
            );
        }
    }
}
