//! Fan-out of session-change notifications.
//!
//! Providers publish into a [`SessionBroadcaster`]; every subscriber holds a
//! [`SessionSubscription`]. A subscription is released when it is dropped,
//! on every exit path.

use crate::error::SubscriptionError;
use crate::provider::SessionEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Notifications buffered per subscriber before it starts lagging.
const CHANNEL_CAPACITY: usize = 16;

/// Publishes session changes to all current subscribers.
#[derive(Debug, Clone)]
pub struct SessionBroadcaster {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionBroadcaster {
    /// Creates a broadcaster with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Adds a subscriber.
    #[must_use]
    pub fn subscribe(&self) -> SessionSubscription {
        debug!("session subscription acquired");
        SessionSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Publishes an event and returns how many subscribers received it.
    pub fn publish(&self, event: SessionEvent) -> usize {
        let kind = event.kind();
        let delivered = self.sender.send(event).unwrap_or(0);
        debug!(event = kind, delivered, "session event published");
        delivered
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription to session changes.
#[derive(Debug)]
pub struct SessionSubscription {
    receiver: broadcast::Receiver<SessionEvent>,
}

impl SessionSubscription {
    /// Waits for the next session change.
    pub async fn recv(&mut self) -> Result<SessionEvent, SubscriptionError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Lagged(missed) => SubscriptionError::Lagged { missed },
            broadcast::error::RecvError::Closed => SubscriptionError::Closed,
        })
    }

    /// Returns the next session change if one is already queued.
    pub fn try_recv(&mut self) -> Result<Option<SessionEvent>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                Err(SubscriptionError::Lagged { missed })
            }
            Err(broadcast::error::TryRecvError::Closed) => Err(SubscriptionError::Closed),
        }
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        debug!("session subscription released");
    }
}
