//! Publish/subscribe fan-out for the real-time channel.
//!
//! The [`Notifier`] owns a [`broadcast`] channel and a registry of the
//! subscribers currently connected. Every published message is wrapped
//! in an [`Envelope`] recording who sent it, so a [`Subscription`] can
//! skip the messages its own connection relayed.
//!
//! Delivery is at-most-once: a subscriber that falls more than
//! [`BROADCAST_CAPACITY`] messages behind loses the oldest ones, and
//! nothing is persisted or replayed.

use std::collections::BTreeSet;
use std::sync::Arc;

use places_types::{ChannelEvent, SubscriberId};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{RwLock, broadcast};

/// Capacity of the broadcast channel.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`RecvError::Lagged`] and skip to the oldest retained one.
pub const BROADCAST_CAPACITY: usize = 256;

/// A channel message plus its sender.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// The subscriber that sent it, or `None` for server-originated events.
    pub origin: Option<SubscriberId>,
    /// The message itself.
    pub event: ChannelEvent,
}

/// Fan-out hub shared by the HTTP handlers and every `WebSocket` session.
///
/// Cloning is cheap; all clones share one channel and one registry.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Arc<Envelope>>,
    subscribers: Arc<RwLock<BTreeSet<SubscriberId>>>,
}

impl Notifier {
    /// Create a notifier with no subscribers.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            subscribers: Arc::new(RwLock::new(BTreeSet::new())),
        }
    }

    /// Register a new subscriber and return its receiving end.
    pub async fn subscribe(&self) -> Subscription {
        let id = SubscriberId::new();
        // Receiver first, so nothing published after registration is missed.
        let rx = self.tx.subscribe();
        self.subscribers.write().await.insert(id);
        Subscription { id, rx }
    }

    /// Remove a subscriber from the registry.
    ///
    /// Returns `false` if it was not registered.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.subscribers.write().await.remove(&id)
    }

    /// Number of registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Send a server-originated event to every subscriber.
    ///
    /// Returns the number of receivers the message was queued for.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn publish(&self, event: ChannelEvent) -> usize {
        tracing::debug!(event = event.name(), "Publishing event");
        self.send(Envelope {
            origin: None,
            event,
        })
    }

    /// Send a subscriber's message to every *other* subscriber.
    ///
    /// The sender's own [`Subscription`] filters it out on receive.
    pub fn relay(&self, origin: SubscriberId, event: ChannelEvent) -> usize {
        tracing::debug!(event = event.name(), %origin, "Relaying event");
        self.send(Envelope {
            origin: Some(origin),
            event,
        })
    }

    fn send(&self, envelope: Envelope) -> usize {
        // send returns Err only when there are zero receivers,
        // which is normal when no WebSocket clients are connected.
        self.tx.send(Arc::new(envelope)).unwrap_or(0)
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

/// The receiving end held by one connected subscriber.
pub struct Subscription {
    id: SubscriberId,
    rx: broadcast::Receiver<Arc<Envelope>>,
}

impl Subscription {
    /// This subscriber's identifier.
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next message not sent by this subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`RecvError::Lagged`] if messages were dropped because this
    /// subscriber fell behind (the next call resumes with the oldest
    /// retained message), or [`RecvError::Closed`] once every
    /// [`Notifier`] clone is gone.
    pub async fn recv(&mut self) -> Result<Arc<Envelope>, RecvError> {
        loop {
            let envelope = self.rx.recv().await?;
            if envelope.origin != Some(self.id) {
                return Ok(envelope);
            }
        }
    }
}
