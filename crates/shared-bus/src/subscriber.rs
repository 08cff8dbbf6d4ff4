//! # Event Subscriber
//!
//! The subscription side of the hubs, for callers at the edge of the system.

use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio_stream::Stream;
use tracing::debug;

use crate::hub::{EventReceiver, Hub, HubInner, SubscriberId};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The subscriber was removed or the hub dropped.
    #[error("Subscription closed")]
    Closed,
}

/// Anything that hands out event subscriptions.
pub trait EventSource<T>: Send + Sync {
    /// Register a fresh queue and return it with its ID.
    fn subscribe(&self) -> (EventReceiver<T>, SubscriberId);

    /// Remove the queue registered under `id`, if any.
    fn unsubscribe(&self, id: SubscriberId);
}

impl<T: Send + Sync + 'static> EventSource<T> for Hub<T> {
    fn subscribe(&self) -> (EventReceiver<T>, SubscriberId) {
        Hub::subscribe(self)
    }

    fn unsubscribe(&self, id: SubscriberId) {
        Hub::unsubscribe(self, id);
    }
}

/// A subscription handle for receiving events.
///
/// When dropped, the subscriber is removed from its hub.
pub struct Subscription<T> {
    receiver: mpsc::Receiver<Arc<T>>,
    id: SubscriberId,
    hub: Weak<HubInner<T>>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(
        receiver: mpsc::Receiver<Arc<T>>,
        id: SubscriberId,
        hub: Weak<HubInner<T>>,
    ) -> Self {
        Self { receiver, id, hub }
    }

    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Receive the next event.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - The next event
    /// - `None` - The subscription was closed
    pub async fn recv(&mut self) -> Option<Arc<T>> {
        self.receiver.recv().await
    }

    /// Try to receive the next event without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - An event was queued
    /// - `Ok(None)` - Nothing queued right now
    /// - `Err(SubscriptionError::Closed)` - The subscription was closed
    pub fn try_recv(&mut self) -> Result<Option<Arc<T>>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SubscriptionError::Closed),
        }
    }
}

impl<T> Stream for Subscription<T> {
    type Item = Arc<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        let Some(hub) = self.hub.upgrade() else {
            return;
        };
        if !hub.unsubscribe(self.id) {
            debug!(subscriber_id = self.id, "Subscription already removed");
        }
    }
}
