//! # Event Hub
//!
//! Fan-out of one event category to a dynamic set of subscribers.
//!
//! Every subscriber owns a bounded queue. Broadcasting never waits on a
//! subscriber: when a queue is full the event is dropped for that
//! subscriber only and the drop is logged and counted.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::subscriber::Subscription;
use crate::DEFAULT_EVENT_BUFFER_SIZE;

/// Identifier handed out by [`Hub::subscribe`].
pub type SubscriberId = u64;

/// Receiving half of a subscription.
pub type EventReceiver<T> = mpsc::Receiver<Arc<T>>;

pub(crate) struct HubInner<T> {
    name: &'static str,
    buffer_size: usize,
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<SubscriberId, mpsc::Sender<Arc<T>>>>,
    events_published: AtomicU64,
    events_dropped: AtomicU64,
}

impl<T> HubInner<T> {
    pub(crate) fn unsubscribe(&self, id: SubscriberId) -> bool {
        // Dropping the sender closes the channel once any in-flight
        // broadcast snapshot releases its clone.
        let removed = self.subscribers.lock().remove(&id).is_some();
        if removed {
            debug!(hub = self.name, subscriber_id = id, "Subscriber removed");
        }
        removed
    }
}

/// Pub/sub fan-out point for events of type `T`.
///
/// Cloning a `Hub` yields another handle to the same subscriber set.
pub struct Hub<T> {
    inner: Arc<HubInner<T>>,
}

impl<T> Clone for Hub<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Hub<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("name", &self.inner.name)
            .field("buffer_size", &self.inner.buffer_size)
            .field("subscribers", &self.inner.subscribers.lock().len())
            .finish()
    }
}

impl<T: Send + Sync + 'static> Hub<T> {
    /// Create a hub whose subscriber queues hold `buffer_size` events.
    #[must_use]
    pub fn new(name: &'static str, buffer_size: usize) -> Self {
        Self {
            inner: Arc::new(HubInner {
                name,
                buffer_size: buffer_size.max(1),
                next_id: AtomicU64::new(1),
                subscribers: Mutex::new(HashMap::new()),
                events_published: AtomicU64::new(0),
                events_dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Create a hub with [`DEFAULT_EVENT_BUFFER_SIZE`].
    #[must_use]
    pub fn with_default_buffer(name: &'static str) -> Self {
        Self::new(name, DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Register a new subscriber queue.
    ///
    /// The caller is responsible for calling [`Hub::unsubscribe`] when done.
    #[must_use]
    pub fn subscribe(&self) -> (EventReceiver<T>, SubscriberId) {
        let (tx, rx) = mpsc::channel(self.inner.buffer_size);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.lock().insert(id, tx);

        debug!(hub = self.inner.name, subscriber_id = id, "Subscriber added");
        (rx, id)
    }

    /// Subscribe with a guard that unsubscribes when dropped.
    #[must_use]
    pub fn subscription(&self) -> Subscription<T> {
        let (receiver, id) = self.subscribe();
        Subscription::new(receiver, id, Arc::downgrade(&self.inner))
    }

    /// Remove and close a subscriber queue. Unknown IDs are ignored.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.inner.unsubscribe(id);
    }

    /// Offer `event` to every current subscriber without blocking.
    ///
    /// Returns the number of subscribers the event was queued for.
    pub fn broadcast(&self, event: T) -> usize {
        self.inner.events_published.fetch_add(1, Ordering::Relaxed);

        let snapshot: Vec<(SubscriberId, mpsc::Sender<Arc<T>>)> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let event = Arc::new(event);
        let mut delivered = 0;
        let mut closed = Vec::new();

        for (id, tx) in snapshot {
            match tx.try_send(Arc::clone(&event)) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    self.inner.events_dropped.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        hub = self.inner.name,
                        subscriber_id = id,
                        buffer_size = self.inner.buffer_size,
                        "Subscriber queue full, dropping event"
                    );
                }
                Err(TrySendError::Closed(_)) => closed.push(id),
            }
        }

        // Receivers dropped without unsubscribing.
        if !closed.is_empty() {
            let mut subscribers = self.inner.subscribers.lock();
            for id in &closed {
                subscribers.remove(id);
            }
            debug!(
                hub = self.inner.name,
                pruned = closed.len(),
                "Pruned closed subscriber queues"
            );
        }

        delivered
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.inner.buffer_size
    }

    /// Total broadcasts, regardless of how many subscribers received them.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.inner.events_published.load(Ordering::Relaxed)
    }

    /// Total per-subscriber deliveries dropped on a full queue.
    #[must_use]
    pub fn events_dropped(&self) -> u64 {
        self.inner.events_dropped.load(Ordering::Relaxed)
    }
}
