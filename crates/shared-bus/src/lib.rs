//! # Shared Bus - Event Hubs
//!
//! Publish/subscribe fan-out for the two change-event categories the state
//! engine emits.
//!
//! ```text
//!                      ┌──────────────┐   try_send   ┌──────────────┐
//!   store provider ──→ │  Stream Hub  │ ───────────→ │ subscriber 1 │
//!     broadcast()      │              │ ───────────→ │ subscriber 2 │
//!                      └──────────────┘   (drop on   └──────────────┘
//!                      ┌──────────────┐    full)
//!                  ──→ │  Entity Hub  │ ───────────→ ...
//!                      └──────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - Subscriber IDs increase monotonically, also under concurrent subscribes.
//! - `unsubscribe` is idempotent and closes the subscriber's queue.
//! - `broadcast` never blocks: a full subscriber queue loses that event only.
//! - The subscriber registry is snapshotted before sending, so subscribe and
//!   unsubscribe never wait on an in-progress broadcast.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod hub;
pub mod subscriber;

use shared_types::{EntityEvent, StreamEvent};

// Re-export main types
pub use hub::{EventReceiver, Hub, SubscriberId};
pub use subscriber::{EventSource, Subscription, SubscriptionError};

/// Events buffered per subscriber before drops begin.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 10_000;

/// Hub for stream-scoped events.
pub type StreamHub = Hub<StreamEvent>;

/// Hub for entity-scoped events.
pub type EntityHub = Hub<EntityEvent>;

/// Log name of the stream hub.
pub const STREAM_HUB: &str = "stream";

/// Log name of the entity hub.
pub const ENTITY_HUB: &str = "entity";

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::StreamEventKind;

    #[test]
    fn test_default_buffer_size() {
        assert_eq!(DEFAULT_EVENT_BUFFER_SIZE, 10_000);
        let hub = StreamHub::with_default_buffer(STREAM_HUB);
        assert_eq!(hub.buffer_size(), DEFAULT_EVENT_BUFFER_SIZE);
    }

    #[tokio::test]
    async fn test_stream_hub_shares_one_event() {
        let hub = StreamHub::new(STREAM_HUB, 4);
        let (mut a, _) = hub.subscribe();
        let (mut b, _) = hub.subscribe();

        hub.broadcast(StreamEvent::new(1, StreamEventKind::RemoveStream { id: 1 }));

        let from_a = a.recv().await.expect("event");
        let from_b = b.recv().await.expect("event");
        assert!(std::sync::Arc::ptr_eq(&from_a, &from_b));
    }
}
