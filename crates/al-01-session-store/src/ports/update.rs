//! # Mutation Contract
//!
//! Every state change is an [`Update`]: built once per decoded protocol
//! message, applied once by the store provider, then dropped.

use shared_types::{EntityEvent, StreamEvent};
use std::fmt::Debug;

use crate::domain::{StoreError, Streams};

/// Ordered change events produced by one update.
///
/// Stream events are broadcast before entity events; each list keeps its
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Events {
    pub stream: Vec<StreamEvent>,
    pub entity: Vec<EntityEvent>,
}

impl Events {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stream(events: Vec<StreamEvent>) -> Self {
        Self {
            stream: events,
            entity: Vec::new(),
        }
    }

    #[must_use]
    pub fn entity(events: Vec<EntityEvent>) -> Self {
        Self {
            stream: Vec::new(),
            entity: events,
        }
    }

    pub fn push_stream(&mut self, event: StreamEvent) {
        self.stream.push(event);
    }

    pub fn push_entity(&mut self, event: EntityEvent) {
        self.entity.push(event);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stream.is_empty() && self.entity.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stream.len() + self.entity.len()
    }
}

/// A failed update together with whatever it had already changed.
///
/// The events are still broadcast; errors never roll back or suppress
/// observable side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateFailure {
    pub events: Events,
    pub error: StoreError,
}

impl UpdateFailure {
    #[must_use]
    pub fn partial(events: Events, error: StoreError) -> Self {
        Self { events, error }
    }
}

impl From<StoreError> for UpdateFailure {
    fn from(error: StoreError) -> Self {
        Self {
            events: Events::none(),
            error,
        }
    }
}

pub type UpdateResult = Result<Events, UpdateFailure>;

/// A single state change.
///
/// `modify_store` runs inside the control loop and must not block or do I/O.
pub trait Update: Debug + Send {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult;
}

pub type BoxedUpdate = Box<dyn Update>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::StreamEventKind;

    #[test]
    fn test_failure_from_error_has_no_events() {
        let failure = UpdateFailure::from(StoreError::StreamNotFound { stream_id: 1 });
        assert!(failure.events.is_empty());
    }

    #[test]
    fn test_events_len() {
        let mut events = Events::none();
        events.push_stream(StreamEvent::new(1, StreamEventKind::RemoveStream { id: 1 }));
        assert_eq!(events.len(), 1);
        assert!(!events.is_empty());
    }
}
