//! Updates issued by the session handler when a session starts or ends.

use shared_types::{Stream, StreamEvent, StreamEventKind, StreamId};

use super::{StoreError, Streams};
use crate::ports::{Events, Update, UpdateResult};

/// Register a new, empty stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddStream {
    pub id: StreamId,
}

impl Update for AddStream {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        let stream = Stream::new(self.id);
        let event = StreamEvent::new(
            self.id,
            StreamEventKind::AddStream {
                stream: Box::new(stream.clone()),
            },
        );
        streams.insert(stream);
        Ok(Events::stream(vec![event]))
    }
}

/// Drop a stream and everything known about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveStream {
    pub id: StreamId,
}

impl Update for RemoveStream {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        if streams.remove(self.id).is_none() {
            return Err(StoreError::StreamNotFound { stream_id: self.id }.into());
        }
        Ok(Events::stream(vec![StreamEvent::new(
            self.id,
            StreamEventKind::RemoveStream { id: self.id },
        )]))
    }
}
