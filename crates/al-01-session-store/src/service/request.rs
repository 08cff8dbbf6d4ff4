//! Read queries as they travel to the control loop.

use shared_types::{Entity, EntityId, EntitySlot, Stream, StreamId};
use tokio::sync::oneshot;
use tracing::debug;

use crate::domain::{StoreError, Streams};

pub(crate) enum Request {
    Streams {
        respond_to: oneshot::Sender<Vec<Stream>>,
    },
    Stream {
        stream_id: StreamId,
        respond_to: oneshot::Sender<Result<Stream, StoreError>>,
    },
    Entity {
        stream_id: StreamId,
        entity_id: EntityId,
        respond_to: oneshot::Sender<Result<Entity, StoreError>>,
    },
}

impl Request {
    /// Answer from the current store state. Every answer is a deep copy.
    pub(crate) fn answer(self, streams: &Streams) {
        let delivered = match self {
            Request::Streams { respond_to } => {
                respond_to.send(streams.ordered().cloned().collect()).is_ok()
            }
            Request::Stream {
                stream_id,
                respond_to,
            } => respond_to.send(lookup_stream(streams, stream_id)).is_ok(),
            Request::Entity {
                stream_id,
                entity_id,
                respond_to,
            } => respond_to
                .send(lookup_entity(streams, stream_id, entity_id))
                .is_ok(),
        };
        if !delivered {
            debug!(target: "store_provider", "Query caller gave up before the answer was ready");
        }
    }
}

fn lookup_stream(streams: &Streams, stream_id: StreamId) -> Result<Stream, StoreError> {
    streams
        .get(stream_id)
        .cloned()
        .ok_or(StoreError::StreamNotFound { stream_id })
}

fn lookup_entity(
    streams: &Streams,
    stream_id: StreamId,
    entity_id: EntityId,
) -> Result<Entity, StoreError> {
    let stream = streams
        .get(stream_id)
        .ok_or(StoreError::StreamNotFound { stream_id })?;
    match stream.entities.slot(entity_id) {
        EntitySlot::Live(entity) => Ok(entity.clone()),
        EntitySlot::Missing | EntitySlot::Tombstoned => Err(StoreError::EntityNotFound {
            stream_id,
            entity_id,
        }),
    }
}
