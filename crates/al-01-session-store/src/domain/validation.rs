//! Shared gate for updates that target one entity in one stream.

use shared_types::{Entity, EntityId, EntitySlot, Stream, StreamId};
use tracing::trace;

use super::{StoreError, Streams};
use crate::ports::{Events, UpdateResult};

/// Decide whether an entity-targeted update is meaningful right now and run
/// it if so.
///
/// 1. Unknown stream: `StreamNotFound`, no events.
/// 2. Unknown entity: `EntityNotFound`, no events.
/// 3. Tombstoned entity: no error, no events.
/// 4. Character not yet identified (`character_id == 0`): no error, no events.
/// 5. Otherwise `modify` runs and its result is returned unchanged.
///
/// While `modify` runs the target entity is detached from the stream's map;
/// it must not add or remove entities under the same ID.
pub fn validate_entity_update<F>(
    streams: &mut Streams,
    stream_id: StreamId,
    entity_id: EntityId,
    modify: F,
) -> UpdateResult
where
    F: FnOnce(&mut Stream, &mut Entity) -> UpdateResult,
{
    let Some(stream) = streams.get_mut(stream_id) else {
        return Err(StoreError::StreamNotFound { stream_id }.into());
    };

    match stream.entities.slot(entity_id) {
        EntitySlot::Missing => {
            return Err(StoreError::EntityNotFound {
                stream_id,
                entity_id,
            }
            .into())
        }
        EntitySlot::Tombstoned => {
            trace!(stream_id, entity_id, "Update for removed entity ignored");
            return Ok(Events::none());
        }
        EntitySlot::Live(_) => {}
    }

    if stream.character_id == 0 {
        trace!(stream_id, entity_id, "Update before identification ignored");
        return Ok(Events::none());
    }

    let Some(mut entity) = stream.entities.tombstone(entity_id) else {
        return Ok(Events::none());
    };
    let result = modify(stream, &mut entity);
    stream.entities.insert(entity);
    result
}
