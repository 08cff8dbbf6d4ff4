use async_trait::async_trait;
use shared_types::{Entity, EntityId, Stream, StreamId};

use crate::domain::StoreError;

/// Read queries against the session store.
///
/// Every value returned is an independent deep copy.
#[async_trait]
pub trait StoreQueries: Send + Sync {
    /// All streams, in the order they were added.
    async fn streams(&self) -> Result<Vec<Stream>, StoreError>;

    async fn stream(&self, stream_id: StreamId) -> Result<Stream, StoreError>;

    /// A live entity. Tombstoned entities report `EntityNotFound`.
    async fn entity(&self, stream_id: StreamId, entity_id: EntityId)
        -> Result<Entity, StoreError>;
}
