use shared_types::{EntityId, StreamId};
use std::time::Duration;
use thiserror::Error;

use crate::service::ProviderState;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Stream not found: {stream_id}")]
    StreamNotFound { stream_id: StreamId },

    #[error("Entity not found: {entity_id} in stream {stream_id}")]
    EntityNotFound {
        stream_id: StreamId,
        entity_id: EntityId,
    },

    #[error("Request timed out after {timeout:?}")]
    RequestTimedOut { timeout: Duration },

    #[error("Store provider is not running")]
    ProviderNotRunning,

    #[error("Store provider cannot {action} while {state}")]
    InvalidState {
        state: ProviderState,
        action: &'static str,
    },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

impl StoreError {
    /// Whether the error reports a missing stream or entity.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::StreamNotFound { .. } | StoreError::EntityNotFound { .. }
        )
    }
}
