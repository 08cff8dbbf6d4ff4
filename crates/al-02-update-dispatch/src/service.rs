//! # Update Generator
//!
//! Looks up the factory for a block's payload kind in the table for its
//! direction and runs it. Unhandled kinds are expected traffic and yield
//! `None`.

use al_01_session_store::BoxedUpdate;
use shared_types::{Block, Direction, StreamId};
use std::sync::Arc;
use tracing::debug;

use crate::domain::{DispatchError, ReferenceData, Registry};
use crate::handlers::default_registry;

/// Turns decoded blocks into store updates.
///
/// Cheap to clone; every session handler holds its own copy.
#[derive(Debug, Clone)]
pub struct Generator {
    registry: Arc<Registry>,
    reference: Arc<ReferenceData>,
}

impl Generator {
    #[must_use]
    pub fn new(registry: Arc<Registry>, reference: Arc<ReferenceData>) -> Self {
        Self {
            registry,
            reference,
        }
    }

    /// Generator over every built-in handler.
    pub fn with_reference(reference: ReferenceData) -> Result<Self, DispatchError> {
        Ok(Self::new(Arc::new(default_registry()?), Arc::new(reference)))
    }

    /// Build the update for `block`, or `None` when nothing handles it.
    #[must_use]
    pub fn generate(
        &self,
        stream_id: StreamId,
        direction: Direction,
        block: &Block,
    ) -> Option<BoxedUpdate> {
        let kind = block.kind();
        let Some(factory) = self.registry.factory(direction, kind) else {
            debug!(stream_id, %direction, %kind, "No handler for payload kind");
            return None;
        };
        factory(stream_id, block, &self.reference)
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }
}
