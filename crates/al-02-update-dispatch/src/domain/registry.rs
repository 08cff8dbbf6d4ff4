//! # Handler Registry
//!
//! Two independent tables, one per traffic direction, each keyed by
//! [`PayloadKind`]. The registry is assembled once through
//! [`RegistryBuilder`] and is immutable afterwards.

use al_01_session_store::BoxedUpdate;
use shared_types::{Block, Direction, PayloadKind, StreamId};
use std::collections::HashMap;

use super::errors::DispatchError;
use super::reference::ReferenceData;

/// Builds the update for one block, or `None` when the block carries
/// nothing the store tracks.
pub type UpdateFactory = fn(StreamId, &Block, &ReferenceData) -> Option<BoxedUpdate>;

#[derive(Default)]
pub struct Registry {
    ingress: HashMap<PayloadKind, UpdateFactory>,
    egress: HashMap<PayloadKind, UpdateFactory>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("ingress", &self.ingress.keys().collect::<Vec<_>>())
            .field("egress", &self.egress.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    #[must_use]
    pub fn factory(&self, direction: Direction, kind: PayloadKind) -> Option<UpdateFactory> {
        self.table(direction).get(&kind).copied()
    }

    #[must_use]
    pub fn handles(&self, direction: Direction, kind: PayloadKind) -> bool {
        self.table(direction).contains_key(&kind)
    }

    /// Number of handlers registered for `direction`.
    #[must_use]
    pub fn len(&self, direction: Direction) -> usize {
        self.table(direction).len()
    }

    fn table(&self, direction: Direction) -> &HashMap<PayloadKind, UpdateFactory> {
        match direction {
            Direction::Ingress => &self.ingress,
            Direction::Egress => &self.egress,
        }
    }
}

/// Collects registrations; duplicates are reported by [`RegistryBuilder::build`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
    duplicates: Vec<DispatchError>,
}

impl RegistryBuilder {
    pub fn ingress(&mut self, kind: PayloadKind, factory: UpdateFactory) -> &mut Self {
        self.register(Direction::Ingress, kind, factory)
    }

    pub fn egress(&mut self, kind: PayloadKind, factory: UpdateFactory) -> &mut Self {
        self.register(Direction::Egress, kind, factory)
    }

    pub fn register(
        &mut self,
        direction: Direction,
        kind: PayloadKind,
        factory: UpdateFactory,
    ) -> &mut Self {
        let table = match direction {
            Direction::Ingress => &mut self.registry.ingress,
            Direction::Egress => &mut self.registry.egress,
        };
        if table.insert(kind, factory).is_some() {
            self.duplicates
                .push(DispatchError::DuplicateRegistration { direction, kind });
        }
        self
    }

    /// Finish the registry, failing on the first duplicate registration.
    pub fn build(self) -> Result<Registry, DispatchError> {
        match self.duplicates.into_iter().next() {
            Some(duplicate) => Err(duplicate),
            None => Ok(self.registry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nothing(_: StreamId, _: &Block, _: &ReferenceData) -> Option<BoxedUpdate> {
        None
    }

    #[test]
    fn test_directions_are_independent() {
        let mut builder = Registry::builder();
        builder
            .ingress(PayloadKind::Movement, nothing)
            .egress(PayloadKind::Movement, nothing);
        let registry = builder.build().unwrap();

        assert!(registry.handles(Direction::Ingress, PayloadKind::Movement));
        assert!(registry.handles(Direction::Egress, PayloadKind::Movement));
        assert!(!registry.handles(Direction::Egress, PayloadKind::SetPos));
        assert_eq!(registry.len(Direction::Ingress), 1);
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut builder = Registry::builder();
        builder
            .ingress(PayloadKind::Casting, nothing)
            .ingress(PayloadKind::Casting, nothing);
        assert_eq!(
            builder.build().unwrap_err(),
            DispatchError::DuplicateRegistration {
                direction: Direction::Ingress,
                kind: PayloadKind::Casting,
            }
        );
    }
}
