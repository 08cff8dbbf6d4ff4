//! Position and targeting of a single entity.

use al_01_session_store::{
    validate_entity_update, BoxedUpdate, Events, Streams, Update, UpdateResult,
};
use shared_types::{
    Block, EntityEvent, EntityEventKind, EntityId, Location, Payload, PayloadKind, StreamId,
};
use std::f64::consts::PI;

use crate::domain::convert::{canonical_orientation, location};
use crate::domain::{ReferenceData, RegistryBuilder};

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .ingress(PayloadKind::Movement, movement)
        .ingress(PayloadKind::SetPos, set_pos)
        .egress(PayloadKind::EgressMovement, egress_movement)
        .ingress(PayloadKind::ActorControlTarget, actor_control_target)
        .egress(PayloadKind::ClientTrigger, client_trigger);
}

/// Actor control kind carrying a new target.
const TARGET_CHANGED: u16 = 0x32;
/// Client trigger kind sent when the player changes target.
const TARGET_SELECTED: u16 = 0x3;

fn movement(stream_id: StreamId, block: &Block, _: &ReferenceData) -> Option<BoxedUpdate> {
    let Payload::Movement(m) = &block.payload else {
        return None;
    };
    let orientation = canonical_orientation(u32::from(m.direction), 0x100);
    Some(SetLocation::boxed(stream_id, block, location(m.position, orientation, block.time)))
}

fn set_pos(stream_id: StreamId, block: &Block, _: &ReferenceData) -> Option<BoxedUpdate> {
    let Payload::SetPos(p) = &block.payload else {
        return None;
    };
    let orientation = canonical_orientation(u32::from(p.direction), 0x100);
    Some(SetLocation::boxed(stream_id, block, location(p.position, orientation, block.time)))
}

fn egress_movement(stream_id: StreamId, block: &Block, _: &ReferenceData) -> Option<BoxedUpdate> {
    let Payload::EgressMovement(m) = &block.payload else {
        return None;
    };
    let orientation = PI + f64::from(m.direction);
    Some(SetLocation::boxed(stream_id, block, location(m.position, orientation, block.time)))
}

#[derive(Debug, Clone)]
pub struct SetLocation {
    pub stream_id: StreamId,
    pub entity_id: EntityId,
    pub location: Location,
}

impl SetLocation {
    fn boxed(stream_id: StreamId, block: &Block, location: Location) -> BoxedUpdate {
        Box::new(Self {
            stream_id,
            entity_id: u64::from(block.subject_id),
            location,
        })
    }
}

impl Update for SetLocation {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        validate_entity_update(streams, self.stream_id, self.entity_id, |_, entity| {
            entity.location = self.location.clone();
            Ok(Events::entity(vec![EntityEvent::new(
                self.stream_id,
                self.entity_id,
                EntityEventKind::UpdateLocation {
                    location: self.location.clone(),
                },
            )]))
        })
    }
}

fn actor_control_target(
    stream_id: StreamId,
    block: &Block,
    _: &ReferenceData,
) -> Option<BoxedUpdate> {
    let Payload::ActorControlTarget(control) = &block.payload else {
        return None;
    };
    (control.kind == TARGET_CHANGED).then(|| {
        SetTarget::boxed(stream_id, block, u64::from(control.target_id))
    })
}

fn client_trigger(stream_id: StreamId, block: &Block, _: &ReferenceData) -> Option<BoxedUpdate> {
    let Payload::ClientTrigger(trigger) = &block.payload else {
        return None;
    };
    (trigger.kind == TARGET_SELECTED).then(|| SetTarget::boxed(stream_id, block, u64::from(trigger.p1)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetTarget {
    pub stream_id: StreamId,
    pub entity_id: EntityId,
    pub target_id: EntityId,
}

impl SetTarget {
    fn boxed(stream_id: StreamId, block: &Block, target_id: EntityId) -> BoxedUpdate {
        Box::new(Self {
            stream_id,
            entity_id: u64::from(block.subject_id),
            target_id,
        })
    }
}

impl Update for SetTarget {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        validate_entity_update(streams, self.stream_id, self.entity_id, |_, entity| {
            entity.target_id = self.target_id;
            Ok(Events::entity(vec![EntityEvent::new(
                self.stream_id,
                self.entity_id,
                EntityEventKind::UpdateTarget {
                    target_id: self.target_id,
                },
            )]))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use al_01_session_store::StoreError;
    use shared_types::protocol::{
        ActorControlTarget, ClientTrigger, EgressMovement, Movement, Position, SetPos,
    };
    use shared_types::{Entity, Stream};

    const STREAM: StreamId = 1234;
    const SUBJECT: u32 = 0x1234_5678;

    fn streams() -> Streams {
        let mut stream = Stream::new(STREAM);
        stream.character_id = u64::from(SUBJECT);
        stream.entities.insert(Entity {
            id: u64::from(SUBJECT),
            ..Default::default()
        });
        stream.entities.tombstone(0x2345_6789);
        let mut streams = Streams::new();
        streams.insert(stream);
        streams
    }

    fn apply(block: &Block, factory: crate::domain::UpdateFactory) -> (Streams, UpdateResult) {
        let mut streams = streams();
        let update = factory(STREAM, block, &ReferenceData::new()).unwrap();
        let result = update.modify_store(&mut streams);
        (streams, result)
    }

    fn location_of(streams: &Streams) -> Location {
        streams
            .get(STREAM)
            .unwrap()
            .entities
            .get(u64::from(SUBJECT))
            .unwrap()
            .location
            .clone()
    }

    const AT: Position = Position {
        x: 1.0,
        y: 2.0,
        z: 3.0,
    };

    #[test]
    fn test_movement_orientation() {
        let block = Block::new(SUBJECT, Payload::Movement(Movement { direction: 0x80, position: AT }));
        let (streams, result) = apply(&block, movement);
        assert_eq!(result.unwrap().entity.len(), 1);
        let location = location_of(&streams);
        assert!((location.orientation - PI).abs() < 1e-9);
        assert_eq!((location.x, location.y, location.z), (1.0, 2.0, 3.0));
        assert_eq!(location.last_updated, block.time);
    }

    #[test]
    fn test_set_pos_orientation() {
        let block = Block::new(SUBJECT, Payload::SetPos(SetPos { direction: 0x40, position: AT }));
        let (streams, _) = apply(&block, set_pos);
        assert!((location_of(&streams).orientation - PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_egress_movement_orientation() {
        let block = Block::new(
            SUBJECT,
            Payload::EgressMovement(EgressMovement { direction: 0.5, position: AT }),
        );
        let (streams, _) = apply(&block, egress_movement);
        assert!((location_of(&streams).orientation - (PI + 0.5)).abs() < 1e-6);
    }

    #[test]
    fn test_location_update_validation() {
        let mut block = Block::new(0x2345_6789, Payload::Movement(Movement::default()));
        let (_, result) = apply(&block, movement);
        assert!(result.unwrap().is_empty());

        block.subject_id = 0x9ABC_DEF0;
        let (_, result) = apply(&block, movement);
        assert_eq!(
            result.unwrap_err().error,
            StoreError::EntityNotFound {
                stream_id: STREAM,
                entity_id: 0x9ABC_DEF0
            }
        );
    }

    #[test]
    fn test_target_from_actor_control() {
        let block = Block::new(
            SUBJECT,
            Payload::ActorControlTarget(ActorControlTarget {
                kind: TARGET_CHANGED,
                target_id: 0xABCD,
                ..Default::default()
            }),
        );
        let (streams, result) = apply(&block, actor_control_target);
        assert_eq!(
            result.unwrap().entity[0].kind,
            EntityEventKind::UpdateTarget { target_id: 0xABCD }
        );
        let entity = streams.get(STREAM).unwrap().entities.get(u64::from(SUBJECT)).unwrap();
        assert_eq!(entity.target_id, 0xABCD);

        let other = Block::new(
            SUBJECT,
            Payload::ActorControlTarget(ActorControlTarget::default()),
        );
        assert!(actor_control_target(STREAM, &other, &ReferenceData::new()).is_none());
    }

    #[test]
    fn test_target_from_client_trigger() {
        let block = Block::new(
            SUBJECT,
            Payload::ClientTrigger(ClientTrigger {
                kind: TARGET_SELECTED,
                p1: 42,
                ..Default::default()
            }),
        );
        let (streams, _) = apply(&block, client_trigger);
        let entity = streams.get(STREAM).unwrap().entities.get(u64::from(SUBJECT)).unwrap();
        assert_eq!(entity.target_id, 42);
    }
}
