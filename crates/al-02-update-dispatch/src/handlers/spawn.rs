//! Entities appearing and disappearing.

use al_01_session_store::{BoxedUpdate, Events, StoreError, Streams, Update, UpdateResult};
use shared_types::protocol::Spawn;
use shared_types::{
    Block, ClassJob, Entity, EntityEvent, EntityEventKind, EntityId, NpcInfo, Payload, PayloadKind,
    Resources, StreamId,
};
use tracing::warn;

use crate::domain::convert::{canonical_orientation, location, sanitize_name, status_slots};
use crate::domain::{ReferenceData, RegistryBuilder};

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .ingress(PayloadKind::PlayerSpawn, player_spawn)
        .ingress(PayloadKind::NpcSpawn, npc_spawn)
        .ingress(PayloadKind::NpcSpawn2, npc_spawn)
        .ingress(PayloadKind::DespawnEntity, despawn)
        .ingress(PayloadKind::ActorControlSelf, actor_control_remove)
        .ingress(PayloadKind::ActorControlNotice, actor_control_remove);
}

/// Actor control kind announcing that an actor left.
const ACTOR_REMOVED: u16 = 0x101;

fn player_spawn(
    stream_id: StreamId,
    block: &Block,
    reference: &ReferenceData,
) -> Option<BoxedUpdate> {
    let Payload::PlayerSpawn(spawn) = &block.payload else {
        return None;
    };
    Some(Box::new(SpawnEntity::from_spawn(stream_id, block, spawn, reference, false)))
}

fn npc_spawn(stream_id: StreamId, block: &Block, reference: &ReferenceData) -> Option<BoxedUpdate> {
    let (Payload::NpcSpawn(spawn) | Payload::NpcSpawn2(spawn)) = &block.payload else {
        return None;
    };
    Some(Box::new(SpawnEntity::from_spawn(stream_id, block, spawn, reference, true)))
}

fn despawn(stream_id: StreamId, block: &Block, _: &ReferenceData) -> Option<BoxedUpdate> {
    let Payload::DespawnEntity(despawn) = &block.payload else {
        return None;
    };
    Some(Box::new(RemoveEntity {
        stream_id,
        entity_id: u64::from(despawn.id),
    }))
}

fn actor_control_remove(
    stream_id: StreamId,
    block: &Block,
    _: &ReferenceData,
) -> Option<BoxedUpdate> {
    let (Payload::ActorControlSelf(control) | Payload::ActorControlNotice(control)) = &block.payload
    else {
        return None;
    };
    (control.kind == ACTOR_REMOVED).then(|| {
        Box::new(RemoveEntity {
            stream_id,
            entity_id: u64::from(control.p3),
        }) as BoxedUpdate
    })
}

/// Install a freshly spawned entity, evicting whoever held its index.
#[derive(Debug, Clone)]
pub struct SpawnEntity {
    pub stream_id: StreamId,
    pub entity: Entity,
}

impl SpawnEntity {
    pub(crate) fn from_spawn(
        stream_id: StreamId,
        block: &Block,
        spawn: &Spawn,
        reference: &ReferenceData,
        is_npc: bool,
    ) -> Self {
        let time = block.time;
        let raw_spawn_json = serde_json::to_string(spawn).unwrap_or_else(|e| {
            warn!(stream_id, error = %e, "Spawn payload could not be captured");
            String::new()
        });

        let mut entity = Entity {
            id: u64::from(block.subject_id),
            index: spawn.index,
            name: sanitize_name(&spawn.name),
            target_id: spawn.target_id,
            owner_id: u64::from(spawn.owner_id),
            level: spawn.level,
            class_job: ClassJob {
                id: u32::from(spawn.class_job),
                ..Default::default()
            },
            is_npc,
            is_enemy: spawn.enemy_type != 0,
            is_pet: spawn.enemy_type == 0 && spawn.subtype == 2,
            resources: Resources {
                hp: spawn.current_hp,
                mp: u32::from(spawn.current_mp),
                tp: 0,
                max_hp: spawn.max_hp,
                max_mp: u32::from(spawn.max_mp),
                last_tick: time,
            },
            location: location(
                spawn.position,
                canonical_orientation(u32::from(spawn.direction), 0x10000),
                time,
            ),
            statuses: status_slots(reference, &spawn.statuses, time),
            raw_spawn_json,
            ..Default::default()
        };

        if is_npc {
            let mut info = NpcInfo {
                name_id: spawn.bnpc_name,
                base_id: spawn.bnpc_base,
                model_id: u32::from(spawn.model_chara),
                ..Default::default()
            };
            if let Some(bnpc) =
                reference
                    .bnpc
                    .info(spawn.bnpc_name, spawn.bnpc_base, u32::from(spawn.model_chara))
            {
                info.name = Some(bnpc.name);
                info.size = Some(f64::from(bnpc.size));
                info.error = bnpc.error;
            }
            entity.npc_info = Some(info);
        } else if spawn.class_job > 0 {
            entity.class_job = reference.class_job(spawn.class_job);
        }

        Self { stream_id, entity }
    }
}

impl Update for SpawnEntity {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        let stream = streams
            .get_mut(self.stream_id)
            .ok_or(StoreError::StreamNotFound {
                stream_id: self.stream_id,
            })?;

        let mut events = Events::none();
        if let Some(previous) = stream.entities.live_id_at_index(self.entity.index) {
            stream.entities.tombstone(previous);
            events.push_entity(EntityEvent::new(
                self.stream_id,
                previous,
                EntityEventKind::RemoveEntity { id: previous },
            ));
        }

        events.push_entity(EntityEvent::new(
            self.stream_id,
            self.entity.id,
            EntityEventKind::AddEntity {
                entity: Box::new(self.entity.clone()),
            },
        ));
        stream.entities.insert(self.entity.clone());
        Ok(events)
    }
}

/// Tombstone an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveEntity {
    pub stream_id: StreamId,
    pub entity_id: EntityId,
}

impl Update for RemoveEntity {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        let stream = streams
            .get_mut(self.stream_id)
            .ok_or(StoreError::StreamNotFound {
                stream_id: self.stream_id,
            })?;
        stream.entities.tombstone(self.entity_id);
        Ok(Events::entity(vec![EntityEvent::new(
            self.stream_id,
            self.entity_id,
            EntityEventKind::RemoveEntity { id: self.entity_id },
        )]))
    }
}
