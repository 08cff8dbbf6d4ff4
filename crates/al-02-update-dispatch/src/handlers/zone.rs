//! Stream-scoped state: zone changes, player stats and enmity.

use al_01_session_store::{BoxedUpdate, Events, StoreError, Streams, Update, UpdateResult};
use shared_types::{
    Block, EntityEvent, EntityEventKind, EntityId, HateEntry, HateRanking, Payload, PayloadKind,
    Place, Stats, Stream, StreamEvent, StreamEventKind, StreamId,
};

use crate::domain::{ReferenceData, RegistryBuilder};

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .ingress(PayloadKind::InitZone, init_zone)
        .ingress(PayloadKind::PlayerStats, player_stats)
        .ingress(PayloadKind::HateList, hate_list)
        .ingress(PayloadKind::HateRanking, hate_ranking);
}

fn stream_mut(streams: &mut Streams, stream_id: StreamId) -> Result<&mut Stream, StoreError> {
    streams
        .get_mut(stream_id)
        .ok_or(StoreError::StreamNotFound { stream_id })
}

fn init_zone(stream_id: StreamId, block: &Block, reference: &ReferenceData) -> Option<BoxedUpdate> {
    let Payload::InitZone(zone) = &block.payload else {
        return None;
    };
    let territory_id = u32::from(zone.territory_type_id);
    let maps = reference.maps(territory_id);
    let place = Place {
        map_id: maps.first().map_or(0, |m| m.key),
        territory_id,
        maps,
    };
    Some(Box::new(ChangeZone {
        stream_id,
        server_id: block.server_id,
        character_id: u64::from(block.current_id),
        instance_num: (zone.instance_flags & 0xFF) as u8,
        place,
    }))
}

/// The session entered a zone: new IDs, new place, empty entity set.
#[derive(Debug, Clone)]
pub struct ChangeZone {
    pub stream_id: StreamId,
    pub server_id: u16,
    pub character_id: EntityId,
    pub instance_num: u8,
    pub place: Place,
}

impl Update for ChangeZone {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        let stream = stream_mut(streams, self.stream_id)?;

        stream.server_id = self.server_id;
        stream.character_id = self.character_id;
        stream.instance_num = self.instance_num;
        stream.place = self.place.clone();
        stream.entities.clear();

        Ok(Events {
            stream: vec![
                StreamEvent::new(
                    self.stream_id,
                    StreamEventKind::UpdateIds {
                        server_id: self.server_id,
                        character_id: self.character_id,
                        instance_num: self.instance_num,
                    },
                ),
                StreamEvent::new(
                    self.stream_id,
                    StreamEventKind::UpdateMap {
                        place: self.place.clone(),
                    },
                ),
            ],
            entity: vec![EntityEvent::new(
                self.stream_id,
                0,
                EntityEventKind::SetEntities {
                    entities: Vec::new(),
                },
            )],
        })
    }
}

fn player_stats(stream_id: StreamId, block: &Block, _: &ReferenceData) -> Option<BoxedUpdate> {
    let Payload::PlayerStats(stats) = &block.payload else {
        return None;
    };
    Some(Box::new(SetStats {
        stream_id,
        stats: stats.clone(),
    }))
}

#[derive(Debug, Clone)]
pub struct SetStats {
    pub stream_id: StreamId,
    pub stats: Stats,
}

impl Update for SetStats {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        let stream = stream_mut(streams, self.stream_id)?;
        stream.stats = Some(self.stats.clone());
        Ok(Events::stream(vec![StreamEvent::new(
            self.stream_id,
            StreamEventKind::UpdateStats {
                stats: self.stats.clone(),
            },
        )]))
    }
}

fn hate_list(stream_id: StreamId, block: &Block, _: &ReferenceData) -> Option<BoxedUpdate> {
    let Payload::HateList(list) = &block.payload else {
        return None;
    };
    let entries = list
        .entries
        .iter()
        .map(|e| HateEntry {
            enemy_id: u64::from(e.enemy_id),
            hate_percent: e.hate_percent,
        })
        .collect();
    Some(Box::new(SetEnmity {
        stream_id,
        change: EnmityChange::NearbyEnemies(entries),
    }))
}

fn hate_ranking(stream_id: StreamId, block: &Block, _: &ReferenceData) -> Option<BoxedUpdate> {
    let Payload::HateRanking(ranking) = &block.payload else {
        return None;
    };
    let mut entries: Vec<HateRanking> = ranking
        .entries
        .iter()
        .map(|e| HateRanking {
            actor_id: u64::from(e.actor_id),
            hate: e.hate,
        })
        .collect();
    entries.sort_by(|a, b| b.hate.cmp(&a.hate));
    Some(Box::new(SetEnmity {
        stream_id,
        change: EnmityChange::TargetRanking(entries),
    }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnmityChange {
    NearbyEnemies(Vec<HateEntry>),
    /// Highest hate first.
    TargetRanking(Vec<HateRanking>),
}

/// Replace one half of the enmity picture.
#[derive(Debug, Clone)]
pub struct SetEnmity {
    pub stream_id: StreamId,
    pub change: EnmityChange,
}

impl Update for SetEnmity {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        let stream = stream_mut(streams, self.stream_id)?;
        match &self.change {
            EnmityChange::NearbyEnemies(entries) => {
                stream.enmity.nearby_enemy_hate = entries.clone();
            }
            EnmityChange::TargetRanking(entries) => {
                stream.enmity.target_hate_ranking = entries.clone();
            }
        }
        Ok(Events::stream(vec![StreamEvent::new(
            self.stream_id,
            StreamEventKind::UpdateEnmity {
                enmity: stream.enmity.clone(),
            },
        )]))
    }
}
