//! Casting, actions, resources and class changes of a single entity.

use al_01_session_store::{
    validate_entity_update, BoxedUpdate, Events, Streams, Update, UpdateResult,
};
use chrono::{DateTime, Utc};
use shared_types::protocol::{ActionHeader, ActionResult};
use shared_types::{
    Action, ActionEffect, Block, CastingInfo, ClassJob, EntityEvent, EntityEventKind, EntityId,
    Location, Payload, PayloadKind, StreamId,
};
use tracing::warn;

use crate::domain::convert::{canonical_orientation, location};
use crate::domain::{ReferenceData, RegistryBuilder};

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .ingress(PayloadKind::Casting, casting)
        .ingress(PayloadKind::ActorControl, actor_control)
        .ingress(PayloadKind::Action, action)
        .ingress(PayloadKind::AoeAction, action)
        .ingress(PayloadKind::UpdateHpMpTp, hp_mp_tp)
        .ingress(PayloadKind::EquipChange, equip_change);
}

/// Actor control kind for an interrupted or cancelled cast.
const CAST_CANCELLED: u16 = 0xF;
const CAST_CANCELLED_PARAM: u32 = 538;
/// Actor control kind for a head marker.
const LOCKON_MARKER: u16 = 0x22;

/// Cast variants whose `action_id` names the effective action.
const CAST_USES_ACTION_ID: [u32; 2] = [0x2, 0xD];

/// Class/job IDs of crafters and gatherers, whose MP field is CP or GP.
const NON_MP_CLASSES: std::ops::RangeInclusive<u32> = 8..=18;

fn entity_id(block: &Block) -> EntityId {
    u64::from(block.subject_id)
}

fn casting(stream_id: StreamId, block: &Block, reference: &ReferenceData) -> Option<BoxedUpdate> {
    let Payload::Casting(cast) = &block.payload else {
        return None;
    };
    let name_id = u32::from(cast.action_id_name);
    let action_id = if CAST_USES_ACTION_ID.contains(&(cast.u1 & 0xFF)) {
        cast.action_id
    } else {
        name_id
    };

    let mut info = CastingInfo {
        action_id,
        action_name: reference.action_name(name_id),
        start_time: block.time,
        cast_time_secs: cast.cast_time,
        target_id: u64::from(cast.target_id),
        location: location(
            cast.position,
            canonical_orientation(u32::from(cast.direction), 0x10000),
            block.time,
        ),
        ..Default::default()
    };
    if let Some(data) = reference.action(action_id) {
        info.cast_type = data.cast_type;
        info.effect_range = data.effect_range;
        info.x_axis_modifier = data.x_axis_modifier;
        info.omen = data.omen.clone();
    }

    Some(Box::new(SetCasting {
        stream_id,
        entity_id: entity_id(block),
        casting_info: Some(info),
    }))
}

fn actor_control(stream_id: StreamId, block: &Block, _: &ReferenceData) -> Option<BoxedUpdate> {
    let Payload::ActorControl(control) = &block.payload else {
        return None;
    };
    match control.kind {
        CAST_CANCELLED if control.p1 == CAST_CANCELLED_PARAM => Some(Box::new(SetCasting {
            stream_id,
            entity_id: entity_id(block),
            casting_info: None,
        })),
        LOCKON_MARKER => Some(Box::new(SetLockonMarker {
            stream_id,
            entity_id: entity_id(block),
            lockon_marker: control.p1,
        })),
        _ => None,
    }
}

/// Start (`Some`) or cancel (`None`) a cast.
#[derive(Debug, Clone)]
pub struct SetCasting {
    pub stream_id: StreamId,
    pub entity_id: EntityId,
    pub casting_info: Option<CastingInfo>,
}

impl Update for SetCasting {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        validate_entity_update(streams, self.stream_id, self.entity_id, |_, entity| {
            entity.casting_info = self.casting_info.clone();
            Ok(Events::entity(vec![EntityEvent::new(
                self.stream_id,
                self.entity_id,
                EntityEventKind::UpdateCastingInfo {
                    casting_info: self.casting_info.clone(),
                },
            )]))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetLockonMarker {
    pub stream_id: StreamId,
    pub entity_id: EntityId,
    pub lockon_marker: u32,
}

impl Update for SetLockonMarker {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        validate_entity_update(streams, self.stream_id, self.entity_id, |_, entity| {
            entity.lockon_marker = self.lockon_marker;
            Ok(Events::entity(vec![EntityEvent::new(
                self.stream_id,
                self.entity_id,
                EntityEventKind::UpdateLockonMarker {
                    lockon_marker: self.lockon_marker,
                },
            )]))
        })
    }
}

fn action(stream_id: StreamId, block: &Block, reference: &ReferenceData) -> Option<BoxedUpdate> {
    let (result, is_aoe) = match &block.payload {
        Payload::Action(result) => (result, false),
        Payload::AoeAction(result) => (result, true),
        _ => return None,
    };

    let mut action = action_from_header(&result.header, reference, block.time);
    action.is_aoe = is_aoe;
    action.effects = pair_effects(stream_id, result);
    action.effect_flags = result.effect_flags;

    Some(Box::new(RecordAction {
        stream_id,
        entity_id: entity_id(block),
        action,
    }))
}

fn action_from_header(
    header: &ActionHeader,
    reference: &ReferenceData,
    time: DateTime<Utc>,
) -> Action {
    Action {
        id: header.action_id,
        name: reference.action_name(u32::from(header.action_id_name)),
        target_id: u64::from(header.target_id),
        global_counter: header.global_counter,
        animation_lock_time: f64::from(header.animation_lock_time),
        hidden_animation: header.hidden_animation,
        location: Location {
            orientation: canonical_orientation(u32::from(header.direction), 0xFFFF),
            last_updated: time,
            ..Default::default()
        },
        variation: 3,
        effect_display_type: 4,
        use_time: time,
        ..Default::default()
    }
}

/// Flatten per-target effect blocks. Each block ends at its first empty
/// effect; unmatched targets or blocks are dropped.
fn pair_effects(stream_id: StreamId, result: &ActionResult) -> Vec<ActionEffect> {
    if result.effects.len() != result.target_ids.len() {
        warn!(
            stream_id,
            effects = result.effects.len(),
            targets = result.target_ids.len(),
            "Action effect blocks and targets differ in length"
        );
    }

    result
        .target_ids
        .iter()
        .zip(&result.effects)
        .flat_map(|(target_id, effects)| {
            effects
                .iter()
                .take_while(|e| e.kind != 0)
                .map(move |e| ActionEffect {
                    target_id: *target_id,
                    kind: e.kind,
                    hit_severity: e.hit_severity,
                    param: e.p3,
                    bonus_percent: e.percentage,
                    value_multiplier: e.multiplier,
                    flags: e.flags,
                    value: u32::from(e.damage),
                })
        })
        .collect()
}

/// Store the entity's latest action and end any cast in progress.
#[derive(Debug, Clone)]
pub struct RecordAction {
    pub stream_id: StreamId,
    pub entity_id: EntityId,
    pub action: Action,
}

impl Update for RecordAction {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        validate_entity_update(streams, self.stream_id, self.entity_id, |_, entity| {
            entity.last_action = Some(self.action.clone());
            let mut events = Events::entity(vec![EntityEvent::new(
                self.stream_id,
                self.entity_id,
                EntityEventKind::UpdateLastAction {
                    action: Box::new(self.action.clone()),
                },
            )]);
            if entity.casting_info.take().is_some() {
                events.push_entity(EntityEvent::new(
                    self.stream_id,
                    self.entity_id,
                    EntityEventKind::UpdateCastingInfo { casting_info: None },
                ));
            }
            Ok(events)
        })
    }
}

fn hp_mp_tp(stream_id: StreamId, block: &Block, _: &ReferenceData) -> Option<BoxedUpdate> {
    let Payload::UpdateHpMpTp(data) = &block.payload else {
        return None;
    };
    Some(Box::new(SetHpMp {
        stream_id,
        entity_id: entity_id(block),
        hp: data.hp,
        mp: u32::from(data.mp),
        time: block.time,
    }))
}

/// Periodic HP/MP tick. TP is not carried over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetHpMp {
    pub stream_id: StreamId,
    pub entity_id: EntityId,
    pub hp: u32,
    pub mp: u32,
    pub time: DateTime<Utc>,
}

impl Update for SetHpMp {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        validate_entity_update(streams, self.stream_id, self.entity_id, |_, entity| {
            entity.resources.hp = self.hp;
            if !NON_MP_CLASSES.contains(&entity.class_job.id) {
                entity.resources.mp = self.mp;
            }
            entity.resources.last_tick = self.time;
            Ok(Events::entity(vec![EntityEvent::new(
                self.stream_id,
                self.entity_id,
                EntityEventKind::UpdateResources {
                    resources: entity.resources.clone(),
                },
            )]))
        })
    }
}

fn equip_change(
    stream_id: StreamId,
    block: &Block,
    reference: &ReferenceData,
) -> Option<BoxedUpdate> {
    let Payload::EquipChange(change) = &block.payload else {
        return None;
    };
    Some(Box::new(ChangeClass {
        stream_id,
        entity_id: entity_id(block),
        class_job: reference.class_job(change.class_job),
        level: change.level,
    }))
}

#[derive(Debug, Clone)]
pub struct ChangeClass {
    pub stream_id: StreamId,
    pub entity_id: EntityId,
    pub class_job: ClassJob,
    pub level: u8,
}

impl Update for ChangeClass {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        validate_entity_update(streams, self.stream_id, self.entity_id, |_, entity| {
            entity.class_job = self.class_job.clone();
            entity.level = self.level;
            Ok(Events::entity(vec![EntityEvent::new(
                self.stream_id,
                self.entity_id,
                EntityEventKind::UpdateClass {
                    class_job: self.class_job.clone(),
                    level: self.level,
                },
            )]))
        })
    }
}
