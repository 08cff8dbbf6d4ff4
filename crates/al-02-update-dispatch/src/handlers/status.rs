//! Status effects and the resources that arrive with them.

use al_01_session_store::{
    validate_entity_update, BoxedUpdate, Events, StoreError, Streams, Update, UpdateFailure,
    UpdateResult,
};
use chrono::{DateTime, Utc};
use shared_types::protocol::StatusList;
use shared_types::{
    Block, EntityEvent, EntityEventKind, EntityId, Payload, PayloadKind, Resources, Status,
    StreamId, MAX_STATUS_SLOTS,
};

use crate::domain::convert::{status, status_slots};
use crate::domain::{ReferenceData, RegistryBuilder};

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .ingress(PayloadKind::EffectResult, effect_result)
        .ingress(PayloadKind::UpdateStatuses, update_statuses)
        .ingress(PayloadKind::UpdateStatusesExtended, update_statuses);
}

fn resources(
    hp: u32,
    max_hp: u32,
    mp: u16,
    max_mp: u16,
    tp: u16,
    time: DateTime<Utc>,
) -> Resources {
    Resources {
        hp,
        mp: u32::from(mp),
        tp: u32::from(tp),
        max_hp,
        max_mp: u32::from(max_mp),
        last_tick: time,
    }
}

fn effect_result(
    stream_id: StreamId,
    block: &Block,
    reference: &ReferenceData,
) -> Option<BoxedUpdate> {
    let Payload::EffectResult(result) = &block.payload else {
        return None;
    };
    let statuses = result
        .entries
        .iter()
        .map(|e| {
            (
                usize::from(e.index),
                status(reference, e.effect_id, e.param, e.duration, e.actor_id, block.time),
            )
        })
        .collect();

    Some(Box::new(ApplyEffects {
        stream_id,
        entity_id: u64::from(block.subject_id),
        resources: resources(
            result.current_hp,
            result.max_hp,
            result.current_mp,
            result.max_mp,
            result.current_tp,
            block.time,
        ),
        statuses,
    }))
}

/// Resources plus individually addressed status slots.
#[derive(Debug, Clone)]
pub struct ApplyEffects {
    pub stream_id: StreamId,
    pub entity_id: EntityId,
    pub resources: Resources,
    /// `(slot, status)` in wire order.
    pub statuses: Vec<(usize, Status)>,
}

impl Update for ApplyEffects {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        validate_entity_update(streams, self.stream_id, self.entity_id, |_, entity| {
            entity.resources = self.resources.clone();
            let mut events = Events::entity(vec![EntityEvent::new(
                self.stream_id,
                self.entity_id,
                EntityEventKind::UpdateResources {
                    resources: self.resources.clone(),
                },
            )]);

            for (index, status) in &self.statuses {
                if *index >= MAX_STATUS_SLOTS {
                    return Err(UpdateFailure::partial(
                        events,
                        StoreError::InvariantViolation(format!(
                            "status slot {index} out of range for entity {}",
                            self.entity_id
                        )),
                    ));
                }
                entity.ensure_status_slots(index + 1);
                entity.statuses[*index] = Some(status.clone());
                events.push_entity(EntityEvent::new(
                    self.stream_id,
                    self.entity_id,
                    EntityEventKind::UpsertStatus {
                        index: *index,
                        status: status.clone(),
                    },
                ));
            }
            Ok(events)
        })
    }
}

fn update_statuses(
    stream_id: StreamId,
    block: &Block,
    reference: &ReferenceData,
) -> Option<BoxedUpdate> {
    let list: &StatusList = match &block.payload {
        Payload::UpdateStatuses(list) | Payload::UpdateStatusesExtended(list) => list,
        _ => return None,
    };
    Some(Box::new(ReplaceStatuses {
        stream_id,
        entity_id: u64::from(block.subject_id),
        resources: resources(
            list.current_hp,
            list.max_hp,
            list.current_mp,
            list.max_mp,
            list.current_tp,
            block.time,
        ),
        statuses: status_slots(reference, &list.statuses, block.time),
    }))
}

/// The full status list of an entity; slots missing here are cleared.
#[derive(Debug, Clone)]
pub struct ReplaceStatuses {
    pub stream_id: StreamId,
    pub entity_id: EntityId,
    pub resources: Resources,
    pub statuses: Vec<Option<Status>>,
}

impl Update for ReplaceStatuses {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        validate_entity_update(streams, self.stream_id, self.entity_id, |_, entity| {
            entity.resources = self.resources.clone();
            entity.ensure_status_slots(self.statuses.len());

            let mut events = Events::none();
            for (index, slot) in entity.statuses.iter_mut().enumerate() {
                match self.statuses.get(index).and_then(Option::as_ref) {
                    Some(incoming) => {
                        let mut status = incoming.clone();
                        if let Some(existing) = slot.as_ref() {
                            status.started_time = existing.started_time;
                        }
                        *slot = Some(status.clone());
                        events.push_entity(EntityEvent::new(
                            self.stream_id,
                            self.entity_id,
                            EntityEventKind::UpsertStatus { index, status },
                        ));
                    }
                    None => {
                        if slot.take().is_some() {
                            events.push_entity(EntityEvent::new(
                                self.stream_id,
                                self.entity_id,
                                EntityEventKind::RemoveStatus { index },
                            ));
                        }
                    }
                }
            }

            events.push_entity(EntityEvent::new(
                self.stream_id,
                self.entity_id,
                EntityEventKind::UpdateResources {
                    resources: self.resources.clone(),
                },
            ));
            Ok(events)
        })
    }
}
