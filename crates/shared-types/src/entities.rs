//! # Entities
//!
//! Actors tracked inside a session: players, NPCs and pets, plus the
//! records hanging off them (resources, statuses, casts, actions).
//!
//! ## Slot Reuse
//!
//! The game server addresses actors by a positional `index` that it reuses.
//! Two live entities never share an index; the spawn mutation tombstones
//! the previous occupant before installing a newcomer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map;
use std::collections::HashMap;

/// Identifier of an actor within a session.
pub type EntityId = u64;

/// Number of status-effect slots an entity carries.
pub const MAX_STATUS_SLOTS: usize = 30;

// =============================================================================
// ENTITY RECORDS
// =============================================================================

/// Position and facing of an actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Facing in radians, `[0, 2π)`.
    pub orientation: f64,
    pub last_updated: DateTime<Utc>,
}

/// Hit points, mana and technique points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub hp: u32,
    pub mp: u32,
    pub tp: u32,
    pub max_hp: u32,
    pub max_mp: u32,
    pub last_tick: DateTime<Utc>,
}

/// Class or job of an actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassJob {
    pub id: u32,
    pub name: String,
    pub abbreviation: String,
}

/// Battle NPC metadata resolved from reference tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NpcInfo {
    pub name_id: u32,
    pub base_id: u32,
    pub model_id: u32,
    pub name: Option<String>,
    pub size: Option<f64>,
    /// Non-zero when part of the size lookup missed.
    pub error: u8,
}

/// A status effect occupying one slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub id: u32,
    pub param: u32,
    pub name: String,
    pub description: String,
    pub started_time: DateTime<Utc>,
    pub duration_secs: f32,
    pub actor_id: EntityId,
    pub last_tick: DateTime<Utc>,
}

/// One effect an action applied to one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEffect {
    pub target_id: EntityId,
    pub kind: u8,
    pub hit_severity: u8,
    pub param: u8,
    pub bonus_percent: u8,
    pub value_multiplier: u8,
    pub flags: u8,
    pub value: u32,
}

/// The most recent action an actor used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: u32,
    pub name: String,
    pub target_id: EntityId,
    pub global_counter: u32,
    pub animation_lock_time: f64,
    pub hidden_animation: u32,
    pub location: Location,
    pub variation: u32,
    pub effect_display_type: u32,
    pub is_aoe: bool,
    pub effects: Vec<ActionEffect>,
    pub effect_flags: u32,
    pub use_time: DateTime<Utc>,
}

/// A cast in progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CastingInfo {
    pub action_id: u32,
    pub action_name: String,
    pub start_time: DateTime<Utc>,
    pub cast_time_secs: f32,
    pub target_id: EntityId,
    pub location: Location,
    pub cast_type: u8,
    pub effect_range: u8,
    pub x_axis_modifier: u8,
    pub omen: String,
}

/// One actor known within a stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub index: u8,
    pub name: String,
    pub target_id: EntityId,
    pub owner_id: EntityId,
    pub level: u8,
    pub class_job: ClassJob,
    pub is_npc: bool,
    pub is_enemy: bool,
    pub is_pet: bool,
    pub npc_info: Option<NpcInfo>,
    pub resources: Resources,
    pub location: Location,
    pub last_action: Option<Action>,
    /// Index-addressed status slots; `None` marks an empty slot.
    pub statuses: Vec<Option<Status>>,
    pub casting_info: Option<CastingInfo>,
    pub lockon_marker: u32,
    /// JSON capture of the spawn payload this entity came from.
    pub raw_spawn_json: String,
}

impl Entity {
    /// Grow the status list so that `len` slots are addressable.
    pub fn ensure_status_slots(&mut self, len: usize) {
        if self.statuses.len() < len {
            self.statuses.resize(len, None);
        }
    }
}

// =============================================================================
// ENTITIES MAP
// =============================================================================

/// Result of looking up an entity ID.
#[derive(Debug, PartialEq)]
pub enum EntitySlot<'a> {
    /// The ID was never seen in this stream.
    Missing,
    /// The ID was seen and has since been removed.
    Tombstoned,
    Live(&'a Entity),
}

/// Mutable counterpart of [`EntitySlot`].
#[derive(Debug)]
pub enum EntitySlotMut<'a> {
    Missing,
    Tombstoned,
    Live(&'a mut Entity),
}

/// Entity ID to entity, keeping tombstones for removed IDs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitiesMap(HashMap<EntityId, Option<Entity>>);

impl EntitiesMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn slot(&self, id: EntityId) -> EntitySlot<'_> {
        match self.0.get(&id) {
            None => EntitySlot::Missing,
            Some(None) => EntitySlot::Tombstoned,
            Some(Some(entity)) => EntitySlot::Live(entity),
        }
    }

    pub fn slot_mut(&mut self, id: EntityId) -> EntitySlotMut<'_> {
        match self.0.get_mut(&id) {
            None => EntitySlotMut::Missing,
            Some(None) => EntitySlotMut::Tombstoned,
            Some(Some(entity)) => EntitySlotMut::Live(entity),
        }
    }

    /// Live entity for `id`, if any.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.0.get(&id).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn contains_key(&self, id: EntityId) -> bool {
        self.0.contains_key(&id)
    }

    #[must_use]
    pub fn is_tombstoned(&self, id: EntityId) -> bool {
        matches!(self.0.get(&id), Some(None))
    }

    /// Install `entity` under its own ID, replacing a live entry or tombstone.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        self.0.insert(entity.id, Some(entity)).flatten()
    }

    /// Mark `id` as removed. Returns the entity that was live, if any.
    ///
    /// Tombstoning an unknown ID records the tombstone anyway so later
    /// references to it resolve as removed rather than unknown.
    pub fn tombstone(&mut self, id: EntityId) -> Option<Entity> {
        self.0.insert(id, None).flatten()
    }

    /// ID of the live entity occupying positional slot `index`.
    #[must_use]
    pub fn live_id_at_index(&self, index: u8) -> Option<EntityId> {
        self.live().find(|e| e.index == index).map(|e| e.id)
    }

    /// Iterate over live entities in arbitrary order.
    pub fn live(&self) -> impl Iterator<Item = &Entity> {
        self.0.values().filter_map(Option::as_ref)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, EntityId, Option<Entity>> {
        self.0.iter()
    }

    /// Number of keys, tombstones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<Entity> for EntitiesMap {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        Self(iter.into_iter().map(|e| (e.id, Some(e))).collect())
    }
}
