//! # Session State
//!
//! A [`Stream`] is one tracked live session of a game client together with
//! everything reconstructed about it so far.

use crate::entities::{EntitiesMap, Entity, EntityId};
use serde::{Deserialize, Serialize};

/// Opaque session identifier assigned by the session handler.
pub type StreamId = i64;

/// A game world (server shard).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    pub id: u32,
    pub name: String,
}

/// One candidate map of a territory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    pub key: u32,
    pub id: String,
    pub size_factor: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub place_name: String,
    pub place_name_sub: String,
    pub territory_type: String,
}

/// Where the session currently is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub map_id: u32,
    pub territory_id: u32,
    pub maps: Vec<MapInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HateRanking {
    pub actor_id: EntityId,
    pub hate: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HateEntry {
    pub enemy_id: EntityId,
    pub hate_percent: u8,
}

/// Enmity as seen by the controlled character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enmity {
    /// Party members ranked by hate on the current target, highest first.
    pub target_hate_ranking: Vec<HateRanking>,
    pub nearby_enemy_hate: Vec<HateEntry>,
}

/// Normalised recipe data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeInfo {
    pub id: u32,
    pub name: String,
    pub recipe_level: u32,
    pub element: u32,
    pub can_hq: bool,
    pub difficulty: u32,
    pub quality: u32,
    pub durability: u32,
}

/// Progress of the craft in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingInfo {
    pub recipe: Option<RecipeInfo>,
    pub last_craft_action_id: u32,
    pub last_craft_action_name: String,
    pub step_num: u32,
    pub progress: u32,
    pub progress_delta: i32,
    pub quality: u32,
    pub quality_delta: i32,
    pub hq_chance: u32,
    pub durability: u32,
    pub durability_delta: i32,
    pub current_condition: u32,
    pub previous_condition: u32,
    pub reuse_proc: bool,
    pub completed: bool,
    pub failed: bool,
}

/// Combat attributes of the controlled character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub strength: u32,
    pub dexterity: u32,
    pub vitality: u32,
    pub intelligence: u32,
    pub mind: u32,
    pub piety: u32,
    pub hp: u32,
    pub mp: u32,
    pub tp: u32,
    pub gp: u32,
    pub cp: u32,
    pub delay: u32,
    pub tenacity: u32,
    pub attack_power: u32,
    pub defense: u32,
    pub direct_hit_rate: u32,
    pub evasion: u32,
    pub magic_defense: u32,
    pub critical_hit: u32,
    pub attack_magic_potency: u32,
    pub healing_magic_potency: u32,
    pub elemental_bonus: u32,
    pub determination: u32,
    pub skill_speed: u32,
    pub spell_speed: u32,
    pub haste: u32,
    pub craftsmanship: u32,
    pub control: u32,
    pub gathering: u32,
    pub perception: u32,
}

/// One live session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub id: StreamId,
    pub server_id: u16,
    pub instance_num: u8,
    /// Zero until the session has identified its own character.
    pub character_id: EntityId,
    pub home_world: World,
    pub current_world: World,
    pub place: Place,
    pub enmity: Enmity,
    pub crafting_info: Option<CraftingInfo>,
    pub stats: Option<Stats>,
    pub entities: EntitiesMap,
}

impl Stream {
    /// An empty stream with no entities.
    #[must_use]
    pub fn new(id: StreamId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Live entities sorted by positional index.
    #[must_use]
    pub fn entities(&self) -> Vec<&Entity> {
        let mut live: Vec<&Entity> = self.entities.live().collect();
        live.sort_by_key(|e| e.index);
        live
    }

    /// The controlled character, once identified and spawned.
    #[must_use]
    pub fn character(&self) -> Option<&Entity> {
        if self.character_id == 0 {
            return None;
        }
        self.entities.get(self.character_id)
    }
}
