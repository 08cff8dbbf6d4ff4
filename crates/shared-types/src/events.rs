//! # Change Events
//!
//! Immutable notifications describing what a mutation changed. They are the
//! only observable output of the state engine.
//!
//! ```text
//! StreamEvent { stream_id, kind: StreamEventKind }              → Stream hub
//! EntityEvent { stream_id, entity_id, kind: EntityEventKind }   → Entity hub
//! ```

use crate::entities::{
    Action, CastingInfo, ClassJob, Entity, EntityId, Location, Resources, Status,
};
use crate::session::{CraftingInfo, Enmity, Place, Stats, Stream, StreamId, World};
use serde::{Deserialize, Serialize};

/// A chat line observed on the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub channel_id: u64,
    pub channel_world: Option<World>,
    pub channel_type: String,
    /// Zero for lines the local character sent.
    pub content_id: u64,
    pub entity_id: EntityId,
    pub world: Option<World>,
    pub name: String,
    pub message: String,
}

/// What changed at stream scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StreamEventKind {
    AddStream {
        stream: Box<Stream>,
    },
    RemoveStream {
        id: StreamId,
    },
    UpdateIds {
        server_id: u16,
        character_id: EntityId,
        instance_num: u8,
    },
    UpdateMap {
        place: Place,
    },
    UpdateEnmity {
        enmity: Enmity,
    },
    UpdateCraftingInfo {
        crafting_info: Option<CraftingInfo>,
    },
    UpdateStats {
        stats: Stats,
    },
    Chat(ChatEvent),
}

impl StreamEventKind {
    /// Stable name of the variant, used as a log field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddStream { .. } => "AddStream",
            Self::RemoveStream { .. } => "RemoveStream",
            Self::UpdateIds { .. } => "UpdateIds",
            Self::UpdateMap { .. } => "UpdateMap",
            Self::UpdateEnmity { .. } => "UpdateEnmity",
            Self::UpdateCraftingInfo { .. } => "UpdateCraftingInfo",
            Self::UpdateStats { .. } => "UpdateStats",
            Self::Chat(_) => "Chat",
        }
    }
}

/// What changed at entity scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EntityEventKind {
    AddEntity { entity: Box<Entity> },
    RemoveEntity { id: EntityId },
    /// Replaces the whole entity set of the stream.
    SetEntities { entities: Vec<Entity> },
    UpdateLocation { location: Location },
    UpdateResources { resources: Resources },
    UpsertStatus { index: usize, status: Status },
    RemoveStatus { index: usize },
    UpdateCastingInfo { casting_info: Option<CastingInfo> },
    UpdateClass { class_job: ClassJob, level: u8 },
    UpdateTarget { target_id: EntityId },
    UpdateLockonMarker { lockon_marker: u32 },
    UpdateLastAction { action: Box<Action> },
}

impl EntityEventKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddEntity { .. } => "AddEntity",
            Self::RemoveEntity { .. } => "RemoveEntity",
            Self::SetEntities { .. } => "SetEntities",
            Self::UpdateLocation { .. } => "UpdateLocation",
            Self::UpdateResources { .. } => "UpdateResources",
            Self::UpsertStatus { .. } => "UpsertStatus",
            Self::RemoveStatus { .. } => "RemoveStatus",
            Self::UpdateCastingInfo { .. } => "UpdateCastingInfo",
            Self::UpdateClass { .. } => "UpdateClass",
            Self::UpdateTarget { .. } => "UpdateTarget",
            Self::UpdateLockonMarker { .. } => "UpdateLockonMarker",
            Self::UpdateLastAction { .. } => "UpdateLastAction",
        }
    }
}

/// Stream-scoped envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub stream_id: StreamId,
    pub kind: StreamEventKind,
}

impl StreamEvent {
    #[must_use]
    pub fn new(stream_id: StreamId, kind: StreamEventKind) -> Self {
        Self { stream_id, kind }
    }
}

/// Entity-scoped envelope. `entity_id` is zero for stream-wide entity events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityEvent {
    pub stream_id: StreamId,
    pub entity_id: EntityId,
    pub kind: EntityEventKind,
}

impl EntityEvent {
    #[must_use]
    pub fn new(stream_id: StreamId, entity_id: EntityId, kind: EntityEventKind) -> Self {
        Self {
            stream_id,
            entity_id,
            kind,
        }
    }
}
