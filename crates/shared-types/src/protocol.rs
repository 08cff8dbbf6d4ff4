//! # Decoded Protocol Blocks
//!
//! The decoder hands the engine one [`Block`] per protocol message. The
//! payload is a closed sum type; [`PayloadKind`] is its fieldless tag and is
//! what the dispatch registry keys on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Stats;

/// Which way a message travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Server to client.
    Ingress,
    /// Client to server.
    Egress,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Ingress => write!(f, "ingress"),
            Direction::Egress => write!(f, "egress"),
        }
    }
}

/// One decoded protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub time: DateTime<Utc>,
    pub server_id: u16,
    /// Actor the message is about.
    pub subject_id: u32,
    /// Actor the session is currently logged in as.
    pub current_id: u32,
    pub payload: Payload,
}

impl Block {
    #[must_use]
    pub fn new(subject_id: u32, payload: Payload) -> Self {
        Self {
            time: Utc::now(),
            server_id: 0,
            subject_id,
            current_id: 0,
            payload,
        }
    }

    #[must_use]
    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }
}

// =============================================================================
// PAYLOAD FIELDS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One status slot as carried on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Zero marks an empty slot.
    pub id: u16,
    pub param: u16,
    pub duration: f32,
    pub actor_id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    pub index: u8,
    /// Fixed-width, NUL padded, not guaranteed to be valid UTF-8.
    pub name: Vec<u8>,
    pub target_id: u64,
    pub owner_id: u32,
    pub level: u8,
    pub class_job: u8,
    pub enemy_type: u8,
    pub subtype: u8,
    pub current_hp: u32,
    pub max_hp: u32,
    pub current_mp: u16,
    pub max_mp: u16,
    pub direction: u16,
    pub position: Position,
    pub bnpc_base: u32,
    pub bnpc_name: u32,
    pub model_chara: u16,
    pub statuses: Vec<StatusEffect>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Despawn {
    pub id: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitZone {
    pub territory_type_id: u16,
    /// Low byte carries the instance number.
    pub instance_flags: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpMpTp {
    pub hp: u32,
    pub mp: u16,
    pub tp: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HateListEntry {
    pub enemy_id: u32,
    pub hate_percent: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HateList {
    pub entries: Vec<HateListEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HateRankingEntry {
    pub actor_id: u32,
    pub hate: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HateRanking {
    pub entries: Vec<HateRankingEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub direction: u8,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SetPos {
    pub direction: u16,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EgressMovement {
    /// Radians, relative to the south-facing origin.
    pub direction: f32,
    pub position: Position,
}

/// Generic actor control message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorControl {
    pub kind: u16,
    pub p1: u32,
    pub p2: u32,
    pub p3: u32,
    pub p4: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorControlTarget {
    pub kind: u16,
    pub p1: u32,
    pub p2: u32,
    pub p3: u32,
    pub p4: u32,
    pub target_id: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientTrigger {
    pub kind: u16,
    pub p1: u32,
    pub p2: u32,
    pub p3: u32,
    pub p4: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Casting {
    pub action_id_name: u16,
    pub u1: u32,
    pub action_id: u32,
    pub cast_time: f32,
    pub target_id: u32,
    pub direction: u16,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionHeader {
    pub target_id: u32,
    pub action_id_name: u16,
    pub action_id: u32,
    pub global_counter: u32,
    /// Milliseconds.
    pub animation_lock_time: u32,
    pub hidden_animation: u32,
    pub direction: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawActionEffect {
    /// Zero terminates an effect block.
    pub kind: u8,
    pub hit_severity: u8,
    pub p3: u8,
    pub percentage: u8,
    pub multiplier: u8,
    pub flags: u8,
    pub damage: u16,
}

/// Single- and multi-target action results share one shape: one effect
/// block per affected target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub header: ActionHeader,
    pub effect_flags: u32,
    pub effects: Vec<Vec<RawActionEffect>>,
    pub target_ids: Vec<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectResultEntry {
    pub index: u8,
    pub effect_id: u16,
    pub param: u16,
    pub duration: f32,
    pub actor_id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectResult {
    pub current_hp: u32,
    pub max_hp: u32,
    pub current_mp: u16,
    pub max_mp: u16,
    pub current_tp: u16,
    pub entries: Vec<EffectResultEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusList {
    pub current_hp: u32,
    pub max_hp: u32,
    pub current_mp: u16,
    pub max_mp: u16,
    pub current_tp: u16,
    pub statuses: Vec<StatusEffect>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipChange {
    pub class_job: u8,
    pub level: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPlay {
    pub event_id: u32,
    pub scene: u16,
    pub params: Vec<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftState {
    pub craft_action: u32,
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
    pub flags: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateChat {
    pub channel_id: u64,
    pub character_id: u64,
    pub entity_id: u32,
    pub world_id: u16,
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelChat {
    pub channel_id: u64,
    pub speaker_character_id: u64,
    pub speaker_entity_id: u32,
    pub world_id: u16,
    pub speaker_name: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingChannelChat {
    pub channel_id: u64,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneChat {
    pub kind: u16,
    pub character_id: u64,
    pub entity_id: u32,
    pub world_id: u16,
    pub speaker_name: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingZoneChat {
    pub kind: u16,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeCompanyResult {
    pub free_company_id: u64,
    pub target_character_id: u64,
    pub kind: u32,
    pub result: u32,
    pub update_status: u8,
    pub identity: u8,
    pub free_company_name: String,
    pub target_name: String,
}

// =============================================================================
// PAYLOAD
// =============================================================================

macro_rules! payloads {
    ($($variant:ident($data:ty)),+ $(,)?) => {
        /// Decoded message body.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub enum Payload {
            $($variant($data),)+
            /// A message the decoder recognised but does not model.
            Unknown { opcode: u16 },
        }

        /// Fieldless tag of a [`Payload`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum PayloadKind {
            $($variant,)+
            Unknown,
        }

        impl Payload {
            #[must_use]
            pub fn kind(&self) -> PayloadKind {
                match self {
                    $(Payload::$variant(_) => PayloadKind::$variant,)+
                    Payload::Unknown { .. } => PayloadKind::Unknown,
                }
            }
        }
    };
}

payloads! {
    PlayerSpawn(Spawn),
    NpcSpawn(Spawn),
    NpcSpawn2(Spawn),
    DespawnEntity(Despawn),
    InitZone(InitZone),
    UpdateHpMpTp(HpMpTp),
    PlayerStats(Stats),
    HateList(HateList),
    HateRanking(HateRanking),
    Movement(Movement),
    SetPos(SetPos),
    EgressMovement(EgressMovement),
    ActorControl(ActorControl),
    ActorControlSelf(ActorControl),
    ActorControlNotice(ActorControl),
    ActorControlTarget(ActorControlTarget),
    ClientTrigger(ClientTrigger),
    Casting(Casting),
    Action(ActionResult),
    AoeAction(ActionResult),
    EffectResult(EffectResult),
    UpdateStatuses(StatusList),
    UpdateStatusesExtended(StatusList),
    EquipChange(EquipChange),
    EventPlay(EventPlay),
    CraftState(CraftState),
    ChatFrom(PrivateChat),
    ChatFromXWorld(PrivateChat),
    ChatTo(PrivateChat),
    Chat(ChannelChat),
    EgressChat(OutgoingChannelChat),
    ChatXWorld(ChannelChat),
    EgressChatXWorld(OutgoingChannelChat),
    ChatZone(ZoneChat),
    EgressChatZone(OutgoingZoneChat),
    FreeCompanyResult(FreeCompanyResult),
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
