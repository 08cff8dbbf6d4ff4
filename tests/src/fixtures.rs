//! Blocks and helpers shared by the integration tests and benchmarks.

#![allow(clippy::expect_used)]

use al_01_session_store::{Provider, ProviderConfig};
use al_02_update_dispatch::{Generator, ReferenceData};
use shared_types::protocol::{Despawn, InitZone, Movement, Position, Spawn};
use shared_types::{Block, Payload};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A zone entry announcing `character_id` as the logged-in character.
pub fn init_zone(character_id: u32) -> Block {
    let mut block = Block::new(
        character_id,
        Payload::InitZone(InitZone {
            territory_type_id: 132,
            instance_flags: 0,
        }),
    );
    block.current_id = character_id;
    block
}

pub fn player_spawn(entity_id: u32, index: u8, name: &str) -> Block {
    Block::new(
        entity_id,
        Payload::PlayerSpawn(Spawn {
            index,
            name: name.as_bytes().to_vec(),
            level: 90,
            current_hp: 1000,
            max_hp: 1000,
            ..Default::default()
        }),
    )
}

pub fn npc_spawn(entity_id: u32, index: u8) -> Block {
    Block::new(
        entity_id,
        Payload::NpcSpawn(Spawn {
            index,
            name: b"striking dummy".to_vec(),
            enemy_type: 4,
            ..Default::default()
        }),
    )
}

pub fn despawn(entity_id: u32) -> Block {
    Block::new(0, Payload::DespawnEntity(Despawn { id: entity_id }))
}

pub fn movement(entity_id: u32, x: f32) -> Block {
    Block::new(
        entity_id,
        Payload::Movement(Movement {
            direction: 0,
            position: Position { x, y: 0.0, z: 0.0 },
        }),
    )
}

pub fn generator() -> Generator {
    Generator::with_reference(ReferenceData::new()).expect("built-in registry")
}

/// A provider with its control loop running on the current runtime.
pub fn running_provider(config: ProviderConfig) -> (Arc<Provider>, JoinHandle<()>) {
    let provider = Arc::new(Provider::new(config));
    let serving = Arc::clone(&provider);
    let task = tokio::spawn(async move {
        serving.serve().await.expect("provider serves once");
    });
    (provider, task)
}
