//! Crafting progress of the local character.

use al_01_session_store::{BoxedUpdate, Events, StoreError, Streams, Update, UpdateResult};
use shared_types::{
    Block, CraftingInfo, Payload, PayloadKind, StreamEvent, StreamEventKind, StreamId,
};

use crate::domain::{ReferenceData, RegistryBuilder};

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .ingress(PayloadKind::EventPlay, event_play)
        .ingress(PayloadKind::CraftState, craft_state);
}

/// Event handler ID of the crafting log.
const CRAFTING_EVENT: u32 = 0xA0001;
const SCENE_CRAFT_STARTED: u16 = 2;
const SCENES_CRAFT_ENDED: [u16; 2] = [4, 6];

const FLAG_COMPLETED: u32 = 0x4;
const FLAG_FAILED: u32 = 0x8;

fn event_play(
    stream_id: StreamId,
    block: &Block,
    reference: &ReferenceData,
) -> Option<BoxedUpdate> {
    let Payload::EventPlay(event) = &block.payload else {
        return None;
    };
    if event.event_id != CRAFTING_EVENT {
        return None;
    }

    let crafting_info = match event.scene {
        SCENE_CRAFT_STARTED => {
            let recipe = reference.recipe(event.params.first().copied().unwrap_or_default());
            Some(CraftingInfo {
                durability: recipe.durability,
                recipe: Some(recipe),
                step_num: 1,
                current_condition: 1,
                previous_condition: 1,
                ..Default::default()
            })
        }
        scene if SCENES_CRAFT_ENDED.contains(&scene) => None,
        _ => return None,
    };
    Some(Box::new(SetCraftingInfo {
        stream_id,
        crafting_info,
    }))
}

fn craft_state(
    stream_id: StreamId,
    block: &Block,
    reference: &ReferenceData,
) -> Option<BoxedUpdate> {
    let Payload::CraftState(state) = &block.payload else {
        return None;
    };
    let completed = state.flags & FLAG_COMPLETED != 0;
    let failed = state.flags & FLAG_FAILED != 0 && !completed;

    Some(Box::new(SetCraftingInfo {
        stream_id,
        crafting_info: Some(CraftingInfo {
            recipe: None,
            last_craft_action_id: state.craft_action,
            last_craft_action_name: reference.action_name(state.craft_action),
            step_num: state.step_num,
            progress: state.progress,
            progress_delta: state.progress_delta,
            quality: state.quality,
            quality_delta: state.quality_delta,
            hq_chance: state.hq_chance,
            durability: state.durability,
            durability_delta: state.durability_delta,
            current_condition: state.current_condition,
            previous_condition: state.previous_condition,
            reuse_proc: false,
            completed,
            failed,
        }),
    }))
}

/// Replace the crafting record. A record without a recipe inherits the
/// recipe of the craft in progress.
#[derive(Debug, Clone)]
pub struct SetCraftingInfo {
    pub stream_id: StreamId,
    pub crafting_info: Option<CraftingInfo>,
}

impl Update for SetCraftingInfo {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        let stream = streams
            .get_mut(self.stream_id)
            .ok_or(StoreError::StreamNotFound {
                stream_id: self.stream_id,
            })?;

        let mut crafting_info = self.crafting_info.clone();
        if let Some(info) = crafting_info.as_mut() {
            let has_recipe = info.recipe.as_ref().is_some_and(|r| r.id != 0);
            if !has_recipe {
                if let Some(previous) = stream.crafting_info.as_ref() {
                    info.recipe = previous.recipe.clone();
                }
            }
        }

        stream.crafting_info = crafting_info.clone();
        Ok(Events::stream(vec![StreamEvent::new(
            self.stream_id,
            StreamEventKind::UpdateCraftingInfo { crafting_info },
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::protocol::{CraftState, EventPlay};
    use shared_types::{RecipeInfo, Stream};

    const STREAM: StreamId = 1234;

    fn streams() -> Streams {
        let mut streams = Streams::new();
        streams.insert(Stream::new(STREAM));
        streams
    }

    fn reference() -> ReferenceData {
        let mut reference = ReferenceData::new();
        reference.recipes.insert(
            31,
            RecipeInfo {
                id: 31,
                name: "Bronze Ingot".into(),
                durability: 40,
                ..Default::default()
            },
        );
        reference
    }

    fn play(scene: u16) -> Block {
        Block::new(
            1,
            Payload::EventPlay(EventPlay {
                event_id: CRAFTING_EVENT,
                scene,
                params: vec![31],
            }),
        )
    }

    fn apply(block: &Block, factory: crate::domain::UpdateFactory, streams: &mut Streams) {
        factory(STREAM, block, &reference())
            .unwrap()
            .modify_store(streams)
            .unwrap();
    }

    #[test]
    fn test_craft_lifecycle_keeps_recipe() {
        let mut streams = streams();
        apply(&play(SCENE_CRAFT_STARTED), event_play, &mut streams);
        let info = streams.get(STREAM).unwrap().crafting_info.clone().unwrap();
        assert_eq!(info.durability, 40);
        assert_eq!(info.step_num, 1);

        let step = Block::new(
            1,
            Payload::CraftState(CraftState {
                craft_action: 100_001,
                step_num: 2,
                progress: 30,
                durability: 30,
                flags: FLAG_COMPLETED | FLAG_FAILED,
                ..Default::default()
            }),
        );
        apply(&step, craft_state, &mut streams);
        let info = streams.get(STREAM).unwrap().crafting_info.clone().unwrap();
        assert_eq!(info.recipe.as_ref().unwrap().name, "Bronze Ingot");
        assert_eq!(info.progress, 30);
        assert!(info.completed);
        assert!(!info.failed);

        apply(&play(4), event_play, &mut streams);
        assert!(streams.get(STREAM).unwrap().crafting_info.is_none());
    }

    #[test]
    fn test_failed_flag() {
        let mut streams = streams();
        let step = Block::new(
            1,
            Payload::CraftState(CraftState {
                flags: FLAG_FAILED,
                ..Default::default()
            }),
        );
        apply(&step, craft_state, &mut streams);
        let info = streams.get(STREAM).unwrap().crafting_info.clone().unwrap();
        assert!(info.failed);
        assert!(info.recipe.is_none());
    }

    #[test]
    fn test_unrelated_events_are_ignored() {
        let mut other = play(SCENE_CRAFT_STARTED);
        if let Payload::EventPlay(event) = &mut other.payload {
            event.event_id = 0x1234;
        }
        assert!(event_play(STREAM, &other, &reference()).is_none());
        assert!(event_play(STREAM, &play(3), &reference()).is_none());
    }
}
