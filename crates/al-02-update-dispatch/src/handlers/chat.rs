//! Chat lines of every channel the session can see.

use al_01_session_store::{BoxedUpdate, Events, StoreError, Streams, Update, UpdateResult};
use shared_types::protocol::{ChannelChat, OutgoingChannelChat, PrivateChat};
use shared_types::{
    Block, ChatEvent, Payload, PayloadKind, StreamEvent, StreamEventKind, StreamId, World,
};

use crate::domain::{ReferenceData, RegistryBuilder};

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .ingress(PayloadKind::ChatFrom, chat_from)
        .ingress(PayloadKind::ChatFromXWorld, chat_from)
        .egress(PayloadKind::ChatTo, chat_to)
        .ingress(PayloadKind::Chat, channel_chat)
        .egress(PayloadKind::EgressChat, egress_channel_chat)
        .ingress(PayloadKind::ChatXWorld, channel_chat)
        .egress(PayloadKind::EgressChatXWorld, egress_channel_chat)
        .ingress(PayloadKind::ChatZone, zone_chat)
        .egress(PayloadKind::EgressChatZone, egress_zone_chat)
        .ingress(PayloadKind::FreeCompanyResult, free_company_result);
}

const CHANNEL_PARTY: u64 = 0x01;
const CHANNEL_LINKSHELL: u64 = 0x02;
const CHANNEL_FREE_COMPANY: u64 = 0x03;
const CHANNEL_NOVICE_NETWORK: u64 = 0x04;

const ZONE_SAY: u16 = 0x0A;
const ZONE_SHOUT: u16 = 0x0B;
const ZONE_YELL: u16 = 0x1E;

const FC_LOGGED_IN: u32 = 0xF;
const FC_LOGGED_OUT: u32 = 0x10;

const CROSS_WORLD_LINKSHELL: &str = "CrossWorldLinkshell";
const FREE_COMPANY_RESULT: &str = "FreeCompanyResult";

fn channel_type(channel_id: u64) -> String {
    match (channel_id & 0xFF_0000_0000) >> 32 {
        CHANNEL_PARTY => "Party".into(),
        CHANNEL_LINKSHELL => "Linkshell".into(),
        CHANNEL_FREE_COMPANY => "FreeCompany".into(),
        CHANNEL_NOVICE_NETWORK => "NoviceNetwork".into(),
        other => format!("Unknown_{other}"),
    }
}

/// World encoded in a channel ID; zero means the channel carries none.
fn channel_world(reference: &ReferenceData, channel_id: u64) -> Option<World> {
    match ((channel_id & 0x00FF_0000_0000_0000) >> 48) as u32 {
        0 => None,
        id => Some(reference.world(id)),
    }
}

fn zone_channel_type(kind: u16) -> String {
    match kind {
        ZONE_SAY => "ZoneChatSay".into(),
        ZONE_SHOUT => "ZoneChatShout".into(),
        ZONE_YELL => "ZoneChatYell".into(),
        other => format!("ZoneChatUnknown{other}"),
    }
}

fn boxed(stream_id: StreamId, chat: ChatEvent) -> Option<BoxedUpdate> {
    Some(Box::new(RecordChat { stream_id, chat }))
}

fn chat_from(
    stream_id: StreamId,
    block: &Block,
    reference: &ReferenceData,
) -> Option<BoxedUpdate> {
    let (Payload::ChatFrom(data) | Payload::ChatFromXWorld(data)) = &block.payload else {
        return None;
    };
    boxed(stream_id, private_chat(data, "Private", 0, reference))
}

fn chat_to(
    stream_id: StreamId,
    block: &Block,
    reference: &ReferenceData,
) -> Option<BoxedUpdate> {
    let Payload::ChatTo(data) = &block.payload else {
        return None;
    };
    boxed(
        stream_id,
        private_chat(data, "PrivateTo", data.channel_id, reference),
    )
}

fn private_chat(
    data: &PrivateChat,
    channel_type: &str,
    channel_id: u64,
    reference: &ReferenceData,
) -> ChatEvent {
    ChatEvent {
        channel_id,
        channel_type: channel_type.into(),
        content_id: data.character_id,
        entity_id: u64::from(data.entity_id),
        world: Some(reference.world(u32::from(data.world_id))),
        name: data.name.clone(),
        message: data.message.clone(),
        ..Default::default()
    }
}

fn channel_chat(
    stream_id: StreamId,
    block: &Block,
    reference: &ReferenceData,
) -> Option<BoxedUpdate> {
    let (data, cross_world): (&ChannelChat, bool) = match &block.payload {
        Payload::Chat(data) => (data, false),
        Payload::ChatXWorld(data) => (data, true),
        _ => return None,
    };
    let (channel_type, channel_world) = if cross_world {
        (CROSS_WORLD_LINKSHELL.to_string(), Some(World::default()))
    } else {
        (
            channel_type(data.channel_id),
            channel_world(reference, data.channel_id),
        )
    };
    boxed(
        stream_id,
        ChatEvent {
            channel_id: data.channel_id,
            channel_world,
            channel_type,
            content_id: data.speaker_character_id,
            entity_id: u64::from(data.speaker_entity_id),
            world: Some(reference.world(u32::from(data.world_id))),
            name: data.speaker_name.clone(),
            message: data.message.clone(),
        },
    )
}

fn egress_channel_chat(
    stream_id: StreamId,
    block: &Block,
    reference: &ReferenceData,
) -> Option<BoxedUpdate> {
    let (data, cross_world): (&OutgoingChannelChat, bool) = match &block.payload {
        Payload::EgressChat(data) => (data, false),
        Payload::EgressChatXWorld(data) => (data, true),
        _ => return None,
    };
    let (channel_type, channel_world) = if cross_world {
        (CROSS_WORLD_LINKSHELL.to_string(), Some(World::default()))
    } else {
        (
            channel_type(data.channel_id),
            channel_world(reference, data.channel_id),
        )
    };
    boxed(
        stream_id,
        ChatEvent {
            channel_id: data.channel_id,
            channel_world,
            channel_type,
            message: data.message.clone(),
            ..Default::default()
        },
    )
}

fn zone_chat(
    stream_id: StreamId,
    block: &Block,
    reference: &ReferenceData,
) -> Option<BoxedUpdate> {
    let Payload::ChatZone(data) = &block.payload else {
        return None;
    };
    boxed(
        stream_id,
        ChatEvent {
            channel_type: zone_channel_type(data.kind),
            content_id: data.character_id,
            entity_id: u64::from(data.entity_id),
            world: Some(reference.world(u32::from(data.world_id))),
            name: data.speaker_name.clone(),
            message: data.message.clone(),
            ..Default::default()
        },
    )
}

fn egress_zone_chat(
    stream_id: StreamId,
    block: &Block,
    _reference: &ReferenceData,
) -> Option<BoxedUpdate> {
    let Payload::EgressChatZone(data) = &block.payload else {
        return None;
    };
    boxed(
        stream_id,
        ChatEvent {
            channel_type: zone_channel_type(data.kind),
            message: data.message.clone(),
            ..Default::default()
        },
    )
}

fn free_company_result(
    stream_id: StreamId,
    block: &Block,
    _reference: &ReferenceData,
) -> Option<BoxedUpdate> {
    let Payload::FreeCompanyResult(data) = &block.payload else {
        return None;
    };
    let what = match data.kind {
        FC_LOGGED_IN => "logged in".to_string(),
        FC_LOGGED_OUT => "logged out".to_string(),
        kind => format!(
            "Unknown_0x{kind:x}_0x{:x}_0x{:x}_0x{:x}",
            data.result, data.update_status, data.identity
        ),
    };
    boxed(
        stream_id,
        ChatEvent {
            channel_id: data.free_company_id,
            channel_type: FREE_COMPANY_RESULT.into(),
            content_id: data.target_character_id,
            name: data.free_company_name.clone(),
            message: format!("{} has {what}.", data.target_name),
            ..Default::default()
        },
    )
}

/// Publish a chat line, filling in what only the session knows: the
/// local speaker and the worlds a channel implicitly belongs to.
#[derive(Debug, Clone)]
pub struct RecordChat {
    pub stream_id: StreamId,
    pub chat: ChatEvent,
}

impl Update for RecordChat {
    fn modify_store(&self, streams: &mut Streams) -> UpdateResult {
        let stream = streams
            .get(self.stream_id)
            .ok_or(StoreError::StreamNotFound {
                stream_id: self.stream_id,
            })?;

        let mut chat = self.chat.clone();
        if chat.channel_type.starts_with("Zone") {
            chat.channel_world = Some(stream.current_world.clone());
        }

        // Lines the local character sent carry no content ID.
        if chat.content_id == 0 {
            chat.entity_id = stream.character_id;
            chat.world = Some(stream.home_world.clone());
            chat.name = stream
                .character()
                .map_or_else(|| "Me".to_string(), |entity| entity.name.clone());
        }

        if !chat.channel_type.starts_with("Cross")
            && chat.channel_world.as_ref().map_or(true, |w| w.name.is_empty())
        {
            chat.channel_world = Some(stream.home_world.clone());
        }

        if chat.channel_type == FREE_COMPANY_RESULT {
            chat.world = Some(stream.home_world.clone());
        }

        Ok(Events::stream(vec![StreamEvent::new(
            self.stream_id,
            StreamEventKind::Chat(chat),
        )]))
    }
}
