//! # Runtime Sessions
//!
//! Frames pushed into runtime sessions end up in the store; closing a
//! session removes its stream.

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tokio::time::timeout;

    use aether_runtime::{feed_json_lines, AetherRuntime, Frame, RuntimeConfig};
    use al_01_session_store::{ProviderState, StoreError, StoreQueries};
    use al_02_update_dispatch::ReferenceData;
    use shared_types::StreamEventKind;

    use crate::fixtures::{init_zone, movement, player_spawn};

    const CHARACTER: u32 = 0x1234_5678;

    async fn wait_for_removal(
        events: &mut shared_bus::Subscription<shared_types::StreamEvent>,
        stream_id: i64,
    ) {
        loop {
            let event = timeout(Duration::from_secs(1), events.recv())
                .await
                .unwrap()
                .unwrap();
            if event.kind == (StreamEventKind::RemoveStream { id: stream_id }) {
                return;
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_sessions_are_isolated() {
        let runtime =
            AetherRuntime::new(&RuntimeConfig::default(), ReferenceData::new()).unwrap();
        runtime.start();
        let provider = runtime.provider();
        let mut stream_events = provider.stream_hub().subscription();

        let first = runtime.open_session();
        let second = runtime.open_session();
        for (session, x) in [(&first, 1.0), (&second, 2.0)] {
            for block in [
                init_zone(CHARACTER),
                player_spawn(CHARACTER, 0, "Alpha Beta"),
                movement(CHARACTER, x),
            ] {
                session.frames.send(Frame::ingress(block)).await.unwrap();
            }
        }

        let first_id = first.stream_id;
        drop(first);
        wait_for_removal(&mut stream_events, first_id).await;

        let second_id = second.stream_id;
        let x = timeout(Duration::from_secs(1), async {
            loop {
                if let Ok(stream) = provider.stream(second_id).await {
                    if let Some(character) = stream.character() {
                        if character.location.x != 0.0 {
                            return character.location.x;
                        }
                    }
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(x, 2.0);

        let ids: Vec<i64> = provider
            .streams()
            .await
            .unwrap()
            .iter()
            .map(|stream| stream.id)
            .collect();
        assert_eq!(ids, vec![second_id]);

        runtime.shutdown().await;
        assert_eq!(provider.state(), ProviderState::Stopped);
        assert_eq!(
            provider.streams().await.unwrap_err(),
            StoreError::ProviderNotRunning
        );
    }

    #[tokio::test]
    async fn test_json_feed_drives_a_session() {
        let runtime =
            AetherRuntime::new(&RuntimeConfig::default(), ReferenceData::new()).unwrap();
        runtime.start();
        let provider = runtime.provider();
        let session = runtime.open_session_with_id(42);

        let input: String = [
            Frame::ingress(init_zone(CHARACTER)),
            Frame::ingress(player_spawn(CHARACTER, 3, "Alpha Beta")),
        ]
        .iter()
        .map(|frame| serde_json::to_string(frame).unwrap() + "\n")
        .collect();

        let delivered = feed_json_lines(input.as_bytes(), session.frames.clone())
            .await
            .unwrap();
        assert_eq!(delivered, 2);

        let entity = timeout(Duration::from_secs(1), async {
            loop {
                if let Ok(entity) = provider.entity(42, u64::from(CHARACTER)).await {
                    return entity;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(entity.index, 3);

        drop(session);
        runtime.shutdown().await;
    }
}
