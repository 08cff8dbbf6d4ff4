//! # Update Ordering
//!
//! Queries are answered between updates, never during one, and always see
//! every update enqueued before them.

#[cfg(test)]
mod tests {
    use al_01_session_store::{AddStream, ProviderConfig, StoreQueries};
    use shared_types::Direction;

    use crate::fixtures::{generator, init_zone, movement, player_spawn, running_provider};

    const CHARACTER: u32 = 0x1000_0001;

    #[tokio::test]
    async fn test_query_sees_full_prefix() {
        let (provider, serving) = running_provider(ProviderConfig::default());
        let generator = generator();
        let updates = provider.updates();

        for id in 1..=3 {
            updates
                .send(Some(Box::new(AddStream { id })))
                .await
                .unwrap();
        }
        updates
            .send(generator.generate(2, Direction::Ingress, &init_zone(CHARACTER)))
            .await
            .unwrap();
        updates
            .send(generator.generate(2, Direction::Ingress, &player_spawn(CHARACTER, 0, "Me")))
            .await
            .unwrap();
        for step in 1..=100 {
            updates
                .send(generator.generate(
                    2,
                    Direction::Ingress,
                    &movement(CHARACTER, step as f32),
                ))
                .await
                .unwrap();
        }

        let ids: Vec<i64> = provider
            .streams()
            .await
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let entity = provider.entity(2, u64::from(CHARACTER)).await.unwrap();
        assert_eq!(entity.location.x, 100.0);

        provider.stop().await;
        serving.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_producers_keep_their_own_order() {
        let (provider, serving) = running_provider(ProviderConfig::default());
        let generator = generator();

        let mut producers = Vec::new();
        for stream_id in 1..=4_i64 {
            let updates = provider.updates();
            let generator = generator.clone();
            producers.push(tokio::spawn(async move {
                let character = 0x1000_0000 + stream_id as u32;
                updates
                    .send(Some(Box::new(AddStream { id: stream_id })))
                    .await
                    .unwrap();
                for block in [init_zone(character), player_spawn(character, 1, "Me")] {
                    updates
                        .send(generator.generate(stream_id, Direction::Ingress, &block))
                        .await
                        .unwrap();
                }
                for step in 1..=50 {
                    updates
                        .send(generator.generate(
                            stream_id,
                            Direction::Ingress,
                            &movement(character, step as f32),
                        ))
                        .await
                        .unwrap();
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }

        let streams = provider.streams().await.unwrap();
        assert_eq!(streams.len(), 4);
        for stream in streams {
            let character = stream.character().expect("character spawned");
            assert_eq!(character.location.x, 50.0);
        }

        provider.stop().await;
        serving.await.unwrap();
    }

    #[tokio::test]
    async fn test_snapshots_are_independent() {
        let (provider, serving) = running_provider(ProviderConfig::default());
        let updates = provider.updates();
        updates
            .send(Some(Box::new(AddStream { id: 7 })))
            .await
            .unwrap();

        let mut snapshot = provider.stream(7).await.unwrap();
        snapshot.character_id = 99;
        snapshot.place.territory_id = 1;

        let fresh = provider.stream(7).await.unwrap();
        assert_eq!(fresh.character_id, 0);
        assert_eq!(fresh.place.territory_id, 0);

        provider.stop().await;
        serving.await.unwrap();
    }
}
