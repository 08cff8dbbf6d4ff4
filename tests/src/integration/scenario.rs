//! # Session Scenario
//!
//! A stream is added, its character identified, an entity spawned and then
//! replaced by a second spawn on the same index.

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tokio::time::timeout;

    use al_01_session_store::{AddStream, ProviderConfig, StoreError, StoreQueries};
    use shared_types::{Direction, EntityEventKind};

    use crate::fixtures::{generator, init_zone, player_spawn, running_provider};

    const STREAM: i64 = 5678;
    const FIRST: u32 = 0x1234_5678;
    const SECOND: u32 = 0x2345_6789;

    #[tokio::test]
    async fn test_respawn_on_reused_index() {
        let (provider, serving) = running_provider(ProviderConfig::default());
        let generator = generator();
        let updates = provider.updates();
        let mut entity_events = provider.entity_hub().subscription();

        updates
            .send(Some(Box::new(AddStream { id: STREAM })))
            .await
            .unwrap();
        let stream = provider.stream(STREAM).await.unwrap();
        assert_eq!(stream.id, STREAM);
        assert!(stream.entities.is_empty());

        for block in [init_zone(FIRST), player_spawn(FIRST, 10, "Alpha Beta")] {
            updates
                .send(generator.generate(STREAM, Direction::Ingress, &block))
                .await
                .unwrap();
        }
        let entity = provider.entity(STREAM, u64::from(FIRST)).await.unwrap();
        assert_eq!(entity.index, 10);
        assert_eq!(provider.stream(STREAM).await.unwrap().character_id, u64::from(FIRST));

        // SetEntities from the zone change, then the first spawn.
        for _ in 0..2 {
            timeout(Duration::from_secs(1), entity_events.recv())
                .await
                .unwrap()
                .unwrap();
        }

        let respawn = player_spawn(SECOND, 10, "Gamma Delta");
        updates
            .send(generator.generate(STREAM, Direction::Ingress, &respawn))
            .await
            .unwrap();

        let removed = timeout(Duration::from_secs(1), entity_events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            removed.kind,
            EntityEventKind::RemoveEntity {
                id: u64::from(FIRST)
            }
        );
        let added = timeout(Duration::from_secs(1), entity_events.recv())
            .await
            .unwrap()
            .unwrap();
        let EntityEventKind::AddEntity { entity } = &added.kind else {
            panic!("expected AddEntity, got {:?}", added.kind);
        };
        assert_eq!(entity.id, u64::from(SECOND));

        assert_eq!(
            provider.entity(STREAM, u64::from(FIRST)).await.unwrap_err(),
            StoreError::EntityNotFound {
                stream_id: STREAM,
                entity_id: u64::from(FIRST),
            }
        );
        assert_eq!(
            provider.entity(STREAM, u64::from(SECOND)).await.unwrap().name,
            "Gamma Delta"
        );

        provider.stop().await;
        serving.await.unwrap();
    }

    #[tokio::test]
    async fn test_updates_for_removed_entity_are_ignored() {
        let (provider, serving) = running_provider(ProviderConfig::default());
        let generator = generator();
        let updates = provider.updates();

        updates
            .send(Some(Box::new(AddStream { id: STREAM })))
            .await
            .unwrap();
        for block in [
            init_zone(FIRST),
            crate::fixtures::npc_spawn(0x4000_0001, 20),
            crate::fixtures::despawn(0x4000_0001),
        ] {
            updates
                .send(generator.generate(STREAM, Direction::Ingress, &block))
                .await
                .unwrap();
        }
        provider.streams().await.unwrap();

        let mut entity_events = provider.entity_hub().subscription();
        updates
            .send(generator.generate(
                STREAM,
                Direction::Ingress,
                &crate::fixtures::movement(0x4000_0001, 10.0),
            ))
            .await
            .unwrap();
        provider.streams().await.unwrap();

        assert!(provider
            .entity(STREAM, 0x4000_0001)
            .await
            .unwrap_err()
            .is_not_found());
        assert_eq!(entity_events.try_recv(), Ok(None));

        provider.stop().await;
        serving.await.unwrap();
    }
}
