//! # Hub Fan-Out
//!
//! Subscribers of the provider's hubs see every event once, in order, and
//! a slow subscriber never holds the control loop back.

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    use al_01_session_store::{AddStream, ProviderConfig, RemoveStream, StoreQueries};
    use shared_types::StreamEventKind;

    use crate::fixtures::running_provider;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_subscriber_sees_every_event_in_order() {
        let (provider, serving) = running_provider(ProviderConfig::default());
        let mut subscribers: Vec<_> = (0..4)
            .map(|_| provider.stream_hub().subscription())
            .collect();

        let updates = provider.updates();
        for id in 1..=20 {
            updates
                .send(Some(Box::new(AddStream { id })))
                .await
                .unwrap();
        }

        for subscriber in &mut subscribers {
            for expected in 1..=20 {
                let event = timeout(Duration::from_secs(1), subscriber.recv())
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(event.stream_id, expected);
                assert!(matches!(event.kind, StreamEventKind::AddStream { .. }));
            }
        }

        provider.stop().await;
        serving.await.unwrap();
    }

    #[tokio::test]
    async fn test_unsubscribed_receives_nothing() {
        let (provider, serving) = running_provider(ProviderConfig::default());
        let (mut rx, id) = provider.stream_hub().subscribe();
        provider.stream_hub().unsubscribe(id);

        provider
            .updates()
            .send(Some(Box::new(AddStream { id: 1 })))
            .await
            .unwrap();
        provider.streams().await.unwrap();

        assert!(rx.recv().await.is_none());

        provider.stop().await;
        serving.await.unwrap();
    }

    #[tokio::test]
    async fn test_slow_subscriber_drops_instead_of_blocking() {
        let config = ProviderConfig::default().with_event_buffer_size(2);
        let (provider, serving) = running_provider(config);
        let mut slow = provider.stream_hub().subscription();

        let updates = provider.updates();
        for id in 1..=5 {
            updates
                .send(Some(Box::new(AddStream { id })))
                .await
                .unwrap();
        }
        assert_eq!(provider.streams().await.unwrap().len(), 5);
        assert_eq!(provider.stream_hub().events_dropped(), 3);

        let first = slow.recv().await.unwrap();
        let second = slow.recv().await.unwrap();
        assert_eq!((first.stream_id, second.stream_id), (1, 2));
        assert_eq!(slow.try_recv(), Ok(None));

        provider.stop().await;
        serving.await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_update_publishes_no_events() {
        let (provider, serving) = running_provider(ProviderConfig::default());
        let events = provider.stream_hub().subscription();

        let updates = provider.updates();
        updates
            .send(Some(Box::new(RemoveStream { id: 404 })))
            .await
            .unwrap();
        updates
            .send(Some(Box::new(AddStream { id: 1 })))
            .await
            .unwrap();
        updates
            .send(Some(Box::new(RemoveStream { id: 1 })))
            .await
            .unwrap();
        provider.streams().await.unwrap();

        provider.stop().await;
        serving.await.unwrap();

        let kinds: Vec<&'static str> = events
            .take(2)
            .map(|event| event.kind.name())
            .collect()
            .await;
        assert_eq!(kinds, vec!["AddStream", "RemoveStream"]);
    }
}
