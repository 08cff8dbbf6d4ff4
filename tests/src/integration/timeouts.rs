//! # Query Timeouts
//!
//! A control loop stuck inside an update makes queries fail with
//! `RequestTimedOut` instead of hanging.

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use al_01_session_store::{
        AddStream, Events, ProviderConfig, StoreError, StoreQueries, Streams, Update, UpdateResult,
    };

    use crate::fixtures::running_provider;

    #[derive(Debug)]
    struct BlockLoop(Duration);

    impl Update for BlockLoop {
        fn modify_store(&self, _streams: &mut Streams) -> UpdateResult {
            std::thread::sleep(self.0);
            Ok(Events::none())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocked_loop_times_out_queries() {
        let query_timeout = Duration::from_millis(50);
        let config = ProviderConfig::default().with_query_timeout(query_timeout);
        let (provider, serving) = running_provider(config);

        let updates = provider.updates();
        updates
            .send(Some(Box::new(AddStream { id: 1 })))
            .await
            .unwrap();
        updates
            .send(Some(Box::new(BlockLoop(Duration::from_millis(400)))))
            .await
            .unwrap();

        let started = Instant::now();
        let result = provider.stream(1).await;
        assert_eq!(
            result.unwrap_err(),
            StoreError::RequestTimedOut {
                timeout: query_timeout
            }
        );
        assert!(started.elapsed() < Duration::from_millis(300));

        // The loop recovers once the update returns.
        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(provider.stream(1).await.unwrap().id, 1);

        provider.stop().await;
        serving.await.unwrap();
    }
}
