//! # Store Provider
//!
//! Owns the [`Streams`] exclusively and serialises every mutation and read
//! through one control loop. Updates and queries reach the loop over bounded
//! channels; change events leave it through the stream and entity hubs.
//!
//! The loop picks fairly between pending updates and queries, so neither can
//! starve the other. Before a query is answered, the updates already queued
//! are applied (at most one channel's worth), which means a caller that
//! awaited its send always reads its own write. On stop the update channel
//! is closed and whatever is still queued is applied before the loop exits.
//!
//! ```text
//! SessionHandler ──Option<BoxedUpdate>──→ ┌──────────────┐ ──StreamEvent──→ StreamHub
//!                                          │ control loop │
//! StoreQueries   ──Request + oneshot────→ └──────────────┘ ──EntityEvent──→ EntityHub
//! ```

use aether_telemetry::{
    metric_inc, time_histogram, QUERY_TIMEOUTS, UPDATES_APPLIED, UPDATES_FAILED,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{EntityHub, StreamHub, ENTITY_HUB, STREAM_HUB};
use shared_types::{Entity, EntityId, Stream, StreamId};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use super::config::{ProviderConfig, ProviderOption};
use super::request::Request;
use super::state::ProviderState;
use crate::domain::{StoreError, Streams};
use crate::ports::{BoxedUpdate, StoreQueries, UpdateFailure};

/// Producer side of the mutation channel. `None` is accepted and ignored.
pub type UpdateSender = mpsc::Sender<Option<BoxedUpdate>>;

/// Receiving ends, held until [`Provider::serve`] takes them.
struct Worker {
    streams: Streams,
    updates_rx: mpsc::Receiver<Option<BoxedUpdate>>,
    update_capacity: usize,
    requests_rx: mpsc::Receiver<Request>,
    stop_rx: watch::Receiver<bool>,
}

/// The single writer of session state.
pub struct Provider {
    updates_tx: UpdateSender,
    requests_tx: mpsc::Sender<Request>,
    stream_hub: StreamHub,
    entity_hub: EntityHub,
    query_timeout: Duration,
    state: watch::Sender<ProviderState>,
    stop_tx: watch::Sender<bool>,
    worker: Mutex<Option<Worker>>,
}

impl Provider {
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        let update_capacity = config.update_buffer_size.max(1);
        let (updates_tx, updates_rx) = mpsc::channel(update_capacity);
        let (requests_tx, requests_rx) = mpsc::channel(config.request_buffer_size.max(1));
        let (stop_tx, stop_rx) = watch::channel(false);
        let (state, _) = watch::channel(ProviderState::Created);

        Self {
            updates_tx,
            requests_tx,
            stream_hub: StreamHub::new(STREAM_HUB, config.event_buffer_size),
            entity_hub: EntityHub::new(ENTITY_HUB, config.event_buffer_size),
            query_timeout: config.query_timeout,
            state,
            stop_tx,
            worker: Mutex::new(Some(Worker {
                streams: Streams::new(),
                updates_rx,
                update_capacity,
                requests_rx,
                stop_rx,
            })),
        }
    }

    /// Build from defaults with `options` applied in order.
    #[must_use]
    pub fn with_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = ProviderOption>,
    {
        Self::new(ProviderConfig::from_options(options))
    }

    /// A handle for submitting updates.
    #[must_use]
    pub fn updates(&self) -> UpdateSender {
        self.updates_tx.clone()
    }

    #[must_use]
    pub fn stream_hub(&self) -> &StreamHub {
        &self.stream_hub
    }

    #[must_use]
    pub fn entity_hub(&self) -> &EntityHub {
        &self.entity_hub
    }

    #[must_use]
    pub fn state(&self) -> ProviderState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Run the control loop until [`Provider::stop`] is called.
    ///
    /// Only the first call on a `Created` provider runs the loop; any other
    /// call returns `InvalidState` immediately.
    pub async fn serve(&self) -> Result<(), StoreError> {
        let mut current = ProviderState::Created;
        let started = self.state.send_if_modified(|state| {
            current = *state;
            if *state == ProviderState::Created {
                *state = ProviderState::Running;
                true
            } else {
                false
            }
        });
        if !started {
            return Err(StoreError::InvalidState {
                state: current,
                action: "serve",
            });
        }

        let Some(worker) = self.worker.lock().take() else {
            self.state.send_replace(ProviderState::Stopped);
            return Err(StoreError::InvariantViolation(
                "control loop receivers already taken".into(),
            ));
        };
        let Worker {
            mut streams,
            mut updates_rx,
            update_capacity,
            mut requests_rx,
            mut stop_rx,
        } = worker;

        info!(target: "store_provider", "Store provider running");
        let mut applied: u64 = 0;

        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                Some(update) = updates_rx.recv() => {
                    if let Some(update) = update {
                        self.apply(&mut streams, update);
                        applied += 1;
                    }
                }
                Some(request) = requests_rx.recv() => {
                    applied += self.apply_queued(&mut streams, &mut updates_rx, update_capacity);
                    request.answer(&streams);
                }
            }
        }

        drop(requests_rx);
        updates_rx.close();
        let drained = self.apply_queued(&mut streams, &mut updates_rx, usize::MAX);
        applied += drained;
        self.state.send_replace(ProviderState::Stopped);
        info!(
            target: "store_provider",
            updates_applied = applied,
            drained_on_stop = drained,
            streams = streams.len(),
            "Store provider stopped"
        );
        Ok(())
    }

    /// Stop the control loop and wait until it has exited.
    ///
    /// Safe to call in any state and more than once. A provider that never
    /// served goes straight to `Stopped`.
    pub async fn stop(&self) {
        let mut previous = ProviderState::Stopped;
        self.state.send_if_modified(|state| {
            previous = *state;
            match *state {
                ProviderState::Created => {
                    *state = ProviderState::Stopped;
                    true
                }
                ProviderState::Running => {
                    *state = ProviderState::Stopping;
                    true
                }
                ProviderState::Stopping | ProviderState::Stopped => false,
            }
        });

        if previous == ProviderState::Created {
            // Release the receivers so queued senders see a closed channel.
            self.worker.lock().take();
            info!(target: "store_provider", "Store provider stopped before serving");
            return;
        }

        self.stop_tx.send_replace(true);
        let mut state_rx = self.state.subscribe();
        let _ = state_rx
            .wait_for(|state| *state == ProviderState::Stopped)
            .await;
    }

    /// Apply up to `limit` updates that are already queued, without waiting.
    fn apply_queued(
        &self,
        streams: &mut Streams,
        updates_rx: &mut mpsc::Receiver<Option<BoxedUpdate>>,
        limit: usize,
    ) -> u64 {
        let mut applied = 0;
        for _ in 0..limit {
            match updates_rx.try_recv() {
                Ok(Some(update)) => {
                    self.apply(streams, update);
                    applied += 1;
                }
                Ok(None) => {}
                Err(_) => break,
            }
        }
        applied
    }

    fn apply(&self, streams: &mut Streams, update: BoxedUpdate) {
        let result = {
            let _timer = time_histogram!(aether_telemetry::UPDATE_APPLY_DURATION);
            update.modify_store(streams)
        };

        let events = match result {
            Ok(events) => {
                metric_inc!(UPDATES_APPLIED);
                events
            }
            Err(UpdateFailure { events, error }) => {
                metric_inc!(UPDATES_FAILED);
                error!(
                    target: "store_provider",
                    update = ?update,
                    error = %error,
                    "Error applying update"
                );
                events
            }
        };

        for event in events.stream {
            self.stream_hub.broadcast(event);
        }
        for event in events.entity {
            self.entity_hub.broadcast(event);
        }
    }

    async fn query<R>(
        &self,
        name: &'static str,
        build: impl FnOnce(oneshot::Sender<R>) -> Request,
    ) -> Result<R, StoreError> {
        let (respond_to, response) = oneshot::channel();
        let request = build(respond_to);

        let exchange = async {
            self.requests_tx
                .send(request)
                .await
                .map_err(|_| StoreError::ProviderNotRunning)?;
            response.await.map_err(|_| StoreError::ProviderNotRunning)
        };

        match tokio::time::timeout(self.query_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                metric_inc!(QUERY_TIMEOUTS, &[name]);
                warn!(
                    target: "store_provider",
                    query = name,
                    timeout = ?self.query_timeout,
                    "Store query timed out"
                );
                Err(StoreError::RequestTimedOut {
                    timeout: self.query_timeout,
                })
            }
        }
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new(ProviderConfig::default())
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("state", &self.state())
            .field("query_timeout", &self.query_timeout)
            .field("stream_hub", &self.stream_hub)
            .field("entity_hub", &self.entity_hub)
            .finish()
    }
}

#[async_trait]
impl StoreQueries for Provider {
    async fn streams(&self) -> Result<Vec<Stream>, StoreError> {
        self.query("streams", |respond_to| Request::Streams { respond_to })
            .await
    }

    async fn stream(&self, stream_id: StreamId) -> Result<Stream, StoreError> {
        self.query("stream", |respond_to| Request::Stream {
            stream_id,
            respond_to,
        })
        .await?
    }

    async fn entity(
        &self,
        stream_id: StreamId,
        entity_id: EntityId,
    ) -> Result<Entity, StoreError> {
        debug!(target: "store_provider", stream_id, entity_id, "Entity query");
        self.query("entity", |respond_to| Request::Entity {
            stream_id,
            entity_id,
            respond_to,
        })
        .await?
    }
}
