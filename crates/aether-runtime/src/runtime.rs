//! # Aether Runtime
//!
//! Owns the store provider and the session tasks.
//!
//! ## Startup Sequence
//!
//! 1. Build the generator from the registry and reference data
//! 2. Spawn the provider's control loop
//! 3. Open sessions on demand, one task each
//!
//! ## Shutdown Sequence
//!
//! 1. Signal every session; each one removes its stream
//! 2. Wait for the session tasks
//! 3. Stop the provider, which applies queued updates before exiting
//! 4. Report hub drops

use aether_telemetry::{log_event, HUB_EVENTS_DROPPED};
use al_01_session_store::{Provider, ProviderState, StoreError};
use al_02_update_dispatch::{DispatchError, Generator, ReferenceData};
use parking_lot::Mutex;
use shared_types::StreamId;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::RuntimeConfig;
use crate::session::{Frame, SessionHandler};

/// Handle to a running session.
#[derive(Debug)]
pub struct SessionHandle {
    pub stream_id: StreamId,
    /// Dropping this ends the session.
    pub frames: mpsc::Sender<Frame>,
}

pub struct AetherRuntime {
    provider: Arc<Provider>,
    generator: Generator,
    frame_buffer_size: usize,
    next_stream_id: AtomicI64,
    shutdown_tx: watch::Sender<bool>,
    serve_task: Mutex<Option<JoinHandle<Result<(), StoreError>>>>,
    session_tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl AetherRuntime {
    pub fn new(config: &RuntimeConfig, reference: ReferenceData) -> Result<Self, DispatchError> {
        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            provider: Arc::new(Provider::new(config.provider.clone())),
            generator: Generator::with_reference(reference)?,
            frame_buffer_size: config.session.frame_buffer_size,
            next_stream_id: AtomicI64::new(1),
            shutdown_tx,
            serve_task: Mutex::new(None),
            session_tasks: Mutex::new(Vec::new()),
        })
    }

    /// Spawn the provider's control loop. Calling this twice is a no-op.
    pub fn start(&self) {
        let mut serve_task = self.serve_task.lock();
        if serve_task.is_some() {
            return;
        }
        let provider = Arc::clone(&self.provider);
        *serve_task = Some(tokio::spawn(async move { provider.serve().await }));
        info!("Aether runtime started");
    }

    /// Start a session under a fresh stream ID.
    pub fn open_session(&self) -> SessionHandle {
        let stream_id = self.next_stream_id.fetch_add(1, Ordering::Relaxed);
        self.open_session_with_id(stream_id)
    }

    /// Start a session under `stream_id`.
    pub fn open_session_with_id(&self, stream_id: StreamId) -> SessionHandle {
        let (frames_tx, frames_rx) = mpsc::channel(self.frame_buffer_size);
        let handler =
            SessionHandler::new(stream_id, self.generator.clone(), self.provider.updates());
        let shutdown = self.shutdown_tx.subscribe();

        let task = tokio::spawn(async move {
            if let Err(error) = handler.run(frames_rx, shutdown).await {
                log_event!(
                    warn,
                    "session",
                    "Session ended early",
                    stream_id = stream_id,
                    error = %error
                );
            }
        });
        self.session_tasks.lock().push(task);

        SessionHandle {
            stream_id,
            frames: frames_tx,
        }
    }

    #[must_use]
    pub fn provider(&self) -> Arc<Provider> {
        Arc::clone(&self.provider)
    }

    #[must_use]
    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// Stop every session, then the provider.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        self.shutdown_tx.send_replace(true);

        let sessions: Vec<_> = self.session_tasks.lock().drain(..).collect();
        for task in sessions {
            if let Err(error) = task.await {
                error!(error = %error, "Session task failed");
            }
        }

        self.provider.stop().await;
        let serve_task = self.serve_task.lock().take();
        if let Some(task) = serve_task {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => error!(error = %error, "Store provider failed"),
                Err(error) => error!(error = %error, "Store provider task failed"),
            }
        }

        self.report_hub_drops();
        info!(state = %self.provider.state(), "Shutdown complete");
    }

    fn report_hub_drops(&self) {
        let stream_hub = self.provider.stream_hub();
        let entity_hub = self.provider.entity_hub();
        let hubs = [
            (stream_hub.name(), stream_hub.events_dropped()),
            (entity_hub.name(), entity_hub.events_dropped()),
        ];
        for (hub, dropped) in hubs {
            if dropped == 0 {
                continue;
            }
            warn!(hub, dropped, "Hub dropped events for slow subscribers");
            HUB_EVENTS_DROPPED
                .with_label_values(&[hub])
                .inc_by(dropped as f64);
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.provider.state() == ProviderState::Running
    }
}

impl std::fmt::Debug for AetherRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AetherRuntime")
            .field("provider", &self.provider)
            .field("sessions", &self.session_tasks.lock().len())
            .finish()
    }
}
