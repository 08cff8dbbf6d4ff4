//! # Session Handler
//!
//! One task per live session. It registers the stream, forwards every frame
//! through the generator and removes the stream when the session ends.
//!
//! ```text
//! frames ──(Direction, Block)──→ Generator ──Option<BoxedUpdate>──→ provider updates
//! ```

use aether_telemetry::SESSIONS_ACTIVE;
use al_01_session_store::{AddStream, BoxedUpdate, RemoveStream, UpdateSender};
use al_02_update_dispatch::Generator;
use serde::{Deserialize, Serialize};
use shared_types::{Block, Direction, StreamId};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// One decoded message together with the way it travelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub direction: Direction,
    pub block: Block,
}

impl Frame {
    #[must_use]
    pub fn ingress(block: Block) -> Self {
        Self {
            direction: Direction::Ingress,
            block,
        }
    }

    #[must_use]
    pub fn egress(block: Block) -> Self {
        Self {
            direction: Direction::Egress,
            block,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Store provider stopped accepting updates for stream {stream_id}")]
    ProviderClosed { stream_id: StreamId },
}

/// Feeds one session's frames into the store.
#[derive(Debug)]
pub struct SessionHandler {
    stream_id: StreamId,
    generator: Generator,
    updates: UpdateSender,
}

impl SessionHandler {
    #[must_use]
    pub fn new(stream_id: StreamId, generator: Generator, updates: UpdateSender) -> Self {
        Self {
            stream_id,
            generator,
            updates,
        }
    }

    #[must_use]
    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    /// Run until `frames` closes or `shutdown` flips to `true`.
    ///
    /// The stream is added before the first frame and removed afterwards in
    /// both cases. Unhandled frames are forwarded as `None`.
    pub async fn run(
        self,
        mut frames: mpsc::Receiver<Frame>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), SessionError> {
        let stream_id = self.stream_id;
        self.enqueue(Some(Box::new(AddStream { id: stream_id })))
            .await?;
        SESSIONS_ACTIVE.inc();
        info!(stream_id, "Session added");

        let result = self.forward(&mut frames, &mut shutdown).await;

        SESSIONS_ACTIVE.dec();
        let removed = self
            .enqueue(Some(Box::new(RemoveStream { id: stream_id })))
            .await;
        info!(stream_id, "Session removed");
        result.and(removed)
    }

    async fn forward(
        &self,
        frames: &mut mpsc::Receiver<Frame>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), SessionError> {
        if *shutdown.borrow() {
            return Ok(());
        }
        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!(stream_id = self.stream_id, "Session shutting down");
                        return Ok(());
                    }
                }
                frame = frames.recv() => {
                    let Some(frame) = frame else {
                        debug!(stream_id = self.stream_id, "Frame source closed");
                        return Ok(());
                    };
                    let update = self
                        .generator
                        .generate(self.stream_id, frame.direction, &frame.block);
                    self.enqueue(update).await?;
                }
            }
        }
    }

    async fn enqueue(&self, update: Option<BoxedUpdate>) -> Result<(), SessionError> {
        self.updates
            .send(update)
            .await
            .map_err(|_| SessionError::ProviderClosed {
                stream_id: self.stream_id,
            })
    }
}
