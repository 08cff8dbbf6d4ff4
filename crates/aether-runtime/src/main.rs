//! # Aetherlens
//!
//! Reconstructs live game-session state from decoded protocol frames.
//!
//! The binary runs one session fed by JSON-lines frames on stdin and logs
//! every change event. It stops on end of input or Ctrl+C.
//!
//! ```text
//! stdin ──Frame──→ SessionHandler ──Update──→ Provider ──events──→ log
//! ```

use std::path::Path;
use std::sync::Arc;

use aether_runtime::{feed_json_lines, AetherRuntime, RuntimeConfig};
use aether_telemetry::init_telemetry;
use al_01_session_store::Provider;
use al_02_update_dispatch::ReferenceData;
use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::{debug, info};

fn load_reference(path: Option<&Path>) -> Result<ReferenceData> {
    let Some(path) = path else {
        info!("No reference data configured, names fall back to placeholders");
        return Ok(ReferenceData::new());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read reference data from {}", path.display()))?;
    let reference = ReferenceData::from_json(&json)
        .with_context(|| format!("Failed to parse reference data in {}", path.display()))?;
    info!(path = %path.display(), "Reference data loaded");
    Ok(reference)
}

/// Log every change event until the hubs close.
fn spawn_event_log(provider: &Arc<Provider>) {
    let mut streams = provider.stream_hub().subscription();
    tokio::spawn(async move {
        while let Some(event) = streams.recv().await {
            info!(stream_id = event.stream_id, kind = event.kind.name(), "Stream event");
            debug!(event = ?event);
        }
    });

    let mut entities = provider.entity_hub().subscription();
    tokio::spawn(async move {
        while let Some(event) = entities.recv().await {
            info!(
                stream_id = event.stream_id,
                entity_id = event.entity_id,
                kind = event.kind.name(),
                "Entity event"
            );
            debug!(event = ?event);
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("Invalid configuration")?;
    let _telemetry = init_telemetry(&config.telemetry).context("Failed to initialise telemetry")?;

    let reference = load_reference(config.reference_data.as_deref())?;
    let runtime = AetherRuntime::new(&config, reference).context("Failed to build registry")?;
    spawn_event_log(&runtime.provider());
    runtime.start();

    let session = runtime.open_session();
    info!(stream_id = session.stream_id, "Reading frames from stdin. Press Ctrl+C to stop.");
    let feed = feed_json_lines(BufReader::new(tokio::io::stdin()), session.frames);

    tokio::select! {
        delivered = feed => {
            let delivered = delivered.context("Failed to read frames")?;
            info!(delivered, "End of input");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
        }
    }

    runtime.shutdown().await;
    Ok(())
}
