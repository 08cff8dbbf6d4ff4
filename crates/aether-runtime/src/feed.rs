//! # Frame Feed
//!
//! Reads frames as JSON lines, one [`Frame`] per line, and hands them to a
//! session. Blank lines are skipped; a malformed line is logged and skipped.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::warn;

use crate::session::Frame;

/// Forward every frame in `reader` to `frames`.
///
/// Returns the number of frames delivered. Stops early when the session
/// stops receiving.
pub async fn feed_json_lines<R>(reader: R, frames: mpsc::Sender<Frame>) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_number = 0_usize;
    let mut delivered = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        let frame: Frame = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(line = line_number, error = %error, "Skipping malformed frame");
                continue;
            }
        };
        if frames.send(frame).await.is_err() {
            break;
        }
        delivered += 1;
    }
    Ok(delivered)
}
