//! Conversions from wire encodings to the store's units.

use chrono::{DateTime, Utc};
use shared_types::protocol::{Position, StatusEffect};
use shared_types::{Location, Status, MAX_STATUS_SLOTS};
use std::f64::consts::PI;

use super::reference::ReferenceData;

/// Map a direction quantised to `max` steps onto radians.
#[must_use]
pub fn canonical_orientation(direction: u32, max: u32) -> f64 {
    f64::from(direction) / f64::from(max) * 2.0 * PI
}

#[must_use]
pub fn location(position: Position, orientation: f64, time: DateTime<Utc>) -> Location {
    Location {
        x: f64::from(position.x),
        y: f64::from(position.y),
        z: f64::from(position.z),
        orientation,
        last_updated: time,
    }
}

/// Decode a fixed-width name field: cut at the first NUL and drop bytes
/// that are not valid UTF-8.
#[must_use]
pub fn sanitize_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    raw[..end]
        .utf8_chunks()
        .map(|chunk| chunk.valid())
        .collect()
}

/// A status record for a wire slot, named from the status table.
#[must_use]
pub fn status(
    reference: &ReferenceData,
    id: u16,
    param: u16,
    duration: f32,
    actor_id: u32,
    time: DateTime<Utc>,
) -> Status {
    let (name, description) = match reference.status(u32::from(id)) {
        Some(info) => (info.name.clone(), info.description.clone()),
        None => (String::new(), String::new()),
    };
    Status {
        id: u32::from(id),
        param: u32::from(param),
        name,
        description,
        started_time: time,
        duration_secs: duration,
        actor_id: u64::from(actor_id),
        last_tick: time,
    }
}

/// Statuses by slot from a wire status array. Only the first
/// [`MAX_STATUS_SLOTS`] entries are read; empty slots become `None` and the
/// list ends at the last occupied slot.
#[must_use]
pub fn status_slots(
    reference: &ReferenceData,
    effects: &[StatusEffect],
    time: DateTime<Utc>,
) -> Vec<Option<Status>> {
    let effects = &effects[..effects.len().min(MAX_STATUS_SLOTS)];
    let used = effects
        .iter()
        .rposition(|e| e.id != 0)
        .map_or(0, |last| last + 1);

    effects[..used]
        .iter()
        .map(|e| {
            (e.id != 0).then(|| status(reference, e.id, e.param, e.duration, e.actor_id, time))
        })
        .collect()
}
