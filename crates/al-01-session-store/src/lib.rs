//! # al-01-session-store
//!
//! The authoritative, in-memory picture of every tracked game session.
//!
//! ## Role in System
//!
//! - **Single Writer**: one control loop applies every [`Update`] in arrival order
//! - **Change Feed**: each update's events fan out on the stream and entity hubs
//! - **Snapshots**: reads return deep copies, never live references
//!
//! ```text
//! [Update Dispatch] ──BoxedUpdate──→ [Provider] ──StreamEvent / EntityEvent──→ [Hubs]
//!                                        ↑
//!                        streams() / stream(id) / entity(s, e)
//! ```
//!
//! Entities that despawn are tombstoned rather than deleted so late updates
//! for them are told apart from updates for entities that never existed.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::*;
pub use ports::*;
pub use service::*;
