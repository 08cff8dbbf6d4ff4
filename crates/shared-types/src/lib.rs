//! # Shared Types Crate
//!
//! The reconstructed session model, the change events it emits, and the
//! decoded protocol blocks the engine consumes.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a crate boundary is
//!   defined here.
//! - **Snapshot by Clone**: all model types own their data; `Clone` yields a
//!   fully independent copy, which is how readers get isolation from writers.
//! - **Tombstones Are Data**: a removed entity stays in [`EntitiesMap`] as an
//!   absent value so that late references resolve as "removed", not "unknown".

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod entities;
pub mod events;
pub mod protocol;
pub mod session;

pub use entities::*;
pub use events::*;
pub use protocol::{Block, Direction, Payload, PayloadKind};
pub use session::*;
