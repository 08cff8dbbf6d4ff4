//! # al-02-update-dispatch
//!
//! Turns decoded protocol blocks into store updates.
//!
//! ## Role in System
//!
//! - **Registry**: one factory table per traffic direction, keyed by payload kind
//! - **Generator**: picks the table by direction and runs the factory
//! - **Handlers**: the concrete updates, grouped by concern
//! - **Reference Data**: static game tables used to name and size things
//!
//! ```text
//! [Decoder] ──(Direction, Block)──→ [Generator] ──BoxedUpdate──→ [Store Provider]
//!                                       │
//!                            Registry + ReferenceData
//! ```
//!
//! The registry is assembled once through [`RegistryBuilder`] and is
//! immutable afterwards; registering the same kind twice for one direction
//! is an error.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod domain;
pub mod handlers;
pub mod service;

pub use domain::*;
pub use handlers::{default_registry, register_all};
pub use service::Generator;
