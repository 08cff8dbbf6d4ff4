//! # Aetherlens Test Suite
//!
//! Cross-crate tests that drive the store provider, the generator and the
//! runtime together.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── scenario.rs    # Stream, spawn, respawn on a reused index
//! │   ├── ordering.rs    # Queries observe a prefix of the update order
//! │   ├── hubs.rs        # Fan-out, unsubscribe, drop-on-full
//! │   ├── timeouts.rs    # Blocked control loop
//! │   └── sessions.rs    # Runtime sessions end to end
//! └── benches/
//!     └── store_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p al-tests
//! cargo test -p al-tests integration::hubs
//! cargo bench -p al-tests
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod fixtures;
pub mod integration;
