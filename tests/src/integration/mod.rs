//! # Integration Tests
//!
//! Each module drives real crates together; nothing is mocked.

pub mod hubs;
pub mod ordering;
pub mod scenario;
pub mod sessions;
pub mod timeouts;
