//! # Aether Runtime Library
//!
//! Process wiring for the Aetherlens engine, exposed as a library so the
//! integration suite can drive it. The entry point is the `main.rs` binary.
//!
//! ## Modules
//!
//! - `config` - settings from the environment
//! - `session` - one handler per live session
//! - `feed` - JSON-lines frame source
//! - `runtime` - provider ownership, startup and shutdown

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod feed;
pub mod runtime;
pub mod session;

pub use config::{ConfigError, RuntimeConfig, SessionConfig, DEFAULT_SESSION_BUFFER_SIZE};
pub use feed::feed_json_lines;
pub use runtime::{AetherRuntime, SessionHandle};
pub use session::{Frame, SessionError, SessionHandler};
