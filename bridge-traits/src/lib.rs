//! # Host Bridge Traits
//!
//! Capability contracts the host platform provides to the tier board core.
//!
//! ## Overview
//!
//! The core owns board state, the media registry and query compilation. It
//! does not own persistence, network access or log output; those are
//! injected through the traits in this crate so the same core runs in a
//! browser shell, a desktop app or a server.
//!
//! ## Traits
//!
//! ### Storage
//! - [`KeyValueStore`](storage::KeyValueStore) - Generic string-keyed persistence
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! Bridge operations return [`BridgeError`](error::BridgeError). External
//! providers (search, details, images) report failures with
//! [`ProviderError`](provider::ProviderError), which distinguishes
//! rate limiting from other upstream failures.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so implementations can be
//! shared across async tasks behind an `Arc`.

pub mod error;
pub mod provider;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use provider::{ProviderError, ProviderResult};
pub use storage::{InMemoryKeyValueStore, KeyValueStore, KeyValueStoreExt};
pub use time::{Clock, ConsoleLogger, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
