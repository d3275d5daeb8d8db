//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the tier board core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! Every domain crate depends on this one for its configuration types and
//! the event vocabulary it emits. Hosts subscribe to the [`events::EventBus`]
//! to react to board, registry, search and storage changes.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
