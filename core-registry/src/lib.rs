//! # Core Registry
//!
//! Cross-board media cache.
//!
//! - [`MediaRegistry`] - merge cache with insertion-order eviction
//! - [`merge`] - field-level merge that never regresses enrichment
//! - [`persist`] - snapshot encoding and startup hydration
//! - [`EnrichmentCoordinator`] - bounded-concurrency details and thumbnail fetches

pub mod enrichment;
pub mod error;
pub mod merge;
pub mod persist;
pub mod registry;

pub use enrichment::{DetailsProvider, EnrichmentCoordinator, ImageSource};
pub use error::{RegistryError, Result};
pub use merge::merge_media_item;
pub use persist::REGISTRY_STORAGE_KEY;
pub use registry::MediaRegistry;
