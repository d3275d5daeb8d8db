//! Registry snapshot persistence
//!
//! The registry is stored as one JSON array under [`REGISTRY_STORAGE_KEY`],
//! oldest entry first, so hydration replays the original insertion order.

use bridge_traits::storage::KeyValueStore;
use core_media::MediaItem;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::registry::MediaRegistry;

pub const REGISTRY_STORAGE_KEY: &str = "media-registry";

/// Serialize the registry in insertion order.
pub fn encode_snapshot(registry: &MediaRegistry) -> Result<String> {
    Ok(serde_json::to_string(&registry.snapshot())?)
}

/// Parse a stored snapshot, dropping entries that no longer deserialize.
pub fn decode_snapshot(raw: &str) -> Result<Vec<MediaItem>> {
    let values: Vec<Value> = serde_json::from_str(raw)?;
    let total = values.len();

    let items: Vec<MediaItem> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();

    if items.len() < total {
        warn!(
            dropped = total - items.len(),
            "Skipped unreadable media registry entries"
        );
    }
    Ok(items)
}

/// Load the stored snapshot into `registry` through the normal merge path.
///
/// A corrupt snapshot is logged and ignored; the registry starts empty.
pub async fn hydrate(registry: &MediaRegistry, store: &dyn KeyValueStore) -> Result<usize> {
    let Some(raw) = store.get(REGISTRY_STORAGE_KEY).await? else {
        return Ok(0);
    };

    match decode_snapshot(&raw) {
        Ok(items) => {
            let changed = registry.register_items(items);
            debug!(changed, "Hydrated media registry");
            Ok(changed)
        }
        Err(e) => {
            warn!(error = %e, "Ignoring corrupt media registry snapshot");
            Ok(0)
        }
    }
}
