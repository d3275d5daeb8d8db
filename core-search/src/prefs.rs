//! Search panel preferences
//!
//! Persisted per category and media type under `search-prefs:{category}:{type}`.

use bridge_traits::storage::{KeyValueStore, KeyValueStoreExt};
use core_media::{MediaCategory, MediaType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Result, SearchError};
use crate::lucene::LuceneOptions;
use crate::query::{SearchFilters, SearchParams};

pub const PREFERENCES_KEY_PREFIX: &str = "search-prefs";

pub fn preference_key(category: MediaCategory, media_type: MediaType) -> String {
    format!("{}:{}:{}", PREFERENCES_KEY_PREFIX, category, media_type)
}

/// Saved panel state for one category/type pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchPreferences {
    pub options: LuceneOptions,
    pub filters: SearchFilters,
}

impl SearchPreferences {
    /// Params for `query` seeded from these preferences.
    pub fn to_params(&self, media_type: MediaType, query: Option<String>) -> SearchParams {
        SearchParams {
            media_type,
            query,
            filters: self.filters.clone(),
            options: self.options,
        }
    }
}

pub struct SearchPreferenceStore {
    store: Arc<dyn KeyValueStore>,
}

impl SearchPreferenceStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Saved preferences, or defaults when nothing (or garbage) is stored.
    pub async fn load(&self, category: MediaCategory, media_type: MediaType) -> SearchPreferences {
        let key = preference_key(category, media_type);
        match self.store.get_json::<SearchPreferences>(&key).await {
            Ok(Some(prefs)) => prefs,
            Ok(None) => SearchPreferences::default(),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding unreadable search preferences");
                SearchPreferences::default()
            }
        }
    }

    pub async fn save(
        &self,
        category: MediaCategory,
        media_type: MediaType,
        prefs: &SearchPreferences,
    ) -> Result<()> {
        category
            .ensure_offers(media_type)
            .map_err(|e| SearchError::InvalidParams(e.to_string()))?;

        let key = preference_key(category, media_type);
        self.store.set_json(&key, prefs).await?;
        debug!(key = %key, "Saved search preferences");
        Ok(())
    }
}
