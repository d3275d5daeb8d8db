//! # Core Configuration Module
//!
//! Provides configuration management for the tier board core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the persistence bridge and the tunables of the registry,
//! history, persistence debounce, search and enrichment. It enforces fail-fast
//! validation so a misconfigured core never starts.
//!
//! ## Required Dependencies
//!
//! - `KeyValueStore` - Required for board, registry and preference persistence
//!
//! When the `desktop-shims` feature is enabled, a SQLite-backed store is
//! injected automatically if none is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use bridge_traits::InMemoryKeyValueStore;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .key_value_store(Arc::new(InMemoryKeyValueStore::new()))
//!     .history_limit(100)
//!     .persistence_debounce_ms(250)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // Without desktop-shims this panics with an actionable error message
//! # #[cfg(feature = "desktop-shims")]
//! # panic!("desktop-shims injects a default store");
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing required bridges");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{Clock, KeyValueStore, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Registry ceiling used when none is configured.
pub const DEFAULT_REGISTRY_MAX_ENTRIES: usize = 2000;

/// Number of oldest entries dropped once the ceiling is crossed.
pub const DEFAULT_REGISTRY_EVICTION_BATCH: usize = 200;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

pub const DEFAULT_PERSISTENCE_DEBOUNCE_MS: u64 = 500;

pub const DEFAULT_ENRICHMENT_CONCURRENCY: usize = 4;

/// Core configuration for the tier board core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Persistence bridge (required)
    pub key_value_store: Arc<dyn KeyValueStore>,

    /// Time source for export timestamps
    pub clock: Arc<dyn Clock>,

    /// Media registry bounds
    pub registry: RegistryConfig,

    /// Maximum number of undo snapshots kept per board
    pub history_limit: usize,

    /// Quiet period before queued persistence writes are flushed
    pub persistence_debounce: Duration,

    /// External search configuration
    pub search: SearchApiConfig,

    /// Maximum number of concurrent enrichment fetches
    pub enrichment_concurrency: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("key_value_store", &"KeyValueStore { ... }")
            .field("registry", &self.registry)
            .field("history_limit", &self.history_limit)
            .field("persistence_debounce", &self.persistence_debounce)
            .field("search", &self.search)
            .field("enrichment_concurrency", &self.enrichment_concurrency)
            .finish()
    }
}

/// Bounds of the media registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Entry count above which eviction runs
    pub max_entries: usize,
    /// Number of oldest-inserted entries removed per eviction
    pub eviction_batch: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_REGISTRY_MAX_ENTRIES,
            eviction_batch: DEFAULT_REGISTRY_EVICTION_BATCH,
        }
    }
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.eviction_batch == 0 {
            return Err(Error::Config(
                "Registry eviction batch must be greater than 0".to_string(),
            ));
        }

        if self.max_entries <= self.eviction_batch {
            return Err(Error::Config(format!(
                "Registry ceiling ({}) must exceed the eviction batch ({})",
                self.max_entries, self.eviction_batch
            )));
        }

        Ok(())
    }
}

/// Configuration for external search providers.
///
/// # Example
///
/// ```no_run
/// use core_runtime::config::SearchApiConfig;
///
/// let config = SearchApiConfig::new()
///     .with_user_agent("MyBoard/2.0 (contact@example.com)")
///     .with_page_size(50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchApiConfig {
    /// User agent sent to catalogs that require identification.
    ///
    /// Format: "ApplicationName/Version (Contact)"
    /// See: https://musicbrainz.org/doc/MusicBrainz_API/Rate_Limiting
    pub user_agent: String,

    /// Fixed number of results requested per page
    pub page_size: u32,
}

impl Default for SearchApiConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchApiConfig {
    pub fn new() -> Self {
        Self {
            user_agent: "TierBoard/0.1 (https://github.com/tierboard)".to_string(),
            page_size: 25,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        let ua = &self.user_agent;
        if ua.trim().is_empty() {
            return Err(Error::Config("Search user agent cannot be empty".to_string()));
        }
        if !ua.contains('/') || !ua.contains('(') || !ua.contains(')') {
            return Err(Error::Config(
                "Search user agent must follow format: 'AppName/Version (Contact)'".to_string(),
            ));
        }

        if self.page_size == 0 || self.page_size > 100 {
            return Err(Error::Config(
                "Search page size must be between 1 and 100".to_string(),
            ));
        }

        Ok(())
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.registry.validate()?;
        self.search.validate()?;

        if self.history_limit == 0 || self.history_limit > 500 {
            return Err(Error::Config(
                "History limit must be between 1 and 500".to_string(),
            ));
        }

        if self.persistence_debounce > Duration::from_secs(60) {
            return Err(Error::Config(
                "Persistence debounce exceeds maximum of 60 seconds (60,000ms)".to_string(),
            ));
        }

        if self.enrichment_concurrency == 0 || self.enrichment_concurrency > 16 {
            return Err(Error::Config(
                "Enrichment concurrency must be between 1 and 16".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn key_value_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "KeyValueStore".to_string(),
        message: "KeyValueStore implementation is required for board and registry persistence. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default SqliteKeyValueStore. \
                 Web: inject a localStorage-based store. \
                 Server: inject a remote key-value store."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_key_value_store(data_dir: Option<&PathBuf>) -> Result<Arc<dyn KeyValueStore>> {
    use bridge_desktop::{default_database_path, SqliteKeyValueStore, DATABASE_FILE_NAME};
    use std::thread;
    use tokio::runtime::{Handle, Runtime};

    let candidate = data_dir
        .map(|dir| dir.join(DATABASE_FILE_NAME))
        .unwrap_or_else(default_database_path);

    let init_store = |path: PathBuf| -> Result<_> {
        let runtime = Runtime::new().map_err(|e| {
            Error::Internal(format!(
                "Failed to create Tokio runtime for default key-value store: {}",
                e
            ))
        })?;

        runtime
            .block_on(SqliteKeyValueStore::new(path))
            .map_err(|e| {
                Error::Internal(format!("Failed to initialize default KeyValueStore: {}", e))
            })
    };

    let store = match Handle::try_current() {
        Ok(_) => {
            let path = candidate.clone();
            thread::spawn(move || init_store(path))
                .join()
                .map_err(|_| {
                    Error::Internal(
                        "Worker thread panicked while creating default KeyValueStore".to_string(),
                    )
                })??
        }
        Err(_) => init_store(candidate)?,
    };

    let store: Arc<dyn KeyValueStore> = Arc::new(store);
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_key_value_store(_data_dir: Option<&PathBuf>) -> Result<Arc<dyn KeyValueStore>> {
    Err(key_value_store_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    key_value_store: Option<Arc<dyn KeyValueStore>>,
    data_dir: Option<PathBuf>,
    clock: Option<Arc<dyn Clock>>,
    registry: Option<RegistryConfig>,
    history_limit: Option<usize>,
    persistence_debounce_ms: Option<u64>,
    search: Option<SearchApiConfig>,
    enrichment_concurrency: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the persistence bridge.
    pub fn key_value_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.key_value_store = Some(store);
        self
    }

    /// Directory for the default desktop store (ignored when a store is injected).
    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    pub fn persistence_debounce_ms(mut self, delay_ms: u64) -> Self {
        self.persistence_debounce_ms = Some(delay_ms);
        self
    }

    pub fn search(mut self, search: SearchApiConfig) -> Self {
        self.search = Some(search);
        self
    }

    pub fn enrichment_concurrency(mut self, limit: usize) -> Self {
        self.enrichment_concurrency = Some(limit);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<CoreConfig> {
        let key_value_store = match self.key_value_store {
            Some(store) => store,
            None => provide_default_key_value_store(self.data_dir.as_ref())?,
        };

        let config = CoreConfig {
            key_value_store,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            registry: self.registry.unwrap_or_default(),
            history_limit: self.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
            persistence_debounce: Duration::from_millis(
                self.persistence_debounce_ms
                    .unwrap_or(DEFAULT_PERSISTENCE_DEBOUNCE_MS),
            ),
            search: self.search.unwrap_or_default(),
            enrichment_concurrency: self
                .enrichment_concurrency
                .unwrap_or(DEFAULT_ENRICHMENT_CONCURRENCY),
        };

        config.validate()?;

        Ok(config)
    }
}
