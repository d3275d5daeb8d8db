//! Enrichment Coordinator
//!
//! Fetches details and artist thumbnails for board items and merges the
//! results into the [`MediaRegistry`].
//!
//! Each item is enriched independently. At most `concurrency` fetches run at
//! once. Provider failures are logged and swallowed: a failed enrichment
//! leaves the item as it was.
//!
//! Thumbnails come from a waterfall of [`ImageSource`]s. Sources that report
//! themselves unconfigured are skipped; the first non-empty URL wins.

use async_trait::async_trait;
use bridge_traits::provider::ProviderResult;
use core_media::{from_search_id, has_media_item_updates, MediaDetails, MediaItem, MediaItemPatch, MediaType};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

use crate::registry::MediaRegistry;

/// Host-implemented details lookup.
#[async_trait]
pub trait DetailsProvider: Send + Sync {
    async fn fetch_details(
        &self,
        id: &str,
        media_type: MediaType,
    ) -> ProviderResult<Option<MediaDetails>>;
}

/// One step of the thumbnail waterfall.
#[async_trait]
pub trait ImageSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// `false` when the host has no credentials for this source.
    fn is_configured(&self) -> bool {
        true
    }

    async fn resolve(&self, item: &MediaItem) -> ProviderResult<Option<String>>;
}

pub struct EnrichmentCoordinator {
    registry: Arc<MediaRegistry>,
    details: Option<Arc<dyn DetailsProvider>>,
    image_sources: Vec<Arc<dyn ImageSource>>,
    permits: Semaphore,
}

impl EnrichmentCoordinator {
    pub fn new(registry: Arc<MediaRegistry>, concurrency: usize) -> Self {
        Self {
            registry,
            details: None,
            image_sources: Vec::new(),
            permits: Semaphore::new(concurrency.max(1)),
        }
    }

    pub fn with_details_provider(mut self, provider: Arc<dyn DetailsProvider>) -> Self {
        self.details = Some(provider);
        self
    }

    /// Append a source to the end of the thumbnail waterfall.
    pub fn with_image_source(mut self, source: Arc<dyn ImageSource>) -> Self {
        self.image_sources.push(source);
        self
    }

    /// Enrich one item.
    ///
    /// Returns the patch that changed the item, or `None` when nothing new
    /// was found. The registry already holds the merged record on return.
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub async fn enrich(&self, item: &MediaItem) -> Option<MediaItemPatch> {
        let Ok(_permit) = self.permits.acquire().await else {
            return None;
        };

        let canonical_id = from_search_id(&item.id);
        let current = self
            .registry
            .get_item(canonical_id)
            .map(|entry| entry.as_ref().clone())
            .unwrap_or_else(|| {
                let mut seed = item.clone();
                seed.id = canonical_id.to_string();
                seed
            });

        let details = match current.populated_details() {
            Some(_) => None,
            None => self.fetch_details(canonical_id, current.media_type()).await,
        };

        let image_url = match (current.media_type(), current.image()) {
            (MediaType::Artist, None) => self.resolve_image(&current).await,
            _ => None,
        };

        let patch = MediaItemPatch::enrichment(details, image_url);
        if !has_media_item_updates(&current, &patch) {
            return None;
        }

        let mut enriched = current;
        patch.apply_to(&mut enriched);
        self.registry.register_item(enriched);
        debug!("Enriched media item");
        Some(patch)
    }

    /// Enrich several items concurrently, bounded by the permit count.
    ///
    /// Returns `(item id, patch)` for every item that changed, ids as given.
    pub async fn enrich_all(&self, items: &[MediaItem]) -> Vec<(String, MediaItemPatch)> {
        let results = join_all(items.iter().map(|item| async move {
            self.enrich(item).await.map(|patch| (item.id.clone(), patch))
        }))
        .await;

        results.into_iter().flatten().collect()
    }

    async fn fetch_details(&self, id: &str, media_type: MediaType) -> Option<MediaDetails> {
        let provider = self.details.as_ref()?;
        match provider.fetch_details(id, media_type).await {
            Ok(details) => details.filter(|d| !d.is_empty()),
            Err(e) => {
                warn!(item_id = %id, media_type = %media_type, error = %e, "Details fetch failed");
                None
            }
        }
    }

    async fn resolve_image(&self, item: &MediaItem) -> Option<String> {
        for source in &self.image_sources {
            if !source.is_configured() {
                debug!(source = source.name(), "Skipping unconfigured image source");
                continue;
            }

            match source.resolve(item).await {
                Ok(Some(url)) if !url.is_empty() => return Some(url),
                Ok(_) => continue,
                Err(e) => {
                    warn!(source = source.name(), item_id = %item.id, error = %e, "Image lookup failed");
                }
            }
        }
        None
    }
}
