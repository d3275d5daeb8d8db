//! Media Registry
//!
//! Process-wide merge cache from item id to the most enriched record seen for
//! that id, shared by every board.
//!
//! ## Eviction
//!
//! Entries are kept in insertion order. After a batch that changed anything,
//! if the entry count exceeds `max_entries`, the `eviction_batch` oldest
//! entries are dropped. Updating an entry does not move it, so this is FIFO
//! rather than LRU.
//!
//! ## Consistency
//!
//! Each batch runs read-merge-write under one write lock, so concurrent
//! enrichment results for the same id cannot lose updates.

use core_media::MediaItem;
use core_runtime::config::RegistryConfig;
use core_runtime::events::{CoreEvent, EventBus, RegistryEvent};
use lru::LruCache;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, trace};

use crate::merge::merge_media_item;

struct RegistryInner {
    /// Most recently inserted entries sit at the MRU end; `peek*` is used
    /// everywhere so reads and updates never reorder.
    entries: LruCache<String, Arc<MediaItem>>,
    version: u64,
}

pub struct MediaRegistry {
    inner: RwLock<RegistryInner>,
    config: RegistryConfig,
    event_bus: Option<EventBus>,
}

impl MediaRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                entries: LruCache::unbounded(),
                version: 0,
            }),
            config,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register one item. Returns whether the registry changed.
    pub fn register_item(&self, item: MediaItem) -> bool {
        self.register_items(std::iter::once(item)) > 0
    }

    /// Register a batch of items. Returns how many entries were inserted or
    /// updated. Items without an id are skipped.
    pub fn register_items<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = MediaItem>,
    {
        let mut guard = self.write();
        let inner = &mut *guard;
        let mut changed = 0;

        for item in items {
            if item.id.is_empty() {
                trace!(title = %item.title, "Skipping media item without id");
                continue;
            }

            match inner.entries.peek_mut(&item.id) {
                Some(existing) => {
                    if let Some(merged) = merge_media_item(existing, &item) {
                        *existing = Arc::new(merged);
                        changed += 1;
                    }
                }
                None => {
                    inner.entries.put(item.id.clone(), Arc::new(item));
                    changed += 1;
                }
            }
        }

        if changed == 0 {
            return 0;
        }

        inner.version += 1;
        let evicted = self.evict_overflow(inner);
        let size = inner.entries.len();
        drop(guard);

        debug!(changed, size, "Media registry updated");
        self.emit(RegistryEvent::Updated { changed, size });
        if evicted > 0 {
            info!(evicted, size, "Evicted oldest media registry entries");
            self.emit(RegistryEvent::Evicted {
                count: evicted,
                size,
            });
        }

        changed
    }

    fn evict_overflow(&self, inner: &mut RegistryInner) -> usize {
        if inner.entries.len() <= self.config.max_entries {
            return 0;
        }

        let mut evicted = 0;
        while evicted < self.config.eviction_batch && inner.entries.pop_lru().is_some() {
            evicted += 1;
        }
        evicted
    }

    /// Current entry for `id`. The returned `Arc` stays stable until the
    /// entry is materially updated.
    pub fn get_item(&self, id: &str) -> Option<Arc<MediaItem>> {
        self.read().entries.peek(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().entries.contains(id)
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bumped once per batch that changed the registry.
    pub fn version(&self) -> u64 {
        self.read().version
    }

    pub fn clear(&self) {
        let mut inner = self.write();
        if inner.entries.is_empty() {
            return;
        }
        inner.entries.clear();
        inner.version += 1;
        drop(inner);

        info!("Media registry cleared");
        self.emit(RegistryEvent::Cleared);
    }

    /// Entries from oldest to newest insertion.
    pub fn snapshot(&self) -> Vec<MediaItem> {
        self.read()
            .entries
            .iter()
            .rev()
            .map(|(_, item)| item.as_ref().clone())
            .collect()
    }

    fn emit(&self, event: RegistryEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Registry(event));
        }
    }
}

impl Default for MediaRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_media::{MediaKind, MediaType};

    fn item(id: &str) -> MediaItem {
        MediaItem::new(id, format!("Title {}", id), MediaKind::empty(MediaType::Artist))
    }

    #[test]
    fn test_register_and_get() {
        let registry = MediaRegistry::default();
        assert!(registry.register_item(item("a")));
        assert_eq!(registry.get_item("a").unwrap().title, "Title a");
        assert_eq!(registry.len(), 1);
        assert!(registry.get_item("missing").is_none());
    }

    #[test]
    fn test_identical_registration_is_stable() {
        let registry = MediaRegistry::default();
        registry.register_item(item("a").with_image_url("https://img/a.jpg"));
        let before = registry.get_item("a").unwrap();
        let version = registry.version();

        assert!(!registry.register_item(item("a").with_image_url("https://img/a.jpg")));
        assert!(!registry.register_item(item("a")));

        assert!(Arc::ptr_eq(&before, &registry.get_item("a").unwrap()));
        assert_eq!(registry.version(), version);
    }

    #[test]
    fn test_missing_id_skipped() {
        let registry = MediaRegistry::default();
        let changed = registry.register_items(vec![item(""), item("b")]);
        assert_eq!(changed, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_eviction_drops_oldest_batch() {
        let registry = MediaRegistry::default();
        for i in 0..=2000 {
            registry.register_item(item(&format!("item-{}", i)));
        }

        assert_eq!(registry.len(), 1801);
        for i in 0..200 {
            assert!(!registry.contains(&format!("item-{}", i)));
        }
        assert!(registry.contains("item-200"));
        assert!(registry.contains("item-2000"));
    }

    #[test]
    fn test_update_does_not_refresh_insertion_order() {
        let registry = MediaRegistry::new(RegistryConfig {
            max_entries: 3,
            eviction_batch: 1,
        });
        registry.register_items(vec![item("a"), item("b"), item("c")]);
        registry.register_item(item("a").with_image_url("https://img/a.jpg"));
        registry.register_item(item("d"));

        assert!(!registry.contains("a"));
        assert_eq!(
            registry.snapshot().iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
            vec!["b", "c", "d"]
        );
    }

    #[test]
    fn test_clear_emits_event() {
        let bus = EventBus::new(8);
        let mut events = bus.subscribe();
        let registry = MediaRegistry::default().with_event_bus(bus);

        registry.register_item(item("a"));
        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(
            events.try_recv().unwrap(),
            CoreEvent::Registry(RegistryEvent::Updated {
                changed: 1,
                size: 1
            })
        );
        assert_eq!(events.try_recv().unwrap(), CoreEvent::Registry(RegistryEvent::Cleared));
    }
}
