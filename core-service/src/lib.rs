//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided collaborators (key-value persistence,
//! search, details and image providers) into the tier board core. Desktop
//! apps typically enable the `desktop-shims` feature, which lets
//! [`CoreConfig`] fall back to the SQLite store from `bridge-desktop`.
//!
//! [`CoreService`] owns the shared [`MediaRegistry`], every open board
//! session and the debounced persistence writer. Board state and the
//! registry are written behind the scenes after each change; call
//! [`CoreService::flush`] before shutdown.

pub mod error;
pub mod persistence;
pub mod share;

pub use error::{CoreError, Result};
pub use persistence::{board_storage_key, PersistenceWriter};
pub use share::{share_key, ShareStore};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bridge_traits::storage::KeyValueStoreExt;
use core_board::{
    BoardAction, BoardSession, DragController, DragKind, PointerGeometry, TierListState,
};
use core_media::{MediaCategory, MediaItemPatch, MediaType};
use core_registry::persist::{encode_snapshot, hydrate};
use core_registry::{
    DetailsProvider, EnrichmentCoordinator, ImageSource, MediaRegistry, REGISTRY_STORAGE_KEY,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, Receiver, CoreEvent};
use core_search::{SearchOutcome, SearchParams, SearchPreferenceStore, SearchPreferences, SearchProvider, SearchService};
use tracing::{debug, info, instrument, warn};

/// Aggregated handle to everything the core needs from its host.
pub struct CoreDependencies {
    pub config: CoreConfig,
    pub search_provider: Option<Arc<dyn SearchProvider>>,
    pub details_provider: Option<Arc<dyn DetailsProvider>>,
    /// Thumbnail waterfall, tried in order
    pub image_sources: Vec<Arc<dyn ImageSource>>,
}

impl CoreDependencies {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config,
            search_provider: None,
            details_provider: None,
            image_sources: Vec::new(),
        }
    }

    pub fn with_search_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.search_provider = Some(provider);
        self
    }

    pub fn with_details_provider(mut self, provider: Arc<dyn DetailsProvider>) -> Self {
        self.details_provider = Some(provider);
        self
    }

    pub fn with_image_source(mut self, source: Arc<dyn ImageSource>) -> Self {
        self.image_sources.push(source);
        self
    }
}

struct BoardHandle {
    session: BoardSession,
    drag: DragController,
}

/// Primary façade exposed to host applications.
pub struct CoreService {
    config: CoreConfig,
    event_bus: EventBus,
    registry: Arc<MediaRegistry>,
    boards: Mutex<HashMap<String, BoardHandle>>,
    search: Option<SearchService>,
    preferences: SearchPreferenceStore,
    enrichment: EnrichmentCoordinator,
    persistence: PersistenceWriter,
    shares: ShareStore,
}

impl CoreService {
    /// Build the service and hydrate the registry from storage.
    ///
    /// An unreadable registry snapshot is logged and the registry starts empty.
    pub async fn bootstrap(deps: CoreDependencies) -> Result<Self> {
        let CoreDependencies {
            config,
            search_provider,
            details_provider,
            image_sources,
        } = deps;

        let event_bus = EventBus::default();
        let store = Arc::clone(&config.key_value_store);
        let registry = Arc::new(MediaRegistry::new(config.registry).with_event_bus(event_bus.clone()));

        match hydrate(&registry, store.as_ref()).await {
            Ok(count) => debug!(count, "Media registry hydrated"),
            Err(e) => warn!(error = %e, "Media registry hydration failed"),
        }

        let mut enrichment = EnrichmentCoordinator::new(Arc::clone(&registry), config.enrichment_concurrency);
        if let Some(provider) = details_provider {
            enrichment = enrichment.with_details_provider(provider);
        }
        for source in image_sources {
            enrichment = enrichment.with_image_source(source);
        }

        let search = search_provider
            .map(|provider| SearchService::new(provider, config.search.clone(), event_bus.clone()));

        info!(
            registry_size = registry.len(),
            search = search.is_some(),
            "Core service ready"
        );

        Ok(Self {
            persistence: PersistenceWriter::new(
                Arc::clone(&store),
                config.persistence_debounce,
                event_bus.clone(),
            ),
            preferences: SearchPreferenceStore::new(Arc::clone(&store)),
            shares: ShareStore::new(store),
            config,
            event_bus,
            registry,
            boards: Mutex::new(HashMap::new()),
            search,
            enrichment,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    pub fn registry(&self) -> Arc<MediaRegistry> {
        Arc::clone(&self.registry)
    }

    fn boards(&self) -> MutexGuard<'_, HashMap<String, BoardHandle>> {
        self.boards.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Boards
    // ------------------------------------------------------------------

    /// Open `board_id`, loading its saved state or starting a default board.
    ///
    /// Opening an already open board returns its current state.
    #[instrument(skip(self))]
    pub async fn open_board(&self, board_id: &str) -> Result<TierListState> {
        if let Some(handle) = self.boards().get(board_id) {
            return Ok(handle.session.state().clone());
        }

        let key = board_storage_key(board_id);
        let state = match self.config.key_value_store.get_json::<TierListState>(&key).await {
            Ok(Some(mut state)) => {
                state.normalize();
                state
            }
            Ok(None) => TierListState::default(),
            Err(e) => {
                warn!(key = %key, error = %e, "Saved board unreadable, starting fresh");
                TierListState::default()
            }
        };
        self.registry.register_items(state.all_items().cloned());

        let session = BoardSession::new(board_id, state, self.config.history_limit)
            .with_event_bus(self.event_bus.clone())
            .with_registry(Arc::clone(&self.registry));

        let mut boards = self.boards();
        let handle = boards.entry(board_id.to_string()).or_insert(BoardHandle {
            session,
            drag: DragController::new(),
        });
        Ok(handle.session.state().clone())
    }

    pub fn close_board(&self, board_id: &str) -> bool {
        self.boards().remove(board_id).is_some()
    }

    pub fn open_boards(&self) -> Vec<String> {
        self.boards().keys().cloned().collect()
    }

    /// Run `f` against an open board and persist the result if it changed.
    fn with_board<R>(&self, board_id: &str, f: impl FnOnce(&mut BoardHandle) -> R) -> Result<R> {
        let registry_version = self.registry.version();
        let (result, snapshot) = {
            let mut boards = self.boards();
            let handle = boards
                .get_mut(board_id)
                .ok_or_else(|| CoreError::BoardNotFound(board_id.to_string()))?;
            let revision = handle.session.revision();
            let result = f(handle);
            let snapshot =
                (handle.session.revision() != revision).then(|| handle.session.state().clone());
            (result, snapshot)
        };

        if let Some(state) = snapshot {
            self.schedule_board(board_id, &state);
        }
        if self.registry.version() != registry_version {
            self.schedule_registry();
        }
        Ok(result)
    }

    fn schedule_board(&self, board_id: &str, state: &TierListState) {
        match serde_json::to_string(state) {
            Ok(json) => self.persistence.schedule(board_storage_key(board_id), json),
            Err(e) => warn!(board_id, error = %e, "Board snapshot not serializable"),
        }
    }

    fn schedule_registry(&self) {
        match encode_snapshot(&self.registry) {
            Ok(json) => self.persistence.schedule(REGISTRY_STORAGE_KEY, json),
            Err(e) => warn!(error = %e, "Registry snapshot not serializable"),
        }
    }

    pub fn board_state(&self, board_id: &str) -> Result<TierListState> {
        self.with_board(board_id, |handle| handle.session.state().clone())
    }

    pub fn dispatch(&self, board_id: &str, action: BoardAction) -> Result<bool> {
        self.with_board(board_id, |handle| handle.session.dispatch(action))
    }

    pub fn undo(&self, board_id: &str) -> Result<bool> {
        self.with_board(board_id, |handle| handle.session.undo())
    }

    pub fn redo(&self, board_id: &str) -> Result<bool> {
        self.with_board(board_id, |handle| handle.session.redo())
    }

    /// Replace a board with imported JSON. The board is unchanged on error.
    pub fn import_board(&self, board_id: &str, json: &str) -> Result<()> {
        self.with_board(board_id, |handle| handle.session.import_json(json))??;
        Ok(())
    }

    pub fn export_board(&self, board_id: &str) -> Result<String> {
        let clock = Arc::clone(&self.config.clock);
        let export = self.with_board(board_id, |handle| handle.session.export(clock.as_ref()))?;
        Ok(serde_json::to_string_pretty(&export)?)
    }

    // ------------------------------------------------------------------
    // Drag and drop
    // ------------------------------------------------------------------

    pub fn drag_start(&self, board_id: &str, active_id: &str, kind: DragKind) -> Result<()> {
        self.with_board(board_id, |handle| {
            handle.drag.drag_start(&mut handle.session, active_id, kind)
        })
    }

    /// Queue a drag-over move; applied on the next [`flush_drag`](Self::flush_drag).
    pub fn drag_over(
        &self,
        board_id: &str,
        over_id: &str,
        geometry: Option<PointerGeometry>,
    ) -> Result<bool> {
        self.with_board(board_id, |handle| {
            handle.drag.drag_over(&handle.session, over_id, geometry)
        })
    }

    /// Apply queued drag moves. Hosts call this once per frame.
    pub fn flush_drag(&self, board_id: &str) -> Result<usize> {
        self.with_board(board_id, |handle| handle.drag.flush(&mut handle.session))
    }

    pub fn drag_end(
        &self,
        board_id: &str,
        over_id: Option<&str>,
        geometry: Option<PointerGeometry>,
    ) -> Result<bool> {
        self.with_board(board_id, |handle| {
            handle.drag.drag_end(&mut handle.session, over_id, geometry)
        })
    }

    pub fn drag_cancel(&self, board_id: &str) -> Result<()> {
        self.with_board(board_id, |handle| handle.drag.drag_cancel(&mut handle.session))
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Run a search. Results are registered so later drags merge with them.
    pub async fn search(&self, params: &SearchParams, page: u32) -> Result<SearchOutcome> {
        let search = self.search.as_ref().ok_or_else(|| CoreError::CapabilityMissing {
            capability: "SearchProvider".to_string(),
            message: "No search provider was supplied to CoreDependencies".to_string(),
        })?;

        let outcome = search.search(params, page).await;
        if self.registry.register_items(outcome.page.results.iter().cloned()) > 0 {
            self.schedule_registry();
        }
        Ok(outcome)
    }

    pub async fn search_preferences(
        &self,
        category: MediaCategory,
        media_type: MediaType,
    ) -> SearchPreferences {
        self.preferences.load(category, media_type).await
    }

    pub async fn save_search_preferences(
        &self,
        category: MediaCategory,
        media_type: MediaType,
        prefs: &SearchPreferences,
    ) -> Result<()> {
        Ok(self.preferences.save(category, media_type, prefs).await?)
    }

    // ------------------------------------------------------------------
    // Enrichment
    // ------------------------------------------------------------------

    /// Enrich every item on a board. Returns how many items changed.
    #[instrument(skip(self))]
    pub async fn enrich_board(&self, board_id: &str) -> Result<usize> {
        let items = self.with_board(board_id, |handle| {
            handle.session.state().all_items().cloned().collect::<Vec<_>>()
        })?;

        let patches: Vec<(String, MediaItemPatch)> = self.enrichment.enrich_all(&items).await;
        if patches.is_empty() {
            return Ok(0);
        }

        // The board may have been closed while fetches were in flight.
        let applied = self
            .with_board(board_id, |handle| {
                patches
                    .into_iter()
                    .filter(|(item_id, patch)| {
                        handle.session.apply_transient(BoardAction::UpdateMediaItem {
                            item_id: item_id.clone(),
                            patch: patch.clone(),
                        })
                    })
                    .count()
            })
            .unwrap_or(0);

        self.schedule_registry();
        debug!(applied, "Board enrichment applied");
        Ok(applied)
    }

    // ------------------------------------------------------------------
    // Sharing and persistence
    // ------------------------------------------------------------------

    pub async fn share_board(&self, board_id: &str) -> Result<String> {
        let state = self.board_state(board_id)?;
        self.shares.share_board(&state).await
    }

    pub async fn load_shared(&self, share_id: &str) -> Result<Option<TierListState>> {
        self.shares.load_shared(share_id).await
    }

    /// Write every open board and the registry now.
    pub async fn flush(&self) -> usize {
        let snapshots: Vec<(String, TierListState)> = self
            .boards()
            .iter()
            .map(|(id, handle)| (id.clone(), handle.session.state().clone()))
            .collect();
        for (board_id, state) in &snapshots {
            self.schedule_board(board_id, state);
        }
        self.schedule_registry();
        self.persistence.flush().await
    }
}
