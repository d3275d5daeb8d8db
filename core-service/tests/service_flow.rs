//! End-to-end flows through the core service façade.

use bridge_traits::provider::{ProviderError, ProviderResult};
use bridge_traits::{InMemoryKeyValueStore, KeyValueStore};
use core_board::{BoardAction, DragKind};
use core_media::{MediaCategory, MediaDetails, MediaItem, MediaKind, MediaType};
use core_registry::DetailsProvider;
use core_runtime::config::CoreConfig;
use core_search::{SearchPage, SearchParams, SearchPreferences, SearchProvider, SearchRequest};
use core_service::{board_storage_key, CoreDependencies, CoreError, CoreService};
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;

mock! {
    pub Search {}

    #[async_trait::async_trait]
    impl SearchProvider for Search {
        async fn search(&self, request: &SearchRequest) -> ProviderResult<SearchPage>;
    }
}

mock! {
    pub Details {}

    #[async_trait::async_trait]
    impl DetailsProvider for Details {
        async fn fetch_details(&self, id: &str, media_type: MediaType) -> ProviderResult<Option<MediaDetails>>;
    }
}

fn album(id: &str, title: &str) -> MediaItem {
    MediaItem::new(id, title, MediaKind::empty(MediaType::Album))
}

fn config(store: Arc<InMemoryKeyValueStore>) -> CoreConfig {
    CoreConfig::builder()
        .key_value_store(store)
        .persistence_debounce_ms(500)
        .build()
        .unwrap()
}

async fn service(store: Arc<InMemoryKeyValueStore>) -> CoreService {
    CoreService::bootstrap(CoreDependencies::new(config(store)))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_board_survives_restart() {
    let store = Arc::new(InMemoryKeyValueStore::new());
    let core = service(store.clone()).await;

    core.open_board("main").await.unwrap();
    core.dispatch("main", BoardAction::SetTitle { title: "90s Albums".to_string() })
        .unwrap();
    assert!(core.flush().await >= 2);
    assert!(store.has_key(&board_storage_key("main")).await.unwrap());
    drop(core);

    let restarted = service(store).await;
    let state = restarted.open_board("main").await.unwrap();
    assert_eq!(state.title, "90s Albums");
}

#[tokio::test(start_paused = true)]
async fn test_changes_written_after_debounce() {
    let store = Arc::new(InMemoryKeyValueStore::new());
    let core = service(store.clone()).await;
    core.open_board("main").await.unwrap();

    core.dispatch("main", BoardAction::AddTier { label: None }).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!store.has_key("tierlist:main").await.unwrap());

    tokio::time::sleep(Duration::from_millis(500)).await;
    let saved = store.get("tierlist:main").await.unwrap().unwrap();
    assert!(saved.contains("New Tier"));
}

#[tokio::test]
async fn test_unknown_board_is_an_error() {
    let core = service(Arc::new(InMemoryKeyValueStore::new())).await;
    let err = core.undo("nope").unwrap_err();
    assert!(matches!(err, CoreError::BoardNotFound(_)));
}

#[tokio::test]
async fn test_search_requires_provider() {
    let core = service(Arc::new(InMemoryKeyValueStore::new())).await;
    let err = core
        .search(&SearchParams::new(MediaType::Album).with_query("Blue Lines"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::CapabilityMissing { .. }));
}

#[tokio::test]
async fn test_search_then_drag_onto_board() {
    let mut provider = MockSearch::new();
    provider.expect_search().returning(|request| {
        Ok(SearchPage {
            results: vec![album("rg-7", "Blue Lines")],
            page: request.page,
            total_pages: 1,
            total_count: 1,
        })
    });

    let store = Arc::new(InMemoryKeyValueStore::new());
    let deps = CoreDependencies::new(config(store)).with_search_provider(Arc::new(provider));
    let core = CoreService::bootstrap(deps).await.unwrap();
    let board = core.open_board("main").await.unwrap();
    let s_tier = board.tier_defs[0].id.clone();

    let outcome = core
        .search(&SearchParams::new(MediaType::Album).with_query("Blue Lines"), 1)
        .await
        .unwrap();
    assert!(outcome.is_success());
    assert!(core.registry().contains("rg-7"));

    let found = outcome.page.results[0].clone();
    core.drag_start(
        "main",
        "search-rg-7",
        DragKind::Item {
            item: found,
            source_tier: None,
        },
    )
    .unwrap();
    assert!(core.drag_over("main", &s_tier, None).unwrap());
    assert_eq!(core.flush_drag("main").unwrap(), 1);
    assert!(core.drag_end("main", Some("search-rg-7"), None).unwrap());

    let state = core.board_state("main").unwrap();
    assert_eq!(state.items_in(&s_tier)[0].id, "rg-7");
    assert!(core.undo("main").unwrap());
    assert_eq!(core.board_state("main").unwrap().item_count(), 0);
}

#[tokio::test]
async fn test_enrichment_updates_board_items() {
    let mut details = MockDetails::new();
    details.expect_fetch_details().returning(|_, _| {
        Ok(Some(MediaDetails {
            description: Some("Debut album".to_string()),
            ..MediaDetails::default()
        }))
    });

    let store = Arc::new(InMemoryKeyValueStore::new());
    let deps = CoreDependencies::new(config(store)).with_details_provider(Arc::new(details));
    let core = CoreService::bootstrap(deps).await.unwrap();
    let board = core.open_board("main").await.unwrap();

    core.dispatch(
        "main",
        BoardAction::MoveItem {
            active_id: "rg-7".to_string(),
            over_id: board.tier_defs[1].id.clone(),
            source_tier_hint: None,
            item: Some(album("rg-7", "Blue Lines")),
            insert_below: false,
        },
    )
    .unwrap();

    assert_eq!(core.enrich_board("main").await.unwrap(), 1);
    let state = core.board_state("main").unwrap();
    let item = state.get_item("rg-7").unwrap();
    assert_eq!(
        item.details.as_ref().and_then(|d| d.description.as_deref()),
        Some("Debut album")
    );
    assert!(core.registry().get_item("rg-7").unwrap().details.is_some());
}

#[tokio::test]
async fn test_enrichment_failures_leave_board_alone() {
    let mut details = MockDetails::new();
    details
        .expect_fetch_details()
        .returning(|_, _| Err(ProviderError::Network("offline".to_string())));

    let store = Arc::new(InMemoryKeyValueStore::new());
    let deps = CoreDependencies::new(config(store)).with_details_provider(Arc::new(details));
    let core = CoreService::bootstrap(deps).await.unwrap();
    let board = core.open_board("main").await.unwrap();
    core.dispatch(
        "main",
        BoardAction::MoveItem {
            active_id: "rg-1".to_string(),
            over_id: board.tier_defs[0].id.clone(),
            source_tier_hint: None,
            item: Some(album("rg-1", "Dummy")),
            insert_below: false,
        },
    )
    .unwrap();

    assert_eq!(core.enrich_board("main").await.unwrap(), 0);
}

#[tokio::test]
async fn test_export_import_and_share() {
    let core = service(Arc::new(InMemoryKeyValueStore::new())).await;
    core.open_board("a").await.unwrap();
    core.open_board("b").await.unwrap();
    core.dispatch("a", BoardAction::SetTitle { title: "Exported".to_string() })
        .unwrap();

    let json = core.export_board("a").unwrap();
    core.import_board("b", &json).unwrap();
    assert_eq!(core.board_state("b").unwrap().title, "Exported");

    let err = core.import_board("b", "{\"bad\": 1}").unwrap_err();
    assert_eq!(err.to_string(), "Board error: Invalid tier list format");
    assert_eq!(core.board_state("b").unwrap().title, "Exported");

    let share_id = core.share_board("b").await.unwrap();
    let shared = core.load_shared(&share_id).await.unwrap().unwrap();
    assert_eq!(shared.title, "Exported");
    assert!(core.load_shared("unknown").await.unwrap().is_none());
}

#[tokio::test]
async fn test_search_preferences_round_trip() {
    let core = service(Arc::new(InMemoryKeyValueStore::new())).await;
    let mut prefs = SearchPreferences::default();
    prefs.options.fuzzy = true;
    prefs.filters.min_year = Some(1991);

    core.save_search_preferences(MediaCategory::Music, MediaType::Album, &prefs)
        .await
        .unwrap();
    assert_eq!(
        core.search_preferences(MediaCategory::Music, MediaType::Album).await,
        prefs
    );

    let err = core
        .save_search_preferences(MediaCategory::Music, MediaType::Movie, &prefs)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Search(_)));
}
