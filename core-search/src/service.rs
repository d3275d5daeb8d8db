//! Search Service
//!
//! Compiles [`SearchParams`] and forwards them to a host [`SearchProvider`].
//! Upstream failures never reach the caller as errors: the panel receives an
//! empty page plus a user-facing message, and the failure is logged and
//! published on the event bus.

use async_trait::async_trait;
use bridge_traits::provider::{ProviderError, ProviderResult};
use core_media::MediaItem;
use core_runtime::config::SearchApiConfig;
use core_runtime::events::{CoreEvent, EventBus, SearchEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::query::{build_query, SearchParams};

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed. Please try again.";

/// Request handed to a search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub endpoint: String,
    pub query: String,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    pub user_agent: String,
}

/// One page of provider results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub results: Vec<MediaItem>,
    pub page: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

impl SearchPage {
    pub fn empty(page: u32) -> Self {
        Self {
            results: Vec::new(),
            page,
            total_pages: 0,
            total_count: 0,
        }
    }
}

/// Host-implemented catalog search.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> ProviderResult<SearchPage>;
}

/// What the search panel renders.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub page: SearchPage,
    /// User-facing failure message; `None` on success
    pub error: Option<String>,
}

impl SearchOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

pub struct SearchService {
    provider: Arc<dyn SearchProvider>,
    config: SearchApiConfig,
    event_bus: EventBus,
}

impl SearchService {
    pub fn new(provider: Arc<dyn SearchProvider>, config: SearchApiConfig, event_bus: EventBus) -> Self {
        Self {
            provider,
            config,
            event_bus,
        }
    }

    /// Build the provider request for `params` at `page`.
    pub fn request_for(&self, params: &SearchParams, page: u32) -> SearchRequest {
        let compiled = build_query(params);
        SearchRequest {
            endpoint: compiled.endpoint,
            query: compiled.query,
            page: page.max(1),
            page_size: self.config.page_size,
            user_agent: self.config.user_agent.clone(),
        }
    }

    #[instrument(skip(self, params), fields(media_type = %params.media_type))]
    pub async fn search(&self, params: &SearchParams, page: u32) -> SearchOutcome {
        let request = self.request_for(params, page);
        debug!(endpoint = %request.endpoint, query = %request.query, "Dispatching search");

        match self.provider.search(&request).await {
            Ok(result) => SearchOutcome {
                page: result,
                error: None,
            },
            Err(err) => self.failure(&request, err),
        }
    }

    fn failure(&self, request: &SearchRequest, err: ProviderError) -> SearchOutcome {
        let rate_limited = err.is_rate_limited();
        warn!(
            endpoint = %request.endpoint,
            page = request.page,
            rate_limited,
            error = %err,
            "Search provider failed"
        );

        let message = user_message(&err).to_string();
        let _ = self.event_bus.emit(CoreEvent::Search(SearchEvent::Failed {
            message: message.clone(),
            rate_limited,
        }));

        SearchOutcome {
            page: SearchPage::empty(request.page),
            error: Some(message),
        }
    }
}

/// Message shown to the user for a provider failure.
pub fn user_message(err: &ProviderError) -> &'static str {
    if err.is_rate_limited() {
        RATE_LIMITED_MESSAGE
    } else {
        SEARCH_FAILED_MESSAGE
    }
}
