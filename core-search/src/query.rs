//! Query compiler
//!
//! Turns structured [`SearchParams`] into a provider endpoint plus a boolean
//! query string in the Lucene dialect used by the music and book catalogs.
//!
//! Fragment order is fixed: free text, artist scoping, tag, date range, then
//! type-specific filters. Fragments are joined with `AND`.

use core_media::MediaType;
use serde::{Deserialize, Serialize};

use crate::lucene::{self, LuceneOptions};

/// Secondary release-group types hidden from album searches unless the user
/// selects secondary types explicitly.
pub const EXCLUDED_SECONDARY_TYPES: &[&str] = &[
    "Compilation",
    "Live",
    "Soundtrack",
    "Spokenword",
    "Interview",
    "Audiobook",
    "Remix",
    "DJ-mix",
    "Demo",
];

/// Provider mapping for one media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMapping {
    /// Field free text is matched against; `None` sends an escaped literal
    /// when no other clause applies
    pub text_field: Option<&'static str>,
    pub endpoint: &'static str,
    /// Field year ranges apply to
    pub date_field: Option<&'static str>,
}

pub fn type_mapping(media_type: MediaType) -> TypeMapping {
    match media_type {
        MediaType::Artist => TypeMapping {
            text_field: Some("artist"),
            endpoint: "artist",
            date_field: Some("begin"),
        },
        MediaType::Album => TypeMapping {
            text_field: Some("releasegroup"),
            endpoint: "release-group",
            date_field: Some("firstreleasedate"),
        },
        MediaType::Song => TypeMapping {
            text_field: Some("recording"),
            endpoint: "recording",
            date_field: Some("firstreleasedate"),
        },
        MediaType::Book => TypeMapping {
            text_field: Some("title"),
            endpoint: "search",
            date_field: Some("first_publish_year"),
        },
        MediaType::Movie => TypeMapping {
            text_field: None,
            endpoint: "movie",
            date_field: None,
        },
        MediaType::Show => TypeMapping {
            text_field: None,
            endpoint: "tv",
            date_field: None,
        },
        MediaType::Game => TypeMapping {
            text_field: None,
            endpoint: "games",
            date_field: None,
        },
    }
}

/// Optional filters. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    /// Exact artist id (album/song); preferred over `artist_name`
    pub artist_id: Option<String>,
    pub artist_name: Option<String>,
    /// Release-group id a song must appear on
    pub album_id: Option<String>,
    /// Release id a song must appear on
    pub release_id: Option<String>,
    pub tag: Option<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    /// Milliseconds
    pub min_duration: Option<u64>,
    pub max_duration: Option<u64>,
    pub primary_types: Vec<String>,
    pub secondary_types: Vec<String>,
    /// Artist category (person, group, ...)
    pub artist_type: Option<String>,
    pub country: Option<String>,
}

/// Everything needed to compile one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub filters: SearchFilters,
    #[serde(default)]
    pub options: LuceneOptions,
}

impl SearchParams {
    pub fn new(media_type: MediaType) -> Self {
        Self {
            media_type,
            query: None,
            filters: SearchFilters::default(),
            options: LuceneOptions::default(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_options(mut self, options: LuceneOptions) -> Self {
        self.options = options;
        self
    }
}

/// Compiled `{ endpoint, query }` pair handed to a search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledQuery {
    pub endpoint: String,
    pub query: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Compile `params` into a provider query.
pub fn build_query(params: &SearchParams) -> CompiledQuery {
    let mapping = type_mapping(params.media_type);
    let filters = &params.filters;
    let mut fragments: Vec<Option<String>> = Vec::new();

    let text = present(&params.query);
    if let Some(text) = text {
        fragments.push(
            mapping
                .text_field
                .and_then(|field| lucene::field_query(field, text, params.options)),
        );
    }

    if matches!(params.media_type, MediaType::Album | MediaType::Song) {
        let scope = match (present(&filters.artist_id), present(&filters.artist_name)) {
            (Some(id), _) => Some(format!("arid:{}", lucene::value(id))),
            (None, Some(name)) => Some(format!("artist:{}", lucene::quote(name))),
            (None, None) => None,
        };
        fragments.push(scope);
    }

    fragments.push(present(&filters.tag).map(|tag| format!("tag:{}", lucene::quote(tag))));

    if let Some(field) = mapping.date_field {
        fragments.push(lucene::range(field, filters.min_year, filters.max_year));
    }

    match params.media_type {
        MediaType::Album => {
            fragments.push(lucene::any_of("primarytype", &filters.primary_types));
            let secondary = lucene::any_of("secondarytype", &filters.secondary_types);
            fragments.push(secondary.or_else(default_secondary_exclusion));
        }
        MediaType::Artist => {
            fragments.push(present(&filters.artist_type).map(|t| format!("type:{}", lucene::value(t))));
            fragments.push(present(&filters.country).map(|c| format!("country:{}", lucene::value(c))));
        }
        MediaType::Song => {
            fragments.push(present(&filters.release_id).map(|id| format!("reid:{}", lucene::value(id))));
            fragments.push(present(&filters.album_id).map(|id| format!("rgid:{}", lucene::value(id))));
            fragments.push(lucene::range("dur", filters.min_duration, filters.max_duration));
        }
        MediaType::Movie | MediaType::Show | MediaType::Book | MediaType::Game => {}
    }

    let mut parts: Vec<String> = fragments
        .into_iter()
        .flatten()
        .filter(|fragment| !fragment.is_empty())
        .collect();

    // Nothing else to search on, so send the literal input.
    if parts.is_empty() {
        if let Some(text) = text {
            parts.push(lucene::escape(text));
        }
    }

    CompiledQuery {
        endpoint: mapping.endpoint.to_string(),
        query: parts.join(" AND "),
    }
}

fn default_secondary_exclusion() -> Option<String> {
    let excluded: Vec<String> = EXCLUDED_SECONDARY_TYPES
        .iter()
        .map(|t| lucene::value(t))
        .collect();
    Some(format!("NOT secondarytype:({})", excluded.join(" OR ")))
}
