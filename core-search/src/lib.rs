//! # Core Search
//!
//! External catalog search for the tier board:
//! - [`lucene`] - escaping and per-term operators
//! - [`query`] - compiles [`SearchParams`] into `{ endpoint, query }`
//! - [`service`] - provider dispatch with the upstream error policy
//! - [`prefs`] - persisted search panel preferences

pub mod error;
pub mod lucene;
pub mod prefs;
pub mod query;
pub mod service;

pub use error::{Result, SearchError};
pub use lucene::LuceneOptions;
pub use prefs::{preference_key, SearchPreferenceStore, SearchPreferences};
pub use query::{build_query, CompiledQuery, SearchFilters, SearchParams};
pub use service::{SearchOutcome, SearchPage, SearchProvider, SearchRequest, SearchService};
