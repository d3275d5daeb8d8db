//! # Core Media
//!
//! Media data model shared by the search, registry and board crates:
//! - [`MediaItem`] tagged union and its [`MediaType`] / [`MediaCategory`]
//! - Search-origin identifier helpers ([`ids`])
//! - Partial updates and no-op detection ([`compare`])

pub mod compare;
pub mod error;
pub mod ids;
pub mod models;

pub use compare::{has_media_item_updates, MediaItemPatch};
pub use error::{MediaError, Result};
pub use ids::{from_search_id, is_search_id, to_search_id, SEARCH_ID_PREFIX};
pub use models::{MediaCategory, MediaDetails, MediaItem, MediaKind, MediaLink, MediaType};
