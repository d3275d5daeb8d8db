//! Search-origin identifiers
//!
//! Items dragged out of the search panel carry a marker-prefixed id until they
//! land on the board. Provider ids are assumed never to start with the marker.

/// Reserved marker for ids of not-yet-committed search results.
pub const SEARCH_ID_PREFIX: &str = "search-";

/// Prefix `id` with the search marker. Already-prefixed ids are returned as-is.
pub fn to_search_id(id: &str) -> String {
    if is_search_id(id) {
        id.to_string()
    } else {
        format!("{}{}", SEARCH_ID_PREFIX, id)
    }
}

/// Strip the search marker, returning canonical ids unchanged.
pub fn from_search_id(id: &str) -> &str {
    id.strip_prefix(SEARCH_ID_PREFIX).unwrap_or(id)
}

pub fn is_search_id(id: &str) -> bool {
    id.starts_with(SEARCH_ID_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_search_id_is_idempotent() {
        let once = to_search_id("b1bc7f3c");
        assert_eq!(once, "search-b1bc7f3c");
        assert_eq!(to_search_id(&once), once);
    }

    #[test]
    fn test_from_search_id() {
        assert_eq!(from_search_id("search-abc"), "abc");
        assert_eq!(from_search_id("abc"), "abc");
        assert_eq!(from_search_id(""), "");
    }

    #[test]
    fn test_is_search_id() {
        assert!(is_search_id("search-abc"));
        assert!(!is_search_id("abc"));
        assert!(!is_search_id("research-abc"));
    }
}
