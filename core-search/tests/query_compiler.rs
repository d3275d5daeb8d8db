//! End-to-end query compilation for every media type.

use core_media::{MediaCategory, MediaType};
use core_search::{build_query, LuceneOptions, SearchFilters, SearchParams};

#[test]
fn test_every_type_has_an_endpoint() {
    let endpoints: Vec<(MediaType, String)> = MediaType::ALL
        .into_iter()
        .map(|t| (t, build_query(&SearchParams::new(t)).endpoint))
        .collect();

    assert!(endpoints.contains(&(MediaType::Artist, "artist".to_string())));
    assert!(endpoints.contains(&(MediaType::Album, "release-group".to_string())));
    assert!(endpoints.contains(&(MediaType::Song, "recording".to_string())));
    assert!(endpoints.contains(&(MediaType::Movie, "movie".to_string())));
    assert!(endpoints.contains(&(MediaType::Show, "tv".to_string())));
    assert!(endpoints.contains(&(MediaType::Book, "search".to_string())));
    assert!(endpoints.contains(&(MediaType::Game, "games".to_string())));
}

#[test]
fn test_compilation_is_deterministic() {
    let params = SearchParams::new(MediaType::Song)
        .with_query("Hey Jude")
        .with_options(LuceneOptions::new(true, true))
        .with_filters(SearchFilters {
            album_id: Some("rg-1".to_string()),
            release_id: Some("re1".to_string()),
            min_year: Some(1968),
            max_year: Some(1968),
            ..SearchFilters::default()
        });

    let first = build_query(&params);
    let second = build_query(&params);
    assert_eq!(first, second);
    assert_eq!(
        first.query,
        "recording:((Hey~ OR Hey*) AND (Jude~ OR Jude*)) AND firstreleasedate:[1968 TO 1968] AND reid:re1 AND rgid:\"rg-1\""
    );
}

#[test]
fn test_params_deserialize_from_panel_json() {
    let raw = r#"{
        "type": "album",
        "query": "OK Computer",
        "filters": { "secondaryTypes": [], "tag": "", "minYear": 1997 },
        "options": { "fuzzy": false, "wildcard": true }
    }"#;
    let params: SearchParams = serde_json::from_str(raw).unwrap();
    let query = build_query(&params).query;

    assert!(query.starts_with("releasegroup:(OK* AND Computer*) AND firstreleasedate:[1997 TO *]"));
    assert!(query.ends_with(")") && query.contains("NOT secondarytype:("));
    assert!(!query.contains("tag:"));
}

#[test]
fn test_default_types_per_category_compile() {
    for category in [
        MediaCategory::Music,
        MediaCategory::Cinema,
        MediaCategory::Books,
        MediaCategory::Games,
    ] {
        let compiled = build_query(&SearchParams::new(category.default_type()).with_query("x"));
        assert!(!compiled.query.is_empty());
    }
}
