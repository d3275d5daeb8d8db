//! Import/export codec
//!
//! Exports drop internal tier ids so a re-import never collides with an
//! existing board. Two import shapes are accepted:
//!
//! - the nested export envelope `{ "tiers": [{ label, color, items }] }`,
//!   which receives fresh tier ids
//! - a legacy flat dump of the board state carrying `tierDefs` directly
//!
//! Anything else fails with [`BoardError::InvalidFormat`].

use bridge_traits::time::Clock;
use core_media::{MediaCategory, MediaItem};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{BoardError, Result};
use crate::state::{TierColor, TierDefinition, TierListState};

pub const EXPORT_VERSION: u32 = 1;

/// Portable board envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub version: u32,
    /// RFC 3339 timestamp
    pub created_at: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MediaCategory>,
    pub tiers: Vec<ExportTier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTier {
    pub label: String,
    pub color: TierColor,
    pub items: Vec<MediaItem>,
}

/// Project `state` into the export envelope.
pub fn generate_export_data(state: &TierListState, clock: &dyn Clock) -> ExportData {
    ExportData {
        version: EXPORT_VERSION,
        created_at: clock.now().to_rfc3339(),
        title: state.title.clone(),
        category: Some(state.category),
        tiers: state
            .tier_defs
            .iter()
            .map(|tier| ExportTier {
                label: tier.label.clone(),
                color: tier.color,
                items: state.items_in(&tier.id).to_vec(),
            })
            .collect(),
    }
}

pub fn export_json(state: &TierListState, clock: &dyn Clock) -> Result<String> {
    Ok(serde_json::to_string_pretty(&generate_export_data(state, clock))?)
}

#[derive(Debug, Deserialize)]
struct NestedImport {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    category: Option<MediaCategory>,
    tiers: Vec<NestedTier>,
}

#[derive(Debug, Deserialize)]
struct NestedTier {
    #[serde(default)]
    label: String,
    #[serde(default)]
    color: Option<TierColor>,
    #[serde(default)]
    items: Vec<MediaItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyImport {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    category: Option<MediaCategory>,
    tier_defs: Vec<TierDefinition>,
    #[serde(default)]
    items: BTreeMap<String, Vec<MediaItem>>,
}

fn pick_title(title: Option<String>, fallback: &str) -> String {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn ensure_item_id(mut item: MediaItem) -> MediaItem {
    if item.id.is_empty() {
        item.id = format!("item-{}", Uuid::new_v4());
    }
    item
}

/// Parse an exported board.
///
/// `fallback_title` is used when the payload has no usable title. The
/// returned state satisfies the board invariants.
pub fn parse_import_data(json: &str, fallback_title: &str) -> Result<TierListState> {
    let value: Value = serde_json::from_str(json).map_err(|e| {
        warn!(error = %e, "Import payload is not valid JSON");
        BoardError::invalid_format()
    })?;

    let has_array = |key: &str| value.get(key).is_some_and(Value::is_array);
    let (nested, legacy) = (has_array("tiers"), has_array("tierDefs"));

    let mut state = if nested {
        from_nested(value, fallback_title)?
    } else if legacy {
        from_legacy(value, fallback_title)?
    } else {
        warn!("Import payload matches no known board shape");
        return Err(BoardError::invalid_format());
    };

    if state.tier_defs.is_empty() {
        warn!("Import payload has no tiers");
        return Err(BoardError::invalid_format());
    }

    state.normalize();
    debug!(tiers = state.tier_defs.len(), items = state.item_count(), "Parsed board import");
    Ok(state)
}

fn from_nested(value: Value, fallback_title: &str) -> Result<TierListState> {
    let import: NestedImport = serde_json::from_value(value).map_err(|e| {
        warn!(error = %e, "Malformed tier export");
        BoardError::invalid_format()
    })?;

    let mut tier_defs = Vec::with_capacity(import.tiers.len());
    let mut items = BTreeMap::new();
    for (index, tier) in import.tiers.into_iter().enumerate() {
        let color = tier
            .color
            .unwrap_or(TierColor::PALETTE[index % TierColor::PALETTE.len()]);
        let definition = TierDefinition::new(tier.label, color);
        items.insert(
            definition.id.clone(),
            tier.items.into_iter().map(ensure_item_id).collect(),
        );
        tier_defs.push(definition);
    }

    let mut state = TierListState::with_tiers(
        pick_title(import.title, fallback_title),
        import.category.unwrap_or_default(),
        tier_defs,
    );
    state.items = items;
    Ok(state)
}

fn from_legacy(value: Value, fallback_title: &str) -> Result<TierListState> {
    let import: LegacyImport = serde_json::from_value(value).map_err(|e| {
        warn!(error = %e, "Malformed legacy board dump");
        BoardError::invalid_format()
    })?;

    let items = import
        .items
        .into_iter()
        .map(|(tier_id, list)| (tier_id, list.into_iter().map(ensure_item_id).collect()))
        .collect();

    Ok(TierListState {
        title: pick_title(import.title, fallback_title),
        category: import.category.unwrap_or_default(),
        tier_defs: import.tier_defs,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::time::FixedClock;
    use chrono::{TimeZone, Utc};
    use core_media::{MediaKind, MediaType};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    fn sample_board() -> TierListState {
        let mut state = TierListState::new("Best Albums", MediaCategory::Music);
        let s = state.tier_defs[0].id.clone();
        let unranked = state.tier_defs[5].id.clone();
        state.items.insert(
            s,
            vec![MediaItem::new("rg-1", "OK Computer", MediaKind::empty(MediaType::Album))],
        );
        state.items.insert(
            unranked,
            vec![MediaItem::new("rg-2", "Kid A", MediaKind::empty(MediaType::Album))],
        );
        state
    }

    #[test]
    fn test_export_drops_tier_ids() {
        let state = sample_board();
        let export = generate_export_data(&state, &clock());

        assert_eq!(export.version, EXPORT_VERSION);
        assert!(export.created_at.starts_with("2024-05-01T12:00:00"));
        assert_eq!(export.tiers.len(), 6);
        assert_eq!(export.tiers[0].label, "S");
        assert_eq!(export.tiers[0].items[0].title, "OK Computer");

        let json = serde_json::to_string(&export).unwrap();
        assert!(!json.contains("tier-"));
    }

    #[test]
    fn test_round_trip_regenerates_ids() {
        let state = sample_board();
        let json = export_json(&state, &clock()).unwrap();
        let imported = parse_import_data(&json, "Fallback").unwrap();

        assert_eq!(imported.title, "Best Albums");
        assert_eq!(imported.tier_defs.len(), state.tier_defs.len());
        assert!(imported
            .tier_defs
            .iter()
            .all(|tier| state.tier(&tier.id).is_none()));
        assert_eq!(imported.items_in(&imported.tier_defs[0].id)[0].title, "OK Computer");
        assert_eq!(imported.items_in(&imported.tier_defs[5].id)[0].title, "Kid A");
        assert!(imported.validate().is_ok());
    }

    #[test]
    fn test_legacy_dump_passes_through_with_title_fallback() {
        let mut state = sample_board();
        state.title = String::new();
        let mut dump = serde_json::to_value(&state).unwrap();
        dump.as_object_mut().unwrap().remove("title");

        let imported = parse_import_data(&dump.to_string(), "Imported List").unwrap();
        assert_eq!(imported.title, "Imported List");
        assert_eq!(imported.tier_defs, state.tier_defs);
        assert_eq!(imported.items, state.items);
    }

    #[test]
    fn test_legacy_orphans_are_kept() {
        let json = r#"{
            "title": "Old",
            "tierDefs": [{"id": "t1", "label": "S", "color": "red"}],
            "items": {"t-gone": [{"id": "m1", "title": "Alien", "type": "movie"}]}
        }"#;
        let imported = parse_import_data(json, "x").unwrap();
        assert_eq!(imported.items_in("t1")[0].id, "m1");
        assert!(!imported.items.contains_key("t-gone"));
    }

    #[test]
    fn test_legacy_repeated_tier_ids_keep_items() {
        let json = r#"{
            "title": "Old",
            "tierDefs": [
                {"id": "t1", "label": "S", "color": "red"},
                {"id": "t1", "label": "A", "color": "orange"}
            ],
            "items": {"t1": [{"id": "m1", "title": "Alien", "type": "movie"}]}
        }"#;
        let imported = parse_import_data(json, "x").unwrap();

        assert_eq!(imported.tier_defs.len(), 2);
        assert_eq!(imported.item_count(), 1);
        assert_eq!(imported.items_in("t1")[0].id, "m1");
        assert!(imported.validate().is_ok());
    }

    #[test]
    fn test_nested_missing_fields_are_filled() {
        let json = r#"{"tiers": [{"label": "Top", "items": [{"title": "Dune", "type": "book"}]}]}"#;
        let imported = parse_import_data(json, "Reading").unwrap();

        assert_eq!(imported.title, "Reading");
        assert_eq!(imported.tier_defs[0].color, TierColor::Red);
        let items = imported.items_in(&imported.tier_defs[0].id);
        assert!(items[0].id.starts_with("item-"));
    }

    #[test]
    fn test_invalid_shapes_rejected() {
        for json in [
            "not json",
            "[]",
            "42",
            r#"{"title": "no tiers"}"#,
            r#"{"tiers": []}"#,
            r#"{"tiers": "nope"}"#,
            r#"{"tiers": [{"label": "S", "color": "chartreuse"}]}"#,
        ] {
            let err = parse_import_data(json, "x").unwrap_err();
            assert_eq!(err.to_string(), "Invalid tier list format", "payload: {}", json);
        }
    }
}
