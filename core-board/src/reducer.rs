//! Board reducer
//!
//! [`reduce`] applies one [`BoardAction`] to a [`TierListState`] in place and
//! reports whether anything changed. Actions that reference unknown tiers or
//! items are no-ops.

use core_media::{from_search_id, has_media_item_updates, MediaCategory, MediaItem, MediaItemPatch};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

use crate::state::{TierColor, TierDefinition, TierListState, MAX_TIERS};

pub const NEW_TIER_LABEL: &str = "New Tier";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum BoardAction {
    AddTier {
        #[serde(default)]
        label: Option<String>,
    },
    UpdateTier {
        tier_id: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        color: Option<TierColor>,
    },
    DeleteTier {
        tier_id: String,
    },
    ReorderTiers {
        from: usize,
        to: usize,
    },
    /// Move an item onto a tier or next to another item.
    ///
    /// `item` carries the payload for items entering from outside the board.
    MoveItem {
        active_id: String,
        over_id: String,
        #[serde(default)]
        source_tier_hint: Option<String>,
        #[serde(default)]
        item: Option<MediaItem>,
        #[serde(default)]
        insert_below: bool,
    },
    RemoveItem {
        item_id: String,
    },
    UpdateMediaItem {
        item_id: String,
        patch: MediaItemPatch,
    },
    /// Rewrite a transient search id to its canonical id.
    NormalizeItemId {
        from: String,
        to: String,
    },
    SetTitle {
        title: String,
    },
    SetCategory {
        category: MediaCategory,
    },
    Import {
        state: TierListState,
    },
    Clear,
    ResetItems,
}

impl BoardAction {
    pub fn name(&self) -> &'static str {
        match self {
            BoardAction::AddTier { .. } => "ADD_TIER",
            BoardAction::UpdateTier { .. } => "UPDATE_TIER",
            BoardAction::DeleteTier { .. } => "DELETE_TIER",
            BoardAction::ReorderTiers { .. } => "REORDER_TIERS",
            BoardAction::MoveItem { .. } => "MOVE_ITEM",
            BoardAction::RemoveItem { .. } => "REMOVE_ITEM",
            BoardAction::UpdateMediaItem { .. } => "UPDATE_MEDIA_ITEM",
            BoardAction::NormalizeItemId { .. } => "NORMALIZE_ITEM_ID",
            BoardAction::SetTitle { .. } => "SET_TITLE",
            BoardAction::SetCategory { .. } => "SET_CATEGORY",
            BoardAction::Import { .. } => "IMPORT",
            BoardAction::Clear => "CLEAR",
            BoardAction::ResetItems => "RESET_ITEMS",
        }
    }

    /// Convenience constructor for moves of items already on the board.
    pub fn move_item(active_id: impl Into<String>, over_id: impl Into<String>) -> Self {
        BoardAction::MoveItem {
            active_id: active_id.into(),
            over_id: over_id.into(),
            source_tier_hint: None,
            item: None,
            insert_below: false,
        }
    }
}

/// Apply `action` to `state`. Returns `true` when the state changed.
pub fn reduce(state: &mut TierListState, action: BoardAction) -> bool {
    let name = action.name();
    let changed = match action {
        BoardAction::AddTier { label } => add_tier(state, label),
        BoardAction::UpdateTier {
            tier_id,
            label,
            color,
        } => update_tier(state, &tier_id, label, color),
        BoardAction::DeleteTier { tier_id } => delete_tier(state, &tier_id),
        BoardAction::ReorderTiers { from, to } => array_move(&mut state.tier_defs, from, to),
        BoardAction::MoveItem {
            active_id,
            over_id,
            source_tier_hint,
            item,
            insert_below,
        } => move_item(
            state,
            &active_id,
            &over_id,
            source_tier_hint.as_deref(),
            item,
            insert_below,
        ),
        BoardAction::RemoveItem { item_id } => remove_item(state, &item_id).is_some(),
        BoardAction::UpdateMediaItem { item_id, patch } => update_media_item(state, &item_id, &patch),
        BoardAction::NormalizeItemId { from, to } => normalize_item_id(state, &from, &to),
        BoardAction::SetTitle { title } => replace(&mut state.title, title),
        BoardAction::SetCategory { category } => replace(&mut state.category, category),
        BoardAction::Import { state: mut imported } => {
            imported.normalize();
            replace(state, imported)
        }
        BoardAction::Clear => {
            *state = TierListState::new(state.title.clone(), state.category);
            true
        }
        BoardAction::ResetItems => {
            let had_items = state.item_count() > 0;
            state.items.values_mut().for_each(Vec::clear);
            had_items
        }
    };

    if changed {
        debug!(action = name, "Board action applied");
    } else {
        trace!(action = name, "Board action was a no-op");
    }
    changed
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Stable move of one element. Out-of-range or equal indices are no-ops.
fn array_move<T>(list: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= list.len() || to >= list.len() {
        return false;
    }
    let element = list.remove(from);
    list.insert(to, element);
    true
}

fn add_tier(state: &mut TierListState, label: Option<String>) -> bool {
    if state.tier_defs.len() >= MAX_TIERS {
        debug!(tiers = state.tier_defs.len(), "Tier limit reached");
        return false;
    }

    let label = label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| NEW_TIER_LABEL.to_string());
    let tier = TierDefinition::new(label, pick_color(&state.tier_defs));
    state.items.insert(tier.id.clone(), Vec::new());
    state.tier_defs.push(tier);
    true
}

/// First palette color not in use, else a random one.
fn pick_color(tiers: &[TierDefinition]) -> TierColor {
    let used: HashSet<TierColor> = tiers.iter().map(|tier| tier.color).collect();
    if let Some(color) = TierColor::PALETTE.iter().find(|c| !used.contains(c)) {
        return *color;
    }

    let mut byte = [0u8; 1];
    let index = match getrandom::getrandom(&mut byte) {
        Ok(()) => byte[0] as usize,
        Err(_) => tiers.len(),
    };
    TierColor::PALETTE[index % TierColor::PALETTE.len()]
}

fn update_tier(
    state: &mut TierListState,
    tier_id: &str,
    label: Option<String>,
    color: Option<TierColor>,
) -> bool {
    let Some(tier) = state.tier_defs.iter_mut().find(|tier| tier.id == tier_id) else {
        return false;
    };

    let mut changed = false;
    if let Some(label) = label {
        changed |= replace(&mut tier.label, label);
    }
    if let Some(color) = color {
        changed |= replace(&mut tier.color, color);
    }
    changed
}

fn delete_tier(state: &mut TierListState, tier_id: &str) -> bool {
    let Some(index) = state.tier_index(tier_id) else {
        return false;
    };
    if state.tier_defs.len() == 1 {
        debug!(tier_id, "Refusing to delete the last tier");
        return false;
    }

    state.tier_defs.remove(index);
    let orphans = state.items.remove(tier_id).unwrap_or_default();
    if !orphans.is_empty() {
        let fallback = state.tier_defs[0].id.clone();
        debug!(tier_id, fallback = %fallback, count = orphans.len(), "Reassigning orphaned items");
        state.items.entry(fallback).or_default().extend(orphans);
    }
    true
}

fn position(list: &[MediaItem], item_id: &str) -> Option<usize> {
    list.iter().position(|item| item.id == item_id)
}

fn move_item(
    state: &mut TierListState,
    active_id: &str,
    over_id: &str,
    source_hint: Option<&str>,
    payload: Option<MediaItem>,
    insert_below: bool,
) -> bool {
    let source = source_hint
        .filter(|hint| position(state.items_in(hint), active_id).is_some())
        .map(str::to_string)
        .or_else(|| state.find_item_container(active_id).map(str::to_string));
    let Some(target) = state.resolve_container(over_id).map(str::to_string) else {
        return false;
    };
    let over_is_container = state.is_tier(over_id);

    let Some(source) = source else {
        return insert_item(state, active_id, over_id, &target, payload, insert_below);
    };

    if source == target {
        let Some(list) = state.items.get_mut(&source) else {
            return false;
        };
        let Some(from) = position(list, active_id) else {
            return false;
        };
        let to = if over_is_container {
            list.len() - 1
        } else {
            match position(list, over_id) {
                Some(index) => index,
                None => return false,
            }
        };
        return array_move(list, from, to);
    }

    let over_index = if over_is_container {
        None
    } else {
        position(state.items_in(&target), over_id)
    };

    let Some(item) = state
        .items
        .get_mut(&source)
        .and_then(|list| position(list, active_id).map(|index| list.remove(index)))
    else {
        return false;
    };

    let list = state.items.entry(target).or_default();
    let index = match over_index {
        Some(index) => (index + usize::from(insert_below)).min(list.len()),
        None => list.len(),
    };
    list.insert(index, item);
    true
}

fn insert_item(
    state: &mut TierListState,
    active_id: &str,
    over_id: &str,
    target: &str,
    payload: Option<MediaItem>,
    insert_below: bool,
) -> bool {
    let Some(mut item) = payload else {
        trace!(active_id, "No payload for item entering the board");
        return false;
    };

    if state.contains_canonical(from_search_id(active_id)) {
        debug!(active_id, "Item already on the board, skipping insert");
        return false;
    }

    item.id = active_id.to_string();
    let over_index = position(state.items_in(target), over_id);
    let list = state.items.entry(target.to_string()).or_default();
    let index = match over_index {
        Some(index) => (index + usize::from(insert_below)).min(list.len()),
        None => list.len(),
    };
    list.insert(index, item);
    true
}

fn remove_item(state: &mut TierListState, item_id: &str) -> Option<MediaItem> {
    state.items.values_mut().find_map(|list| {
        position(list, item_id).map(|index| list.remove(index))
    })
}

fn update_media_item(state: &mut TierListState, item_id: &str, patch: &MediaItemPatch) -> bool {
    let Some(item) = state
        .items
        .values_mut()
        .flat_map(|list| list.iter_mut())
        .find(|item| item.id == item_id)
    else {
        return false;
    };

    if !has_media_item_updates(item, patch) {
        return false;
    }
    patch.apply_to(item)
}

fn normalize_item_id(state: &mut TierListState, from: &str, to: &str) -> bool {
    if from == to || to.is_empty() || !state.contains_item(from) {
        return false;
    }

    if state.contains_item(to) {
        debug!(from, to, "Canonical item already present, dropping transient copy");
        return remove_item(state, from).is_some();
    }

    match state
        .items
        .values_mut()
        .flat_map(|list| list.iter_mut())
        .find(|item| item.id == from)
    {
        Some(item) => {
            item.id = to.to_string();
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_media::{MediaKind, MediaType};

    fn movie(id: &str) -> MediaItem {
        MediaItem::new(id, format!("Movie {}", id), MediaKind::empty(MediaType::Movie))
    }

    fn ids(state: &TierListState, tier: usize) -> Vec<String> {
        state
            .items_in(&state.tier_defs[tier].id)
            .iter()
            .map(|item| item.id.clone())
            .collect()
    }

    fn board_with(items: &[&str]) -> TierListState {
        let mut state = TierListState::default();
        let first = state.tier_defs[0].id.clone();
        state.items.insert(first, items.iter().map(|id| movie(id)).collect());
        state
    }

    #[test]
    fn test_reorder_within_tier() {
        let mut state = board_with(&["a", "b", "c", "d"]);

        assert!(reduce(&mut state, BoardAction::move_item("a", "c")));
        assert_eq!(ids(&state, 0), vec!["b", "c", "a", "d"]);

        assert!(reduce(&mut state, BoardAction::move_item("d", "b")));
        assert_eq!(ids(&state, 0), vec!["d", "b", "c", "a"]);

        assert!(!reduce(&mut state, BoardAction::move_item("c", "c")));
    }

    #[test]
    fn test_drop_on_own_container_moves_to_end() {
        let mut state = board_with(&["a", "b", "c"]);
        let tier = state.tier_defs[0].id.clone();

        assert!(reduce(&mut state, BoardAction::move_item("a", tier.clone())));
        assert_eq!(ids(&state, 0), vec!["b", "c", "a"]);
        assert!(!reduce(&mut state, BoardAction::move_item("a", tier)));
    }

    #[test]
    fn test_cross_tier_move_respects_insert_below() {
        let mut state = board_with(&["a", "b"]);
        let second = state.tier_defs[1].id.clone();
        state.items.insert(second, vec![movie("x"), movie("y")]);

        let action = BoardAction::MoveItem {
            active_id: "a".to_string(),
            over_id: "x".to_string(),
            source_tier_hint: None,
            item: None,
            insert_below: true,
        };
        assert!(reduce(&mut state, action));
        assert_eq!(ids(&state, 0), vec!["b"]);
        assert_eq!(ids(&state, 1), vec!["x", "a", "y"]);

        assert!(reduce(&mut state, BoardAction::move_item("b", "x")));
        assert_eq!(ids(&state, 1), vec!["b", "x", "a", "y"]);
    }

    #[test]
    fn test_stale_source_hint_falls_back_to_scan() {
        let mut state = board_with(&["a"]);
        let (wrong, target) = (state.tier_defs[3].id.clone(), state.tier_defs[2].id.clone());

        let action = BoardAction::MoveItem {
            active_id: "a".to_string(),
            over_id: target,
            source_tier_hint: Some(wrong),
            item: None,
            insert_below: false,
        };
        assert!(reduce(&mut state, action));
        assert!(ids(&state, 0).is_empty());
        assert_eq!(ids(&state, 2), vec!["a"]);
    }

    #[test]
    fn test_insert_from_search_and_duplicate_guard() {
        let mut state = board_with(&["a"]);
        let tier = state.tier_defs[1].id.clone();
        let insert = |id: &str| BoardAction::MoveItem {
            active_id: id.to_string(),
            over_id: tier.clone(),
            source_tier_hint: None,
            item: Some(movie("m1")),
            insert_below: false,
        };

        assert!(reduce(&mut state, insert("search-m1")));
        assert_eq!(ids(&state, 1), vec!["search-m1"]);

        // Same canonical id, with or without the marker, is refused.
        assert!(!reduce(&mut state, insert("m1")));
        reduce(&mut state, BoardAction::NormalizeItemId {
            from: "search-m1".to_string(),
            to: "m1".to_string(),
        });
        assert!(!reduce(&mut state, insert("search-m1")));
        assert_eq!(state.item_count(), 2);
    }

    #[test]
    fn test_insert_without_payload_or_target_is_noop() {
        let mut state = TierListState::default();
        let tier = state.tier_defs[0].id.clone();
        assert!(!reduce(&mut state, BoardAction::move_item("ghost", tier)));

        let action = BoardAction::MoveItem {
            active_id: "search-x".to_string(),
            over_id: "nowhere".to_string(),
            source_tier_hint: None,
            item: Some(movie("x")),
            insert_below: false,
        };
        assert!(!reduce(&mut state, action));
    }

    #[test]
    fn test_add_tier_avoids_used_colors_and_caps() {
        let mut state = TierListState::default();
        assert!(reduce(&mut state, BoardAction::AddTier { label: None }));

        let added = state.tier_defs.last().unwrap();
        assert_eq!(added.label, NEW_TIER_LABEL);
        assert_eq!(added.color, TierColor::Green);
        assert!(state.items.contains_key(&added.id));

        while state.tier_defs.len() < MAX_TIERS {
            assert!(reduce(&mut state, BoardAction::AddTier { label: Some("X".to_string()) }));
        }
        assert!(!reduce(&mut state, BoardAction::AddTier { label: None }));
        assert_eq!(state.tier_defs.len(), MAX_TIERS);
    }

    #[test]
    fn test_delete_tier_moves_orphans_to_first_remaining() {
        let mut state = board_with(&["a", "b"]);
        let second = state.tier_defs[1].id.clone();
        state.items.insert(second, vec![movie("c")]);
        let first = state.tier_defs[0].id.clone();

        assert!(reduce(&mut state, BoardAction::DeleteTier { tier_id: first.clone() }));
        assert_eq!(state.tier_defs.len(), 5);
        assert!(!state.items.contains_key(&first));
        assert_eq!(ids(&state, 0), vec!["c", "a", "b"]);
        assert_eq!(state.item_count(), 3);

        assert!(!reduce(&mut state, BoardAction::DeleteTier { tier_id: "missing".to_string() }));
    }

    #[test]
    fn test_last_tier_cannot_be_deleted() {
        let tier = TierDefinition::new("Only", TierColor::Red);
        let id = tier.id.clone();
        let mut state = TierListState::with_tiers("t", MediaCategory::Games, vec![tier]);
        assert!(!reduce(&mut state, BoardAction::DeleteTier { tier_id: id }));
    }

    #[test]
    fn test_reorder_tiers_leaves_items() {
        let mut state = board_with(&["a"]);
        let items_before = state.items.clone();
        let first = state.tier_defs[0].id.clone();

        assert!(reduce(&mut state, BoardAction::ReorderTiers { from: 0, to: 2 }));
        assert_eq!(state.tier_defs[2].id, first);
        assert_eq!(state.items, items_before);

        assert!(!reduce(&mut state, BoardAction::ReorderTiers { from: 1, to: 1 }));
        assert!(!reduce(&mut state, BoardAction::ReorderTiers { from: 0, to: 99 }));
    }

    #[test]
    fn test_update_media_item_gated_on_changes() {
        let mut state = board_with(&["a"]);
        let patch = MediaItemPatch {
            image_url: Some("https://img/a.jpg".to_string()),
            ..MediaItemPatch::default()
        };

        assert!(reduce(&mut state, BoardAction::UpdateMediaItem {
            item_id: "a".to_string(),
            patch: patch.clone(),
        }));
        assert!(!reduce(&mut state, BoardAction::UpdateMediaItem {
            item_id: "a".to_string(),
            patch,
        }));
        assert_eq!(state.get_item("a").unwrap().image_url.as_deref(), Some("https://img/a.jpg"));
    }

    #[test]
    fn test_title_category_reset_and_clear() {
        let mut state = board_with(&["a"]);

        assert!(reduce(&mut state, BoardAction::SetTitle { title: "Films".to_string() }));
        assert!(!reduce(&mut state, BoardAction::SetTitle { title: "Films".to_string() }));
        assert!(reduce(&mut state, BoardAction::SetCategory { category: MediaCategory::Cinema }));

        assert!(reduce(&mut state, BoardAction::ResetItems));
        assert_eq!(state.item_count(), 0);
        assert_eq!(state.tier_defs.len(), 6);
        assert!(!reduce(&mut state, BoardAction::ResetItems));

        let first = state.tier_defs[0].id.clone();
        reduce(&mut state, BoardAction::DeleteTier { tier_id: first });
        assert!(reduce(&mut state, BoardAction::Clear));
        assert_eq!(state.tier_defs.len(), 6);
        assert_eq!(state.category, MediaCategory::Cinema);
    }

    #[test]
    fn test_action_json_shape() {
        let action: BoardAction = serde_json::from_str(
            r#"{"type":"MOVE_ITEM","activeId":"a","overId":"b","insertBelow":true}"#,
        )
        .unwrap();
        assert_eq!(action.name(), "MOVE_ITEM");
        assert!(matches!(action, BoardAction::MoveItem { insert_below: true, .. }));
    }
}
