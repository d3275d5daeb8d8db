//! Board state
//!
//! A board is a title, a category, an ordered list of tier definitions and
//! one ordered item list per tier.
//!
//! ## Invariants
//!
//! - every key in `items` is the id of a tier in `tier_defs`
//! - an item id appears at most once across all tiers
//! - order within a tier list is the rank within that tier

use core_media::{from_search_id, MediaCategory, MediaItem};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

use crate::error::{BoardError, Result};

pub const DEFAULT_TITLE: &str = "My Tier List";
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_TIERS: usize = 20;

/// Tier color token. Hosts map tokens to their own palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierColor {
    Red,
    Orange,
    Amber,
    Yellow,
    Lime,
    Green,
    Emerald,
    Teal,
    Cyan,
    Sky,
    Blue,
    Indigo,
    Violet,
    Purple,
    Fuchsia,
    Pink,
    Rose,
    Slate,
}

impl TierColor {
    /// Colors offered to new tiers, in preference order.
    pub const PALETTE: [TierColor; 18] = [
        TierColor::Red,
        TierColor::Orange,
        TierColor::Amber,
        TierColor::Yellow,
        TierColor::Lime,
        TierColor::Green,
        TierColor::Emerald,
        TierColor::Teal,
        TierColor::Cyan,
        TierColor::Sky,
        TierColor::Blue,
        TierColor::Indigo,
        TierColor::Violet,
        TierColor::Purple,
        TierColor::Fuchsia,
        TierColor::Pink,
        TierColor::Rose,
        TierColor::Slate,
    ];
}

impl fmt::Display for TierColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDefinition {
    /// Stable for the lifetime of the board
    pub id: String,
    pub label: String,
    pub color: TierColor,
}

impl TierDefinition {
    /// New tier with a freshly generated id.
    pub fn new(label: impl Into<String>, color: TierColor) -> Self {
        Self {
            id: new_tier_id(),
            label: label.into(),
            color,
        }
    }
}

pub fn new_tier_id() -> String {
    format!("tier-{}", Uuid::new_v4())
}

fn default_tiers() -> Vec<TierDefinition> {
    [
        ("S", TierColor::Red),
        ("A", TierColor::Orange),
        ("B", TierColor::Amber),
        ("C", TierColor::Yellow),
        ("D", TierColor::Lime),
        ("Unranked", TierColor::Slate),
    ]
    .into_iter()
    .map(|(label, color)| TierDefinition::new(label, color))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierListState {
    pub title: String,
    #[serde(default)]
    pub category: MediaCategory,
    pub tier_defs: Vec<TierDefinition>,
    #[serde(default)]
    pub items: BTreeMap<String, Vec<MediaItem>>,
}

impl Default for TierListState {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE, MediaCategory::default())
    }
}

impl TierListState {
    /// Board with the default S/A/B/C/D/Unranked tiers, all empty.
    pub fn new(title: impl Into<String>, category: MediaCategory) -> Self {
        Self::with_tiers(title, category, default_tiers())
    }

    pub fn with_tiers(
        title: impl Into<String>,
        category: MediaCategory,
        tier_defs: Vec<TierDefinition>,
    ) -> Self {
        let items = tier_defs
            .iter()
            .map(|tier| (tier.id.clone(), Vec::new()))
            .collect();
        Self {
            title: title.into(),
            category,
            tier_defs,
            items,
        }
    }

    pub fn tier(&self, tier_id: &str) -> Option<&TierDefinition> {
        self.tier_defs.iter().find(|tier| tier.id == tier_id)
    }

    pub fn tier_index(&self, tier_id: &str) -> Option<usize> {
        self.tier_defs.iter().position(|tier| tier.id == tier_id)
    }

    pub fn is_tier(&self, id: &str) -> bool {
        self.tier(id).is_some()
    }

    /// Items of `tier_id` in rank order; empty for unknown tiers.
    pub fn items_in(&self, tier_id: &str) -> &[MediaItem] {
        self.items.get(tier_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tier currently holding `item_id`, scanning tiers top to bottom.
    pub fn find_item_container(&self, item_id: &str) -> Option<&str> {
        self.tier_defs
            .iter()
            .find(|tier| self.items_in(&tier.id).iter().any(|item| item.id == item_id))
            .map(|tier| tier.id.as_str())
    }

    /// Container for a drag target: the tier itself or the tier holding the item.
    pub fn resolve_container(&self, id: &str) -> Option<&str> {
        match self.tier(id) {
            Some(tier) => Some(tier.id.as_str()),
            None => self.find_item_container(id),
        }
    }

    pub fn get_item(&self, item_id: &str) -> Option<&MediaItem> {
        self.items
            .values()
            .flat_map(|items| items.iter())
            .find(|item| item.id == item_id)
    }

    pub fn contains_item(&self, item_id: &str) -> bool {
        self.get_item(item_id).is_some()
    }

    /// Whether any item resolves to `canonical_id`, search-prefixed or not.
    pub fn contains_canonical(&self, canonical_id: &str) -> bool {
        self.items
            .values()
            .flat_map(|items| items.iter())
            .any(|item| from_search_id(&item.id) == canonical_id)
    }

    pub fn item_count(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    /// Every item in tier order, then rank order.
    pub fn all_items(&self) -> impl Iterator<Item = &MediaItem> {
        self.tier_defs
            .iter()
            .flat_map(move |tier| self.items_in(&tier.id).iter())
    }

    /// Restore the invariants on externally supplied state.
    ///
    /// Tier ids that are empty or repeated get fresh ids, every tier gets a
    /// list, items filed under unknown keys move to the first tier, and
    /// repeated item ids keep only their first occurrence.
    pub fn normalize(&mut self) {
        let mut tier_ids = HashSet::new();
        for tier in &mut self.tier_defs {
            if tier.id.is_empty() || !tier_ids.insert(tier.id.clone()) {
                let fresh = new_tier_id();
                debug!(from = %tier.id, to = %fresh, "Reassigned repeated tier id");
                tier.id = fresh.clone();
                tier_ids.insert(fresh);
            }
        }

        let Some(first_tier) = self.tier_defs.first().map(|tier| tier.id.clone()) else {
            self.items.clear();
            return;
        };

        let mut items = std::mem::take(&mut self.items);
        let mut orphans = Vec::new();
        let known: HashSet<&str> = self.tier_defs.iter().map(|tier| tier.id.as_str()).collect();
        for (key, list) in std::mem::take(&mut items) {
            if known.contains(key.as_str()) {
                items.insert(key, list);
            } else {
                orphans.extend(list);
            }
        }

        let mut seen = HashSet::new();
        for tier in &self.tier_defs {
            let mut list = items.remove(&tier.id).unwrap_or_default();
            if tier.id == first_tier {
                list.append(&mut orphans);
            }
            list.retain(|item| !item.id.is_empty() && seen.insert(item.id.clone()));
            self.items.insert(tier.id.clone(), list);
        }
    }

    /// Checks run before a board is published or shared.
    pub fn validate(&self) -> Result<()> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(BoardError::Validation("Title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(BoardError::Validation(format!(
                "Title must be at most {} characters",
                MAX_TITLE_LENGTH
            )));
        }

        if self.tier_defs.is_empty() || self.tier_defs.len() > MAX_TIERS {
            return Err(BoardError::Validation(format!(
                "A board needs between 1 and {} tiers",
                MAX_TIERS
            )));
        }

        let mut tier_ids = HashSet::new();
        for tier in &self.tier_defs {
            if !tier_ids.insert(tier.id.as_str()) {
                return Err(BoardError::Validation(format!("Duplicate tier id {}", tier.id)));
            }
        }

        let mut item_ids = HashSet::new();
        for (tier_id, items) in &self.items {
            if !tier_ids.contains(tier_id.as_str()) {
                return Err(BoardError::Validation(format!(
                    "Items reference unknown tier {}",
                    tier_id
                )));
            }
            for item in items {
                if !item_ids.insert(item.id.as_str()) {
                    return Err(BoardError::Validation(format!(
                        "Item {} appears more than once",
                        item.id
                    )));
                }
            }
        }

        Ok(())
    }
}
