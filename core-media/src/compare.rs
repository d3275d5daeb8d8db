//! Update detection for media items
//!
//! Enrichment often resolves to data the board already holds. Callers gate
//! their state writes on [`has_media_item_updates`] so identical results do
//! not produce a new revision.

use serde::{Deserialize, Serialize};

use crate::models::{MediaDetails, MediaItem};

/// Partial update for a [`MediaItem`].
///
/// `None` means "no instruction": an absent key never unsets a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<MediaDetails>,
    /// An empty string clears the note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Ignored for types without an artist field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
}

impl MediaItemPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Patch carrying only enrichment output.
    pub fn enrichment(details: Option<MediaDetails>, image_url: Option<String>) -> Self {
        Self {
            details,
            image_url,
            ..Self::default()
        }
    }

    /// Apply to `item`. Returns whether anything changed.
    pub fn apply_to(&self, item: &mut MediaItem) -> bool {
        if !has_media_item_updates(item, self) {
            return false;
        }

        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(url) = &self.image_url {
            item.image_url = Some(url.clone());
        }
        if let Some(year) = self.year {
            item.year = Some(year);
        }
        if let Some(details) = &self.details {
            item.details = Some(details.clone());
        }
        if let Some(notes) = &self.notes {
            item.notes = normalized_notes(notes).map(str::to_string);
        }
        if let Some(artist) = &self.artist {
            item.set_artist(Some(artist.clone()));
        }
        true
    }
}

fn normalized_notes(notes: &str) -> Option<&str> {
    Some(notes).filter(|n| !n.is_empty())
}

/// Whether applying `patch` would change observable state of `current`.
///
/// `details` is compared structurally; every other key by plain inequality.
pub fn has_media_item_updates(current: &MediaItem, patch: &MediaItemPatch) -> bool {
    if let Some(title) = &patch.title {
        if *title != current.title {
            return true;
        }
    }

    if let Some(url) = &patch.image_url {
        if current.image_url.as_deref() != Some(url.as_str()) {
            return true;
        }
    }

    if let Some(year) = patch.year {
        if current.year != Some(year) {
            return true;
        }
    }

    if let Some(details) = &patch.details {
        if current.details.as_ref() != Some(details) {
            return true;
        }
    }

    if let Some(notes) = &patch.notes {
        if current.notes.as_deref() != normalized_notes(notes) {
            return true;
        }
    }

    if let Some(artist) = &patch.artist {
        if current.kind.has_artist() && current.artist() != Some(artist.as_str()) {
            return true;
        }
    }

    false
}
