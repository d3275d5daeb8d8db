//! Field-level merge for registry entries
//!
//! Enrichment is monotonic: a sparser record never clears an image URL or a
//! details record that an earlier, richer record supplied.

use core_media::MediaItem;

/// Whether `incoming` carries anything `existing` does not already show.
pub fn differs_materially(existing: &MediaItem, incoming: &MediaItem) -> bool {
    if let Some(url) = incoming.image() {
        if existing.image_url.as_deref() != Some(url) {
            return true;
        }
    }

    if let Some(details) = incoming.populated_details() {
        if existing.details.as_ref() != Some(details) {
            return true;
        }
    }

    if !incoming.title.is_empty() && incoming.title != existing.title {
        return true;
    }

    if incoming.notes != existing.notes {
        return true;
    }

    incoming.kind.has_artist() && incoming.artist() != existing.artist()
}

/// Merge `incoming` over `existing`.
///
/// Returns `None` when nothing material changed, so callers can keep the
/// existing entry untouched.
pub fn merge_media_item(existing: &MediaItem, incoming: &MediaItem) -> Option<MediaItem> {
    if !differs_materially(existing, incoming) {
        return None;
    }

    let mut merged = incoming.clone();
    if incoming.image().is_none() {
        merged.image_url = existing.image_url.clone();
    }
    if incoming.populated_details().is_none() {
        merged.details = existing.details.clone();
    }
    if incoming.title.is_empty() {
        merged.title = existing.title.clone();
    }
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_media::{MediaDetails, MediaKind, MediaType};

    fn rich() -> MediaItem {
        MediaItem::new(
            "rg-1",
            "Blue Lines",
            MediaKind::Album {
                artist: Some("Massive Attack".to_string()),
                artist_id: None,
                primary_type: None,
            },
        )
        .with_image_url("https://img/blue-lines.jpg")
        .with_details(MediaDetails {
            description: Some("Debut album".to_string()),
            ..MediaDetails::default()
        })
    }

    fn sparse() -> MediaItem {
        MediaItem::new(
            "rg-1",
            "Blue Lines",
            MediaKind::Album {
                artist: Some("Massive Attack".to_string()),
                artist_id: None,
                primary_type: None,
            },
        )
    }

    #[test]
    fn test_sparse_update_is_not_material() {
        assert!(!differs_materially(&rich(), &sparse()));
        assert_eq!(merge_media_item(&rich(), &sparse()), None);
    }

    #[test]
    fn test_identical_item_is_not_material() {
        assert_eq!(merge_media_item(&rich(), &rich()), None);
    }

    #[test]
    fn test_title_change_keeps_enrichment() {
        let mut incoming = sparse();
        incoming.title = "Blue Lines (Remastered)".to_string();

        let merged = merge_media_item(&rich(), &incoming).unwrap();
        assert_eq!(merged.title, "Blue Lines (Remastered)");
        assert_eq!(merged.image_url.as_deref(), Some("https://img/blue-lines.jpg"));
        assert_eq!(merged.details, rich().details);
    }

    #[test]
    fn test_empty_values_never_regress() {
        let mut incoming = sparse().with_image_url("").with_details(MediaDetails::default());
        incoming.notes = Some("classic".to_string());

        let merged = merge_media_item(&rich(), &incoming).unwrap();
        assert_eq!(merged.image_url.as_deref(), Some("https://img/blue-lines.jpg"));
        assert_eq!(merged.details, rich().details);
        assert_eq!(merged.notes.as_deref(), Some("classic"));
    }

    #[test]
    fn test_new_image_replaces_old() {
        let incoming = sparse().with_image_url("https://img/new.jpg");
        let merged = merge_media_item(&rich(), &incoming).unwrap();
        assert_eq!(merged.image_url.as_deref(), Some("https://img/new.jpg"));
    }

    #[test]
    fn test_artist_only_compared_for_music_releases() {
        let mut incoming = sparse();
        incoming.set_artist(Some("Massive Attack & Friends".to_string()));
        assert!(differs_materially(&rich(), &incoming));

        let book = MediaItem::new("b", "Dune", MediaKind::empty(MediaType::Book));
        assert!(!differs_materially(&book, &book.clone()));
    }
}
