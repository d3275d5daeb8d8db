//! Domain models for board media
//!
//! A [`MediaItem`] is a tagged union keyed by `type`. Shared fields live on the
//! item, type-specific fields on its [`MediaKind`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::MediaError;

// =============================================================================
// Media Types & Categories
// =============================================================================

/// Discriminant of a [`MediaItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Artist,
    Album,
    Song,
    Movie,
    Show,
    Book,
    Game,
}

impl MediaType {
    pub const ALL: [MediaType; 7] = [
        MediaType::Artist,
        MediaType::Album,
        MediaType::Song,
        MediaType::Movie,
        MediaType::Show,
        MediaType::Book,
        MediaType::Game,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Artist => "artist",
            MediaType::Album => "album",
            MediaType::Song => "song",
            MediaType::Movie => "movie",
            MediaType::Show => "show",
            MediaType::Book => "book",
            MediaType::Game => "game",
        }
    }

    /// Category that offers this type.
    pub fn category(&self) -> MediaCategory {
        match self {
            MediaType::Artist | MediaType::Album | MediaType::Song => MediaCategory::Music,
            MediaType::Movie | MediaType::Show => MediaCategory::Cinema,
            MediaType::Book => MediaCategory::Books,
            MediaType::Game => MediaCategory::Games,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| MediaError::UnknownMediaType(s.to_string()))
    }
}

/// Board category. Determines which media types the search panel offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    #[default]
    Music,
    Cinema,
    Books,
    Games,
}

impl MediaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Music => "music",
            MediaCategory::Cinema => "cinema",
            MediaCategory::Books => "books",
            MediaCategory::Games => "games",
        }
    }

    /// Media types searchable within this category, in panel order.
    pub fn media_types(&self) -> &'static [MediaType] {
        match self {
            MediaCategory::Music => &[MediaType::Album, MediaType::Artist, MediaType::Song],
            MediaCategory::Cinema => &[MediaType::Movie, MediaType::Show],
            MediaCategory::Books => &[MediaType::Book],
            MediaCategory::Games => &[MediaType::Game],
        }
    }

    pub fn default_type(&self) -> MediaType {
        self.media_types()[0]
    }

    /// Fail if `media_type` belongs to another category.
    pub fn ensure_offers(&self, media_type: MediaType) -> crate::Result<()> {
        if self.media_types().contains(&media_type) {
            Ok(())
        } else {
            Err(MediaError::TypeNotInCategory {
                media_type: media_type.to_string(),
                category: self.to_string(),
            })
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaCategory {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "music" => Ok(MediaCategory::Music),
            "cinema" => Ok(MediaCategory::Cinema),
            "books" => Ok(MediaCategory::Books),
            "games" => Ok(MediaCategory::Games),
            other => Err(MediaError::UnknownCategory(other.to_string())),
        }
    }
}

// =============================================================================
// Enrichment
// =============================================================================

/// External link attached by enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaLink {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// Lazily fetched enrichment record.
///
/// Provider-specific keys the core does not interpret are kept in `extra` so
/// nothing is lost on a round trip through the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<MediaLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl MediaDetails {
    pub fn is_empty(&self) -> bool {
        self.description.as_deref().map_or(true, str::is_empty)
            && self.tags.is_empty()
            && self.urls.is_empty()
            && self.release_date.as_deref().map_or(true, str::is_empty)
            && self.extra.is_empty()
    }
}

// =============================================================================
// Media Item
// =============================================================================

/// Type-specific fields of a [`MediaItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum MediaKind {
    Artist {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        disambiguation: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        country: Option<String>,
    },
    Album {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artist: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artist_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        primary_type: Option<String>,
    },
    Song {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artist: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        album: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        album_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
    },
    Movie,
    Show,
    Book {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author: Option<String>,
    },
    Game {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        developer: Option<String>,
    },
}

impl MediaKind {
    /// Bare variant for `media_type` with every optional field unset.
    pub fn empty(media_type: MediaType) -> Self {
        match media_type {
            MediaType::Artist => MediaKind::Artist {
                disambiguation: None,
                country: None,
            },
            MediaType::Album => MediaKind::Album {
                artist: None,
                artist_id: None,
                primary_type: None,
            },
            MediaType::Song => MediaKind::Song {
                artist: None,
                album: None,
                album_id: None,
                duration_ms: None,
            },
            MediaType::Movie => MediaKind::Movie,
            MediaType::Show => MediaKind::Show,
            MediaType::Book => MediaKind::Book { author: None },
            MediaType::Game => MediaKind::Game { developer: None },
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self {
            MediaKind::Artist { .. } => MediaType::Artist,
            MediaKind::Album { .. } => MediaType::Album,
            MediaKind::Song { .. } => MediaType::Song,
            MediaKind::Movie => MediaType::Movie,
            MediaKind::Show => MediaType::Show,
            MediaKind::Book { .. } => MediaType::Book,
            MediaKind::Game { .. } => MediaType::Game,
        }
    }

    /// Whether this variant carries an `artist` field.
    pub fn has_artist(&self) -> bool {
        matches!(self, MediaKind::Album { .. } | MediaKind::Song { .. })
    }
}

/// A media entity placed on a board or held in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Canonical provider id, or a search id while not yet committed
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<MediaDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub kind: MediaKind,
}

impl MediaItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: None,
            year: None,
            details: None,
            notes: None,
            kind,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_details(mut self, details: MediaDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn media_type(&self) -> MediaType {
        self.kind.media_type()
    }

    /// `artist` of album and song items.
    pub fn artist(&self) -> Option<&str> {
        match &self.kind {
            MediaKind::Album { artist, .. } | MediaKind::Song { artist, .. } => artist.as_deref(),
            _ => None,
        }
    }

    /// Set `artist` on album and song items. Returns `false` for other types.
    pub fn set_artist(&mut self, value: Option<String>) -> bool {
        match &mut self.kind {
            MediaKind::Album { artist, .. } | MediaKind::Song { artist, .. } => {
                *artist = value;
                true
            }
            _ => false,
        }
    }

    /// Non-empty image URL, if any.
    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Non-empty details record, if any.
    pub fn populated_details(&self) -> Option<&MediaDetails> {
        self.details.as_ref().filter(|details| !details.is_empty())
    }

    /// Secondary line shown under the title.
    pub fn subtitle(&self) -> Option<String> {
        match &self.kind {
            MediaKind::Artist { disambiguation, .. } => disambiguation.clone(),
            MediaKind::Album { artist, .. } | MediaKind::Song { artist, .. } => artist.clone(),
            MediaKind::Book { author } => author.clone(),
            MediaKind::Game { developer } => developer.clone(),
            MediaKind::Movie | MediaKind::Show => self.year.map(|y| y.to_string()),
        }
    }

    /// Third line shown on detailed cards.
    pub fn tertiary_text(&self) -> Option<String> {
        match &self.kind {
            MediaKind::Artist { country, .. } => country.clone(),
            MediaKind::Song { album, .. } => album.clone(),
            MediaKind::Album { .. } | MediaKind::Book { .. } | MediaKind::Game { .. } => {
                self.year.map(|y| y.to_string())
            }
            MediaKind::Movie | MediaKind::Show => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn album() -> MediaItem {
        MediaItem::new(
            "rg-1",
            "Abbey Road",
            MediaKind::Album {
                artist: Some("The Beatles".to_string()),
                artist_id: None,
                primary_type: Some("Album".to_string()),
            },
        )
        .with_year(1969)
    }

    #[test]
    fn test_media_type_from_str() {
        assert_eq!("song".parse::<MediaType>().unwrap(), MediaType::Song);
        assert!(matches!(
            "podcast".parse::<MediaType>(),
            Err(MediaError::UnknownMediaType(_))
        ));
    }

    #[test]
    fn test_category_types() {
        assert_eq!(MediaCategory::Music.default_type(), MediaType::Album);
        assert_eq!(MediaCategory::Cinema.media_types(), &[MediaType::Movie, MediaType::Show]);
        for media_type in MediaType::ALL {
            assert!(media_type.category().media_types().contains(&media_type));
        }
        assert!(MediaCategory::Books.ensure_offers(MediaType::Game).is_err());
    }

    #[test]
    fn test_serialized_shape_is_tagged() {
        let json = serde_json::to_value(album()).unwrap();
        assert_eq!(json["type"], "album");
        assert_eq!(json["artist"], "The Beatles");
        assert_eq!(json["primaryType"], "Album");
        assert_eq!(json["year"], 1969);
        assert!(json.get("imageUrl").is_none());
    }

    #[test]
    fn test_deserialize_unit_variant_and_missing_id() {
        let movie: MediaItem =
            serde_json::from_str(r#"{"type":"movie","title":"Alien","year":1979}"#).unwrap();
        assert_eq!(movie.media_type(), MediaType::Movie);
        assert_eq!(movie.id, "");
        assert_eq!(movie.subtitle(), Some("1979".to_string()));
    }

    #[test]
    fn test_details_keep_unknown_keys() {
        let raw = r#"{"description":"d","label":"Apple","rating":4.5}"#;
        let details: MediaDetails = serde_json::from_str(raw).unwrap();
        assert_eq!(details.extra.len(), 2);
        assert!(!details.is_empty());
        assert!(MediaDetails::default().is_empty());
    }

    #[test]
    fn test_presentation_helpers() {
        let item = album();
        assert_eq!(item.subtitle().as_deref(), Some("The Beatles"));
        assert_eq!(item.tertiary_text().as_deref(), Some("1969"));

        let song = MediaItem::new(
            "rec-1",
            "Something",
            MediaKind::Song {
                artist: Some("The Beatles".to_string()),
                album: Some("Abbey Road".to_string()),
                album_id: None,
                duration_ms: Some(182_000),
            },
        );
        assert_eq!(song.tertiary_text().as_deref(), Some("Abbey Road"));
    }

    #[test]
    fn test_set_artist_only_on_music_releases() {
        let mut item = album();
        assert!(item.set_artist(Some("Beatles".to_string())));
        assert_eq!(item.artist(), Some("Beatles"));

        let mut book = MediaItem::new("b", "Dune", MediaKind::empty(MediaType::Book));
        assert!(!book.set_artist(Some("x".to_string())));
        assert_eq!(book.artist(), None);
    }

    #[test]
    fn test_empty_image_is_absent() {
        let item = album().with_image_url("");
        assert_eq!(item.image(), None);
    }
}
