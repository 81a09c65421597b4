//! Track metadata shown to listeners.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Maximum length for track title and artist.
pub const MAX_TEXT_LENGTH: usize = 256;

/// Maximum length for the cover image URL.
pub const MAX_COVER_LENGTH: usize = 2048;

/// Metadata for the track currently on air.
///
/// # Invariants
///
/// - `title` and `artist` are trimmed, non-empty, at most 256 characters
/// - `cover` is at most 2048 characters when present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    title: String,
    artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cover: Option<String>,
}

impl Track {
    /// Create a validated track.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if title or artist is blank
    /// - `TooLong` if any field exceeds its limit
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        cover: Option<String>,
    ) -> Result<Self, ValidationError> {
        let title = Self::validate_text("title", title.into())?;
        let artist = Self::validate_text("artist", artist.into())?;
        let cover = cover
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if let Some(c) = &cover {
            if c.chars().count() > MAX_COVER_LENGTH {
                return Err(ValidationError::too_long("cover", MAX_COVER_LENGTH));
            }
        }
        Ok(Self {
            title,
            artist,
            cover,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn cover(&self) -> Option<&str> {
        self.cover.as_deref()
    }

    /// Produce the track that results from applying `update` on top of this one.
    ///
    /// Fields absent from the update keep their current value.
    pub fn apply(&self, update: &TrackUpdate) -> Result<Track, ValidationError> {
        Track::new(
            update.title.clone().unwrap_or_else(|| self.title.clone()),
            update.artist.clone().unwrap_or_else(|| self.artist.clone()),
            update.cover.clone().or_else(|| self.cover.clone()),
        )
    }

    fn validate_text(field: &str, value: String) -> Result<String, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field(field));
        }
        if trimmed.chars().count() > MAX_TEXT_LENGTH {
            return Err(ValidationError::too_long(field, MAX_TEXT_LENGTH));
        }
        Ok(trimmed.to_string())
    }
}

/// Partial track metadata as sent by the broadcaster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TrackUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
}

impl TrackUpdate {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn full(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            artist: Some(artist.into()),
            cover: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Track {
        Track::new("Night Drive", "Nobody", None).unwrap()
    }

    #[test]
    fn new_trims_fields() {
        let track = Track::new("  T  ", " Ar ", Some("  ".to_string())).unwrap();
        assert_eq!(track.title(), "T");
        assert_eq!(track.artist(), "Ar");
        assert_eq!(track.cover(), None);
    }

    #[test]
    fn new_rejects_blank_title() {
        let err = Track::new("   ", "Ar", None).unwrap_err();
        assert_eq!(err, ValidationError::empty_field("title"));
    }

    #[test]
    fn new_rejects_oversized_artist() {
        let long = "a".repeat(MAX_TEXT_LENGTH + 1);
        let err = Track::new("T", long, None).unwrap_err();
        assert_eq!(err, ValidationError::too_long("artist", MAX_TEXT_LENGTH));
    }

    #[test]
    fn apply_keeps_absent_fields() {
        let updated = base().apply(&TrackUpdate::titled("T2")).unwrap();
        assert_eq!(updated.title(), "T2");
        assert_eq!(updated.artist(), "Nobody");
    }

    #[test]
    fn apply_replaces_cover_when_given() {
        let update = TrackUpdate {
            cover: Some("https://img.example/c.png".to_string()),
            ..Default::default()
        };
        let updated = base().apply(&update).unwrap();
        assert_eq!(updated.cover(), Some("https://img.example/c.png"));
    }

    #[test]
    fn cover_is_omitted_from_json_when_absent() {
        let json = serde_json::to_value(base()).unwrap();
        assert_eq!(json, serde_json::json!({"title": "Night Drive", "artist": "Nobody"}));
    }

    #[test]
    fn update_deserializes_with_missing_fields() {
        let update: TrackUpdate = serde_json::from_str(r#"{"title":"T2"}"#).unwrap();
        assert_eq!(update, TrackUpdate::titled("T2"));
    }
}
