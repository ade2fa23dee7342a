use std::fmt;

use super::title::normalize_title;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Track {
    /// Local row id, `None` until the track has been stored.
    pub id: Option<i64>,
    pub title: String,
    pub album: String,
    pub artist: String,
    /// Identifier assigned by the media server (Plex `ratingKey`).
    pub track_id: String,
    /// Kept for schema compatibility; nothing writes it today.
    pub url: Option<String>,
}

impl Track {
    pub fn new(
        title: impl Into<String>,
        album: impl Into<String>,
        artist: impl Into<String>,
        track_id: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            album: album.into(),
            artist: artist.into(),
            track_id: track_id.into(),
            url: None,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.title = normalize_title(&self.title);
        self
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - {}", self.track_id, self.title, self.artist)
    }
}

/// Conjunctive lookup filter; `None` fields do not constrain the result.
#[derive(Debug, Clone, Default)]
pub struct TrackFilter {
    pub track_id: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
}

impl TrackFilter {
    pub fn by_track_id(track_id: impl Into<String>) -> Self {
        Self {
            track_id: Some(track_id.into()),
            ..Self::default()
        }
    }
}
