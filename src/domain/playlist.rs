use super::track::Track;

/// A named, ordered list of tracks.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    pub name: String,
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            tracks,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }

    pub fn normalize_titles(&mut self) {
        for track in &mut self.tracks {
            *track = std::mem::take(track).normalized();
        }
    }

    /// Orders tracks by title using `String`'s ordering (byte-wise, so
    /// uppercase sorts before lowercase). Equal titles keep their remote order.
    pub fn sort_by_title(&mut self) {
        self.tracks.sort_by(|a, b| a.title.cmp(&b.title));
    }

    pub fn track_ids(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.track_id.clone()).collect()
    }
}
