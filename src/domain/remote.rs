use std::collections::HashMap;

use async_trait::async_trait;

use super::track::Track;
use crate::error::Result;

/// Playlist operations the sync pipeline needs from a media server.
#[async_trait]
pub trait RemotePlaylists: Send + Sync {
    /// Every playlist as `(name, id)` in server order. Names may repeat.
    async fn playlist_entries(&self) -> Result<Vec<(String, String)>>;

    /// Playlist name to playlist id. Names are not unique on the server;
    /// when two playlists share a name the last one listed wins.
    async fn list_playlists(&self) -> Result<HashMap<String, String>> {
        Ok(self.playlist_entries().await?.into_iter().collect())
    }

    /// Tracks of the named playlist in server order, with titles normalized.
    /// Fails with `NotFound` when no playlist has that name.
    async fn playlist_tracks(&self, name: &str) -> Result<Vec<Track>>;

    /// Creates a new playlist holding `track_ids` in the given order. Existing
    /// playlists with the same name are left alone.
    async fn create_playlist(&self, name: &str, track_ids: &[String]) -> Result<()>;

    async fn delete_playlist(&self, playlist_id: &str) -> Result<()>;
}
