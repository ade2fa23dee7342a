use std::fmt;

use tracing::{Span, debug, info};

use crate::domain::playlist::Playlist;
use crate::domain::remote::RemotePlaylists;
use crate::domain::table::StoreTable;
use crate::domain::track::Track;
use crate::error::{Result, SorterError};
use crate::infrastructure::plex::{PlexClient, PlexCredentials};
use crate::infrastructure::store::Store;
use crate::logging::Logging;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Connect,
    Fetch,
    Normalize,
    Persist,
    Sort,
    Publish,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::Connect => "connect",
            SyncStage::Fetch => "fetch",
            SyncStage::Normalize => "normalize",
            SyncStage::Persist => "persist",
            SyncStage::Sort => "sort",
            SyncStage::Publish => "publish",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub source: String,
    pub target: String,
    pub persist_to: Option<StoreTable>,
    /// Delete remote playlists already named `target` before publishing.
    pub replace_existing: bool,
}

impl SyncOptions {
    /// Sorts `source` into `"<source> Sorted"` without persisting.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let target = format!("{source} Sorted");
        Self {
            source,
            target,
            persist_to: None,
            replace_existing: false,
        }
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn persist_to(mut self, table: StoreTable) -> Self {
        self.persist_to = Some(table);
        self
    }

    pub fn replace_existing(mut self, replace: bool) -> Self {
        self.replace_existing = replace;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub source: String,
    pub target: String,
    /// Published tracks, in published order.
    pub tracks: Vec<Track>,
    pub persisted: usize,
}

/// Fetch, normalize, optionally persist, sort and republish one playlist.
///
/// Any stage error ends the run and is returned unchanged; nothing done by an
/// earlier stage is rolled back.
pub struct SyncPipeline<R> {
    remote: R,
    store: Option<Store>,
    span: Span,
}

impl SyncPipeline<PlexClient> {
    pub async fn connect(
        http: reqwest::Client,
        credentials: &PlexCredentials,
        logging: &Logging,
    ) -> Result<Self> {
        let span = logging.component("sync");
        debug!(parent: &span, stage = %SyncStage::Connect, "Entering connect stage");
        let client = PlexClient::connect(http, credentials, logging.component("plex")).await?;
        Ok(Self::new(client, span))
    }
}

impl<R: RemotePlaylists> SyncPipeline<R> {
    pub fn new(remote: R, span: Span) -> Self {
        Self {
            remote,
            store: None,
            span,
        }
    }

    pub fn with_store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn run(&self, options: &SyncOptions) -> Result<SyncReport> {
        self.stage(SyncStage::Fetch);
        let tracks = self.remote.playlist_tracks(&options.source).await?;
        let mut playlist = Playlist::new(options.source.as_str(), tracks);

        self.stage(SyncStage::Normalize);
        playlist.normalize_titles();

        let persisted = match options.persist_to {
            Some(table) => {
                self.stage(SyncStage::Persist);
                self.persist(table, playlist.tracks()).await?
            }
            None => 0,
        };

        self.stage(SyncStage::Sort);
        playlist.sort_by_title();
        debug!(parent: &self.span, "Sorted playlist: {:?}", playlist.track_ids());

        self.stage(SyncStage::Publish);
        let track_ids = playlist.track_ids();
        if track_ids.is_empty() {
            return Err(SorterError::Validation(format!(
                "playlist {:?} has no tracks to publish",
                options.source
            )));
        }
        if options.replace_existing {
            self.remove_existing(&options.target).await?;
        }
        self.remote.create_playlist(&options.target, &track_ids).await?;

        info!(
            parent: &self.span,
            "Published {:?} as {:?} ({} tracks)",
            options.source,
            options.target,
            track_ids.len()
        );
        Ok(SyncReport {
            source: options.source.clone(),
            target: options.target.clone(),
            tracks: playlist.into_tracks(),
            persisted,
        })
    }

    fn stage(&self, stage: SyncStage) {
        debug!(parent: &self.span, stage = %stage, "Entering {stage} stage");
    }

    async fn persist(&self, table: StoreTable, tracks: &[Track]) -> Result<usize> {
        let store = self.store.as_ref().ok_or_else(|| {
            SorterError::Configuration(format!("persisting to {table} requires a store"))
        })?;
        let mut session = store.open().await?;
        let count = session.insert_tracks(table, tracks).await?;
        session.close().await?;
        Ok(count)
    }

    /// Deletes every playlist called `name`; repeated plain runs leave several.
    async fn remove_existing(&self, name: &str) -> Result<()> {
        let playlists = self.remote.playlist_entries().await?;
        for (_, playlist_id) in playlists.iter().filter(|(title, _)| title == name) {
            info!(parent: &self.span, "Replacing existing playlist {name:?} ({playlist_id})");
            self.remote.delete_playlist(playlist_id).await?;
        }
        Ok(())
    }
}
