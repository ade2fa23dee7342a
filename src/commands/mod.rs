use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use plex_sorter::config::Config;
use plex_sorter::domain::table::{StoreTable, TrackColumn};
use plex_sorter::error::Result;
use plex_sorter::logging::Logging;

pub mod playlists;
pub mod serve;
pub mod sync;
pub mod tracks;

#[derive(Debug, Parser)]
#[command(name = "plex-sorter", version, about = "Sort Plex playlists by track title")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sort a Plex playlist by title and publish it as a new playlist
    Sync {
        /// Name of the playlist to sort
        source: String,
        /// Name of the new playlist [default: "<SOURCE> Sorted"]
        #[arg(long)]
        target: Option<String>,
        /// Also store the fetched tracks in a local table
        #[arg(long, num_args = 0..=1, default_missing_value = "plex_data")]
        persist: Option<StoreTable>,
        /// Delete existing playlists named like the target first
        #[arg(long)]
        replace: bool,
    },
    /// List the audio playlists on the Plex server
    Playlists,
    /// Run the web front end
    Serve {
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// List stored tracks, optionally filtered or sorted
    Tracks {
        table: StoreTable,
        #[arg(long)]
        track_id: Option<String>,
        #[arg(long)]
        album: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        /// Sort by this column instead of filtering
        #[arg(long, conflicts_with_all = ["track_id", "album", "artist"])]
        sort: Option<TrackColumn>,
    },
    /// Remove stored tracks by Plex track id
    Remove { table: StoreTable, track_id: String },
}

pub async fn run(cli: Cli, config: &Config, logging: &Logging) -> Result<()> {
    match cli.command {
        Command::Sync {
            source,
            target,
            persist,
            replace,
        } => sync::sync(config, logging, source, target, persist, replace).await,
        Command::Playlists => playlists::playlists(config, logging).await,
        Command::Serve { bind } => serve::serve(config, logging, bind).await,
        Command::Tracks {
            table,
            track_id,
            album,
            artist,
            sort,
        } => {
            let filter = plex_sorter::domain::track::TrackFilter {
                track_id,
                album,
                artist,
            };
            tracks::tracks(config, logging, table, filter, sort).await
        }
        Command::Remove { table, track_id } => {
            tracks::remove(config, logging, table, &track_id).await
        }
    }
}
