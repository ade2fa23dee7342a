use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Result, SorterError};
use crate::infrastructure::plex::{PLEX_TV_URL, PlexCredentials};

pub const DEFAULT_DATABASE: &str = "PlexSorter.db";
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

pub struct Config {
    pub plex: PlexCredentials,
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values are treated as unset.
    ///
    /// Plex settings are not checked here: commands that never talk to Plex
    /// run without them, and `PlexClient::connect` reports what is missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let bind = var("PLEX_SORTER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind.parse().map_err(|e| {
            SorterError::Configuration(format!("invalid PLEX_SORTER_BIND {bind:?}: {e}"))
        })?;

        Ok(Self {
            plex: PlexCredentials {
                token: var("PLEX_TOKEN"),
                username: var("PLEX_USERNAME"),
                password: var("PLEX_PASSWORD"),
                server_name: var("PLEX_SERVER_NAME"),
                base_url: var("PLEX_BASE_URL"),
                account_url: var("PLEX_ACCOUNT_URL").unwrap_or_else(|| PLEX_TV_URL.to_string()),
            },
            database_path: var("PLEX_SORTER_DB")
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
                .into(),
            bind_addr,
            log_file: var("PLEX_SORTER_LOG").map(PathBuf::from),
        })
    }
}
