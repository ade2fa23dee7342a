use plex_sorter::config::Config;
use plex_sorter::domain::remote::RemotePlaylists;
use plex_sorter::error::Result;
use plex_sorter::infrastructure::plex::PlexClient;
use plex_sorter::logging::Logging;

pub async fn playlists(config: &Config, logging: &Logging) -> Result<()> {
    let client =
        PlexClient::connect(reqwest::Client::new(), &config.plex, logging.component("plex")).await?;

    let mut playlists = client.playlist_entries().await?;
    if playlists.is_empty() {
        println!("No audio playlists found");
        return Ok(());
    }

    playlists.sort();
    for (name, id) in playlists {
        println!("{id:>8}  {name}");
    }
    Ok(())
}
