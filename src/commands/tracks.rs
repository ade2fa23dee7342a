use plex_sorter::config::Config;
use plex_sorter::domain::table::{StoreTable, TrackColumn};
use plex_sorter::domain::track::TrackFilter;
use plex_sorter::error::Result;
use plex_sorter::infrastructure::store::Store;
use plex_sorter::logging::Logging;

pub async fn tracks(
    config: &Config,
    logging: &Logging,
    table: StoreTable,
    filter: TrackFilter,
    sort: Option<TrackColumn>,
) -> Result<()> {
    let store = Store::new(&config.database_path, logging.component("store"));
    let mut session = store.open().await?;
    let tracks = match sort {
        Some(column) => session.sorted_by_column(table, column).await?,
        None => session.find_tracks(table, &filter).await?,
    };
    session.close().await?;

    for track in &tracks {
        println!(
            "{:>6}  {}  {} / {} / {}",
            track.id.unwrap_or_default(),
            track.track_id,
            track.title,
            track.album,
            track.artist
        );
    }
    println!("{} rows in {table}", tracks.len());
    Ok(())
}

pub async fn remove(
    config: &Config,
    logging: &Logging,
    table: StoreTable,
    track_id: &str,
) -> Result<()> {
    let store = Store::new(&config.database_path, logging.component("store"));
    let mut session = store.open().await?;
    let removed = session.delete_track(table, track_id).await?;
    session.close().await?;

    println!("Removed {removed} rows for track {track_id} from {table}");
    Ok(())
}
