use plex_sorter::config::Config;
use plex_sorter::domain::table::StoreTable;
use plex_sorter::error::Result;
use plex_sorter::infrastructure::store::Store;
use plex_sorter::logging::Logging;
use plex_sorter::services::sync_service::{SyncOptions, SyncPipeline};

pub async fn sync(
    config: &Config,
    logging: &Logging,
    source: String,
    target: Option<String>,
    persist: Option<StoreTable>,
    replace: bool,
) -> Result<()> {
    let mut pipeline = SyncPipeline::connect(reqwest::Client::new(), &config.plex, logging).await?;

    let mut options = SyncOptions::new(source).replace_existing(replace);
    if let Some(target) = target {
        options = options.target(target);
    }
    if let Some(table) = persist {
        let store = Store::new(&config.database_path, logging.component("store"));
        store.initialize().await?;
        pipeline = pipeline.with_store(store);
        options = options.persist_to(table);
    }

    let report = pipeline.run(&options).await?;

    println!(
        "Created {:?} from {:?} with {} tracks",
        report.target,
        report.source,
        report.tracks.len()
    );
    if report.persisted > 0 {
        println!("Stored {} tracks locally", report.persisted);
    }
    for (i, track) in report.tracks.iter().enumerate() {
        println!("{:>4}. {track}", i + 1);
    }
    Ok(())
}
