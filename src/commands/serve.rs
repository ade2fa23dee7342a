use std::net::SocketAddr;

use plex_sorter::config::Config;
use plex_sorter::error::Result;
use plex_sorter::infrastructure::store::Store;
use plex_sorter::logging::Logging;
use plex_sorter::web::{AppState, build_router};

pub async fn serve(config: &Config, logging: &Logging, bind: Option<SocketAddr>) -> Result<()> {
    let store = Store::new(&config.database_path, logging.component("store"));
    store.initialize().await?;

    let app = build_router(AppState::new(store));
    let addr = bind.unwrap_or(config.bind_addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
