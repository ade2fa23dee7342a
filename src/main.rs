mod commands;

use anyhow::Result;
use clap::Parser;

use commands::Cli;
use plex_sorter::config::Config;
use plex_sorter::logging::Logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let logging = Logging::install(config.log_file.as_deref())?;
    tracing::info!("Starting plex-sorter v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = commands::run(cli, &config, &logging).await {
        tracing::error!("{e}");
        return Err(e.into());
    }
    Ok(())
}
