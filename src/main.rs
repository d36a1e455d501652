use anyhow::Context;
use clap::Parser;
use log::info;

use autoqm_launcher::config::{Args, LauncherConfig};
use autoqm_launcher::db::open::open_db;
use autoqm_launcher::launch::launch_jobs;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("autoQM job launcher starting up");

    let config = LauncherConfig::load(Args::parse())?;
    info!("Launching up to {} jobs from {}", config.limit, config.data_path.display());

    let conn = open_db(&config.db_path)
        .with_context(|| format!("Opening registration database {}", config.db_path.display()))?;

    let summary = launch_jobs(&conn, &config).await?;
    info!(
        "Finished: {} selected, {} launched, {} failed",
        summary.selected, summary.launched, summary.failed
    );

    Ok(())
}
