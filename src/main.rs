//! Headless tile-match runner (default binary).
//!
//! Starts one session and serves it over the controller adapter. Every
//! command is applied on this thread; the adapter only moves bytes.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tile_match::adapter::{Adapter, Driver, JsonFileStore};
use tile_match::core::Session;
use tile_match::GameConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GameConfig::from_env();
    let store = JsonFileStore::open(&config.score_path)
        .with_context(|| format!("failed to open score file {}", config.score_path.display()))?;

    let session = Session::new(config.session.clone());
    match session.best_score(&store) {
        Ok(Some(best)) => info!(best, "last persisted score"),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "could not read persisted score"),
    }

    let Some(mut adapter) = Adapter::start_from_env()? else {
        info!("adapter disabled, nothing to serve");
        return Ok(());
    };

    let mut driver = Driver::new(session, store);
    while let Some(inbound) = adapter.recv_blocking() {
        for msg in driver.handle(inbound) {
            adapter.send(msg);
        }
    }

    info!(score = driver.session().state().score(), "adapter stopped");
    Ok(())
}
