use anyhow::Context;

use crate::application::config::StoreConfig;
use crate::infrastructure::persistence::create_store;

/// Check store reachability once and report.
///
/// # Errors
///
/// Returns an error if the store cannot be created or does not answer.
pub async fn run_ping(config: &StoreConfig) -> anyhow::Result<()> {
    let store = create_store(config).context("Failed to create store")?;
    store
        .ping()
        .await
        .with_context(|| format!("Store at {} is unreachable", config.addr))?;
    println!("store at {} is reachable", config.addr);
    Ok(())
}
