//! Job to refresh tracked pool snapshots.

use anyhow::{Context, Result};
use log::info;

use crate::cache::DataKind;
use crate::data::pools;
use crate::engine::Engine;

/// Discovers the current top pools, tracks any new ones and re-fetches
/// snapshots for everything tracked.
///
/// Addresses still waiting on a first snapshot are claimed through the
/// fetch slot so an in-flight or failed first fetch is not duplicated;
/// already-populated entries are refreshed unconditionally and replaced
/// last-write-wins.
pub async fn run(engine: &Engine) -> Result<()> {
    info!("Starting refresh_pools job...");

    let start = std::time::Instant::now();
    let settings = &engine.settings().exchange;

    let top = pools::top_pool_addresses(
        engine.exchange(),
        settings.top_entity_count,
        &settings.token_blacklist,
    )
    .await
    .context("Failed to discover top pools")?;

    let new = engine.pools.untracked(&top);
    if !new.is_empty() {
        info!("Tracking {} new pools", new.len());
        engine.pools.track(&new);
    }

    let mut claimed = Vec::new();
    let mut refresh = Vec::new();
    for address in engine.pools.tracked() {
        if engine.pools.snapshot_of(&address).is_some() {
            refresh.push(address);
        } else if engine.pools.begin_fetch(&address, DataKind::Snapshot) {
            claimed.push(address.clone());
            refresh.push(address);
        }
    }

    if refresh.is_empty() {
        info!("No pools to refresh");
        return Ok(());
    }

    let fetched = match pools::fetch_pool_data(engine.exchange(), engine.resolver(), &refresh).await
    {
        Ok(fetched) => fetched,
        Err(err) => {
            for address in &claimed {
                engine.pools.fail(address, DataKind::Snapshot);
            }
            return Err(err).context("Failed to fetch pool snapshots");
        },
    };

    // A claimed pool the indexer no longer returns would otherwise sit in
    // the pending state forever.
    for address in &claimed {
        if !fetched.contains_key(address) {
            engine.pools.fail(address, DataKind::Snapshot);
        }
    }

    let count = fetched.len();
    engine.pools.commit_snapshots(fetched.into_iter().collect());

    info!(
        "Completed refresh_pools job in {:?} ({} pools)",
        start.elapsed(),
        count
    );
    Ok(())
}
