//! Job to refresh tracked token snapshots.

use anyhow::{Context, Result};
use log::info;

use crate::cache::DataKind;
use crate::data::tokens;
use crate::engine::Engine;

/// Discovers the current top tokens, tracks any new ones and re-fetches
/// snapshots for everything tracked.
///
/// Token derivation always yields an entry per requested address (unknown
/// tokens come back flagged rather than missing), so every claimed address
/// is settled by the commit.
pub async fn run(engine: &Engine) -> Result<()> {
    info!("Starting refresh_tokens job...");

    let start = std::time::Instant::now();
    let settings = &engine.settings().exchange;

    let top = tokens::top_token_addresses(
        engine.exchange(),
        settings.top_entity_count,
        &settings.token_blacklist,
    )
    .await
    .context("Failed to discover top tokens")?;

    let new = engine.tokens.untracked(&top);
    if !new.is_empty() {
        info!("Tracking {} new tokens", new.len());
        engine.tokens.track(&new);
    }

    let mut claimed = Vec::new();
    let mut refresh = Vec::new();
    for address in engine.tokens.tracked() {
        if engine.tokens.snapshot_of(&address).is_some() {
            refresh.push(address);
        } else if engine.tokens.begin_fetch(&address, DataKind::Snapshot) {
            claimed.push(address.clone());
            refresh.push(address);
        }
    }

    if refresh.is_empty() {
        info!("No tokens to refresh");
        return Ok(());
    }

    let fetched =
        match tokens::fetch_token_data(engine.exchange(), engine.resolver(), &refresh).await {
            Ok(fetched) => fetched,
            Err(err) => {
                for address in &claimed {
                    engine.tokens.fail(address, DataKind::Snapshot);
                }
                return Err(err).context("Failed to fetch token snapshots");
            },
        };

    let count = fetched.len();
    engine.tokens.commit_snapshots(fetched.into_iter().collect());

    info!(
        "Completed refresh_tokens job in {:?} ({} tokens)",
        start.elapsed(),
        count
    );
    Ok(())
}
