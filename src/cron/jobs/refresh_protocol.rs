//! Job to refresh the protocol-wide overview, chart and transaction feed.

use anyhow::{Context, Result};
use log::info;

use crate::data::{chart, protocol, transactions};
use crate::engine::Engine;

/// Refreshes the three protocol-level pieces in order: overview metrics,
/// the daily chart and the latest transactions. Commits are wholesale
/// replacements, so a cycle that dies midway leaves the previous data in
/// place rather than a partial mix.
pub async fn run(engine: &Engine) -> Result<()> {
    info!("Starting refresh_protocol job...");

    let start = std::time::Instant::now();

    let data = protocol::fetch_protocol_data(engine.exchange(), engine.resolver())
        .await
        .context("Failed to fetch protocol overview")?;
    engine.protocol.commit_data(data);

    let chart_start = engine.settings().exchange.chart_start_timestamp;
    let series = chart::fetch_protocol_chart(engine.exchange(), chart_start)
        .await
        .context("Failed to fetch protocol chart")?;
    let days = series.len();
    engine.protocol.commit_chart(series);

    let feed = transactions::fetch_global_transactions(engine.exchange())
        .await
        .context("Failed to fetch global transactions")?;
    let count = feed.len();
    engine.protocol.commit_transactions(feed);

    info!(
        "Completed refresh_protocol job in {:?} ({} chart days, {} transactions)",
        start.elapsed(),
        days,
        count
    );
    Ok(())
}
