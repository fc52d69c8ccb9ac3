//! Protocol-wide aggregates from the factory entity.

use chrono::Utc;
use serde::Deserialize;

use crate::blocks::{delta_timestamps, BlockResolver};
use crate::client::GraphClient;
use crate::error::{Result, ScryError};
use crate::query::block_clause;
use crate::types::{decimal_from_str, ProtocolData};
use crate::utils::{percent_change, window_total};

fn factories_query(block: Option<u64>) -> String {
    format!(
        "query factories {{
            factories(first: 1 {block}) {{
                totalTransactions
                totalVolumeUSD
                totalLiquidityUSD
            }}
        }}",
        block = block_clause(block),
    )
}

#[derive(Debug, Clone, Deserialize)]
struct FactoryFields {
    #[serde(rename = "totalTransactions", deserialize_with = "decimal_from_str")]
    total_transactions: f64,
    #[serde(rename = "totalVolumeUSD", deserialize_with = "decimal_from_str")]
    total_volume_usd: f64,
    #[serde(rename = "totalLiquidityUSD", deserialize_with = "decimal_from_str")]
    total_liquidity_usd: f64,
}

#[derive(Debug, Deserialize)]
struct FactoriesResponse {
    factories: Vec<FactoryFields>,
}

async fn fetch_factory(client: &GraphClient, block: Option<u64>) -> Result<Option<FactoryFields>> {
    let response: FactoriesResponse = client.query(&factories_query(block)).await?;
    Ok(response.factories.into_iter().next())
}

/// Fetches factory totals at now / 24h / 48h and derives the protocol
/// overview.
///
/// A failed block resolution or any failed sub-query fails the whole call:
/// no deltas are fabricated against missing history.
pub async fn fetch_protocol_data(
    client: &GraphClient,
    resolver: &BlockResolver,
) -> Result<ProtocolData> {
    let windows = delta_timestamps(Utc::now());
    let blocks = resolver
        .blocks_from_timestamps(&[windows.t24, windows.t48])
        .await?;
    let (block24, block48) = (blocks[0].number, blocks[1].number);

    let (current, one_day, two_day) = futures::try_join!(
        fetch_factory(client, None),
        fetch_factory(client, Some(block24)),
        fetch_factory(client, Some(block48)),
    )?;

    let current = current.ok_or(ScryError::PartialData("current factory totals"))?;
    Ok(derive_protocol_data(
        &current,
        one_day.as_ref(),
        two_day.as_ref(),
    ))
}

/// Pure derivation of the overview metrics from up to three factory
/// readings.
fn derive_protocol_data(
    current: &FactoryFields,
    one_day: Option<&FactoryFields>,
    two_day: Option<&FactoryFields>,
) -> ProtocolData {
    let volume_usd = window_total(
        current.total_volume_usd,
        one_day.map(|f| f.total_volume_usd),
    );

    // Day-over-day volume change compares this 24h window against the
    // previous one (between 48h and 24h ago), as a ratio of window totals.
    let volume_usd_change = match (one_day, two_day) {
        (Some(one_day), Some(two_day)) if volume_usd != 0.0 => {
            let previous_window = one_day.total_volume_usd - two_day.total_volume_usd;
            if previous_window != 0.0 {
                volume_usd / previous_window * 100.0
            } else {
                0.0
            }
        },
        _ => 0.0,
    };

    let tvl_usd_change = percent_change(
        Some(current.total_liquidity_usd),
        one_day.map(|f| f.total_liquidity_usd),
    );

    let tx_count = window_total(
        current.total_transactions,
        one_day.map(|f| f.total_transactions),
    );
    let tx_count_change = percent_change(
        Some(current.total_transactions),
        one_day.map(|f| f.total_transactions),
    );

    ProtocolData {
        volume_usd,
        volume_usd_change,
        tvl_usd: current.total_liquidity_usd,
        tvl_usd_change,
        tx_count,
        tx_count_change,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(transactions: f64, volume: f64, liquidity: f64) -> FactoryFields {
        FactoryFields {
            total_transactions: transactions,
            total_volume_usd: volume,
            total_liquidity_usd: liquidity,
        }
    }

    #[test]
    fn window_metrics_are_differences_of_cumulatives() {
        let current = factory(1_000.0, 50_000.0, 9_000.0);
        let one_day = factory(900.0, 48_000.0, 8_000.0);
        let two_day = factory(850.0, 47_000.0, 7_500.0);

        let data = derive_protocol_data(&current, Some(&one_day), Some(&two_day));

        assert_eq!(data.volume_usd, 2_000.0);
        assert_eq!(data.tx_count, 100.0);
        // This window (2000) vs previous window (1000), as a ratio.
        assert!((data.volume_usd_change - 200.0).abs() < 1e-9);
        assert!((data.tvl_usd_change - 12.5).abs() < 1e-9);
    }

    #[test]
    fn missing_history_yields_totals_with_zero_change() {
        let current = factory(1_000.0, 50_000.0, 9_000.0);

        let data = derive_protocol_data(&current, None, None);

        assert_eq!(data.volume_usd, 50_000.0);
        assert_eq!(data.volume_usd_change, 0.0);
        assert_eq!(data.tvl_usd, 9_000.0);
        assert_eq!(data.tvl_usd_change, 0.0);
        assert_eq!(data.tx_count, 1_000.0);
    }

    #[test]
    fn factory_fields_decode_decimal_strings() {
        let response: FactoriesResponse = serde_json::from_value(serde_json::json!({
            "factories": [{
                "totalTransactions": "123456",
                "totalVolumeUSD": "9876543.21",
                "totalLiquidityUSD": "1234567.89",
            }],
        }))
        .unwrap();

        assert_eq!(response.factories[0].total_transactions, 123_456.0);
        assert_eq!(response.factories[0].total_volume_usd, 9_876_543.21);
    }
}
