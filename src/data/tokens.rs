//! Token discovery and bulk snapshot queries.
//!
//! Unlike pools, token snapshots at each block height go out as separate
//! queries (the indexer caches block-pinned token reads independently), and
//! USD prices are derived from `derivedNative` times the native price at
//! the matching height.

use chrono::Utc;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::blocks::{delta_timestamps, BlockResolver};
use crate::client::GraphClient;
use crate::data::prices::{fetch_native_prices, NativePrices};
use crate::error::Result;
use crate::query::{address_list, block_clause, fetch_sliced};
use crate::types::{decimal_from_str, TokenData};
use crate::utils::{day_change, percent_change, window_total};

fn top_tokens_query(count: usize, blacklist: &[String]) -> String {
    format!(
        "query topTokens {{
            tokens(
                first: {count}
                orderBy: tradeVolumeUSD
                orderDirection: desc
                where: {{ totalTransactions_gt: 100, id_not_in: {blacklist} }}
            ) {{
                id
            }}
        }}",
        blacklist = address_list(blacklist),
    )
}

fn tokens_query(block: Option<u64>, tokens: &[String]) -> String {
    format!(
        "query tokens {{
            tokens(
                where: {{ id_in: {addresses} }}
                {block}
                orderBy: tradeVolumeUSD
                orderDirection: desc
            ) {{
                id
                symbol
                name
                derivedNative
                derivedUSD
                tradeVolumeUSD
                totalTransactions
                totalLiquidity
            }}
        }}",
        addresses = address_list(tokens),
        block = block_clause(block),
    )
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TopTokensResponse {
    tokens: Vec<IdOnly>,
}

#[derive(Debug, Clone, Deserialize)]
struct TokenFields {
    id: String,
    symbol: String,
    name: String,
    #[serde(rename = "derivedNative", deserialize_with = "decimal_from_str")]
    derived_native: f64,
    #[serde(rename = "derivedUSD", deserialize_with = "decimal_from_str")]
    derived_usd: f64,
    #[serde(rename = "tradeVolumeUSD", deserialize_with = "decimal_from_str")]
    trade_volume_usd: f64,
    #[serde(rename = "totalTransactions", deserialize_with = "decimal_from_str")]
    total_transactions: f64,
    #[serde(rename = "totalLiquidity", deserialize_with = "decimal_from_str")]
    total_liquidity: f64,
}

#[derive(Debug, Deserialize)]
struct TokensResponse {
    tokens: Vec<TokenFields>,
}

/// Addresses of the highest-volume tokens, blacklist applied server-side.
pub async fn top_token_addresses(
    client: &GraphClient,
    count: usize,
    blacklist: &[String],
) -> Result<Vec<String>> {
    let response: TopTokensResponse = client.query(&top_tokens_query(count, blacklist)).await?;
    Ok(response.tokens.into_iter().map(|t| t.id).collect())
}

async fn fetch_tokens_at(
    client: &GraphClient,
    block: Option<u64>,
    addresses: &[String],
) -> Result<FxHashMap<String, TokenFields>> {
    let rows = fetch_sliced(addresses, |slice| {
        let query = tokens_query(block, slice);
        async move {
            let response: TokensResponse = client.query(&query).await?;
            Ok(response.tokens)
        }
    })
    .await?;

    let mut indexed = FxHashMap::default();
    for token in rows {
        indexed.insert(token.id.clone(), token);
    }
    Ok(indexed)
}

/// Fetches token snapshots at now / 24h / 1w plus native prices, and
/// derives per-token metrics.
pub async fn fetch_token_data(
    client: &GraphClient,
    resolver: &BlockResolver,
    addresses: &[String],
) -> Result<FxHashMap<String, TokenData>> {
    if addresses.is_empty() {
        return Ok(FxHashMap::default());
    }

    let windows = delta_timestamps(Utc::now());
    let blocks = resolver
        .blocks_from_timestamps(&windows.as_array())
        .await?;
    let (block24, block48, block_week) = (blocks[0].number, blocks[1].number, blocks[2].number);

    let prices = fetch_native_prices(client, block24, block48, block_week).await?;

    let (current, one_day, one_week) = futures::try_join!(
        fetch_tokens_at(client, None, addresses),
        fetch_tokens_at(client, Some(block24), addresses),
        fetch_tokens_at(client, Some(block_week), addresses),
    )?;

    Ok(derive_token_data(
        addresses, &current, &one_day, &one_week, &prices,
    ))
}

/// Pure derivation of token metrics from the snapshot maps and native
/// prices.
///
/// Every requested address yields an entry; tokens absent from the current
/// snapshot are flagged `exists: false` with zeroed metrics so consumers
/// can tell "unknown token" from "quiet token".
fn derive_token_data(
    addresses: &[String],
    current: &FxHashMap<String, TokenFields>,
    one_day: &FxHashMap<String, TokenFields>,
    one_week: &FxHashMap<String, TokenFields>,
    prices: &NativePrices,
) -> FxHashMap<String, TokenData> {
    let mut derived = FxHashMap::default();

    for address in addresses {
        let token = current.get(address);
        let day = one_day.get(address);
        let week = one_week.get(address);

        let (volume_usd, volume_usd_change) = match (token, day) {
            (Some(token), Some(day)) => day_change(token.trade_volume_usd, day.trade_volume_usd),
            (Some(token), None) => (token.trade_volume_usd, 0.0),
            _ => (0.0, 0.0),
        };
        let volume_usd_week = match token {
            Some(token) => window_total(token.trade_volume_usd, week.map(|w| w.trade_volume_usd)),
            None => 0.0,
        };

        let tvl_usd = token.map_or(0.0, |t| t.total_liquidity * t.derived_usd);
        let tvl_usd_one_day = day.map_or(0.0, |d| d.total_liquidity * d.derived_usd);
        let tvl_usd_change = percent_change(Some(tvl_usd), Some(tvl_usd_one_day));

        let price_usd = token.map_or(0.0, |t| t.derived_native * prices.current);
        let price_usd_one_day = day.map_or(0.0, |d| d.derived_native * prices.one_day);
        let price_usd_week = week.map_or(0.0, |w| w.derived_native * prices.week);
        let price_usd_change = percent_change(Some(price_usd), Some(price_usd_one_day));
        let price_usd_change_week = percent_change(Some(price_usd), Some(price_usd_week));

        let tx_count = match token {
            Some(token) => {
                window_total(token.total_transactions, day.map(|d| d.total_transactions))
            },
            None => 0.0,
        };

        derived.insert(
            address.clone(),
            TokenData {
                exists: token.is_some(),
                address: address.clone(),
                name: token.map_or(String::new(), |t| t.name.clone()),
                symbol: token.map_or(String::new(), |t| t.symbol.clone()),
                volume_usd,
                volume_usd_change,
                volume_usd_week,
                tx_count,
                tvl_usd,
                tvl_usd_change,
                tvl_token: token.map_or(0.0, |t| t.total_liquidity),
                price_usd,
                price_usd_change,
                price_usd_change_week,
            },
        );
    }

    derived
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(id: &str, volume: f64, liquidity: f64, derived_native: f64) -> TokenFields {
        TokenFields {
            id: id.to_string(),
            symbol: "TKN".to_string(),
            name: "Token".to_string(),
            derived_native,
            derived_usd: derived_native * 300.0,
            trade_volume_usd: volume,
            total_transactions: 100.0,
            total_liquidity: liquidity,
        }
    }

    fn indexed(tokens: Vec<TokenFields>) -> FxHashMap<String, TokenFields> {
        tokens.into_iter().map(|t| (t.id.clone(), t)).collect()
    }

    const PRICES: NativePrices = NativePrices {
        current: 300.0,
        one_day: 290.0,
        two_day: 280.0,
        week: 250.0,
    };

    #[test]
    fn price_changes_use_native_price_at_matching_height() {
        let addresses = vec!["0xaa".to_string()];
        let current = indexed(vec![token("0xaa", 1_000.0, 50.0, 1.0)]);
        let one_day = indexed(vec![token("0xaa", 900.0, 50.0, 1.0)]);
        let one_week = indexed(vec![token("0xaa", 700.0, 50.0, 1.0)]);

        let derived = derive_token_data(&addresses, &current, &one_day, &one_week, &PRICES);
        let data = &derived["0xaa"];

        // Same derivedNative, different native price per height.
        assert_eq!(data.price_usd, 300.0);
        let expected_day = (300.0 - 290.0) / 290.0 * 100.0;
        assert!((data.price_usd_change - expected_day).abs() < 1e-9);
        let expected_week = (300.0 - 250.0) / 250.0 * 100.0;
        assert!((data.price_usd_change_week - expected_week).abs() < 1e-9);
    }

    #[test]
    fn weekly_volume_is_absolute_difference() {
        let addresses = vec!["0xaa".to_string()];
        let current = indexed(vec![token("0xaa", 500.0, 50.0, 1.0)]);
        let one_week = indexed(vec![token("0xaa", 300.0, 50.0, 1.0)]);

        let derived = derive_token_data(
            &addresses,
            &current,
            &FxHashMap::default(),
            &one_week,
            &PRICES,
        );

        assert_eq!(derived["0xaa"].volume_usd_week, 200.0);
    }

    #[test]
    fn unknown_token_is_flagged_not_dropped() {
        let addresses = vec!["0xmissing".to_string()];

        let derived = derive_token_data(
            &addresses,
            &FxHashMap::default(),
            &FxHashMap::default(),
            &FxHashMap::default(),
            &PRICES,
        );
        let data = &derived["0xmissing"];

        assert!(!data.exists);
        assert_eq!(data.price_usd, 0.0);
        assert_eq!(data.volume_usd, 0.0);
        assert!(data.symbol.is_empty());
    }
}
