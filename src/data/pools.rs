//! Pool discovery and bulk snapshot queries.
//!
//! Pool snapshots at now / 24h / 1w are fetched in a single composite query
//! with one aliased sub-query per block height. The block numbers are
//! inlined as literals (see [`crate::query::template`]).

use chrono::Utc;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::blocks::{delta_timestamps, BlockResolver};
use crate::client::GraphClient;
use crate::error::Result;
use crate::query::{address_list, block_clause, fetch_sliced};
use crate::types::{decimal_from_str, PairToken, PoolData};
use crate::utils::{day_change, percent_change, window_total};

fn top_pools_query(count: usize, blacklist: &[String]) -> String {
    format!(
        "query topPools {{
            pairs(
                first: {count}
                orderBy: reserveUSD
                orderDirection: desc
                where: {{ totalTransactions_gt: 1000, token0_not_in: {blacklist}, token1_not_in: {blacklist} }}
            ) {{
                id
            }}
        }}",
        blacklist = address_list(blacklist),
    )
}

fn pairs_at_block(block: Option<u64>, pools: &[String]) -> String {
    format!(
        "pairs(
            where: {{ id_in: {addresses} }}
            {block}
            orderBy: reserveUSD
            orderDirection: desc
        ) {{
            id
            reserve0
            reserve1
            reserveUSD
            volumeUSD
            token0Price
            token1Price
            token0 {{ id symbol name }}
            token1 {{ id symbol name }}
        }}",
        addresses = address_list(pools),
        block = block_clause(block),
    )
}

fn pools_bulk_query(block24: u64, block_week: u64, pools: &[String]) -> String {
    format!(
        "query poolsBulk {{
            current: {current}
            oneDayAgo: {one_day}
            oneWeekAgo: {one_week}
        }}",
        current = pairs_at_block(None, pools),
        one_day = pairs_at_block(Some(block24), pools),
        one_week = pairs_at_block(Some(block_week), pools),
    )
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TopPoolsResponse {
    pairs: Vec<IdOnly>,
}

#[derive(Debug, Clone, Deserialize)]
struct PairTokenFields {
    id: String,
    symbol: String,
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PairFields {
    id: String,
    #[serde(deserialize_with = "decimal_from_str")]
    reserve0: f64,
    #[serde(deserialize_with = "decimal_from_str")]
    reserve1: f64,
    #[serde(rename = "reserveUSD", deserialize_with = "decimal_from_str")]
    reserve_usd: f64,
    #[serde(rename = "volumeUSD", deserialize_with = "decimal_from_str")]
    volume_usd: f64,
    #[serde(rename = "token0Price", deserialize_with = "decimal_from_str")]
    token0_price: f64,
    #[serde(rename = "token1Price", deserialize_with = "decimal_from_str")]
    token1_price: f64,
    token0: PairTokenFields,
    token1: PairTokenFields,
}

#[derive(Debug, Deserialize)]
struct PoolsBulkResponse {
    current: Vec<PairFields>,
    #[serde(rename = "oneDayAgo")]
    one_day_ago: Vec<PairFields>,
    #[serde(rename = "oneWeekAgo")]
    one_week_ago: Vec<PairFields>,
}

/// Addresses of the highest-liquidity pools, blacklist applied server-side.
pub async fn top_pool_addresses(
    client: &GraphClient,
    count: usize,
    blacklist: &[String],
) -> Result<Vec<String>> {
    let response: TopPoolsResponse = client.query(&top_pools_query(count, blacklist)).await?;
    Ok(response.pairs.into_iter().map(|p| p.id).collect())
}

fn index_pairs(pairs: Vec<PairFields>, into: &mut FxHashMap<String, PairFields>) {
    for pair in pairs {
        into.insert(pair.id.clone(), pair);
    }
}

/// Fetches snapshots at now / 24h / 1w for the given pools and derives
/// per-pool metrics.
///
/// Oversized address sets are sliced into sequential bulk queries; block
/// resolution failure fails the whole call.
pub async fn fetch_pool_data(
    client: &GraphClient,
    resolver: &BlockResolver,
    addresses: &[String],
) -> Result<FxHashMap<String, PoolData>> {
    if addresses.is_empty() {
        return Ok(FxHashMap::default());
    }

    let windows = delta_timestamps(Utc::now());
    let blocks = resolver
        .blocks_from_timestamps(&windows.as_array())
        .await?;
    let (block24, block_week) = (blocks[0].number, blocks[2].number);

    let responses = fetch_sliced(addresses, |slice| {
        let query = pools_bulk_query(block24, block_week, slice);
        async move {
            let response: PoolsBulkResponse = client.query(&query).await?;
            Ok(vec![response])
        }
    })
    .await?;

    let mut current = FxHashMap::default();
    let mut one_day = FxHashMap::default();
    let mut one_week = FxHashMap::default();
    for response in responses {
        index_pairs(response.current, &mut current);
        index_pairs(response.one_day_ago, &mut one_day);
        index_pairs(response.one_week_ago, &mut one_week);
    }

    Ok(derive_pool_data(addresses, &current, &one_day, &one_week))
}

/// Pure derivation of pool metrics from the three snapshot maps.
///
/// Pools absent from the current snapshot are dropped; pools without
/// history get their cumulative volume as the window value and zero change.
fn derive_pool_data(
    addresses: &[String],
    current: &FxHashMap<String, PairFields>,
    one_day: &FxHashMap<String, PairFields>,
    one_week: &FxHashMap<String, PairFields>,
) -> FxHashMap<String, PoolData> {
    let mut derived = FxHashMap::default();

    for address in addresses {
        let Some(pool) = current.get(address) else {
            continue;
        };
        let day = one_day.get(address);
        let week = one_week.get(address);

        let (volume_usd, volume_usd_change) = match day {
            Some(day) => day_change(pool.volume_usd, day.volume_usd),
            None => (pool.volume_usd, 0.0),
        };
        let volume_usd_week = window_total(pool.volume_usd, week.map(|w| w.volume_usd));

        let tvl_usd_change = percent_change(Some(pool.reserve_usd), day.map(|d| d.reserve_usd));

        derived.insert(
            address.clone(),
            PoolData {
                address: address.clone(),
                token0: PairToken {
                    address: pool.token0.id.clone(),
                    symbol: pool.token0.symbol.clone(),
                    name: pool.token0.name.clone(),
                },
                token1: PairToken {
                    address: pool.token1.id.clone(),
                    symbol: pool.token1.symbol.clone(),
                    name: pool.token1.name.clone(),
                },
                token0_price: pool.token0_price,
                token1_price: pool.token1_price,
                volume_usd,
                volume_usd_change,
                volume_usd_week,
                tvl_usd: pool.reserve_usd,
                tvl_usd_change,
                tvl_token0: pool.reserve0,
                tvl_token1: pool.reserve1,
            },
        );
    }

    derived
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(id: &str, volume_usd: f64, reserve_usd: f64) -> PairFields {
        PairFields {
            id: id.to_string(),
            reserve0: 10.0,
            reserve1: 20.0,
            reserve_usd,
            volume_usd,
            token0_price: 2.0,
            token1_price: 0.5,
            token0: PairTokenFields {
                id: "0xt0".to_string(),
                symbol: "T0".to_string(),
                name: "Token Zero".to_string(),
            },
            token1: PairTokenFields {
                id: "0xt1".to_string(),
                symbol: "T1".to_string(),
                name: "Token One".to_string(),
            },
        }
    }

    fn indexed(pairs: Vec<PairFields>) -> FxHashMap<String, PairFields> {
        let mut map = FxHashMap::default();
        index_pairs(pairs, &mut map);
        map
    }

    #[test]
    fn bulk_query_pins_blocks_as_literals() {
        let pools = vec!["0xaa".to_string()];
        let query = pools_bulk_query(111, 222, &pools);

        assert!(query.contains("current: pairs("));
        assert!(query.contains("oneDayAgo: pairs("));
        assert!(query.contains("oneWeekAgo: pairs("));
        assert!(query.contains("block: { number: 111 }"));
        assert!(query.contains("block: { number: 222 }"));
        assert!(query.contains(r#"id_in: ["0xaa"]"#));
        // Never a bound variable.
        assert!(!query.contains('$'));
    }

    #[test]
    fn derives_changes_against_both_offsets() {
        let addresses = vec!["0xaa".to_string()];
        let current = indexed(vec![pair("0xaa", 500.0, 2_000.0)]);
        let one_day = indexed(vec![pair("0xaa", 400.0, 1_600.0)]);
        let one_week = indexed(vec![pair("0xaa", 300.0, 1_000.0)]);

        let derived = derive_pool_data(&addresses, &current, &one_day, &one_week);
        let data = &derived["0xaa"];

        assert_eq!(data.volume_usd, 100.0);
        assert!((data.volume_usd_change - 25.0).abs() < 1e-9);
        // Weekly volume is a difference of cumulative totals, not a percent.
        assert_eq!(data.volume_usd_week, 200.0);
        assert_eq!(data.tvl_usd, 2_000.0);
        assert!((data.tvl_usd_change - 25.0).abs() < 1e-9);
    }

    #[test]
    fn new_pool_without_history_reports_totals_and_zero_change() {
        let addresses = vec!["0xaa".to_string()];
        let current = indexed(vec![pair("0xaa", 500.0, 2_000.0)]);

        let derived = derive_pool_data(
            &addresses,
            &current,
            &FxHashMap::default(),
            &FxHashMap::default(),
        );
        let data = &derived["0xaa"];

        assert_eq!(data.volume_usd, 500.0);
        assert_eq!(data.volume_usd_change, 0.0);
        assert_eq!(data.volume_usd_week, 500.0);
        assert_eq!(data.tvl_usd_change, 0.0);
    }

    #[test]
    fn pool_missing_from_current_snapshot_is_dropped() {
        let addresses = vec!["0xaa".to_string(), "0xbb".to_string()];
        let current = indexed(vec![pair("0xaa", 1.0, 1.0)]);

        let derived = derive_pool_data(
            &addresses,
            &current,
            &FxHashMap::default(),
            &FxHashMap::default(),
        );

        assert!(derived.contains_key("0xaa"));
        assert!(!derived.contains_key("0xbb"));
    }
}
