//! Native-currency USD price at each lookback offset.
//!
//! Token prices are stored by the subgraph as ratios against the chain's
//! native currency (`derivedNative`), so converting them to USD needs the
//! native price as of the same block the token was read at.

use serde::Deserialize;

use crate::client::GraphClient;
use crate::error::Result;
use crate::query::block_clause;
use crate::types::decimal_from_str;

/// Native currency USD price now and at the standard lookback blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativePrices {
    pub current: f64,
    pub one_day: f64,
    pub two_day: f64,
    pub week: f64,
}

fn bundle_query(block24: u64, block48: u64, block_week: u64) -> String {
    let sub = |alias: &str, block: Option<u64>| {
        format!(
            "{alias}: bundle(id: \"1\" {block}) {{ nativePrice }}",
            block = block_clause(block),
        )
    };
    format!(
        "query prices {{
            {current}
            {one_day}
            {two_day}
            {one_week}
        }}",
        current = sub("current", None),
        one_day = sub("oneDay", Some(block24)),
        two_day = sub("twoDay", Some(block48)),
        one_week = sub("oneWeek", Some(block_week)),
    )
}

#[derive(Debug, Deserialize)]
struct BundleFields {
    #[serde(rename = "nativePrice", deserialize_with = "decimal_from_str")]
    native_price: f64,
}

#[derive(Debug, Deserialize)]
struct BundleResponse {
    current: Option<BundleFields>,
    #[serde(rename = "oneDay")]
    one_day: Option<BundleFields>,
    #[serde(rename = "twoDay")]
    two_day: Option<BundleFields>,
    #[serde(rename = "oneWeek")]
    one_week: Option<BundleFields>,
}

/// Fetches the native price quadruple in one aliased query.
///
/// A missing bundle at some height (chain younger than the window) reads as
/// a price of zero; downstream percent math treats zero as "no change".
pub async fn fetch_native_prices(
    client: &GraphClient,
    block24: u64,
    block48: u64,
    block_week: u64,
) -> Result<NativePrices> {
    let response: BundleResponse = client
        .query(&bundle_query(block24, block48, block_week))
        .await?;

    let price = |fields: Option<BundleFields>| fields.map(|f| f.native_price).unwrap_or(0.0);

    Ok(NativePrices {
        current: price(response.current),
        one_day: price(response.one_day),
        two_day: price(response.two_day),
        week: price(response.one_week),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pins_each_alias_to_its_block() {
        let query = bundle_query(100, 200, 300);
        assert!(query.contains("current: bundle(id: \"1\" )"));
        assert!(query.contains("oneDay: bundle(id: \"1\" block: { number: 100 })"));
        assert!(query.contains("twoDay: bundle(id: \"1\" block: { number: 200 })"));
        assert!(query.contains("oneWeek: bundle(id: \"1\" block: { number: 300 })"));
    }

    #[test]
    fn missing_bundles_read_as_zero() {
        let response: BundleResponse = serde_json::from_value(serde_json::json!({
            "current": { "nativePrice": "312.5" },
            "oneDay": null,
            "twoDay": null,
            "oneWeek": null,
        }))
        .unwrap();

        assert_eq!(response.current.unwrap().native_price, 312.5);
        assert!(response.one_day.is_none());
    }
}
