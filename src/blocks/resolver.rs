//! Timestamp-to-block resolution against the blocks subgraph.

use std::time::Duration;

use moka::future::Cache;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::blocks::BlockRef;
use crate::client::GraphClient;
use crate::error::{Result, ScryError};

/// How far back from the requested timestamp a block may be and still count
/// as "the block at that time". Keeps the lookup bounded for the indexer.
const RESOLUTION_WINDOW_SECONDS: i64 = 600;

/// Resolves wall-clock timestamps to historical block numbers.
///
/// Resolution is all-or-nothing per batch: a single unresolvable timestamp
/// fails the whole call, because every delta computed against a missing
/// historical block would be wrong. Resolved pairs are memoized; the
/// lookback timestamps are minute-aligned, so repeated refresh cycles
/// within the same minute never re-query.
pub struct BlockResolver {
    client: GraphClient,
    resolved: Cache<i64, u64>,
}

impl BlockResolver {
    pub fn new(client: GraphClient) -> Self {
        let resolved = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(3_600))
            .build();

        Self { client, resolved }
    }

    /// Maps each timestamp to the closest block at or before it.
    ///
    /// Output order matches input order. No retries are performed; callers
    /// decide whether to re-invoke on a later cycle.
    pub async fn blocks_from_timestamps(&self, timestamps: &[i64]) -> Result<Vec<BlockRef>> {
        let mut known: FxHashMap<i64, u64> = FxHashMap::default();
        let mut unresolved = Vec::new();

        for &timestamp in timestamps {
            match self.resolved.get(&timestamp).await {
                Some(number) => {
                    known.insert(timestamp, number);
                },
                None => unresolved.push(timestamp),
            }
        }

        if !unresolved.is_empty() {
            let response: Value = self.client.query(&blocks_query(&unresolved)).await?;
            for block in parse_blocks(&response, &unresolved)? {
                self.resolved.insert(block.timestamp, block.number).await;
                known.insert(block.timestamp, block.number);
            }
        }

        timestamps
            .iter()
            .map(|&timestamp| {
                known
                    .get(&timestamp)
                    .map(|&number| BlockRef { timestamp, number })
                    .ok_or(ScryError::BlockResolution { timestamp })
            })
            .collect()
    }
}

/// One aliased sub-query per timestamp, newest block in the window first.
fn blocks_query(timestamps: &[i64]) -> String {
    let mut parts = String::new();
    for &timestamp in timestamps {
        parts.push_str(&format!(
            "t{timestamp}: blocks(
                first: 1
                orderBy: timestamp
                orderDirection: desc
                where: {{ timestamp_gt: {lower}, timestamp_lte: {timestamp} }}
            ) {{
                number
            }}\n",
            lower = timestamp - RESOLUTION_WINDOW_SECONDS,
        ));
    }
    format!("query blocks {{\n{parts}}}")
}

/// Extracts one block number per requested timestamp.
///
/// Aliases are dynamic (`t<timestamp>`), so the response is walked as raw
/// JSON. Any missing or malformed entry fails the whole batch.
fn parse_blocks(data: &Value, timestamps: &[i64]) -> Result<Vec<BlockRef>> {
    timestamps
        .iter()
        .map(|&timestamp| {
            data.get(format!("t{timestamp}"))
                .and_then(Value::as_array)
                .and_then(|blocks| blocks.first())
                .and_then(|block| block.get("number"))
                .and_then(Value::as_str)
                .and_then(|number| number.parse::<u64>().ok())
                .map(|number| BlockRef { timestamp, number })
                .ok_or(ScryError::BlockResolution { timestamp })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_embeds_timestamps_as_aliases_and_literals() {
        let query = blocks_query(&[1_633_046_400]);
        assert!(query.contains("t1633046400: blocks("));
        assert!(query.contains("timestamp_lte: 1633046400"));
        assert!(query.contains("timestamp_gt: 1633045800"));
    }

    #[test]
    fn parse_resolves_every_timestamp() {
        let data = json!({
            "t100": [{ "number": "1234" }],
            "t200": [{ "number": "5678" }],
        });
        let blocks = parse_blocks(&data, &[100, 200]).unwrap();
        assert_eq!(
            blocks,
            vec![
                BlockRef { timestamp: 100, number: 1234 },
                BlockRef { timestamp: 200, number: 5678 },
            ]
        );
    }

    #[test]
    fn one_missing_timestamp_fails_the_batch() {
        let data = json!({
            "t100": [{ "number": "1234" }],
            "t200": [],
        });
        let result = parse_blocks(&data, &[100, 200]);
        assert!(matches!(
            result,
            Err(ScryError::BlockResolution { timestamp: 200 })
        ));
    }

    #[test]
    fn malformed_number_fails_the_batch() {
        let data = json!({
            "t100": [{ "number": "not-a-number" }],
        });
        assert!(parse_blocks(&data, &[100]).is_err());
    }
}
