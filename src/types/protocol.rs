use serde::Serialize;

/// Protocol-wide trading metrics derived from factory totals.
///
/// Volume and transaction counts are per-24h windows computed from the
/// factory's cumulative life-to-date counters; TVL is the current reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolData {
    pub volume_usd: f64,
    pub volume_usd_change: f64,
    pub tvl_usd: f64,
    pub tvl_usd_change: f64,
    pub tx_count: f64,
    pub tx_count_change: f64,
}
