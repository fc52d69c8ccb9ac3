use serde::Serialize;

/// Identity of one side of a pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairToken {
    pub address: String,
    pub symbol: String,
    pub name: String,
}

/// Derived per-pool metrics for pool tables and the pool page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolData {
    pub address: String,
    pub token0: PairToken,
    pub token1: PairToken,

    pub token0_price: f64,
    pub token1_price: f64,

    /// 24h volume and its day-over-day change.
    pub volume_usd: f64,
    pub volume_usd_change: f64,
    /// 7d volume, as a difference of cumulative totals.
    pub volume_usd_week: f64,

    pub tvl_usd: f64,
    pub tvl_usd_change: f64,
    pub tvl_token0: f64,
    pub tvl_token1: f64,
}
