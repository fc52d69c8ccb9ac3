use serde::Serialize;

/// Derived per-token metrics for token tables and the token page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenData {
    /// False when the token was requested but absent from the current
    /// snapshot; all numeric fields are zero in that case.
    pub exists: bool,
    pub address: String,
    pub name: String,
    pub symbol: String,

    pub volume_usd: f64,
    pub volume_usd_change: f64,
    pub volume_usd_week: f64,
    /// Transactions in the last 24h.
    pub tx_count: f64,

    pub tvl_usd: f64,
    pub tvl_usd_change: f64,
    pub tvl_token: f64,

    pub price_usd: f64,
    pub price_usd_change: f64,
    pub price_usd_change_week: f64,
}
