use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionType {
    Mint,
    Burn,
    Swap,
}

/// Normalized mint/burn/swap record for transaction tables.
///
/// Swap token amounts are net flows (`amountIn - amountOut`), so one of the
/// two is usually negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub kind: TransactionType,
    pub hash: String,
    pub timestamp: i64,
    pub sender: String,
    pub token0_symbol: String,
    pub token0_address: String,
    pub token1_symbol: String,
    pub token1_address: String,
    pub amount_usd: f64,
    pub amount_token0: f64,
    pub amount_token1: f64,
}
