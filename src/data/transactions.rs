//! Transaction feeds: protocol-wide, per-pool and per-token.
//!
//! Mint, burn and swap rows are normalized into one [`Transaction`] shape.
//! Swap token amounts are reported net (`amountIn - amountOut`) so the sign
//! shows the direction of flow.

use serde::Deserialize;

use crate::client::GraphClient;
use crate::error::Result;
use crate::types::{decimal_from_str, int_from_str, Transaction, TransactionType};

const ENTITY_FIELDS_MINT: &str = "id timestamp pair { token0 { id symbol } token1 { id symbol } } to amount0 amount1 amountUSD";
const ENTITY_FIELDS_BURN: &str = "id timestamp pair { token0 { id symbol } token1 { id symbol } } sender amount0 amount1 amountUSD";
const ENTITY_FIELDS_SWAP: &str = "id timestamp pair { token0 { id symbol } token1 { id symbol } } from amount0In amount1In amount0Out amount1Out amountUSD";

fn global_transactions_query() -> String {
    format!(
        "query transactions {{
            mints(first: 100, orderBy: timestamp, orderDirection: desc) {{ {ENTITY_FIELDS_MINT} }}
            swaps(first: 100, orderBy: timestamp, orderDirection: desc) {{ {ENTITY_FIELDS_SWAP} }}
            burns(first: 100, orderBy: timestamp, orderDirection: desc) {{ {ENTITY_FIELDS_BURN} }}
        }}"
    )
}

fn pool_transactions_query(address: &str) -> String {
    format!(
        "query poolTransactions {{
            mints(first: 35, orderBy: timestamp, orderDirection: desc, where: {{ pair: \"{address}\" }}) {{ {ENTITY_FIELDS_MINT} }}
            swaps(first: 35, orderBy: timestamp, orderDirection: desc, where: {{ pair: \"{address}\" }}) {{ {ENTITY_FIELDS_SWAP} }}
            burns(first: 35, orderBy: timestamp, orderDirection: desc, where: {{ pair: \"{address}\" }}) {{ {ENTITY_FIELDS_BURN} }}
        }}"
    )
}

fn token_transactions_query(address: &str) -> String {
    format!(
        "query tokenTransactions {{
            mintsAs0: mints(first: 10, orderBy: timestamp, orderDirection: desc, where: {{ token0: \"{address}\" }}) {{ {ENTITY_FIELDS_MINT} }}
            mintsAs1: mints(first: 10, orderBy: timestamp, orderDirection: desc, where: {{ token1: \"{address}\" }}) {{ {ENTITY_FIELDS_MINT} }}
            swapsAs0: swaps(first: 10, orderBy: timestamp, orderDirection: desc, where: {{ token0: \"{address}\" }}) {{ {ENTITY_FIELDS_SWAP} }}
            swapsAs1: swaps(first: 10, orderBy: timestamp, orderDirection: desc, where: {{ token1: \"{address}\" }}) {{ {ENTITY_FIELDS_SWAP} }}
            burnsAs0: burns(first: 10, orderBy: timestamp, orderDirection: desc, where: {{ token0: \"{address}\" }}) {{ {ENTITY_FIELDS_BURN} }}
            burnsAs1: burns(first: 10, orderBy: timestamp, orderDirection: desc, where: {{ token1: \"{address}\" }}) {{ {ENTITY_FIELDS_BURN} }}
        }}"
    )
}

#[derive(Debug, Deserialize)]
struct TokenRef {
    id: String,
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct PairRef {
    token0: TokenRef,
    token1: TokenRef,
}

#[derive(Debug, Deserialize)]
struct MintFields {
    id: String,
    #[serde(deserialize_with = "int_from_str")]
    timestamp: i64,
    pair: PairRef,
    to: String,
    #[serde(deserialize_with = "decimal_from_str")]
    amount0: f64,
    #[serde(deserialize_with = "decimal_from_str")]
    amount1: f64,
    #[serde(rename = "amountUSD", deserialize_with = "decimal_from_str")]
    amount_usd: f64,
}

#[derive(Debug, Deserialize)]
struct BurnFields {
    id: String,
    #[serde(deserialize_with = "int_from_str")]
    timestamp: i64,
    pair: PairRef,
    sender: String,
    #[serde(deserialize_with = "decimal_from_str")]
    amount0: f64,
    #[serde(deserialize_with = "decimal_from_str")]
    amount1: f64,
    #[serde(rename = "amountUSD", deserialize_with = "decimal_from_str")]
    amount_usd: f64,
}

#[derive(Debug, Deserialize)]
struct SwapFields {
    id: String,
    #[serde(deserialize_with = "int_from_str")]
    timestamp: i64,
    pair: PairRef,
    from: String,
    #[serde(rename = "amount0In", deserialize_with = "decimal_from_str")]
    amount0_in: f64,
    #[serde(rename = "amount1In", deserialize_with = "decimal_from_str")]
    amount1_in: f64,
    #[serde(rename = "amount0Out", deserialize_with = "decimal_from_str")]
    amount0_out: f64,
    #[serde(rename = "amount1Out", deserialize_with = "decimal_from_str")]
    amount1_out: f64,
    #[serde(rename = "amountUSD", deserialize_with = "decimal_from_str")]
    amount_usd: f64,
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    mints: Vec<MintFields>,
    swaps: Vec<SwapFields>,
    burns: Vec<BurnFields>,
}

#[derive(Debug, Deserialize)]
struct TokenTransactionsResponse {
    #[serde(rename = "mintsAs0")]
    mints_as0: Vec<MintFields>,
    #[serde(rename = "mintsAs1")]
    mints_as1: Vec<MintFields>,
    #[serde(rename = "swapsAs0")]
    swaps_as0: Vec<SwapFields>,
    #[serde(rename = "swapsAs1")]
    swaps_as1: Vec<SwapFields>,
    #[serde(rename = "burnsAs0")]
    burns_as0: Vec<BurnFields>,
    #[serde(rename = "burnsAs1")]
    burns_as1: Vec<BurnFields>,
}

/// Entity ids are `<txhash>-<index>`; the hash is everything before the
/// first dash.
fn transaction_hash(id: &str) -> String {
    id.split('-').next().unwrap_or(id).to_string()
}

fn mint_to_transaction(mint: MintFields) -> Transaction {
    Transaction {
        kind: TransactionType::Mint,
        hash: transaction_hash(&mint.id),
        timestamp: mint.timestamp,
        sender: mint.to,
        token0_symbol: mint.pair.token0.symbol,
        token0_address: mint.pair.token0.id,
        token1_symbol: mint.pair.token1.symbol,
        token1_address: mint.pair.token1.id,
        amount_usd: mint.amount_usd,
        amount_token0: mint.amount0,
        amount_token1: mint.amount1,
    }
}

fn burn_to_transaction(burn: BurnFields) -> Transaction {
    Transaction {
        kind: TransactionType::Burn,
        hash: transaction_hash(&burn.id),
        timestamp: burn.timestamp,
        sender: burn.sender,
        token0_symbol: burn.pair.token0.symbol,
        token0_address: burn.pair.token0.id,
        token1_symbol: burn.pair.token1.symbol,
        token1_address: burn.pair.token1.id,
        amount_usd: burn.amount_usd,
        amount_token0: burn.amount0,
        amount_token1: burn.amount1,
    }
}

fn swap_to_transaction(swap: SwapFields) -> Transaction {
    Transaction {
        kind: TransactionType::Swap,
        hash: transaction_hash(&swap.id),
        timestamp: swap.timestamp,
        sender: swap.from,
        token0_symbol: swap.pair.token0.symbol,
        token0_address: swap.pair.token0.id,
        token1_symbol: swap.pair.token1.symbol,
        token1_address: swap.pair.token1.id,
        amount_usd: swap.amount_usd,
        amount_token0: swap.amount0_in - swap.amount0_out,
        amount_token1: swap.amount1_in - swap.amount1_out,
    }
}

fn normalize(response: TransactionsResponse) -> Vec<Transaction> {
    let mut transactions = Vec::with_capacity(
        response.mints.len() + response.burns.len() + response.swaps.len(),
    );
    transactions.extend(response.mints.into_iter().map(mint_to_transaction));
    transactions.extend(response.burns.into_iter().map(burn_to_transaction));
    transactions.extend(response.swaps.into_iter().map(swap_to_transaction));
    transactions
}

/// Latest transactions across the whole protocol.
pub async fn fetch_global_transactions(client: &GraphClient) -> Result<Vec<Transaction>> {
    let response: TransactionsResponse = client.query(&global_transactions_query()).await?;
    Ok(normalize(response))
}

/// Latest transactions of one pool.
pub async fn fetch_pool_transactions(
    client: &GraphClient,
    address: &str,
) -> Result<Vec<Transaction>> {
    let response: TransactionsResponse = client.query(&pool_transactions_query(address)).await?;
    Ok(normalize(response))
}

/// Latest transactions touching one token on either side of a pair.
pub async fn fetch_token_transactions(
    client: &GraphClient,
    address: &str,
) -> Result<Vec<Transaction>> {
    let response: TokenTransactionsResponse =
        client.query(&token_transactions_query(address)).await?;

    let mut transactions = Vec::new();
    transactions.extend(response.mints_as0.into_iter().map(mint_to_transaction));
    transactions.extend(response.mints_as1.into_iter().map(mint_to_transaction));
    transactions.extend(response.burns_as0.into_iter().map(burn_to_transaction));
    transactions.extend(response.burns_as1.into_iter().map(burn_to_transaction));
    transactions.extend(response.swaps_as0.into_iter().map(swap_to_transaction));
    transactions.extend(response.swaps_as1.into_iter().map(swap_to_transaction));
    Ok(transactions)
}
