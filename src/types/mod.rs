//! Output contracts consumed by the UI/state layer.
//!
//! Everything here is plain derived data: raw subgraph readings have already
//! been parsed, delta-computed and gap-filled by the time these types exist.

mod chart;
mod pool;
mod protocol;
mod token;
mod transaction;

pub use chart::ChartDayData;
pub use pool::{PairToken, PoolData};
pub use protocol::ProtocolData;
pub use token::TokenData;
pub use transaction::{Transaction, TransactionType};

/// Deserializes the subgraph's decimal-as-string fields into `f64`.
pub(crate) fn decimal_from_str<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let s = String::deserialize(deserializer)?;
    s.parse::<f64>().map_err(serde::de::Error::custom)
}

/// Deserializes the subgraph's integer-as-string fields into `i64`.
pub(crate) fn int_from_str<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let s = String::deserialize(deserializer)?;
    s.parse::<i64>().map_err(serde::de::Error::custom)
}
