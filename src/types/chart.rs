use serde::Serialize;

/// One day of a TVL/volume chart series.
///
/// Series handed to consumers are contiguous: exactly one entry per calendar
/// day, ascending, with quiet days synthesized by the gap filler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDayData {
    /// Unix timestamp of the day bucket.
    pub date: i64,
    pub volume_usd: f64,
    pub tvl_usd: f64,
}
