//! Gap-filling for sparse daily series.
//!
//! The indexer emits one row per day *with trades*; days without activity
//! produce no row at all. Chart consumers assume a contiguous series, so
//! missing days are synthesized with zero volume and the last known TVL
//! carried forward (liquidity does not vanish on quiet days).

use std::collections::BTreeMap;

use crate::types::ChartDayData;
use crate::utils::ONE_DAY_SECONDS;

/// Expands a sparse day list into a contiguous daily series.
///
/// Walks one day at a time from the earliest known entry (or
/// `start_timestamp` when the input is empty) up to the day before
/// `end_timestamp`. Input rows are bucketed by `floor(date / 86400)` with
/// later rows overwriting earlier ones for the same bucket; the output is
/// ascending by day with no gaps.
pub fn fill_missing_days(
    rows: Vec<ChartDayData>,
    start_timestamp: i64,
    end_timestamp: i64,
) -> Vec<ChartDayData> {
    let mut by_day: BTreeMap<i64, ChartDayData> = BTreeMap::new();
    for row in rows {
        by_day.insert(row.date / ONE_DAY_SECONDS, row);
    }

    let (first_date, first_tvl) = by_day
        .values()
        .next()
        .map(|entry| (entry.date, entry.tvl_usd))
        .unwrap_or((start_timestamp, 0.0));

    let mut latest_tvl = first_tvl;
    let mut timestamp = first_date;
    while timestamp + ONE_DAY_SECONDS <= end_timestamp - ONE_DAY_SECONDS {
        let next_day = timestamp + ONE_DAY_SECONDS;
        let day_index = next_day / ONE_DAY_SECONDS;
        match by_day.get(&day_index) {
            Some(entry) => latest_tvl = entry.tvl_usd,
            None => {
                by_day.insert(
                    day_index,
                    ChartDayData {
                        date: next_day,
                        volume_usd: 0.0,
                        tvl_usd: latest_tvl,
                    },
                );
            },
        }
        timestamp = next_day;
    }

    by_day.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(index: i64, volume_usd: f64, tvl_usd: f64) -> ChartDayData {
        ChartDayData {
            date: index * ONE_DAY_SECONDS,
            volume_usd,
            tvl_usd,
        }
    }

    #[test]
    fn output_has_no_gaps() {
        let rows = vec![day(100, 10.0, 1000.0), day(105, 5.0, 1200.0)];
        let filled = fill_missing_days(rows, 0, 110 * ONE_DAY_SECONDS);

        let indices: Vec<i64> = filled.iter().map(|e| e.date / ONE_DAY_SECONDS).collect();
        let expected: Vec<i64> = (100..=109).collect();
        assert_eq!(indices, expected);
    }

    #[test]
    fn synthesized_days_carry_tvl_forward_with_zero_volume() {
        let rows = vec![day(100, 10.0, 1000.0), day(103, 7.0, 1500.0)];
        let filled = fill_missing_days(rows, 0, 105 * ONE_DAY_SECONDS);

        let by_index: BTreeMap<i64, &ChartDayData> = filled
            .iter()
            .map(|e| (e.date / ONE_DAY_SECONDS, e))
            .collect();

        // Days 101 and 102 were missing: zero volume, TVL carried from day 100.
        assert_eq!(by_index[&101].volume_usd, 0.0);
        assert_eq!(by_index[&101].tvl_usd, 1000.0);
        assert_eq!(by_index[&102].tvl_usd, 1000.0);

        // Day 104 carries the newer TVL from day 103.
        assert_eq!(by_index[&104].volume_usd, 0.0);
        assert_eq!(by_index[&104].tvl_usd, 1500.0);
    }

    #[test]
    fn duplicate_days_last_write_wins() {
        let rows = vec![day(100, 10.0, 1000.0), day(100, 20.0, 2000.0)];
        let filled = fill_missing_days(rows, 0, 102 * ONE_DAY_SECONDS);

        assert_eq!(filled[0].volume_usd, 20.0);
        assert_eq!(filled[0].tvl_usd, 2000.0);
    }

    #[test]
    fn empty_input_walks_from_epoch_with_zero_tvl() {
        let start = 100 * ONE_DAY_SECONDS;
        let end = 104 * ONE_DAY_SECONDS;
        let filled = fill_missing_days(Vec::new(), start, end);

        assert_eq!(filled.len(), 3);
        assert!(filled.iter().all(|e| e.volume_usd == 0.0 && e.tvl_usd == 0.0));
    }

    #[test]
    fn series_ends_the_day_before_now() {
        let rows = vec![day(100, 1.0, 1.0)];
        let end = 110 * ONE_DAY_SECONDS + 3_600; // mid-day "now"
        let filled = fill_missing_days(rows, 0, end);

        let last = filled.last().unwrap();
        assert_eq!(last.date / ONE_DAY_SECONDS, 109);
    }
}
