//! Wall-clock lookback windows and their mapping to chain blocks.

mod resolver;

pub use resolver::BlockResolver;

use chrono::{DateTime, Utc};

/// A wall-clock timestamp resolved to the chain block current at that time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    /// The timestamp the caller asked about.
    pub timestamp: i64,
    /// Height of the closest block at or before the timestamp.
    pub number: u64,
}

/// The standard lookback timestamps: 24h, 48h and one week ago.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaTimestamps {
    pub t24: i64,
    pub t48: i64,
    pub t_week: i64,
}

impl DeltaTimestamps {
    pub fn as_array(&self) -> [i64; 3] {
        [self.t24, self.t48, self.t_week]
    }
}

/// Derives the lookback timestamps from the current wall-clock time.
///
/// Timestamps are truncated to the start of the minute so repeated calls
/// within the same minute produce identical values and hit the resolver's
/// memo instead of issuing fresh block lookups.
pub fn delta_timestamps(now: DateTime<Utc>) -> DeltaTimestamps {
    let minute = now.timestamp() - now.timestamp() % 60;
    DeltaTimestamps {
        t24: minute - 24 * 3_600,
        t48: minute - 48 * 3_600,
        t_week: minute - 7 * 24 * 3_600,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_truncate_to_minute() {
        let now = Utc.with_ymd_and_hms(2021, 10, 1, 12, 30, 45).unwrap();
        let ts = delta_timestamps(now);

        assert_eq!(ts.t24 % 60, 0);
        assert_eq!(ts.t24, now.timestamp() - 45 - 24 * 3_600);
        assert_eq!(ts.t48, ts.t24 - 24 * 3_600);
        assert_eq!(ts.t_week, ts.t24 - 6 * 24 * 3_600);
    }

    #[test]
    fn same_minute_yields_identical_windows() {
        let a = Utc.with_ymd_and_hms(2021, 10, 1, 12, 30, 5).unwrap();
        let b = Utc.with_ymd_and_hms(2021, 10, 1, 12, 30, 59).unwrap();
        assert_eq!(delta_timestamps(a), delta_timestamps(b));
    }
}
