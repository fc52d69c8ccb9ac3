//! Period-over-period change calculations.
//!
//! All percent math treats a missing or zero denominator as "no change"
//! rather than propagating infinities: the dashboards downstream render 0%
//! for entities without enough history. That is a deliberate policy, not a
//! numeric identity.

/// Standard percent change between two optional values.
///
/// Returns 0 when either value is absent or zero.
pub fn percent_change(now: Option<f64>, before: Option<f64>) -> f64 {
    match (now, before) {
        (Some(now), Some(before)) if now != 0.0 && before != 0.0 => {
            (now - before) / before * 100.0
        },
        _ => 0.0,
    }
}

/// Absolute and percent change of a metric over one period.
///
/// Returns `(now - before, percent)`; the percent component is 0 when the
/// historical value is zero.
pub fn day_change(now: f64, before: f64) -> (f64, f64) {
    if before == 0.0 {
        return (now, 0.0);
    }
    (now - before, now * 100.0 / before - 100.0)
}

/// Activity within a window derived from cumulative life-to-date totals.
///
/// Subgraph volume and transaction counters only ever grow, so "volume in
/// the last week" is the difference of two cumulative readings. When no
/// historical reading exists (entity newer than the window) the cumulative
/// total itself is the window activity.
pub fn window_total(current_cumulative: f64, offset_cumulative: Option<f64>) -> f64 {
    match offset_cumulative {
        Some(offset) => current_cumulative - offset,
        None => current_cumulative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_change_standard() {
        assert_eq!(percent_change(Some(110.0), Some(100.0)), 10.0);
        assert_eq!(percent_change(Some(50.0), Some(100.0)), -50.0);
    }

    #[test]
    fn percent_change_zero_or_missing_denominator() {
        assert_eq!(percent_change(Some(90.0), Some(0.0)), 0.0);
        assert_eq!(percent_change(Some(90.0), None), 0.0);
        assert_eq!(percent_change(None, Some(100.0)), 0.0);
    }

    #[test]
    fn day_change_pair() {
        let (diff, pct) = day_change(110.0, 100.0);
        assert_eq!(diff, 10.0);
        assert!((pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn day_change_zero_history() {
        assert_eq!(day_change(42.0, 0.0), (42.0, 0.0));
    }

    #[test]
    fn window_total_is_difference_of_cumulatives() {
        assert_eq!(window_total(500.0, Some(300.0)), 200.0);
        assert_eq!(window_total(500.0, None), 500.0);
    }
}
