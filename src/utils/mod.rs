//! Pure numeric utilities shared across the engine.
//!
//! - [`delta`] - Period-over-period change math (absolute + percent)
//! - [`series`] - Gap-filling of sparse daily series

mod delta;
mod series;

// ============================================
// Common Constants
// ============================================

/// Seconds in one calendar day; daily series are bucketed on this.
pub const ONE_DAY_SECONDS: i64 = 86_400;

// ============================================
// Re-exports
// ============================================

pub use delta::{day_change, percent_change, window_total};

pub use series::fill_missing_days;
