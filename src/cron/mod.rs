//! Periodic refresh of the analytics caches.

pub mod jobs;
mod scheduler;

pub use scheduler::{CronScheduler, CronSettings};
