pub mod blocks;
pub mod cache;
pub mod client;
pub mod config;
pub mod cron;
pub mod data;
pub mod engine;
pub mod error;
pub mod query;
pub mod types;
pub mod utils;

pub use cache::{DataKind, EntityStore, ProtocolStore};
pub use client::GraphClient;
pub use config::Settings;
pub use cron::{CronScheduler, CronSettings};
pub use engine::Engine;
pub use error::{Result, ScryError};
