mod config;

pub use config::{ExchangeSettings, Settings};
