use config::{Config, ConfigError, File};
use once_cell::sync::Lazy;
use serde::Deserialize;

/// Tokens excluded from top-entity discovery queries.
///
/// These contracts report absurd liquidity or broken metadata and would
/// otherwise crowd out real pairs in ranked queries.
static DEFAULT_TOKEN_BLACKLIST: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "0x4269e4090ff9dfc99d8846eb0d42e67f01c3ac8b",
        "0xdbf8913dfe14536c0dae5dd06805afb2731f7e7b",
        "0xe8e4d92dbd87b0f0a9e1ca0ab147cbe283fe98e9",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
});

/// Exchange subgraph configuration.
///
/// The exchange subgraph answers entity queries (pairs, tokens, factory
/// totals, transactions) at both current and historical block heights.
/// The blocks subgraph maps wall-clock timestamps to block numbers.
#[derive(Debug, Deserialize, Clone)]
pub struct ExchangeSettings {
    pub subgraph_url: String,
    pub blocks_subgraph_url: String,
    /// Unix timestamp of the first indexed day, used as the start of every
    /// gap-filled chart series.
    #[serde(default = "default_chart_start_timestamp")]
    pub chart_start_timestamp: i64,
    /// Number of entities fetched by top-pool / top-token discovery.
    #[serde(default = "default_top_entity_count")]
    pub top_entity_count: usize,
    #[serde(default = "default_token_blacklist")]
    pub token_blacklist: Vec<String>,
}

fn default_chart_start_timestamp() -> i64 {
    1_619_170_975
}

fn default_top_entity_count() -> usize {
    30
}

fn default_token_blacklist() -> Vec<String> {
    DEFAULT_TOKEN_BLACKLIST.clone()
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub exchange: ExchangeSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}
