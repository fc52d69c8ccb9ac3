//! Error type shared across the engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScryError>;

#[derive(Debug, Error)]
pub enum ScryError {
    /// HTTP transport failure talking to a subgraph endpoint.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The indexer answered but reported query errors.
    #[error("indexer error: {0}")]
    Indexer(String),

    /// The indexer's response body did not decode into the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A configured endpoint is not a valid URL.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// No block exists within the resolution window of the timestamp.
    #[error("no block found at or before timestamp {timestamp}")]
    BlockResolution { timestamp: i64 },

    /// A response was well-formed but missing data the caller requires.
    #[error("incomplete data: {0}")]
    PartialData(&'static str),
}
