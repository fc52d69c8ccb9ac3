//! Thin GraphQL-over-HTTP client for the indexing service.
//!
//! Responses are decoded into strict typed structs at the query boundary so
//! the rest of the engine never touches loosely-shaped JSON. The indexer
//! reports query problems in an `errors` array next to (possibly null) data;
//! any reported error is treated as a failed fetch.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ScryError};

#[derive(Serialize)]
struct GraphRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct GraphResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphResponseError>>,
}

#[derive(Deserialize)]
struct GraphResponseError {
    message: String,
}

/// Shared client for one subgraph endpoint.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl GraphClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: Url::parse(endpoint)?,
        })
    }

    /// Issues a single query and decodes `data` into `T`.
    ///
    /// Transport failures, indexer-reported errors and decode failures all
    /// surface as errors; no retries are attempted here.
    pub async fn query<T: DeserializeOwned>(&self, query: &str) -> Result<T> {
        let response: GraphResponse<T> = self
            .http
            .post(self.endpoint.clone())
            .json(&GraphRequest { query })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(errors) = response.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(ScryError::Indexer(messages.join("; ")));
        }

        response
            .data
            .ok_or(ScryError::PartialData("indexer returned empty data"))
    }
}
