//! The aggregation engine: clients, block resolver and entity stores
//! behind one handle.
//!
//! Background jobs refresh the protocol overview and the top entities on a
//! schedule; detail data (per-entity charts and transaction feeds) is
//! fetched on demand the first time it is asked for, with the store's
//! fetch slots guaranteeing each piece goes out at most once per session.

use std::sync::Arc;

use crate::blocks::BlockResolver;
use crate::cache::{DataKind, EntityStore, ProtocolStore};
use crate::client::GraphClient;
use crate::config::Settings;
use crate::data::{chart, transactions};
use crate::error::Result;
use crate::types::{ChartDayData, PoolData, TokenData, Transaction};

pub struct Engine {
    settings: Arc<Settings>,
    exchange: GraphClient,
    resolver: BlockResolver,
    pub protocol: ProtocolStore,
    pub pools: EntityStore<PoolData>,
    pub tokens: EntityStore<TokenData>,
}

impl Engine {
    pub fn new(settings: Arc<Settings>) -> Result<Self> {
        let exchange = GraphClient::new(&settings.exchange.subgraph_url)?;
        let blocks = GraphClient::new(&settings.exchange.blocks_subgraph_url)?;

        Ok(Self {
            settings,
            exchange,
            resolver: BlockResolver::new(blocks),
            protocol: ProtocolStore::new(),
            pools: EntityStore::new(),
            tokens: EntityStore::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn exchange(&self) -> &GraphClient {
        &self.exchange
    }

    pub fn resolver(&self) -> &BlockResolver {
        &self.resolver
    }

    /// Daily chart of one pool, fetched on first request.
    ///
    /// Returns the cached series when present, `Ok(None)` when another
    /// caller already holds the fetch (or a previous fetch failed), and the
    /// freshly-fetched series otherwise.
    pub async fn pool_chart(&self, address: &str) -> Result<Option<Vec<ChartDayData>>> {
        if let Some(series) = self.pools.chart_of(address) {
            return Ok(Some(series));
        }
        if !self.pools.begin_fetch(address, DataKind::Chart) {
            return Ok(None);
        }

        let start = self.settings.exchange.chart_start_timestamp;
        match chart::fetch_pool_chart(&self.exchange, address, start).await {
            Ok(series) => {
                self.pools.commit_chart(address, series.clone());
                Ok(Some(series))
            },
            Err(err) => {
                self.pools.fail(address, DataKind::Chart);
                Err(err)
            },
        }
    }

    /// Daily chart of one token, fetched on first request.
    pub async fn token_chart(&self, address: &str) -> Result<Option<Vec<ChartDayData>>> {
        if let Some(series) = self.tokens.chart_of(address) {
            return Ok(Some(series));
        }
        if !self.tokens.begin_fetch(address, DataKind::Chart) {
            return Ok(None);
        }

        let start = self.settings.exchange.chart_start_timestamp;
        match chart::fetch_token_chart(&self.exchange, address, start).await {
            Ok(series) => {
                self.tokens.commit_chart(address, series.clone());
                Ok(Some(series))
            },
            Err(err) => {
                self.tokens.fail(address, DataKind::Chart);
                Err(err)
            },
        }
    }

    /// Transaction feed of one pool, fetched on first request.
    pub async fn pool_transactions(&self, address: &str) -> Result<Option<Vec<Transaction>>> {
        if let Some(feed) = self.pools.transactions_of(address) {
            return Ok(Some(feed));
        }
        if !self.pools.begin_fetch(address, DataKind::Transactions) {
            return Ok(None);
        }

        match transactions::fetch_pool_transactions(&self.exchange, address).await {
            Ok(feed) => {
                self.pools.commit_transactions(address, feed.clone());
                Ok(Some(feed))
            },
            Err(err) => {
                self.pools.fail(address, DataKind::Transactions);
                Err(err)
            },
        }
    }

    /// Transaction feed of one token, fetched on first request.
    pub async fn token_transactions(&self, address: &str) -> Result<Option<Vec<Transaction>>> {
        if let Some(feed) = self.tokens.transactions_of(address) {
            return Ok(Some(feed));
        }
        if !self.tokens.begin_fetch(address, DataKind::Transactions) {
            return Ok(None);
        }

        match transactions::fetch_token_transactions(&self.exchange, address).await {
            Ok(feed) => {
                self.tokens.commit_transactions(address, feed.clone());
                Ok(Some(feed))
            },
            Err(err) => {
                self.tokens.fail(address, DataKind::Transactions);
                Err(err)
            },
        }
    }
}
