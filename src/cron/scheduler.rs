//! Cron scheduler for periodic background tasks.
//!
//! Runs jobs like:
//! - Refreshing the protocol overview, chart and transaction feed
//! - Discovering and refreshing top pool snapshots
//! - Discovering and refreshing top token snapshots

use std::sync::Arc;

use anyhow::Result;
use log::{error, info};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;

use crate::engine::Engine;

use super::jobs;

/// Cron scheduler that manages periodic background jobs.
pub struct CronScheduler {
    engine: Arc<Engine>,
    settings: Arc<CronSettings>,
}

/// Configuration for cron job intervals
#[derive(Debug, Clone)]
pub struct CronSettings {
    /// Interval for refreshing protocol-level data - default 5 minutes
    pub refresh_protocol_interval_secs: u64,
    /// Interval for refreshing pool snapshots - default 5 minutes
    pub refresh_pools_interval_secs: u64,
    /// Interval for refreshing token snapshots - default 5 minutes
    pub refresh_tokens_interval_secs: u64,
}

impl Default for CronSettings {
    fn default() -> Self {
        Self {
            refresh_protocol_interval_secs: 300, // 5 minutes
            refresh_pools_interval_secs: 300,    // 5 minutes
            refresh_tokens_interval_secs: 300,   // 5 minutes
        }
    }
}

impl CronScheduler {
    pub fn new(engine: Arc<Engine>, settings: CronSettings) -> Self {
        Self {
            engine,
            settings: Arc::new(settings),
        }
    }

    /// Starts the cron scheduler and runs until cancellation.
    pub async fn run(&self, cancellation_token: CancellationToken) -> Result<()> {
        let mut scheduler = JobScheduler::new().await?;

        // Register all jobs
        self.register_refresh_protocol_job(&scheduler).await?;
        self.register_refresh_pools_job(&scheduler).await?;
        self.register_refresh_tokens_job(&scheduler).await?;

        // Start the scheduler
        scheduler.start().await?;
        info!("Cron scheduler started with {} jobs", 3);

        // Wait for cancellation
        cancellation_token.cancelled().await;
        info!("Cron scheduler shutting down...");

        scheduler.shutdown().await?;
        Ok(())
    }

    async fn register_refresh_protocol_job(&self, scheduler: &JobScheduler) -> Result<()> {
        let engine = self.engine.clone();
        let interval = self.settings.refresh_protocol_interval_secs;

        let job = Job::new_repeated_async(
            std::time::Duration::from_secs(interval),
            move |_uuid, _lock| {
                let engine = engine.clone();
                Box::pin(async move {
                    if let Err(e) = jobs::refresh_protocol::run(&engine).await {
                        error!("Failed to refresh protocol data: {:#}", e);
                    }
                })
            },
        )?;

        scheduler.add(job).await?;
        info!("Registered refresh_protocol job (every {}s)", interval);
        Ok(())
    }

    async fn register_refresh_pools_job(&self, scheduler: &JobScheduler) -> Result<()> {
        let engine = self.engine.clone();
        let interval = self.settings.refresh_pools_interval_secs;

        let job = Job::new_repeated_async(
            std::time::Duration::from_secs(interval),
            move |_uuid, _lock| {
                let engine = engine.clone();
                Box::pin(async move {
                    if let Err(e) = jobs::refresh_pools::run(&engine).await {
                        error!("Failed to refresh pools: {:#}", e);
                    }
                })
            },
        )?;

        scheduler.add(job).await?;
        info!("Registered refresh_pools job (every {}s)", interval);
        Ok(())
    }

    async fn register_refresh_tokens_job(&self, scheduler: &JobScheduler) -> Result<()> {
        let engine = self.engine.clone();
        let interval = self.settings.refresh_tokens_interval_secs;

        let job = Job::new_repeated_async(
            std::time::Duration::from_secs(interval),
            move |_uuid, _lock| {
                let engine = engine.clone();
                Box::pin(async move {
                    if let Err(e) = jobs::refresh_tokens::run(&engine).await {
                        error!("Failed to refresh tokens: {:#}", e);
                    }
                })
            },
        )?;

        scheduler.add(job).await?;
        info!("Registered refresh_tokens job (every {}s)", interval);
        Ok(())
    }
}
