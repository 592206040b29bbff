//! Periodic reporting cycle.
//!
//! One cycle polls every configured address, folds the successful snapshots
//! into a report and hands it to the notification sink. The outer loop owns
//! scheduling and shutdown; a failing address or a failing cycle never stops
//! the loop.

use std::time::Duration;

use alloy::primitives::Address;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::{error, info, warn};

use monitor_api::{MessageTransport, Notifier};
use monitor_chain::AccountDataSource;

use crate::fetcher::PositionFetcher;
use crate::position::PositionSnapshot;
use crate::report;

/// Outbound notification seam.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn publish(&self, text: &str) -> Result<()>;
}

#[async_trait]
impl<T: MessageTransport> ReportSink for Notifier<T> {
    async fn publish(&self, text: &str) -> Result<()> {
        Notifier::publish(self, text).await
    }
}

/// The monitor: fetches all addresses each cycle and publishes one report.
pub struct Monitor<S, R> {
    fetcher: PositionFetcher<S>,
    sink: R,
    network_name: String,
    addresses: Vec<Address>,
    update_interval: Duration,
    max_concurrent_fetches: usize,
}

impl<S: AccountDataSource, R: ReportSink> Monitor<S, R> {
    pub fn new(
        fetcher: PositionFetcher<S>,
        sink: R,
        network_name: impl Into<String>,
        addresses: Vec<Address>,
        update_interval: Duration,
        max_concurrent_fetches: usize,
    ) -> Self {
        Self {
            fetcher,
            sink,
            network_name: network_name.into(),
            addresses,
            update_interval,
            max_concurrent_fetches: max_concurrent_fetches.max(1),
        }
    }

    /// Run one full polling pass and publish the aggregate.
    ///
    /// Addresses are fetched as an ordered stream: concurrency is bounded by
    /// `max_concurrent_fetches` and the report order always matches the
    /// configured address order, regardless of completion order. Returns the
    /// number of positions reported.
    pub async fn run_cycle(&self) -> Result<usize> {
        let results: Vec<Option<PositionSnapshot>> = stream::iter(self.addresses.iter().copied())
            .map(|address| self.fetcher.fetch(address))
            .buffered(self.max_concurrent_fetches)
            .collect()
            .await;

        let positions: Vec<PositionSnapshot> = results.into_iter().flatten().collect();

        if positions.is_empty() {
            warn!("No position data fetched this cycle, skipping notification");
            return Ok(0);
        }

        let reported = positions.len();
        let text = report::format_report(&self.network_name, &positions);
        if let Err(e) = self.sink.publish(&text).await {
            warn!(error = %e, "Failed to publish report");
        }

        Ok(reported)
    }

    /// Run cycles until the shutdown signal fires.
    ///
    /// Both the in-flight cycle and the inter-cycle sleep are interruptible;
    /// any error inside a cycle is logged and the loop continues.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            network = %self.network_name,
            addresses = self.addresses.len(),
            interval_secs = self.update_interval.as_secs(),
            "Monitor started"
        );

        loop {
            tokio::select! {
                result = self.run_cycle() => match result {
                    Ok(reported) => info!(reported, total = self.addresses.len(), "Cycle complete"),
                    Err(e) => error!(error = %e, "Cycle failed"),
                },
                _ = shutdown.changed() => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.update_interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!("Monitor stopped");
        Ok(())
    }
}
