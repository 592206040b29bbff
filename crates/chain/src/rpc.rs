//! Failover endpoint pool for public RPC providers.
//!
//! Public endpoints are free, rate-limited and occasionally unreachable, so
//! the monitor never commits to a single one. The pool rotates a cursor over
//! the candidate set, skips endpoints with too many consecutive failures,
//! and force-resets when every endpoint looks dead so it can never wedge
//! permanently.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{bail, Result};
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::networks::NetworkConfig;

/// An endpoint is skipped once it accumulates this many consecutive failures.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// One concrete RPC endpoint with its health state.
///
/// Provider handles are built per call from the stored URL; only the failure
/// counter is mutated during a run.
#[derive(Debug)]
pub struct Endpoint {
    url: reqwest::Url,
    failures: AtomicU32,
}

impl Endpoint {
    /// Construct an endpoint, validating the URL.
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            url: url.parse()?,
            failures: AtomicU32::new(0),
        })
    }

    /// Endpoint URL as a string.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// A fresh provider bound to this endpoint.
    pub fn provider(&self) -> impl Provider {
        ProviderBuilder::new().on_http(self.url.clone())
    }

    /// Current consecutive-failure count.
    pub fn failure_count(&self) -> u32 {
        self.failures.load(Ordering::Relaxed)
    }

    pub(crate) fn record_failure(&self) -> u32 {
        self.failures.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn reset_failures(&self) {
        self.failures.store(0, Ordering::Relaxed);
    }

    /// Lightweight liveness probe: does the endpoint answer `eth_blockNumber`
    /// within the given bound? Best-effort, probe failures are silent.
    pub async fn is_alive(&self, timeout: Duration) -> bool {
        let provider = self.provider();
        matches!(
            tokio::time::timeout(timeout, provider.get_block_number()).await,
            Ok(Ok(_))
        )
    }
}

/// Endpoint pool tuning knobs.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Randomize endpoint order at init to spread load across processes.
    pub shuffle: bool,
    /// Probe candidates during `acquire` (costs one request per candidate).
    pub probe_on_acquire: bool,
    /// Liveness probe bound.
    pub probe_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            shuffle: true,
            probe_on_acquire: true,
            probe_timeout: Duration::from_secs(5),
        }
    }
}

/// Pool of candidate endpoints with rotating-cursor selection.
///
/// The cursor and the per-endpoint counters are shared across concurrent
/// fetches; the cursor sits behind a mutex and the counters are atomics so
/// no update is lost.
pub struct EndpointPool {
    endpoints: Vec<Arc<Endpoint>>,
    cursor: Mutex<usize>,
    options: PoolOptions,
}

impl EndpointPool {
    /// Build one endpoint per configured URL, in randomized order.
    ///
    /// Fails when zero endpoints could be constructed: without any usable
    /// endpoint the process cannot do anything.
    pub fn new(network: &NetworkConfig, options: PoolOptions) -> Result<Self> {
        let mut endpoints = Vec::with_capacity(network.rpc_urls.len());
        for url in network.rpc_urls.iter().copied() {
            match Endpoint::new(url) {
                Ok(endpoint) => endpoints.push(Arc::new(endpoint)),
                Err(e) => warn!(url, error = %e, "Skipping unusable RPC endpoint"),
            }
        }

        if endpoints.is_empty() {
            bail!(
                "no usable RPC endpoints for network {} ({} configured)",
                network.name,
                network.rpc_urls.len()
            );
        }

        if options.shuffle {
            endpoints.shuffle(&mut rand::thread_rng());
        }

        info!(
            network = network.name,
            count = endpoints.len(),
            "Endpoint pool initialized"
        );

        Ok(Self {
            endpoints,
            cursor: Mutex::new(0),
            options,
        })
    }

    /// Number of endpoints in the pool. Also the fetch attempt budget.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Select an endpoint for the next remote call.
    ///
    /// Starting from the rotating cursor: skip endpoints at the failure cap,
    /// prefer the first remaining candidate that answers the liveness probe,
    /// and advance past anything skipped or unresponsive. After scanning
    /// `2 x pool size` candidates without success, reset every failure count
    /// and hand out the first endpoint unconditionally.
    pub async fn acquire(&self) -> Arc<Endpoint> {
        let max_scan = self.endpoints.len() * 2;

        for _ in 0..max_scan {
            let candidate = self.current();

            if candidate.failure_count() >= MAX_CONSECUTIVE_FAILURES {
                self.advance();
                continue;
            }

            if !self.options.probe_on_acquire
                || candidate.is_alive(self.options.probe_timeout).await
            {
                return candidate;
            }

            debug!(url = candidate.url(), "Endpoint failed liveness probe");
            self.advance();
        }

        // Forced recovery: everything looks dead, so wipe the slate rather
        // than wedge. The next round of failures will re-populate the counts.
        warn!("All endpoints unusable, resetting failure counts");
        for endpoint in &self.endpoints {
            endpoint.reset_failures();
        }
        self.endpoints[0].clone()
    }

    /// Record a successful call against an endpoint.
    pub fn report_success(&self, endpoint: &Endpoint) {
        endpoint.reset_failures();
    }

    /// Record a failed call against an endpoint and rotate away from it so
    /// the next `acquire` does not immediately retry the same one.
    pub fn report_failure(&self, endpoint: &Endpoint) {
        let count = endpoint.record_failure();
        debug!(url = endpoint.url(), failures = count, "Endpoint failure recorded");
        self.advance();
    }

    fn current(&self) -> Arc<Endpoint> {
        let cursor = self.cursor.lock();
        self.endpoints[*cursor].clone()
    }

    fn advance(&self) {
        let mut cursor = self.cursor.lock();
        *cursor = (*cursor + 1) % self.endpoints.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pool(urls: &[&'static str]) -> EndpointPool {
        let network = NetworkConfig {
            name: "test",
            rpc_urls: urls.to_vec(),
            pool: alloy::primitives::Address::ZERO,
            oracle: alloy::primitives::Address::ZERO,
            chain_id: 31337,
        };
        // Deterministic order, no network traffic.
        let options = PoolOptions {
            shuffle: false,
            probe_on_acquire: false,
            probe_timeout: Duration::from_millis(10),
        };
        EndpointPool::new(&network, options).unwrap()
    }

    #[test]
    fn test_empty_pool_is_fatal() {
        let network = NetworkConfig {
            name: "test",
            rpc_urls: vec!["not a url"],
            pool: alloy::primitives::Address::ZERO,
            oracle: alloy::primitives::Address::ZERO,
            chain_id: 31337,
        };
        assert!(EndpointPool::new(&network, PoolOptions::default()).is_err());
    }

    #[test]
    fn test_invalid_urls_are_skipped() {
        let network = NetworkConfig {
            name: "test",
            rpc_urls: vec!["https://rpc-a.invalid", "::definitely not::"],
            pool: alloy::primitives::Address::ZERO,
            oracle: alloy::primitives::Address::ZERO,
            chain_id: 31337,
        };
        let pool = EndpointPool::new(&network, PoolOptions::default()).unwrap();
        assert_eq!(pool.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_advances_cursor() {
        let pool = test_pool(&["https://rpc-a.invalid", "https://rpc-b.invalid"]);

        let first = pool.acquire().await;
        assert_eq!(first.url(), "https://rpc-a.invalid/");

        pool.report_failure(&first);
        let second = pool.acquire().await;
        assert_eq!(second.url(), "https://rpc-b.invalid/");
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let pool = test_pool(&["https://rpc-a.invalid", "https://rpc-b.invalid"]);

        let endpoint = pool.acquire().await;
        pool.report_failure(&endpoint);
        pool.report_failure(&endpoint);
        assert_eq!(endpoint.failure_count(), 2);

        pool.report_success(&endpoint);
        assert_eq!(endpoint.failure_count(), 0);
    }

    #[tokio::test]
    async fn test_capped_endpoint_is_skipped() {
        let pool = test_pool(&["https://rpc-a.invalid", "https://rpc-b.invalid"]);

        let bad = pool.acquire().await;
        for _ in 0..MAX_CONSECUTIVE_FAILURES {
            pool.report_failure(&bad);
        }

        // The capped endpoint must never be handed out again until a forced
        // reset happens.
        for _ in 0..10 {
            let selected = pool.acquire().await;
            assert_ne!(selected.url(), bad.url());
        }
    }

    #[tokio::test]
    async fn test_forced_reset_when_all_capped() {
        let pool = test_pool(&["https://rpc-a.invalid", "https://rpc-b.invalid"]);

        let a = pool.acquire().await;
        for _ in 0..MAX_CONSECUTIVE_FAILURES {
            pool.report_failure(&a);
        }
        let b = pool.acquire().await;
        for _ in 0..MAX_CONSECUTIVE_FAILURES {
            pool.report_failure(&b);
        }

        // Every endpoint is capped: acquire must still succeed and leave all
        // failure counts at zero.
        let recovered = pool.acquire().await;
        assert_eq!(recovered.url(), "https://rpc-a.invalid/");
        assert_eq!(a.failure_count(), 0);
        assert_eq!(b.failure_count(), 0);
    }
}
