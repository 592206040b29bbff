//! Position fetch protocol with endpoint failover.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tracing::{debug, error, warn};

use monitor_chain::{AccountDataSource, EndpointPool};

use crate::position::PositionSnapshot;

/// Fixed delay between failed attempts. Suspends only the current task, so
/// concurrent fetches for other addresses keep running.
pub const FETCH_BACKOFF: Duration = Duration::from_secs(2);

/// Fetches one address's position, rotating through the endpoint pool on
/// failure. Makes at most `pool size` remote attempts per fetch.
pub struct PositionFetcher<S> {
    pool: Arc<EndpointPool>,
    source: S,
    backoff: Duration,
}

impl<S: AccountDataSource> PositionFetcher<S> {
    pub fn new(pool: Arc<EndpointPool>, source: S) -> Self {
        Self {
            pool,
            source,
            backoff: FETCH_BACKOFF,
        }
    }

    /// Override the inter-attempt backoff.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Fetch a snapshot for `address`, or `None` once every attempt is
    /// exhausted. Exhaustion is diagnosable in the logs but not fatal to the
    /// surrounding cycle.
    pub async fn fetch(&self, address: Address) -> Option<PositionSnapshot> {
        let max_attempts = self.pool.len();

        for attempt in 1..=max_attempts {
            let endpoint = self.pool.acquire().await;

            let result = self
                .source
                .user_account_data(&endpoint, address)
                .await
                .and_then(|raw| PositionSnapshot::from_raw(address, &raw, endpoint.url()));

            match result {
                Ok(snapshot) => {
                    self.pool.report_success(&endpoint);
                    debug!(
                        address = %address,
                        url = endpoint.url(),
                        health_factor = snapshot.health_factor,
                        "Position fetched"
                    );
                    return Some(snapshot);
                }
                Err(e) => {
                    self.pool.report_failure(&endpoint);
                    warn!(
                        address = %address,
                        url = endpoint.url(),
                        attempt,
                        max_attempts,
                        error = %e,
                        "Position fetch attempt failed"
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        error!(address = %address, attempts = max_attempts, "All endpoints failed for address");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use monitor_chain::{Endpoint, NetworkConfig, PoolOptions, RawAccountData, RpcError};

    fn test_pool(size: usize) -> Arc<EndpointPool> {
        let urls: Vec<&'static str> = ["https://a.invalid", "https://b.invalid", "https://c.invalid"]
            .iter()
            .copied()
            .take(size)
            .collect();
        let network = NetworkConfig {
            name: "test",
            rpc_urls: urls,
            pool: Address::ZERO,
            oracle: Address::ZERO,
            chain_id: 31337,
        };
        let options = PoolOptions {
            shuffle: false,
            probe_on_acquire: false,
            probe_timeout: Duration::from_millis(10),
        };
        Arc::new(EndpointPool::new(&network, options).unwrap())
    }

    fn healthy_raw() -> RawAccountData {
        use alloy::primitives::U256;
        RawAccountData {
            total_collateral_base: U256::from(1_000_000_000_000u64),
            total_debt_base: U256::from(500_000_000_000u64),
            available_borrows_base: U256::from(300_000_000_000u64),
            current_liquidation_threshold: U256::from(8_000u64),
            ltv: U256::from(7_500u64),
            health_factor: U256::from(1_600_000_000_000_000_000u64),
        }
    }

    /// Fails the first `failures` calls, then succeeds.
    struct FlakySource {
        failures: usize,
        calls: AtomicUsize,
    }

    impl FlakySource {
        fn failing(failures: usize) -> Self {
            Self {
                failures,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AccountDataSource for &FlakySource {
        async fn user_account_data(
            &self,
            _endpoint: &Endpoint,
            _user: Address,
        ) -> Result<RawAccountData, RpcError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(RpcError::Transport("connection refused".into()))
            } else {
                Ok(healthy_raw())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_budget_is_pool_size() {
        let source = FlakySource::failing(usize::MAX);
        let fetcher = PositionFetcher::new(test_pool(3), &source);

        let snapshot = fetcher.fetch(Address::ZERO).await;
        assert!(snapshot.is_none());
        assert_eq!(source.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failover_to_second_endpoint() {
        let source = FlakySource::failing(1);
        let pool = test_pool(2);
        let fetcher = PositionFetcher::new(pool.clone(), &source);

        let snapshot = fetcher.fetch(Address::ZERO).await.unwrap();
        assert_eq!(source.call_count(), 2);
        // The failing endpoint rotated away, the second one served the data.
        assert_eq!(snapshot.rpc_used, "https://b.invalid/");
        assert!((snapshot.health_factor - 1.6).abs() < 1e-12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_endpoint_failures() {
        let source = FlakySource::failing(2);
        let pool = test_pool(2);
        let fetcher = PositionFetcher::new(pool.clone(), &source);

        // Both endpoints fail once, then the third attempt... does not exist:
        // budget is two. First fetch exhausts, second fetch succeeds.
        assert!(fetcher.fetch(Address::ZERO).await.is_none());
        assert!(fetcher.fetch(Address::ZERO).await.is_some());
    }
}
