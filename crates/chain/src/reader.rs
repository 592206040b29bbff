//! Remote reads against the AAVE V3 contracts.

use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use tracing::debug;

use crate::contracts::{IAaveOracle, IPool, RawAccountData};
use crate::error::RpcError;
use crate::networks::NetworkConfig;
use crate::rpc::Endpoint;

/// Bound on every remote call; a hung endpoint must not stall the cycle.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote ledger read, abstracted so the fetch protocol can be tested
/// without a network.
#[async_trait]
pub trait AccountDataSource: Send + Sync {
    /// Read the raw account data for `user` through the given endpoint.
    async fn user_account_data(
        &self,
        endpoint: &Endpoint,
        user: Address,
    ) -> Result<RawAccountData, RpcError>;
}

/// Production reader bound to one network's Pool and Oracle contracts.
#[derive(Debug, Clone)]
pub struct PoolReader {
    pool_address: Address,
    oracle_address: Address,
    call_timeout: Duration,
}

impl PoolReader {
    pub fn new(network: &NetworkConfig) -> Self {
        Self {
            pool_address: network.pool,
            oracle_address: network.oracle,
            call_timeout: CALL_TIMEOUT,
        }
    }

    /// Read an asset's oracle price (base currency, 8 decimals).
    ///
    /// Not consumed by the risk derivation, which expresses metrics relative
    /// to a normalized current price; exposed for callers that want absolute
    /// prices.
    pub async fn asset_price(
        &self,
        endpoint: &Endpoint,
        asset: Address,
    ) -> Result<U256, RpcError> {
        let provider = endpoint.provider();
        let oracle = IAaveOracle::new(self.oracle_address, &provider);

        let call = oracle.getAssetPrice(asset);
        let price = tokio::time::timeout(self.call_timeout, call.call())
            .await
            .map_err(|_| RpcError::Timeout(self.call_timeout))?
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        Ok(price._0)
    }
}

#[async_trait]
impl AccountDataSource for PoolReader {
    async fn user_account_data(
        &self,
        endpoint: &Endpoint,
        user: Address,
    ) -> Result<RawAccountData, RpcError> {
        debug!(user = %user, url = endpoint.url(), "Fetching account data");

        let provider = endpoint.provider();
        let pool = IPool::new(self.pool_address, &provider);

        let call = pool.getUserAccountData(user);
        let data = tokio::time::timeout(self.call_timeout, call.call())
            .await
            .map_err(|_| RpcError::Timeout(self.call_timeout))?
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        Ok(data.into())
    }
}
