//! Monitor chain interaction layer.
//!
//! This crate provides:
//! - Static network configurations (RPC endpoints, AAVE V3 contract addresses)
//! - Contract bindings for the AAVE V3 Pool and Oracle
//! - A failover endpoint pool with per-endpoint health tracking
//! - Account-data and oracle-price readers with bounded call timeouts
//!
//! Supports multiple EVM chains; the active network is selected once at startup.

mod contracts;
mod error;
mod networks;
mod reader;
mod rpc;

pub use contracts::RawAccountData;
pub use error::RpcError;
pub use networks::NetworkConfig;
pub use reader::{AccountDataSource, PoolReader, CALL_TIMEOUT};
pub use rpc::{Endpoint, EndpointPool, PoolOptions, MAX_CONSECUTIVE_FAILURES};
