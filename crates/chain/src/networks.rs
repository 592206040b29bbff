//! Static per-network configuration for AAVE V3 deployments.

use alloy::primitives::{address, Address};
use anyhow::{bail, Result};

/// Immutable configuration for one supported network.
///
/// Selected once at startup by name; the RPC URLs are the candidate set the
/// endpoint pool draws from. All endpoints are free public providers, so the
/// list is deliberately long.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name ("ethereum", "polygon", ...)
    pub name: &'static str,
    /// Candidate RPC endpoint URLs
    pub rpc_urls: Vec<&'static str>,
    /// AAVE V3 Pool contract address
    pub pool: Address,
    /// AAVE V3 Oracle contract address
    pub oracle: Address,
    /// EVM chain id
    pub chain_id: u64,
}

impl NetworkConfig {
    /// Look up a network by name. Unknown names are a startup error.
    pub fn by_name(name: &str) -> Result<Self> {
        let config = match name.to_lowercase().as_str() {
            "ethereum" => Self {
                name: "ethereum",
                rpc_urls: vec![
                    "https://eth.llamarpc.com",
                    "https://rpc.ankr.com/eth",
                    "https://ethereum.publicnode.com",
                    "https://eth.drpc.org",
                    "https://1rpc.io/eth",
                    "https://eth.meowrpc.com",
                ],
                pool: address!("87870bca3f3fd6335c3f4ce8392d69350b4fa4e2"),
                oracle: address!("54586be62e3c3580375ae3723c145253060ca0c2"),
                chain_id: 1,
            },
            "polygon" => Self {
                name: "polygon",
                rpc_urls: vec![
                    "https://polygon.llamarpc.com",
                    "https://rpc.ankr.com/polygon",
                    "https://polygon.drpc.org",
                    "https://polygon-bor-rpc.publicnode.com",
                    "https://1rpc.io/matic",
                ],
                pool: address!("794a61358d6845594f94dc1db02a252b5b4814ad"),
                oracle: address!("b023e699f5a33916ea823a16485e259257ca8bd1"),
                chain_id: 137,
            },
            "arbitrum" => Self {
                name: "arbitrum",
                rpc_urls: vec![
                    "https://arbitrum.llamarpc.com",
                    "https://rpc.ankr.com/arbitrum",
                    "https://arbitrum.drpc.org",
                    "https://arbitrum-one-rpc.publicnode.com",
                    "https://1rpc.io/arb",
                ],
                pool: address!("794a61358d6845594f94dc1db02a252b5b4814ad"),
                oracle: address!("b56c2f0b653b2e0b10c9b928c8580ac5df02c7c7"),
                chain_id: 42161,
            },
            "optimism" => Self {
                name: "optimism",
                rpc_urls: vec![
                    "https://optimism.llamarpc.com",
                    "https://rpc.ankr.com/optimism",
                    "https://optimism.drpc.org",
                    "https://optimism-rpc.publicnode.com",
                    "https://1rpc.io/op",
                ],
                pool: address!("794a61358d6845594f94dc1db02a252b5b4814ad"),
                oracle: address!("d81eb3728a631871a7ebbad631b5f424909f0c77"),
                chain_id: 10,
            },
            other => bail!("unsupported network: {other}"),
        };
        Ok(config)
    }

    /// Names of all supported networks.
    pub fn supported() -> &'static [&'static str] {
        &["ethereum", "polygon", "arbitrum", "optimism"]
    }
}
