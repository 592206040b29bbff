//! Position snapshots and fixed-point scaling of on-chain values.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::Serialize;

use monitor_chain::{RawAccountData, RpcError};

use crate::risk::RiskMetrics;

/// Base-currency values (collateral, debt, borrow headroom) use 8 decimals.
const BASE_CURRENCY_SCALE: f64 = 1e8;
/// Threshold and LTV are basis points; dividing by 1e4 yields a percentage.
const BPS_SCALE: f64 = 1e4;
/// The health factor is WAD-scaled (18 decimals).
const WAD_SCALE: f64 = 1e18;

/// One address's position as observed in a single poll cycle.
///
/// Created fresh each cycle, never mutated, discarded after the cycle's
/// report is produced.
#[derive(Debug, Clone, Serialize)]
pub struct PositionSnapshot {
    /// Monitored wallet address
    pub address: Address,
    /// Total collateral (USD)
    pub collateral_usd: f64,
    /// Total debt (USD)
    pub debt_usd: f64,
    /// Remaining borrow headroom (USD)
    pub available_borrows_usd: f64,
    /// Weighted liquidation threshold, percent (e.g. 82.5)
    pub liquidation_threshold_pct: f64,
    /// Weighted loan-to-value, percent
    pub ltv_pct: f64,
    /// Health factor (1.0 = liquidatable)
    pub health_factor: f64,
    /// Derived risk metrics; `None` for degenerate positions
    pub risk: Option<RiskMetrics>,
    /// Capture time
    pub timestamp: DateTime<Utc>,
    /// URL of the endpoint that served the data
    pub rpc_used: String,
}

impl PositionSnapshot {
    /// Scale raw fixed-point account data into decimal metrics and derive
    /// the risk metrics.
    ///
    /// A non-finite value after scaling means the endpoint returned garbage;
    /// that is a malformed-response error, not a snapshot.
    pub fn from_raw(
        address: Address,
        raw: &RawAccountData,
        rpc_used: &str,
    ) -> Result<Self, RpcError> {
        let collateral_usd = scale(raw.total_collateral_base, BASE_CURRENCY_SCALE)?;
        let debt_usd = scale(raw.total_debt_base, BASE_CURRENCY_SCALE)?;
        let available_borrows_usd = scale(raw.available_borrows_base, BASE_CURRENCY_SCALE)?;
        let liquidation_threshold_pct = scale(raw.current_liquidation_threshold, BPS_SCALE)?;
        let ltv_pct = scale(raw.ltv, BPS_SCALE)?;
        let health_factor = scale(raw.health_factor, WAD_SCALE)?;

        let risk = RiskMetrics::compute(
            collateral_usd,
            debt_usd,
            liquidation_threshold_pct / 100.0,
            health_factor,
        );

        Ok(Self {
            address,
            collateral_usd,
            debt_usd,
            available_borrows_usd,
            liquidation_threshold_pct,
            ltv_pct,
            health_factor,
            risk,
            timestamp: Utc::now(),
            rpc_used: rpc_used.to_string(),
        })
    }
}

/// Convert a U256 to f64. Exact for values up to 2^53; beyond that the
/// precision loss is irrelevant for display-scale metrics.
fn u256_to_f64(value: U256) -> f64 {
    if value <= U256::from(u128::MAX) {
        value.to::<u128>() as f64
    } else {
        value
            .as_limbs()
            .iter()
            .enumerate()
            .map(|(i, &limb)| limb as f64 * 2f64.powi(64 * i as i32))
            .sum()
    }
}

fn scale(value: U256, divisor: f64) -> Result<f64, RpcError> {
    let scaled = u256_to_f64(value) / divisor;
    if !scaled.is_finite() || scaled < 0.0 {
        return Err(RpcError::Malformed(format!(
            "fixed-point value out of range: {value}"
        )));
    }
    Ok(scaled)
}
