//! Liquidation-risk derivation from the health factor.

use serde::Serialize;

/// Risk metrics derived from a position's account data.
///
/// Liquidation occurs when HF < 1.0, where
/// `HF = Collateral x Price x LiqThreshold / Debt`. At liquidation HF = 1.0,
/// so the ratio of liquidation price to current price is exactly `1 / HF`.
/// Metrics are expressed relative to the current price rather than in
/// absolute currency terms; the normalized current price is always 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskMetrics {
    /// Liquidation price as a fraction of the current price (`1 / HF`).
    pub liquidation_price_ratio: f64,
    /// Percentage price drop needed to reach liquidation. Negative means the
    /// position is already under-collateralized (HF < 1.0).
    pub price_drop_to_liquidation_pct: f64,
    /// Fixed reference point for the ratios above.
    pub current_price_normalized: f64,
}

impl RiskMetrics {
    /// Derive risk metrics from scaled account values.
    ///
    /// Returns `None` when collateral, debt or the liquidation threshold is
    /// exactly zero: risk is undefined for such positions, not zero.
    pub fn compute(
        collateral_usd: f64,
        debt_usd: f64,
        liquidation_threshold: f64,
        health_factor: f64,
    ) -> Option<Self> {
        if collateral_usd == 0.0 || debt_usd == 0.0 || liquidation_threshold == 0.0 {
            return None;
        }

        let liquidation_price_ratio = if health_factor > 0.0 {
            1.0 / health_factor
        } else {
            0.0
        };

        Some(Self {
            liquidation_price_ratio,
            price_drop_to_liquidation_pct: (1.0 - liquidation_price_ratio) * 100.0,
            current_price_normalized: 1.0,
        })
    }
}
