//! Contract bindings for the AAVE V3 Pool and Oracle.

use alloy::primitives::U256;
use alloy::sol;

sol! {
    /// AAVE V3 Pool interface (read-only subset used by the monitor)
    #[sol(rpc)]
    interface IPool {
        function getUserAccountData(address user)
            external
            view
            returns (
                uint256 totalCollateralBase,
                uint256 totalDebtBase,
                uint256 availableBorrowsBase,
                uint256 currentLiquidationThreshold,
                uint256 ltv,
                uint256 healthFactor
            );
    }

    /// AAVE V3 Oracle interface
    #[sol(rpc)]
    interface IAaveOracle {
        function getAssetPrice(address asset) external view returns (uint256);
    }
}

/// Raw fixed-point output of `Pool.getUserAccountData`.
///
/// Collateral, debt and borrow headroom are base-currency values with 8
/// decimals; threshold and LTV are basis points; the health factor is WAD
/// (18 decimals). Scaling to decimal metrics happens in `monitor-core`.
#[derive(Debug, Clone, Copy)]
pub struct RawAccountData {
    pub total_collateral_base: U256,
    pub total_debt_base: U256,
    pub available_borrows_base: U256,
    pub current_liquidation_threshold: U256,
    pub ltv: U256,
    pub health_factor: U256,
}

impl From<IPool::getUserAccountDataReturn> for RawAccountData {
    fn from(ret: IPool::getUserAccountDataReturn) -> Self {
        Self {
            total_collateral_base: ret.totalCollateralBase,
            total_debt_base: ret.totalDebtBase,
            available_borrows_base: ret.availableBorrowsBase,
            current_liquidation_threshold: ret.currentLiquidationThreshold,
            ltv: ret.ltv,
            health_factor: ret.healthFactor,
        }
    }
}
