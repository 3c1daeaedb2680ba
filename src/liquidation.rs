// 8.0: liquidation. a position is liquidatable once its post-funding equity sits
// at or below the maintenance threshold, a fixed fraction of notional. the
// threshold is inclusive: exactly at the line means liquidatable, solvency of the
// pool wins over trader leniency. whoever submits the liquidation gets a share of
// the remaining settlement value, the rest accrues to the pool.

use serde::{Deserialize, Serialize};

use crate::math::{bps_mul_floor, MathError, BPS_DENOMINATOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationParams {
    /// Minimum equity as bps of notional before liquidation opens up.
    pub maintenance_margin_bps: u64,
    /// Liquidator's cut of the remaining settlement value, in bps.
    pub liquidator_share_bps: u64,
}

impl Default for LiquidationParams {
    fn default() -> Self {
        Self {
            maintenance_margin_bps: 500,  // 5% of notional
            liquidator_share_bps: 5_000,  // half to the liquidator, half to the pool
        }
    }
}

// 8.1: inclusive threshold check. equity/amount <= maintenance_bps/10000,
// cross-multiplied so there is no division.
pub fn is_liquidatable(equity: u64, amount: u64, params: &LiquidationParams) -> bool {
    (equity as u128) * (BPS_DENOMINATOR as u128)
        <= (amount as u128) * (params.maintenance_margin_bps as u128)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationSplit {
    pub liquidator_reward: u64,
    pub pool_remainder: u64,
}

// 8.2: reward split. the liquidator's cut floors, the pool keeps the remainder.
pub fn split_liquidation_value(
    value: u64,
    params: &LiquidationParams,
) -> Result<LiquidationSplit, MathError> {
    let liquidator_reward = bps_mul_floor(value, params.liquidator_share_bps)?;
    Ok(LiquidationSplit {
        liquidator_reward,
        pool_remainder: value - liquidator_reward,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> LiquidationParams {
        LiquidationParams::default()
    }

    #[test]
    fn threshold_is_inclusive() {
        // 5% of 10_000 notional = 500 equity: exactly at the line liquidates
        assert!(is_liquidatable(500, 10_000, &params()));
        assert!(is_liquidatable(499, 10_000, &params()));
        assert!(!is_liquidatable(501, 10_000, &params()));
    }

    #[test]
    fn zero_equity_always_liquidatable() {
        assert!(is_liquidatable(0, 1, &params()));
        assert!(is_liquidatable(0, u64::MAX, &params()));
    }

    #[test]
    fn split_conserves_value() {
        let split = split_liquidation_value(1_001, &params()).unwrap();
        assert_eq!(split.liquidator_reward, 500); // floors
        assert_eq!(split.pool_remainder, 501);
        assert_eq!(split.liquidator_reward + split.pool_remainder, 1_001);
    }

    #[test]
    fn split_of_nothing() {
        let split = split_liquidation_value(0, &params()).unwrap();
        assert_eq!(split.liquidator_reward, 0);
        assert_eq!(split.pool_remainder, 0);
    }
}
