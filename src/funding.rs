// 7.0: funding. the crowded side of open interest pays the other side over time,
// which nudges traders toward balance. the rate is linear in OI imbalance and
// self-clamped: |long - short| <= long + short, so |rate| <= max_rate_bps_per_day.
// accrual is lazy: it runs on every touch of a position and from the keeper crank.

use serde::{Deserialize, Serialize};

use crate::math::{MathError, BPS_DENOMINATOR};
use crate::types::Direction;

pub const SECONDS_PER_DAY: u64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingParams {
    /// Rate at full one-sided imbalance, in bps of notional per day.
    pub max_rate_bps_per_day: u64,
}

impl Default for FundingParams {
    fn default() -> Self {
        Self {
            max_rate_bps_per_day: 100, // 1% of notional per day at full imbalance
        }
    }
}

// 7.1: signed rate in bps/day. positive = longs pay shorts.
pub fn funding_rate_bps(long_oi: u64, short_oi: u64, params: &FundingParams) -> i64 {
    let total = long_oi as i128 + short_oi as i128;
    if total == 0 {
        return 0;
    }
    let imbalance = long_oi as i128 - short_oi as i128;
    (imbalance * params.max_rate_bps_per_day as i128 / total) as i64
}

// 7.2: payment owed by or to one position over an elapsed window.
// positive = the position pays (equity debited), negative = it is credited.
pub fn accrued_funding(
    direction: Direction,
    amount: u64,
    long_oi: u64,
    short_oi: u64,
    elapsed_secs: u64,
    params: &FundingParams,
) -> Result<i128, MathError> {
    let rate = funding_rate_bps(long_oi, short_oi, params);
    if rate == 0 || elapsed_secs == 0 {
        return Ok(0);
    }

    let magnitude = (amount as u128)
        .checked_mul(rate.unsigned_abs() as u128)
        .and_then(|m| m.checked_mul(elapsed_secs as u128))
        .ok_or(MathError::Overflow)?
        / (BPS_DENOMINATOR as u128 * SECONDS_PER_DAY as u128);
    let magnitude = i128::try_from(magnitude).map_err(|_| MathError::Overflow)?;

    // the side the rate points at pays; the other side is credited
    Ok(magnitude * rate.signum() as i128 * direction.sign() as i128)
}
