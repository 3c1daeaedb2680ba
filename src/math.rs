// 1.0: checked integer math. every formula in the engine goes through these helpers.
// nothing wraps, nothing truncates silently: overflow and division by zero are errors.
//
// rounding policy (1.2): amounts charged to traders round up, amounts paid out
// round down. the pool never loses value to rounding.

use serde::{Deserialize, Serialize};

/// Basis-point denominator. 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,
}

pub fn add(a: u64, b: u64) -> Result<u64, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

pub fn sub(a: u64, b: u64) -> Result<u64, MathError> {
    a.checked_sub(b).ok_or(MathError::Overflow)
}

pub fn mul(a: u64, b: u64) -> Result<u64, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

pub fn div(a: u64, b: u64) -> Result<u64, MathError> {
    a.checked_div(b).ok_or(MathError::DivisionByZero)
}

// 1.1: a * b / d with a u128 intermediate so the product cannot overflow u64 inputs.

/// `a * b / d`, rounded down.
pub fn mul_div_floor(a: u64, b: u64, d: u64) -> Result<u64, MathError> {
    if d == 0 {
        return Err(MathError::DivisionByZero);
    }
    let wide = (a as u128) * (b as u128) / (d as u128);
    u64::try_from(wide).map_err(|_| MathError::Overflow)
}

/// `a * b / d`, rounded up.
pub fn mul_div_ceil(a: u64, b: u64, d: u64) -> Result<u64, MathError> {
    if d == 0 {
        return Err(MathError::DivisionByZero);
    }
    let product = (a as u128) * (b as u128);
    let wide = product
        .checked_add(d as u128 - 1)
        .ok_or(MathError::Overflow)?
        / (d as u128);
    u64::try_from(wide).map_err(|_| MathError::Overflow)
}

/// `value * bps / 10_000`, rounded down.
pub fn bps_mul_floor(value: u64, bps: u64) -> Result<u64, MathError> {
    mul_div_floor(value, bps, BPS_DENOMINATOR)
}

/// Remainder of `value` after deducting `fee_bps`, rounded down.
/// The fee itself is whatever is left over, so the fee rounds up.
pub fn after_fee(value: u64, fee_bps: u64) -> Result<u64, MathError> {
    let keep_bps = BPS_DENOMINATOR
        .checked_sub(fee_bps)
        .ok_or(MathError::Overflow)?;
    mul_div_floor(value, keep_bps, BPS_DENOMINATOR)
}

/// The constant-product value `reserve_a * reserve_b`, widened so it never overflows.
pub fn reserve_product(reserve_a: u64, reserve_b: u64) -> u128 {
    (reserve_a as u128) * (reserve_b as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_ops_catch_overflow() {
        assert_eq!(add(u64::MAX, 1), Err(MathError::Overflow));
        assert_eq!(sub(0, 1), Err(MathError::Overflow));
        assert_eq!(mul(u64::MAX, 2), Err(MathError::Overflow));
        assert_eq!(div(1, 0), Err(MathError::DivisionByZero));
        assert_eq!(add(2, 3), Ok(5));
    }

    #[test]
    fn mul_div_rounding_directions() {
        // 7 * 3 / 2 = 10.5
        assert_eq!(mul_div_floor(7, 3, 2), Ok(10));
        assert_eq!(mul_div_ceil(7, 3, 2), Ok(11));

        // exact division rounds the same both ways
        assert_eq!(mul_div_floor(10, 4, 2), Ok(20));
        assert_eq!(mul_div_ceil(10, 4, 2), Ok(20));
    }

    #[test]
    fn mul_div_survives_u64_products() {
        // the intermediate product overflows u64 but not u128
        assert_eq!(mul_div_floor(u64::MAX, 3, 3), Ok(u64::MAX));
        // a quotient past u64 is an error
        assert_eq!(mul_div_floor(u64::MAX, 3, 2), Err(MathError::Overflow));
        assert_eq!(mul_div_ceil(u64::MAX, 3, 2), Err(MathError::Overflow));
    }

    #[test]
    fn mul_div_by_zero() {
        assert_eq!(mul_div_floor(1, 1, 0), Err(MathError::DivisionByZero));
        assert_eq!(mul_div_ceil(1, 1, 0), Err(MathError::DivisionByZero));
    }

    #[test]
    fn fee_deduction() {
        // 3 bps on 10_000 leaves 9_997
        assert_eq!(after_fee(10_000, 3), Ok(9_997));
        // fee rounds up: 3 bps on 100 is 0.03, trader keeps 99
        assert_eq!(after_fee(100, 3), Ok(99));
        assert_eq!(after_fee(100, 0), Ok(100));
    }

    #[test]
    fn bps_helper() {
        assert_eq!(bps_mul_floor(50_000, 500), Ok(2_500)); // 5%
        assert_eq!(bps_mul_floor(3, 500), Ok(0)); // floors
    }
}
