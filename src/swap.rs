// 5.0: constant-product pricing. fee is taken on the input side, so the product
// of reserves never decreases across a trade. input price answers "what do I get
// for amount_in", output price is the inverse: "what must I pay for amount_out".
// both are pure; 5.3/5.4 wrap them into executable outcomes with slippage bounds.

use crate::error::ExchangeError;
use crate::math::{after_fee, mul_div_floor, MathError, BPS_DENOMINATOR};

/// A swap ready to commit: how much goes in, how much comes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    pub amount_in: u64,
    pub amount_out: u64,
}

// 5.1: amount_out = reserve_out * in_after_fee / (reserve_in + in_after_fee).
// output is paid to the trader, so every rounding step floors.
pub fn input_price(
    amount_in: u64,
    reserve_in: u64,
    reserve_out: u64,
    fee_bps: u64,
) -> Result<u64, ExchangeError> {
    if amount_in == 0 {
        return Err(ExchangeError::Validation("swap amount_in must be non-zero"));
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(ExchangeError::InsufficientLiquidity {
            requested: amount_in,
            available: 0,
        });
    }

    let in_after_fee = after_fee(amount_in, fee_bps)?;
    let denominator = reserve_in
        .checked_add(in_after_fee)
        .ok_or(MathError::Overflow)?;
    Ok(mul_div_floor(reserve_out, in_after_fee, denominator)?)
}

// 5.2: amount_in = ceil(reserve_in * amount_out * 10000
//                       / ((reserve_out - amount_out) * (10000 - fee))).
// input is charged to the trader, so the division rounds up.
pub fn output_price(
    amount_out: u64,
    reserve_in: u64,
    reserve_out: u64,
    fee_bps: u64,
) -> Result<u64, ExchangeError> {
    if amount_out == 0 {
        return Err(ExchangeError::Validation("swap amount_out must be non-zero"));
    }
    if amount_out >= reserve_out {
        return Err(ExchangeError::InsufficientLiquidity {
            requested: amount_out,
            available: reserve_out,
        });
    }

    let numerator = (reserve_in as u128)
        .checked_mul(amount_out as u128)
        .and_then(|n| n.checked_mul(BPS_DENOMINATOR as u128))
        .ok_or(MathError::Overflow)?;
    let keep_bps = BPS_DENOMINATOR
        .checked_sub(fee_bps)
        .ok_or(MathError::Overflow)?;
    let denominator = ((reserve_out - amount_out) as u128) * (keep_bps as u128);
    if denominator == 0 {
        return Err(MathError::DivisionByZero.into());
    }

    let amount_in = numerator
        .checked_add(denominator - 1)
        .ok_or(MathError::Overflow)?
        / denominator;
    Ok(u64::try_from(amount_in).map_err(|_| MathError::Overflow)?)
}

// 5.3: exact-input trade with a floor on what comes out.
pub fn swap_input_outcome(
    amount_in: u64,
    reserve_in: u64,
    reserve_out: u64,
    fee_bps: u64,
    min_out: u64,
) -> Result<SwapOutcome, ExchangeError> {
    let amount_out = input_price(amount_in, reserve_in, reserve_out, fee_bps)?;
    if amount_out < min_out {
        return Err(ExchangeError::SlippageExceeded {
            actual: amount_out,
            minimum: min_out,
        });
    }
    Ok(SwapOutcome {
        amount_in,
        amount_out,
    })
}

// 5.4: exact-output trade with a cap on what goes in.
pub fn swap_output_outcome(
    amount_out: u64,
    reserve_in: u64,
    reserve_out: u64,
    fee_bps: u64,
    max_in: u64,
) -> Result<SwapOutcome, ExchangeError> {
    let amount_in = output_price(amount_out, reserve_in, reserve_out, fee_bps)?;
    if amount_in > max_in {
        return Err(ExchangeError::ExcessiveInput {
            required: amount_in,
            maximum: max_in,
        });
    }
    Ok(SwapOutcome {
        amount_in,
        amount_out,
    })
}
