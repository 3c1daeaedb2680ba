// 4.0: bonding math. the pool mints a receipt token as a proportional claim on its
// reserves. bond deposits both assets at the current ratio, unbond burns receipt
// for a proportional share. 4.1/4.2 are pure: callers pass reserve state in and
// apply the outcome atomically.

use crate::error::ExchangeError;
use crate::math::{mul_div_ceil, mul_div_floor};

/// What a bond would do to the pool: how much A gets pulled alongside `amount_b`,
/// and how much receipt gets minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondOutcome {
    pub amount_a: u64,
    pub amount_b: u64,
    pub receipt_minted: u64,
}

/// What an unbond pays out for the burned receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnbondOutcome {
    pub amount_a: u64,
    pub amount_b: u64,
    pub receipt_burned: u64,
}

// 4.1: bond. on an empty pool the caller sets the initial ratio directly and
// min_receipt_out is ignored. on a live pool the required A preserves the current
// reserve ratio: A is charged to the trader so it rounds up, minted receipt is
// paid to the trader so it rounds down.
pub fn bond_outcome(
    reserve_a: u64,
    reserve_b: u64,
    receipt_supply: u64,
    max_amount_a: u64,
    amount_b: u64,
    min_receipt_out: u64,
) -> Result<BondOutcome, ExchangeError> {
    if amount_b == 0 {
        return Err(ExchangeError::Validation("bond amount_b must be non-zero"));
    }
    if max_amount_a == 0 {
        return Err(ExchangeError::Validation("bond max_amount_a must be non-zero"));
    }

    if receipt_supply == 0 {
        return Ok(BondOutcome {
            amount_a: max_amount_a,
            amount_b,
            receipt_minted: amount_b,
        });
    }

    let amount_a = mul_div_ceil(amount_b, reserve_a, reserve_b)?;
    if amount_a > max_amount_a {
        return Err(ExchangeError::ExcessiveInput {
            required: amount_a,
            maximum: max_amount_a,
        });
    }

    let receipt_minted = mul_div_floor(receipt_supply, amount_b, reserve_b)?;
    if receipt_minted < min_receipt_out {
        return Err(ExchangeError::SlippageExceeded {
            actual: receipt_minted,
            minimum: min_receipt_out,
        });
    }

    Ok(BondOutcome {
        amount_a,
        amount_b,
        receipt_minted,
    })
}

// 4.2: unbond. both payouts round down; burning the entire supply drains the pool
// exactly, which keeps `receipt_supply == 0 <=> reserves == 0`.
pub fn unbond_outcome(
    reserve_a: u64,
    reserve_b: u64,
    receipt_supply: u64,
    receipt_amount: u64,
) -> Result<UnbondOutcome, ExchangeError> {
    if receipt_amount == 0 {
        return Err(ExchangeError::Validation("unbond amount must be non-zero"));
    }
    if receipt_amount > receipt_supply {
        return Err(ExchangeError::InsufficientReceipt {
            requested: receipt_amount,
            available: receipt_supply,
        });
    }

    let amount_a = mul_div_floor(reserve_a, receipt_amount, receipt_supply)?;
    let amount_b = mul_div_floor(reserve_b, receipt_amount, receipt_supply)?;

    Ok(UnbondOutcome {
        amount_a,
        amount_b,
        receipt_burned: receipt_amount,
    })
}
