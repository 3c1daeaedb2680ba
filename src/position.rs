// 6.0: leveraged position records. a position is notional exposure (`amount`,
// quote units) backed by collateral (`equity`) at a recorded entry price.
// pnl = (mark - entry) * amount * sign(direction). the record persists after
// close/liquidation for audit; only its status goes terminal.

use serde::{Deserialize, Serialize};

use crate::error::ExchangeError;
use crate::types::{
    Direction, ExchangeId, PositionId, PositionStatus, TraderId, UnixTime, PRICE_SCALE,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub trader: TraderId,
    pub exchange: ExchangeId,
    /// Per-exchange open sequence number the id was derived from.
    pub seq: u64,
    pub status: PositionStatus,
    pub direction: Direction,
    /// Notional exposure in the quote asset's smallest unit.
    pub amount: u64,
    /// Collateral currently backing the position, same unit.
    pub equity: u64,
    /// Entry price, `PRICE_SCALE` fixed point.
    pub entry_price: u64,
    pub opened_at: UnixTime,
    /// Funding has been settled up to here.
    pub last_funding_at: UnixTime,
}

impl Position {
    pub fn open(
        id: PositionId,
        trader: TraderId,
        exchange: ExchangeId,
        seq: u64,
        direction: Direction,
        amount: u64,
        equity: u64,
        entry_price: u64,
        opened_at: UnixTime,
    ) -> Self {
        Self {
            id,
            trader,
            exchange,
            seq,
            status: PositionStatus::Open,
            direction,
            amount,
            equity,
            entry_price,
            opened_at,
            last_funding_at: opened_at,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// Effective leverage, floored to whole multiples. Display only; validation
    /// uses `check_leverage` which is exact.
    pub fn leverage(&self) -> u64 {
        if self.equity == 0 {
            return u64::MAX;
        }
        self.amount / self.equity
    }

    // 6.1: paper gains/losses at the given mark price
    pub fn pnl(&self, mark_price: u64) -> i128 {
        signed_pnl(self.direction, self.amount, self.entry_price, mark_price)
    }

    /// Collateral plus pnl, clamped at zero. What the owner would walk away with.
    pub fn settlement_value(&self, mark_price: u64) -> u64 {
        settle(self.equity, self.pnl(mark_price))
    }
}

// 6.2: the pnl formula. (mark - entry) * amount * sign / PRICE_SCALE.
// div_euclid rounds toward negative infinity: profits floor, losses round away
// from zero. the pool keeps every rounding remainder.
pub fn signed_pnl(direction: Direction, amount: u64, entry_price: u64, mark_price: u64) -> i128 {
    let diff = mark_price as i128 - entry_price as i128;
    let raw = diff * amount as i128 * direction.sign() as i128;
    raw.div_euclid(PRICE_SCALE as i128)
}

/// `equity + pnl` clamped into `0..=u64::MAX`.
pub fn settle(equity: u64, pnl: i128) -> u64 {
    let value = equity as i128 + pnl;
    value.clamp(0, u64::MAX as i128) as u64
}

// 6.3: leverage gate. amount/equity must be at least 1x and at most max_leverage.
// exact at the maximum passes; one unit of notional above it fails.
pub fn check_leverage(amount: u64, equity: u64, max_leverage: u64) -> Result<(), ExchangeError> {
    if amount == 0 {
        return Err(ExchangeError::Validation("position amount must be non-zero"));
    }
    if equity == 0 {
        return Err(ExchangeError::Validation("position equity must be non-zero"));
    }
    if amount < equity {
        return Err(ExchangeError::Validation("leverage below 1x"));
    }
    let cap = equity
        .checked_mul(max_leverage)
        .ok_or(crate::math::MathError::Overflow)?;
    if amount > cap {
        return Err(ExchangeError::LeverageExceeded {
            amount,
            equity,
            max_leverage,
        });
    }
    Ok(())
}
