// 14.6: funding application and the sweep. the rate math lives in
// crate::funding; this layer moves the payment between position equity and the
// pool reserve. both flows are capped: a position never pays more than its
// equity, the pool never credits more than its B reserve.

use super::core::Engine;
use super::results::FundingSweepResult;
use crate::error::ExchangeError;
use crate::events::{EventPayload, FundingAccruedEvent};
use crate::funding::{accrued_funding, funding_rate_bps};
use crate::liquidation::is_liquidatable;
use crate::math;
use crate::position::{settle, signed_pnl};
use crate::types::{ExchangeId, PositionId};

/// One position's funding payment folded into pool accounting.
#[derive(Debug, Clone, Copy)]
pub(super) struct FundingApplication {
    /// What was actually moved, after caps. Positive = the position paid.
    pub applied: i128,
    pub equity: u64,
    pub reserve_b: u64,
    pub collateral_b: u64,
}

pub(super) fn apply_funding_math(
    raw_payment: i128,
    equity: u64,
    reserve_b: u64,
    collateral_b: u64,
) -> Result<FundingApplication, ExchangeError> {
    if raw_payment >= 0 {
        // debit is capped at remaining equity
        let pay = if raw_payment > equity as i128 {
            equity
        } else {
            raw_payment as u64
        };
        Ok(FundingApplication {
            applied: pay as i128,
            equity: equity - pay,
            reserve_b: math::add(reserve_b, pay)?,
            collateral_b: math::sub(collateral_b, pay)?,
        })
    } else {
        // credit is capped at what the pool holds
        let want = -raw_payment;
        let credit = if want > reserve_b as i128 {
            reserve_b
        } else {
            want as u64
        };
        Ok(FundingApplication {
            applied: -(credit as i128),
            equity: math::add(equity, credit)?,
            reserve_b: reserve_b - credit,
            collateral_b: math::add(collateral_b, credit)?,
        })
    }
}

impl Engine {
    /// Settle funding for every open position on an exchange, oldest open first.
    /// Returns the positions left at or below the maintenance threshold so a
    /// keeper can follow up with liquidations.
    pub fn accrue_funding(
        &mut self,
        exchange_id: ExchangeId,
    ) -> Result<FundingSweepResult, ExchangeError> {
        let now = self.time();
        let exchange = self.exchange(exchange_id)?;
        let funding_params = exchange.params.funding;
        let liquidation_params = exchange.params.liquidation;
        let (long_oi, short_oi) = (exchange.long_oi, exchange.short_oi);
        let rate = funding_rate_bps(long_oi, short_oi, &funding_params);
        // a stale or absent price does not block accrual; the eligibility check
        // just falls back to equity alone
        let mark = exchange.mark_price(now).ok();

        // open-sequence order keeps the sweep deterministic across map layouts
        let mut order: Vec<(u64, PositionId)> =
            exchange.open_positions().map(|p| (p.seq, p.id)).collect();
        order.sort_unstable_by_key(|(seq, _)| *seq);

        let mut result = FundingSweepResult {
            rate_bps_per_day: rate,
            positions_touched: 0,
            total_debited: 0,
            total_credited: 0,
            liquidatable: Vec::new(),
        };

        for (_, position_id) in order {
            let exchange = self.exchange(exchange_id)?;
            let position = exchange.position(position_id)?.clone();
            let elapsed = position.last_funding_at.elapsed_secs(now);
            let raw = accrued_funding(
                position.direction,
                position.amount,
                long_oi,
                short_oi,
                elapsed,
                &funding_params,
            )?;
            let applied = apply_funding_math(
                raw,
                position.equity,
                exchange.reserve_b,
                exchange.collateral_b,
            )?;

            let exchange = self.exchange_mut(exchange_id)?;
            exchange.reserve_b = applied.reserve_b;
            exchange.collateral_b = applied.collateral_b;
            let record = exchange.position_mut(position_id)?;
            record.equity = applied.equity;
            record.last_funding_at = now;

            result.positions_touched += 1;
            if applied.applied > 0 {
                result.total_debited = math::add(result.total_debited, applied.applied as u64)?;
            } else if applied.applied < 0 {
                result.total_credited =
                    math::add(result.total_credited, (-applied.applied) as u64)?;
            }
            if applied.applied != 0 {
                self.emit_event(EventPayload::FundingAccrued(FundingAccruedEvent {
                    exchange_id,
                    position_id,
                    payment: applied.applied,
                    rate_bps_per_day: rate,
                }));
            }

            let margin_equity = match mark {
                Some(price) => settle(
                    applied.equity,
                    signed_pnl(position.direction, position.amount, position.entry_price, price),
                ),
                None => applied.equity,
            };
            if is_liquidatable(margin_equity, position.amount, &liquidation_params) {
                result.liquidatable.push(position_id);
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_caps_at_equity() {
        let applied = apply_funding_math(1_500, 1_000, 10_000, 1_000).unwrap();
        assert_eq!(applied.applied, 1_000);
        assert_eq!(applied.equity, 0);
        assert_eq!(applied.reserve_b, 11_000);
        assert_eq!(applied.collateral_b, 0);
    }

    #[test]
    fn credit_caps_at_reserve() {
        let applied = apply_funding_math(-500, 1_000, 200, 1_000).unwrap();
        assert_eq!(applied.applied, -200);
        assert_eq!(applied.equity, 1_200);
        assert_eq!(applied.reserve_b, 0);
        assert_eq!(applied.collateral_b, 1_200);
    }

    #[test]
    fn application_conserves_pool_holdings() {
        // reserve_b + collateral_b is invariant under funding
        for raw in [-10_000i128, -1, 0, 1, 733, 10_000] {
            let applied = apply_funding_math(raw, 2_000, 5_000, 3_000).unwrap();
            assert_eq!(applied.reserve_b + applied.collateral_b, 8_000, "raw={raw}");
        }
    }
}
