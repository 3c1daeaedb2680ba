// 14.7: position lifecycle. open locks collateral into the vault, close and
// liquidate settle against the pool. the pool is the counterparty: profits are
// paid out of the B reserve (capped by what it holds), losses accrue to it.
// settlement always runs funding first, then pnl at the mark.

use super::core::Engine;
use super::funding::apply_funding_math;
use super::results::{ClosePositionResult, LiquidationResult, OpenPositionResult};
use crate::error::ExchangeError;
use crate::events::{
    EventPayload, FundingAccruedEvent, PositionClosedEvent, PositionLiquidatedEvent,
    PositionOpenedEvent,
};
use crate::exchange::Exchange;
use crate::funding::{accrued_funding, funding_rate_bps};
use crate::ledger::HolderId;
use crate::liquidation::{is_liquidatable, split_liquidation_value};
use crate::math;
use crate::position::{check_leverage, settle, signed_pnl, Position};
use crate::types::{Direction, ExchangeId, PositionId, PositionStatus, TraderId, UnixTime};

/// Everything a close or liquidation will commit, computed before any mutation.
struct SettlementPlan {
    mark: u64,
    /// Funding applied first, positive = the position paid.
    funding: i128,
    pnl: i128,
    /// Post-funding equity plus pnl, clamped at zero. Drives the maintenance
    /// check and, capped by the reserve, the payout.
    margin_equity: u64,
    /// What actually leaves the pool's custody for this position.
    payout: u64,
    new_reserve_b: u64,
    new_collateral_b: u64,
}

fn plan_settlement(
    exchange: &Exchange,
    position: &Position,
    now: UnixTime,
) -> Result<SettlementPlan, ExchangeError> {
    let mark = exchange.mark_price(now)?;
    let raw_funding = accrued_funding(
        position.direction,
        position.amount,
        exchange.long_oi,
        exchange.short_oi,
        position.last_funding_at.elapsed_secs(now),
        &exchange.params.funding,
    )?;
    let funded = apply_funding_math(
        raw_funding,
        position.equity,
        exchange.reserve_b,
        exchange.collateral_b,
    )?;

    let pnl = signed_pnl(position.direction, position.amount, position.entry_price, mark);
    let margin_equity = settle(funded.equity, pnl);

    // release the collateral, then settle the difference against the reserve
    let new_collateral_b = math::sub(funded.collateral_b, funded.equity)?;
    let (payout, new_reserve_b) = if margin_equity > funded.equity {
        let profit = margin_equity - funded.equity;
        let paid = profit.min(funded.reserve_b);
        (funded.equity + paid, funded.reserve_b - paid)
    } else {
        let loss = funded.equity - margin_equity;
        (margin_equity, math::add(funded.reserve_b, loss)?)
    };

    Ok(SettlementPlan {
        mark,
        funding: funded.applied,
        pnl,
        margin_equity,
        payout,
        new_reserve_b,
        new_collateral_b,
    })
}

impl Engine {
    /// Open a leveraged position. `amount` is notional exposure, `equity` the
    /// collateral locked behind it; both in quote (B) units. Entry is at the
    /// current mark price.
    pub fn open_position(
        &mut self,
        trader: TraderId,
        exchange_id: ExchangeId,
        direction: Direction,
        amount: u64,
        equity: u64,
        deadline: UnixTime,
    ) -> Result<OpenPositionResult, ExchangeError> {
        self.ensure_deadline(deadline)?;
        let now = self.time();

        let exchange = self.exchange(exchange_id)?;
        check_leverage(amount, equity, exchange.params.max_leverage)?;
        let entry_price = exchange.mark_price(now)?;

        let (token_b, vault, seq) = (exchange.token_b, exchange.vault(), exchange.position_count);
        let new_collateral_b = math::add(exchange.collateral_b, equity)?;
        let new_count = math::add(seq, 1)?;
        let (new_long_oi, new_short_oi) = match direction {
            Direction::Long => (math::add(exchange.long_oi, amount)?, exchange.short_oi),
            Direction::Short => (exchange.long_oi, math::add(exchange.short_oi, amount)?),
        };

        let holder = HolderId::Trader(trader);
        self.ledger.require_collateral(holder, token_b, equity)?;
        self.ledger.transfer(holder, vault, token_b, equity)?;

        let position_id = PositionId::derive(trader, exchange_id, seq);
        let exchange = self.exchange_mut(exchange_id)?;
        exchange.position_count = new_count;
        exchange.collateral_b = new_collateral_b;
        exchange.long_oi = new_long_oi;
        exchange.short_oi = new_short_oi;
        exchange.positions.insert(
            position_id,
            Position::open(
                position_id,
                trader,
                exchange_id,
                seq,
                direction,
                amount,
                equity,
                entry_price,
                now,
            ),
        );

        self.emit_event(EventPayload::PositionOpened(PositionOpenedEvent {
            exchange_id,
            position_id,
            trader,
            direction,
            amount,
            equity,
            entry_price,
        }));

        Ok(OpenPositionResult {
            position_id,
            direction,
            amount,
            equity,
            entry_price,
        })
    }

    /// Close an open position at the current mark. Only the owner may close;
    /// funding settles first, then pnl, and the payout goes back to the owner.
    pub fn close_position(
        &mut self,
        caller: TraderId,
        exchange_id: ExchangeId,
        position_id: PositionId,
        deadline: UnixTime,
    ) -> Result<ClosePositionResult, ExchangeError> {
        let exchange = self.exchange(exchange_id)?;
        let position = exchange.position(position_id)?.clone();
        if position.trader != caller {
            return Err(ExchangeError::Unauthorized(caller));
        }
        self.ensure_deadline(deadline)?;
        if !position.is_open() {
            return Err(ExchangeError::PositionNotOpen(position_id));
        }

        let now = self.time();
        let plan = plan_settlement(exchange, &position, now)?;
        let (token_b, vault) = (exchange.token_b, exchange.vault());
        let rate = funding_rate_bps(exchange.long_oi, exchange.short_oi, &exchange.params.funding);

        self.ledger.transfer(vault, HolderId::Trader(caller), token_b, plan.payout)?;

        let exchange = self.exchange_mut(exchange_id)?;
        exchange.reserve_b = plan.new_reserve_b;
        exchange.collateral_b = plan.new_collateral_b;
        exchange.remove_open_interest(position.direction, position.amount);
        let record = exchange.position_mut(position_id)?;
        record.status = PositionStatus::Closed;
        record.equity = 0;
        record.last_funding_at = now;

        if plan.funding != 0 {
            self.emit_event(EventPayload::FundingAccrued(FundingAccruedEvent {
                exchange_id,
                position_id,
                payment: plan.funding,
                rate_bps_per_day: rate,
            }));
        }
        self.emit_event(EventPayload::PositionClosed(PositionClosedEvent {
            exchange_id,
            position_id,
            trader: caller,
            exit_price: plan.mark,
            pnl: plan.pnl,
            payout: plan.payout,
        }));

        Ok(ClosePositionResult {
            position_id,
            exit_price: plan.mark,
            pnl: plan.pnl,
            funding: plan.funding,
            payout: plan.payout,
        })
    }

    /// Liquidate a position at or below the maintenance threshold. Anyone may
    /// call; the caller takes the configured share of the remaining value and
    /// the rest accrues to the pool.
    pub fn liquidate_position(
        &mut self,
        liquidator: TraderId,
        exchange_id: ExchangeId,
        position_id: PositionId,
    ) -> Result<LiquidationResult, ExchangeError> {
        let now = self.time();
        let exchange = self.exchange(exchange_id)?;
        let position = exchange.position(position_id)?.clone();
        if !position.is_open() {
            return Err(ExchangeError::PositionNotOpen(position_id));
        }

        let plan = plan_settlement(exchange, &position, now)?;
        if !is_liquidatable(plan.margin_equity, position.amount, &exchange.params.liquidation) {
            return Err(ExchangeError::NotLiquidatable(position_id));
        }

        let split = split_liquidation_value(plan.payout, &exchange.params.liquidation)?;
        let new_reserve_b = math::add(plan.new_reserve_b, split.pool_remainder)?;
        let (token_b, vault) = (exchange.token_b, exchange.vault());
        let rate = funding_rate_bps(exchange.long_oi, exchange.short_oi, &exchange.params.funding);

        self.ledger.transfer(
            vault,
            HolderId::Trader(liquidator),
            token_b,
            split.liquidator_reward,
        )?;

        let exchange = self.exchange_mut(exchange_id)?;
        exchange.reserve_b = new_reserve_b;
        exchange.collateral_b = plan.new_collateral_b;
        exchange.remove_open_interest(position.direction, position.amount);
        let record = exchange.position_mut(position_id)?;
        record.status = PositionStatus::Liquidated;
        record.equity = 0;
        record.last_funding_at = now;

        if plan.funding != 0 {
            self.emit_event(EventPayload::FundingAccrued(FundingAccruedEvent {
                exchange_id,
                position_id,
                payment: plan.funding,
                rate_bps_per_day: rate,
            }));
        }
        self.emit_event(EventPayload::PositionLiquidated(PositionLiquidatedEvent {
            exchange_id,
            position_id,
            trader: position.trader,
            liquidator,
            mark_price: plan.mark,
            liquidator_reward: split.liquidator_reward,
            pool_remainder: split.pool_remainder,
        }));

        Ok(LiquidationResult {
            position_id,
            trader: position.trader,
            liquidator,
            mark_price: plan.mark,
            liquidator_reward: split.liquidator_reward,
            pool_remainder: split.pool_remainder,
        })
    }
}
