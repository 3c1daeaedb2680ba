// 14.5: swap quoting and execution. quotes are pure reads against current
// reserves; executed swaps move tokens through the vault, update reserves, and
// refresh the cached trade price in the same commit.

use super::core::Engine;
use super::results::{SwapQuote, SwapResult};
use crate::error::ExchangeError;
use crate::events::{EventPayload, SwapExecutedEvent};
use crate::exchange::Exchange;
use crate::ledger::HolderId;
use crate::math::{self, mul_div_floor};
use crate::swap;
use crate::types::{ExchangeId, SwapDirection, TokenId, TraderId, UnixTime, PRICE_SCALE};

/// Reserves and token ids oriented for one trade direction.
struct Orientation {
    token_in: TokenId,
    token_out: TokenId,
    reserve_in: u64,
    reserve_out: u64,
}

fn orient(exchange: &Exchange, direction: SwapDirection) -> Orientation {
    match direction {
        SwapDirection::AToB => Orientation {
            token_in: exchange.token_a,
            token_out: exchange.token_b,
            reserve_in: exchange.reserve_a,
            reserve_out: exchange.reserve_b,
        },
        SwapDirection::BToA => Orientation {
            token_in: exchange.token_b,
            token_out: exchange.token_a,
            reserve_in: exchange.reserve_b,
            reserve_out: exchange.reserve_a,
        },
    }
}

impl Engine {
    /// Price an exact-input swap without touching state.
    pub fn quote_input(
        &self,
        exchange_id: ExchangeId,
        direction: SwapDirection,
        amount_in: u64,
    ) -> Result<SwapQuote, ExchangeError> {
        let exchange = self.exchange(exchange_id)?;
        let o = orient(exchange, direction);
        let amount_out =
            swap::input_price(amount_in, o.reserve_in, o.reserve_out, exchange.fee_bps.as_u64())?;
        Ok(SwapQuote {
            direction,
            amount_in,
            amount_out,
        })
    }

    /// Price an exact-output swap without touching state.
    pub fn quote_output(
        &self,
        exchange_id: ExchangeId,
        direction: SwapDirection,
        amount_out: u64,
    ) -> Result<SwapQuote, ExchangeError> {
        let exchange = self.exchange(exchange_id)?;
        let o = orient(exchange, direction);
        let amount_in =
            swap::output_price(amount_out, o.reserve_in, o.reserve_out, exchange.fee_bps.as_u64())?;
        Ok(SwapQuote {
            direction,
            amount_in,
            amount_out,
        })
    }

    /// Execute an exact-input swap. Fails with `SlippageExceeded` if the output
    /// lands under `min_out`.
    pub fn swap_input(
        &mut self,
        trader: TraderId,
        exchange_id: ExchangeId,
        direction: SwapDirection,
        amount_in: u64,
        min_out: u64,
        deadline: UnixTime,
    ) -> Result<SwapResult, ExchangeError> {
        self.ensure_deadline(deadline)?;

        let exchange = self.exchange(exchange_id)?;
        let o = orient(exchange, direction);
        let outcome = swap::swap_input_outcome(
            amount_in,
            o.reserve_in,
            o.reserve_out,
            exchange.fee_bps.as_u64(),
            min_out,
        )?;
        self.commit_swap(trader, exchange_id, direction, outcome.amount_in, outcome.amount_out)
    }

    /// Execute an exact-output swap. Fails with `ExcessiveInput` if the required
    /// input exceeds `max_in`.
    pub fn swap_output(
        &mut self,
        trader: TraderId,
        exchange_id: ExchangeId,
        direction: SwapDirection,
        amount_out: u64,
        max_in: u64,
        deadline: UnixTime,
    ) -> Result<SwapResult, ExchangeError> {
        self.ensure_deadline(deadline)?;

        let exchange = self.exchange(exchange_id)?;
        let o = orient(exchange, direction);
        let outcome = swap::swap_output_outcome(
            amount_out,
            o.reserve_in,
            o.reserve_out,
            exchange.fee_bps.as_u64(),
            max_in,
        )?;
        self.commit_swap(trader, exchange_id, direction, outcome.amount_in, outcome.amount_out)
    }

    // shared commit path. new reserves and the refreshed price are computed
    // before any balance moves.
    fn commit_swap(
        &mut self,
        trader: TraderId,
        exchange_id: ExchangeId,
        direction: SwapDirection,
        amount_in: u64,
        amount_out: u64,
    ) -> Result<SwapResult, ExchangeError> {
        let exchange = self.exchange(exchange_id)?;
        let o = orient(exchange, direction);
        let vault = exchange.vault();

        let new_reserve_in = math::add(o.reserve_in, amount_in)?;
        let new_reserve_out = math::sub(o.reserve_out, amount_out)?;
        let (new_reserve_a, new_reserve_b) = match direction {
            SwapDirection::AToB => (new_reserve_in, new_reserve_out),
            SwapDirection::BToA => (new_reserve_out, new_reserve_in),
        };
        let new_last_price = mul_div_floor(new_reserve_a, PRICE_SCALE, new_reserve_b)?;

        let holder = HolderId::Trader(trader);
        let available = self.ledger.balance(holder, o.token_in);
        if available < amount_in {
            return Err(ExchangeError::InsufficientBalance {
                token: o.token_in,
                requested: amount_in,
                available,
            });
        }

        self.ledger.transfer(holder, vault, o.token_in, amount_in)?;
        self.ledger.transfer(vault, holder, o.token_out, amount_out)?;

        let exchange = self.exchange_mut(exchange_id)?;
        exchange.reserve_a = new_reserve_a;
        exchange.reserve_b = new_reserve_b;
        exchange.last_price = new_last_price;

        self.emit_event(EventPayload::SwapExecuted(SwapExecutedEvent {
            exchange_id,
            trader,
            direction,
            amount_in,
            amount_out,
            last_price: new_last_price,
        }));

        Ok(SwapResult {
            direction,
            amount_in,
            amount_out,
            last_price: new_last_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExchangeParams;
    use crate::engine::config::EngineConfig;
    use crate::math::reserve_product;
    use crate::types::Bps;

    const ALICE: TraderId = TraderId(1);
    const FAR: UnixTime = UnixTime(1_000_000);

    fn pool_with(reserve_a: u64, reserve_b: u64, fee_bps: u16) -> (Engine, ExchangeId) {
        let mut engine = Engine::new(EngineConfig::default());
        engine.set_time(UnixTime::from_secs(0));
        let id = engine
            .create_exchange(
                TokenId(1),
                TokenId(2),
                TokenId(3),
                Bps::new(fee_bps).unwrap(),
                ExchangeParams::default(),
            )
            .unwrap();
        engine.deposit(ALICE, TokenId(1), reserve_a + 100_000).unwrap();
        engine.deposit(ALICE, TokenId(2), reserve_b + 100_000).unwrap();
        engine.bond(ALICE, id, reserve_a, reserve_b, 0, FAR).unwrap();
        (engine, id)
    }

    #[test]
    fn quote_then_trade_is_exact() {
        let (mut engine, id) = pool_with(100_000, 100_000, 30);
        let quote = engine.quote_input(id, SwapDirection::AToB, 1_000).unwrap();
        assert_eq!(quote.amount_out, 987);

        // using the quote as min_out can never slip
        let result = engine
            .swap_input(ALICE, id, SwapDirection::AToB, 1_000, quote.amount_out, FAR)
            .unwrap();
        assert_eq!(result.amount_out, quote.amount_out);
    }

    #[test]
    fn swap_updates_reserves_balances_and_price() {
        let (mut engine, id) = pool_with(1_000, 1_000, 0);
        let a_before = engine.balance_of(ALICE, TokenId(1));
        let b_before = engine.balance_of(ALICE, TokenId(2));

        let result = engine
            .swap_input(ALICE, id, SwapDirection::AToB, 100, 0, FAR)
            .unwrap();
        assert_eq!(result.amount_out, 90);

        let snap = engine.snapshot(id).unwrap();
        assert_eq!((snap.reserve_a, snap.reserve_b), (1_100, 910));
        assert_eq!(snap.last_price, mul_div_floor(1_100, PRICE_SCALE, 910).unwrap());
        assert_eq!(engine.balance_of(ALICE, TokenId(1)), a_before - 100);
        assert_eq!(engine.balance_of(ALICE, TokenId(2)), b_before + 90);
    }

    #[test]
    fn swap_output_charges_at_most_max_in() {
        let (mut engine, id) = pool_with(1_000, 1_000, 0);
        let quote = engine.quote_output(id, SwapDirection::BToA, 90).unwrap();

        let err = engine
            .swap_output(ALICE, id, SwapDirection::BToA, 90, quote.amount_in - 1, FAR)
            .unwrap_err();
        assert!(matches!(err, ExchangeError::ExcessiveInput { .. }));

        let result = engine
            .swap_output(ALICE, id, SwapDirection::BToA, 90, quote.amount_in, FAR)
            .unwrap();
        assert_eq!(result.amount_in, quote.amount_in);
    }

    #[test]
    fn reserve_product_never_decreases() {
        let (mut engine, id) = pool_with(100_000, 50_000, 30);
        let snap = engine.snapshot(id).unwrap();
        let before = reserve_product(snap.reserve_a, snap.reserve_b);

        for (direction, amount) in [
            (SwapDirection::AToB, 1_234),
            (SwapDirection::BToA, 999),
            (SwapDirection::AToB, 50_000),
        ] {
            engine.swap_input(ALICE, id, direction, amount, 0, FAR).unwrap();
        }
        let snap = engine.snapshot(id).unwrap();
        assert!(reserve_product(snap.reserve_a, snap.reserve_b) >= before);
    }

    #[test]
    fn failed_swap_mutates_nothing() {
        let (mut engine, id) = pool_with(1_000, 1_000, 0);
        let before = engine.snapshot(id).unwrap();

        let err = engine
            .swap_input(ALICE, id, SwapDirection::AToB, 100, 91, FAR)
            .unwrap_err();
        assert!(matches!(err, ExchangeError::SlippageExceeded { .. }));
        assert_eq!(engine.snapshot(id).unwrap(), before);
    }
}
