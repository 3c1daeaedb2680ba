// 14.4: bond and unbond. the pure math lives in crate::pool; this layer checks
// the deadline, plans every balance move, then commits. all fallible work
// happens before the first mutation.

use super::core::Engine;
use super::results::{BondResult, UnbondResult};
use crate::error::ExchangeError;
use crate::events::{BondedEvent, EventPayload, UnbondedEvent};
use crate::ledger::HolderId;
use crate::math;
use crate::pool;
use crate::types::{ExchangeId, TraderId, UnixTime};

impl Engine {
    /// Deposit both assets at the pool's current ratio and mint receipt tokens.
    /// `amount_b` drives the deposit; the matching A amount is computed from the
    /// reserve ratio and bounded by `max_amount_a`.
    pub fn bond(
        &mut self,
        trader: TraderId,
        exchange_id: ExchangeId,
        max_amount_a: u64,
        amount_b: u64,
        min_receipt_out: u64,
        deadline: UnixTime,
    ) -> Result<BondResult, ExchangeError> {
        self.ensure_deadline(deadline)?;

        let exchange = self.exchange(exchange_id)?;
        let (token_a, token_b, receipt_token) =
            (exchange.token_a, exchange.token_b, exchange.receipt_token);
        let vault = exchange.vault();

        let outcome = pool::bond_outcome(
            exchange.reserve_a,
            exchange.reserve_b,
            exchange.receipt_supply,
            max_amount_a,
            amount_b,
            min_receipt_out,
        )?;

        // plan the commit so nothing below can fail partway
        let new_reserve_a = math::add(exchange.reserve_a, outcome.amount_a)?;
        let new_reserve_b = math::add(exchange.reserve_b, outcome.amount_b)?;
        let new_supply = math::add(exchange.receipt_supply, outcome.receipt_minted)?;

        let holder = HolderId::Trader(trader);
        for (token, amount) in [(token_a, outcome.amount_a), (token_b, outcome.amount_b)] {
            let available = self.ledger.balance(holder, token);
            if available < amount {
                return Err(ExchangeError::InsufficientBalance {
                    token,
                    requested: amount,
                    available,
                });
            }
        }

        self.ledger.transfer(holder, vault, token_a, outcome.amount_a)?;
        self.ledger.transfer(holder, vault, token_b, outcome.amount_b)?;
        self.ledger.mint(holder, receipt_token, outcome.receipt_minted)?;

        let exchange = self.exchange_mut(exchange_id)?;
        exchange.reserve_a = new_reserve_a;
        exchange.reserve_b = new_reserve_b;
        exchange.receipt_supply = new_supply;

        self.emit_event(EventPayload::Bonded(BondedEvent {
            exchange_id,
            trader,
            amount_a: outcome.amount_a,
            amount_b: outcome.amount_b,
            receipt_minted: outcome.receipt_minted,
        }));

        Ok(BondResult {
            amount_a: outcome.amount_a,
            amount_b: outcome.amount_b,
            receipt_minted: outcome.receipt_minted,
        })
    }

    /// Burn receipt tokens for a proportional share of both reserves.
    pub fn unbond(
        &mut self,
        trader: TraderId,
        exchange_id: ExchangeId,
        receipt_amount: u64,
        deadline: UnixTime,
    ) -> Result<UnbondResult, ExchangeError> {
        self.ensure_deadline(deadline)?;

        let exchange = self.exchange(exchange_id)?;
        let (token_a, token_b, receipt_token) =
            (exchange.token_a, exchange.token_b, exchange.receipt_token);
        let vault = exchange.vault();

        let holder = HolderId::Trader(trader);
        let held = self.ledger.balance(holder, receipt_token);
        if held < receipt_amount {
            return Err(ExchangeError::InsufficientReceipt {
                requested: receipt_amount,
                available: held,
            });
        }

        let outcome = pool::unbond_outcome(
            exchange.reserve_a,
            exchange.reserve_b,
            exchange.receipt_supply,
            receipt_amount,
        )?;

        let new_reserve_a = math::sub(exchange.reserve_a, outcome.amount_a)?;
        let new_reserve_b = math::sub(exchange.reserve_b, outcome.amount_b)?;
        let new_supply = math::sub(exchange.receipt_supply, outcome.receipt_burned)?;

        self.ledger.burn(holder, receipt_token, outcome.receipt_burned)?;
        self.ledger.transfer(vault, holder, token_a, outcome.amount_a)?;
        self.ledger.transfer(vault, holder, token_b, outcome.amount_b)?;

        let exchange = self.exchange_mut(exchange_id)?;
        exchange.reserve_a = new_reserve_a;
        exchange.reserve_b = new_reserve_b;
        exchange.receipt_supply = new_supply;

        self.emit_event(EventPayload::Unbonded(UnbondedEvent {
            exchange_id,
            trader,
            receipt_burned: outcome.receipt_burned,
            amount_a: outcome.amount_a,
            amount_b: outcome.amount_b,
        }));

        Ok(UnbondResult {
            receipt_burned: outcome.receipt_burned,
            amount_a: outcome.amount_a,
            amount_b: outcome.amount_b,
        })
    }
}
