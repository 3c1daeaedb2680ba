// 14.3: engine state and the plumbing every operation shares. registry and
// factory for exchanges, the token ledger, external deposits/withdrawals, the
// logical clock, oracle ingestion, and the bounded event log.

use std::collections::HashMap;

use super::config::EngineConfig;
use crate::config::ExchangeParams;
use crate::error::ExchangeError;
use crate::events::{
    DepositedEvent, Event, EventId, EventPayload, ExchangeCreatedEvent, OraclePriceUpdatedEvent,
    WithdrawnEvent,
};
use crate::exchange::{Exchange, ExchangeSnapshot};
use crate::ledger::{HolderId, TokenLedger};
use crate::oracle::OracleObservation;
use crate::types::{Bps, ExchangeId, TokenId, TraderId, UnixTime};

#[derive(Debug)]
pub struct Engine {
    pub(super) config: EngineConfig,
    pub(super) exchanges: HashMap<ExchangeId, Exchange>,
    pub(super) ledger: TokenLedger,
    pub(super) events: Vec<Event>,
    next_event_id: u64,
    exchange_count: u32,
    current_time: UnixTime,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            exchanges: HashMap::new(),
            ledger: TokenLedger::new(),
            events: Vec::new(),
            next_event_id: 1,
            exchange_count: 0,
            current_time: UnixTime::now(),
        }
    }

    // ---- logical clock ------------------------------------------------------

    pub fn time(&self) -> UnixTime {
        self.current_time
    }

    pub fn set_time(&mut self, time: UnixTime) {
        self.current_time = time;
    }

    pub fn advance_time(&mut self, secs: u64) {
        self.current_time = UnixTime::from_secs(self.current_time.as_secs() + secs as i64);
    }

    /// Deadline gate shared by time-sensitive operations. A deadline equal to
    /// the current time is still good.
    pub(super) fn ensure_deadline(&self, deadline: UnixTime) -> Result<(), ExchangeError> {
        if self.current_time > deadline {
            return Err(ExchangeError::DeadlineExpired {
                deadline,
                now: self.current_time,
            });
        }
        Ok(())
    }

    // ---- registry and factory ----------------------------------------------

    pub fn create_exchange(
        &mut self,
        token_a: TokenId,
        token_b: TokenId,
        receipt_token: TokenId,
        fee_bps: Bps,
        params: ExchangeParams,
    ) -> Result<ExchangeId, ExchangeError> {
        if token_a == token_b {
            return Err(ExchangeError::Validation("pair tokens must differ"));
        }
        if receipt_token == token_a || receipt_token == token_b {
            return Err(ExchangeError::Validation(
                "receipt token must not be a pair token",
            ));
        }
        if params.max_leverage == 0 {
            return Err(ExchangeError::Validation("max leverage must be positive"));
        }

        self.exchange_count += 1;
        let id = ExchangeId(self.exchange_count);
        let exchange = Exchange::new(
            id,
            token_a,
            token_b,
            receipt_token,
            fee_bps,
            params,
            self.current_time,
        );
        self.exchanges.insert(id, exchange);

        self.emit_event(EventPayload::ExchangeCreated(ExchangeCreatedEvent {
            exchange_id: id,
            token_a,
            token_b,
            receipt_token,
            fee_bps,
        }));
        Ok(id)
    }

    pub fn exchange(&self, id: ExchangeId) -> Result<&Exchange, ExchangeError> {
        self.exchanges
            .get(&id)
            .ok_or(ExchangeError::ExchangeNotFound(id))
    }

    pub(super) fn exchange_mut(&mut self, id: ExchangeId) -> Result<&mut Exchange, ExchangeError> {
        self.exchanges
            .get_mut(&id)
            .ok_or(ExchangeError::ExchangeNotFound(id))
    }

    pub fn snapshot(&self, id: ExchangeId) -> Result<ExchangeSnapshot, ExchangeError> {
        Ok(self.exchange(id)?.snapshot())
    }

    // ---- external balances --------------------------------------------------

    /// Credit tokens arriving from outside the engine.
    pub fn deposit(
        &mut self,
        trader: TraderId,
        token: TokenId,
        amount: u64,
    ) -> Result<(), ExchangeError> {
        if amount == 0 {
            return Err(ExchangeError::Validation("deposit amount must be positive"));
        }
        self.ledger.mint(HolderId::Trader(trader), token, amount)?;
        self.emit_event(EventPayload::Deposited(DepositedEvent {
            trader,
            token,
            amount,
        }));
        Ok(())
    }

    pub fn withdraw(
        &mut self,
        trader: TraderId,
        token: TokenId,
        amount: u64,
    ) -> Result<(), ExchangeError> {
        if amount == 0 {
            return Err(ExchangeError::Validation("withdraw amount must be positive"));
        }
        self.ledger.burn(HolderId::Trader(trader), token, amount)?;
        self.emit_event(EventPayload::Withdrawn(WithdrawnEvent {
            trader,
            token,
            amount,
        }));
        Ok(())
    }

    pub fn balance_of(&self, trader: TraderId, token: TokenId) -> u64 {
        self.ledger.balance(HolderId::Trader(trader), token)
    }

    /// Read-only view of the full balance book. Mutations only happen through
    /// engine operations.
    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    // ---- oracle ingestion ---------------------------------------------------

    /// Push a fresh oracle observation into an exchange. The observation must
    /// scale cleanly; staleness is checked at use, not here.
    pub fn update_oracle_price(
        &mut self,
        exchange_id: ExchangeId,
        observation: OracleObservation,
    ) -> Result<(), ExchangeError> {
        let scaled = observation.scaled_price()?;
        let exchange = self.exchange_mut(exchange_id)?;
        exchange.oracle = Some(observation);

        self.emit_event(EventPayload::OraclePriceUpdated(OraclePriceUpdatedEvent {
            exchange_id,
            scaled_price: scaled,
            publish_time: observation.publish_time,
        }));
        Ok(())
    }

    // ---- event log ----------------------------------------------------------

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        if self.config.verbose {
            println!("[{}] {:?}", event.timestamp.as_secs(), event.payload);
        }
        if self.events.len() >= self.config.max_events {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
