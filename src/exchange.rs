// 12.0: the per-pair exchange record. reserves, receipt supply, cached last trade
// price, the position index, and open interest all live here. the engine applies
// the same gate order to every operation against this record:
//   (1) authorization  (2) deadline  (3) operation invariants  (4) arithmetic
//   (5) state commit + token transfers
// steps 1-4 return early; nothing mutates until step 5, so a failure anywhere
// leaves the record untouched.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::ExchangeParams;
use crate::error::ExchangeError;
use crate::ledger::HolderId;
use crate::oracle::OracleObservation;
use crate::position::Position;
use crate::types::{Bps, Direction, ExchangeId, PositionId, TokenId, UnixTime};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub id: ExchangeId,
    pub token_a: TokenId,
    pub token_b: TokenId,
    pub receipt_token: TokenId,
    pub fee_bps: Bps,
    pub params: ExchangeParams,

    pub reserve_a: u64,
    pub reserve_b: u64,
    pub receipt_supply: u64,
    /// Open-position equity custodied in the vault, quote (B) units. Sits beside
    /// the reserves: vault B holdings are always `reserve_b + collateral_b`.
    pub collateral_b: u64,

    /// Most recent executed trade price (A per B, `PRICE_SCALE` fixed point).
    /// Zero until the first trade.
    pub last_price: u64,
    /// Monotone counter; position ids derive from it.
    pub position_count: u64,
    pub positions: HashMap<PositionId, Position>,

    /// Open interest in quote units, by side.
    pub long_oi: u64,
    pub short_oi: u64,

    /// Latest oracle observation pushed into this exchange, if any.
    pub oracle: Option<OracleObservation>,
    pub created_at: UnixTime,
}

impl Exchange {
    pub fn new(
        id: ExchangeId,
        token_a: TokenId,
        token_b: TokenId,
        receipt_token: TokenId,
        fee_bps: Bps,
        params: ExchangeParams,
        created_at: UnixTime,
    ) -> Self {
        Self {
            id,
            token_a,
            token_b,
            receipt_token,
            fee_bps,
            params,
            reserve_a: 0,
            reserve_b: 0,
            receipt_supply: 0,
            collateral_b: 0,
            last_price: 0,
            position_count: 0,
            positions: HashMap::new(),
            long_oi: 0,
            short_oi: 0,
            oracle: None,
            created_at,
        }
    }

    /// The derived custody identity for this exchange's vault.
    pub fn vault(&self) -> HolderId {
        HolderId::Vault(self.id)
    }

    // 12.1: mark price for position entry and settlement. a pushed oracle
    // observation wins but must be fresh; otherwise the cached trade price.
    pub fn mark_price(&self, now: UnixTime) -> Result<u64, ExchangeError> {
        if let Some(obs) = &self.oracle {
            obs.ensure_fresh(now, self.params.oracle_max_age_secs)?;
            return obs.scaled_price();
        }
        if self.last_price > 0 {
            return Ok(self.last_price);
        }
        Err(ExchangeError::Validation("no price available for this pair"))
    }

    pub fn position(&self, id: PositionId) -> Result<&Position, ExchangeError> {
        self.positions
            .get(&id)
            .ok_or(ExchangeError::PositionNotFound(id))
    }

    pub fn position_mut(&mut self, id: PositionId) -> Result<&mut Position, ExchangeError> {
        self.positions
            .get_mut(&id)
            .ok_or(ExchangeError::PositionNotFound(id))
    }

    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values().filter(|p| p.is_open())
    }

    pub fn remove_open_interest(&mut self, direction: Direction, amount: u64) {
        match direction {
            Direction::Long => self.long_oi = self.long_oi.saturating_sub(amount),
            Direction::Short => self.short_oi = self.short_oi.saturating_sub(amount),
        }
    }

    /// Read-only view for the presentation layer.
    pub fn snapshot(&self) -> ExchangeSnapshot {
        ExchangeSnapshot {
            id: self.id,
            token_a: self.token_a,
            token_b: self.token_b,
            receipt_token: self.receipt_token,
            fee_bps: self.fee_bps,
            reserve_a: self.reserve_a,
            reserve_b: self.reserve_b,
            receipt_supply: self.receipt_supply,
            collateral_b: self.collateral_b,
            last_price: self.last_price,
            position_count: self.position_count,
            long_oi: self.long_oi,
            short_oi: self.short_oi,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSnapshot {
    pub id: ExchangeId,
    pub token_a: TokenId,
    pub token_b: TokenId,
    pub receipt_token: TokenId,
    pub fee_bps: Bps,
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub receipt_supply: u64,
    pub collateral_b: u64,
    pub last_price: u64,
    pub position_count: u64,
    pub long_oi: u64,
    pub short_oi: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PRICE_SCALE;

    fn test_exchange() -> Exchange {
        Exchange::new(
            ExchangeId(1),
            TokenId(10),
            TokenId(20),
            TokenId(30),
            Bps::new(30).unwrap(),
            ExchangeParams::default(),
            UnixTime::from_secs(0),
        )
    }

    #[test]
    fn fresh_oracle_beats_last_price() {
        let mut ex = test_exchange();
        ex.last_price = 5 * PRICE_SCALE;
        ex.oracle = Some(OracleObservation::new(7, 0, 0, UnixTime::from_secs(100)));

        let mark = ex.mark_price(UnixTime::from_secs(120)).unwrap();
        assert_eq!(mark, 7 * PRICE_SCALE);
    }

    #[test]
    fn stale_oracle_fails_rather_than_falling_back() {
        let mut ex = test_exchange();
        ex.last_price = 5 * PRICE_SCALE;
        ex.oracle = Some(OracleObservation::new(7, 0, 0, UnixTime::from_secs(0)));

        let err = ex.mark_price(UnixTime::from_secs(1_000)).unwrap_err();
        assert!(matches!(err, ExchangeError::StaleOracle { .. }));
    }

    #[test]
    fn last_price_used_without_oracle() {
        let mut ex = test_exchange();
        ex.last_price = 5 * PRICE_SCALE;
        assert_eq!(ex.mark_price(UnixTime::from_secs(0)).unwrap(), 5 * PRICE_SCALE);
    }

    #[test]
    fn no_price_at_all_is_an_error() {
        let ex = test_exchange();
        assert!(ex.mark_price(UnixTime::from_secs(0)).is_err());
    }

    #[test]
    fn open_interest_removal_saturates() {
        let mut ex = test_exchange();
        ex.long_oi = 1_000;
        ex.short_oi = 400;
        ex.remove_open_interest(Direction::Long, 1_000);
        ex.remove_open_interest(Direction::Short, 500);

        assert_eq!(ex.long_oi, 0);
        assert_eq!(ex.short_oi, 0);
    }
}
