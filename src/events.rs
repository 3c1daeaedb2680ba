// 13.0: every committed state change produces an event. used for audit trails,
// state reconstruction, and notifying external systems. failed operations emit
// nothing: the log only ever reflects applied mutations.

use serde::{Deserialize, Serialize};

use crate::types::{
    Bps, Direction, ExchangeId, PositionId, SwapDirection, TokenId, TraderId, UnixTime,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: UnixTime,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: UnixTime, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // registry events
    ExchangeCreated(ExchangeCreatedEvent),

    // liquidity events
    Bonded(BondedEvent),
    Unbonded(UnbondedEvent),

    // trade events
    SwapExecuted(SwapExecutedEvent),

    // position events
    PositionOpened(PositionOpenedEvent),
    PositionClosed(PositionClosedEvent),
    PositionLiquidated(PositionLiquidatedEvent),
    FundingAccrued(FundingAccruedEvent),

    // price events
    OraclePriceUpdated(OraclePriceUpdatedEvent),

    // balance events
    Deposited(DepositedEvent),
    Withdrawn(WithdrawnEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeCreatedEvent {
    pub exchange_id: ExchangeId,
    pub token_a: TokenId,
    pub token_b: TokenId,
    pub receipt_token: TokenId,
    pub fee_bps: Bps,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondedEvent {
    pub exchange_id: ExchangeId,
    pub trader: TraderId,
    pub amount_a: u64,
    pub amount_b: u64,
    pub receipt_minted: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnbondedEvent {
    pub exchange_id: ExchangeId,
    pub trader: TraderId,
    pub receipt_burned: u64,
    pub amount_a: u64,
    pub amount_b: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapExecutedEvent {
    pub exchange_id: ExchangeId,
    pub trader: TraderId,
    pub direction: SwapDirection,
    pub amount_in: u64,
    pub amount_out: u64,
    pub last_price: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionOpenedEvent {
    pub exchange_id: ExchangeId,
    pub position_id: PositionId,
    pub trader: TraderId,
    pub direction: Direction,
    pub amount: u64,
    pub equity: u64,
    pub entry_price: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionClosedEvent {
    pub exchange_id: ExchangeId,
    pub position_id: PositionId,
    pub trader: TraderId,
    pub exit_price: u64,
    pub pnl: i128,
    pub payout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionLiquidatedEvent {
    pub exchange_id: ExchangeId,
    pub position_id: PositionId,
    pub trader: TraderId,
    pub liquidator: TraderId,
    pub mark_price: u64,
    pub liquidator_reward: u64,
    pub pool_remainder: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingAccruedEvent {
    pub exchange_id: ExchangeId,
    pub position_id: PositionId,
    /// Positive = the position paid, negative = it was credited.
    pub payment: i128,
    pub rate_bps_per_day: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OraclePriceUpdatedEvent {
    pub exchange_id: ExchangeId,
    pub scaled_price: u64,
    pub publish_time: UnixTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositedEvent {
    pub trader: TraderId,
    pub token: TokenId,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawnEvent {
    pub trader: TraderId,
    pub token: TokenId,
    pub amount: u64,
}
