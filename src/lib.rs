//! Deterministic core for a constant-product exchange with leveraged positions.
//!
//! Liquidity providers bond both assets of a pair for a receipt token, traders
//! swap against the pooled reserves, and leveraged longs/shorts settle against
//! the pool as counterparty. Everything is checked integer math on a logical
//! clock: replaying the same operations yields the same state, byte for byte.
//!
//! file map:
//!   1.0  math.rs         checked arithmetic, rounding policy
//!   2.0  types.rs        ids, direction/status tags, bps, timestamps
//!   3.0  error.rs        the operation error surface
//!   4.0  pool.rs         bond/unbond math
//!   5.0  swap.rs         constant-product pricing
//!   6.0  position.rs     position records, pnl, leverage gate
//!   7.0  funding.rs      oi-imbalance funding rate and accrual
//!   8.0  liquidation.rs  maintenance threshold, reward split
//!   9.0  oracle.rs       observation scaling, staleness, PriceSource
//!  10.0  ledger.rs       token balance book, vault custody
//!  11.0  config.rs       per-exchange parameters
//!  12.0  exchange.rs     the per-pair record and mark price
//!  13.0  events.rs       committed-change event log payloads
//!  14.0  engine/         the state machine: registry, ops, event buffer
//!  15.0  keeper.rs       bounded funding/liquidation crank

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod exchange;
pub mod funding;
pub mod keeper;
pub mod ledger;
pub mod liquidation;
pub mod math;
pub mod oracle;
pub mod pool;
pub mod position;
pub mod swap;
pub mod types;

pub use config::ExchangeParams;
pub use engine::{
    BondResult, ClosePositionResult, Engine, EngineConfig, FundingSweepResult, LiquidationResult,
    OpenPositionResult, SwapQuote, SwapResult, UnbondResult,
};
pub use error::ExchangeError;
pub use events::{Event, EventId, EventPayload};
pub use exchange::{Exchange, ExchangeSnapshot};
pub use keeper::{Keeper, KeeperConfig, KeeperReport, KeeperRound};
pub use ledger::{HolderId, TokenLedger};
pub use oracle::{FeedId, OracleObservation, PriceSource};
pub use position::Position;
pub use types::{
    Bps, Direction, ExchangeId, PositionId, PositionStatus, SwapDirection, TokenId, TraderId,
    UnixTime, PRICE_SCALE,
};
