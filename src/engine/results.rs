// 14.2: outcome structs returned by engine operations. every field reflects
// committed state; an operation that errors returns none of these.

use serde::{Deserialize, Serialize};

use crate::types::{Direction, PositionId, SwapDirection, TraderId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondResult {
    pub amount_a: u64,
    pub amount_b: u64,
    pub receipt_minted: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondResult {
    pub receipt_burned: u64,
    pub amount_a: u64,
    pub amount_b: u64,
}

/// Read-only pricing answer. Binding in the sense that an immediately executed
/// swap against unchanged reserves produces exactly these amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub direction: SwapDirection,
    pub amount_in: u64,
    pub amount_out: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapResult {
    pub direction: SwapDirection,
    pub amount_in: u64,
    pub amount_out: u64,
    /// Trade price cached on the exchange after this swap.
    pub last_price: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPositionResult {
    pub position_id: PositionId,
    pub direction: Direction,
    pub amount: u64,
    pub equity: u64,
    pub entry_price: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosePositionResult {
    pub position_id: PositionId,
    pub exit_price: u64,
    /// Price PnL only; funding is reported separately.
    pub pnl: i128,
    /// Funding applied at close. Positive = the position paid.
    pub funding: i128,
    /// Quote tokens actually returned to the trader.
    pub payout: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationResult {
    pub position_id: PositionId,
    pub trader: TraderId,
    pub liquidator: TraderId,
    pub mark_price: u64,
    pub liquidator_reward: u64,
    pub pool_remainder: u64,
}

/// Summary of one funding sweep over an exchange's open positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingSweepResult {
    pub rate_bps_per_day: i64,
    pub positions_touched: usize,
    /// Total quote tokens moved from position equity into the pool.
    pub total_debited: u64,
    /// Total quote tokens moved from the pool into position equity.
    pub total_credited: u64,
    /// Positions at or below the maintenance threshold after the sweep.
    pub liquidatable: Vec<PositionId>,
}
