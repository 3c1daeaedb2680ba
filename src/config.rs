// 11.0: per-exchange parameters in one place. leverage cap, funding, liquidation,
// oracle staleness. created once per pair, immutable afterwards.

use serde::{Deserialize, Serialize};

use crate::funding::FundingParams;
use crate::liquidation::LiquidationParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeParams {
    /// Maximum `amount / equity` for new positions.
    pub max_leverage: u64,
    pub funding: FundingParams,
    pub liquidation: LiquidationParams,
    /// Oracle observations older than this are rejected.
    pub oracle_max_age_secs: u64,
}

impl Default for ExchangeParams {
    fn default() -> Self {
        Self {
            max_leverage: 10,
            funding: FundingParams::default(),
            liquidation: LiquidationParams::default(),
            oracle_max_age_secs: 60,
        }
    }
}
