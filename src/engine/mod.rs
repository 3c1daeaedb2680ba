// 14.0 engine/: the exchange account state machine. core.rs owns all state
// (registry, ledger, clock, event log); the other files add one operation
// family each as `impl Engine` blocks.

pub mod config;
pub mod core;
pub mod funding;
pub mod liquidity;
pub mod positions;
pub mod results;
pub mod swaps;

pub use config::EngineConfig;
pub use core::Engine;
pub use results::{
    BondResult, ClosePositionResult, FundingSweepResult, LiquidationResult, OpenPositionResult,
    SwapQuote, SwapResult, UnbondResult,
};
