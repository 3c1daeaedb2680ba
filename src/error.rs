// 3.0: the operation error surface. one variant per failure kind the caller can
// observe. every error aborts the current operation with zero state mutation;
// nothing is retried internally, resubmitting with fresher inputs is on the caller.

use crate::math::MathError;
use crate::types::{ExchangeId, PositionId, TokenId, TraderId, UnixTime};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeError {
    #[error("invalid parameter: {0}")]
    Validation(&'static str),

    #[error("deadline {} passed at {}", deadline.as_secs(), now.as_secs())]
    DeadlineExpired { deadline: UnixTime, now: UnixTime },

    #[error("slippage exceeded: got {actual}, minimum {minimum}")]
    SlippageExceeded { actual: u64, minimum: u64 },

    #[error("required input {required} exceeds maximum {maximum}")]
    ExcessiveInput { required: u64, maximum: u64 },

    #[error("receipt balance {available} below requested {requested}")]
    InsufficientReceipt { requested: u64, available: u64 },

    #[error("insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: u64, available: u64 },

    #[error("notional {amount} over equity {equity} exceeds {max_leverage}x leverage")]
    LeverageExceeded {
        amount: u64,
        equity: u64,
        max_leverage: u64,
    },

    #[error("insufficient collateral: requested {requested}, available {available}")]
    InsufficientCollateral { requested: u64, available: u64 },

    #[error("insufficient balance of token {token:?}: requested {requested}, available {available}")]
    InsufficientBalance {
        token: TokenId,
        requested: u64,
        available: u64,
    },

    #[error("position {0:?} is not open")]
    PositionNotOpen(PositionId),

    #[error("position {0:?} is above the maintenance threshold")]
    NotLiquidatable(PositionId),

    #[error("oracle price published at {} exceeds staleness bound of {max_age_secs}s", published.as_secs())]
    StaleOracle {
        published: UnixTime,
        max_age_secs: u64,
    },

    #[error("exchange {0:?} not found")]
    ExchangeNotFound(ExchangeId),

    #[error("position {0:?} not found")]
    PositionNotFound(PositionId),

    #[error("caller {0:?} is not authorized for this operation")]
    Unauthorized(TraderId),

    #[error(transparent)]
    Math(#[from] MathError),
}
