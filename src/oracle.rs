// 9.0: oracle consumption. the engine never computes prices, it only consumes a
// signed (price, confidence, exponent, publish_time) tuple from an external feed
// and refuses anything older than the staleness bound. the PriceSource trait is
// the seam: pyth, a CEX aggregator, or a test stub all look the same from here.

use serde::{Deserialize, Serialize};

use crate::error::ExchangeError;
use crate::math::MathError;
use crate::types::{UnixTime, PRICE_SCALE};

pub type FeedId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleObservation {
    /// Raw feed price, scaled by `10^exponent`.
    pub price: i64,
    /// Confidence interval in the same raw scale.
    pub confidence: u64,
    pub exponent: i32,
    pub publish_time: UnixTime,
}

impl OracleObservation {
    pub fn new(price: i64, confidence: u64, exponent: i32, publish_time: UnixTime) -> Self {
        Self {
            price,
            confidence,
            exponent,
            publish_time,
        }
    }

    // 9.1: normalize the raw (price, exponent) pair to the engine's 6-decimal
    // fixed point. a pyth-style exponent of -8 means price * 10^-8 units.
    pub fn scaled_price(&self) -> Result<u64, ExchangeError> {
        if self.price <= 0 {
            return Err(ExchangeError::Validation("oracle price must be positive"));
        }
        let price = self.price as u128;

        // PRICE_SCALE is 10^6, so the net shift is exponent + 6
        let shift = self.exponent + 6;
        let value = if shift >= 0 {
            let factor = 10u128
                .checked_pow(u32::try_from(shift).map_err(|_| MathError::Overflow)?)
                .ok_or(MathError::Overflow)?;
            price.checked_mul(factor).ok_or(MathError::Overflow)?
        } else {
            let factor = 10u128
                .checked_pow(u32::try_from(-shift).map_err(|_| MathError::Overflow)?)
                .ok_or(MathError::Overflow)?;
            price / factor
        };

        Ok(u64::try_from(value).map_err(|_| MathError::Overflow)?)
    }

    pub fn is_stale(&self, now: UnixTime, max_age_secs: u64) -> bool {
        self.publish_time.elapsed_secs(now) > max_age_secs
    }

    pub fn ensure_fresh(&self, now: UnixTime, max_age_secs: u64) -> Result<(), ExchangeError> {
        if self.is_stale(now, max_age_secs) {
            return Err(ExchangeError::StaleOracle {
                published: self.publish_time,
                max_age_secs,
            });
        }
        Ok(())
    }
}

/// Anything that can answer "what is the price of feed X right now".
pub trait PriceSource {
    fn get_price(&self, feed: FeedId) -> Option<OracleObservation>;
}
