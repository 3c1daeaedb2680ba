// 2.0: all the primitives live here. IDs, direction/status tags, basis points,
// timestamps, the price fixed point. each ID is a newtype so the compiler catches
// mixups between exchanges, traders, and tokens.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::math::BPS_DENOMINATOR;

/// Prices are fixed point with 6 decimals: `PRICE_SCALE` = 1.0.
pub const PRICE_SCALE: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExchangeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub u32);

/// Deterministic position identity, derived from (trader, exchange, sequence).
/// Independent of the storage substrate: replaying the same opens on any backend
/// yields the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionId(pub u64);

impl PositionId {
    // 2.1: FNV-1a over the three components. cheap, stable, no external state.
    pub fn derive(trader: TraderId, exchange: ExchangeId, seq: u64) -> Self {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut hash = FNV_OFFSET;
        for byte in trader
            .0
            .to_le_bytes()
            .into_iter()
            .chain(u64::from(exchange.0).to_le_bytes())
            .chain(seq.to_le_bytes())
        {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        Self(hash)
    }
}

// Long = profit when price goes up. Short = profit when price goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn sign(&self) -> i64 {
        match self {
            Direction::Long => 1,
            Direction::Short => -1,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

// 2.2: position lifecycle tag. Open is the only initial state; Closed and
// Liquidated are terminal. every transition site matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    Open,
    Closed,
    Liquidated,
}

impl PositionStatus {
    pub fn is_terminal(&self) -> bool {
        match self {
            PositionStatus::Open => false,
            PositionStatus::Closed | PositionStatus::Liquidated => true,
        }
    }
}

/// Which way a swap moves through the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapDirection {
    AToB,
    BToA,
}

// 2.3: basis points. 100 bps = 1%. bounded at 10_000 so fees can never exceed 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bps(u16);

impl Bps {
    #[must_use]
    pub fn new(bps: u16) -> Option<Self> {
        if u64::from(bps) <= BPS_DENOMINATOR {
            Some(Self(bps))
        } else {
            None
        }
    }

    pub fn as_u64(&self) -> u64 {
        u64::from(self.0)
    }
}

impl fmt::Display for Bps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}

// 2.4: unix timestamp in seconds. deadlines and funding accrual both use this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnixTime(pub i64);

impl UnixTime {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp())
    }

    pub fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// Seconds elapsed from `self` to `later`. Zero if `later` is not later.
    pub fn elapsed_secs(&self, later: UnixTime) -> u64 {
        (later.0 - self.0).max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_sign_and_opposite() {
        assert_eq!(Direction::Long.sign(), 1);
        assert_eq!(Direction::Short.sign(), -1);
        assert_eq!(Direction::Long.opposite(), Direction::Short);
        assert_eq!(Direction::Short.opposite(), Direction::Long);
    }

    #[test]
    fn status_terminality() {
        assert!(!PositionStatus::Open.is_terminal());
        assert!(PositionStatus::Closed.is_terminal());
        assert!(PositionStatus::Liquidated.is_terminal());
    }

    #[test]
    fn bps_bounds() {
        assert!(Bps::new(0).is_some());
        assert!(Bps::new(10_000).is_some());
        assert!(Bps::new(10_001).is_none());
        assert_eq!(Bps::new(30).unwrap().as_u64(), 30);
    }

    #[test]
    fn position_id_is_deterministic() {
        let a = PositionId::derive(TraderId(7), ExchangeId(1), 0);
        let b = PositionId::derive(TraderId(7), ExchangeId(1), 0);
        assert_eq!(a, b);

        // any component change yields a different id
        assert_ne!(a, PositionId::derive(TraderId(8), ExchangeId(1), 0));
        assert_ne!(a, PositionId::derive(TraderId(7), ExchangeId(2), 0));
        assert_ne!(a, PositionId::derive(TraderId(7), ExchangeId(1), 1));
    }

    #[test]
    fn elapsed_secs_clamps_backwards_time() {
        let t0 = UnixTime::from_secs(1_000);
        assert_eq!(t0.elapsed_secs(UnixTime::from_secs(1_060)), 60);
        assert_eq!(t0.elapsed_secs(UnixTime::from_secs(900)), 0);
    }
}
