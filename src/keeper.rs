// 15.0: the keeper crank. drives funding accrual forward and follows up on
// liquidation-eligible positions. bounded and cancellable: it runs at most
// max_rounds and honors a shared stop flag, so callers always get control back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::engine::{Engine, FundingSweepResult};
use crate::error::ExchangeError;
use crate::types::{ExchangeId, PositionId, TraderId};

#[derive(Debug, Clone, Copy)]
pub struct KeeperConfig {
    /// Hard ceiling on rounds per `run` call.
    pub max_rounds: u64,
    /// Logical seconds advanced between rounds.
    pub poll_interval_secs: u64,
    /// Identity credited with liquidation rewards.
    pub liquidator: TraderId,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            max_rounds: 100,
            poll_interval_secs: 60,
            liquidator: TraderId(0),
        }
    }
}

/// What one round did.
#[derive(Debug, Clone)]
pub struct KeeperRound {
    pub funding: FundingSweepResult,
    pub liquidated: Vec<PositionId>,
    /// Eligible positions the liquidation attempt could not finish, with the
    /// reason. The price moving or a stale oracle lands here, not in Err.
    pub skipped: Vec<(PositionId, ExchangeError)>,
}

#[derive(Debug, Clone, Default)]
pub struct KeeperReport {
    pub rounds_run: u64,
    pub liquidations: u64,
    pub skipped: u64,
    pub stopped_early: bool,
}

pub struct Keeper {
    config: KeeperConfig,
    stop: Arc<AtomicBool>,
}

impl Keeper {
    pub fn new(config: KeeperConfig) -> Self {
        Self {
            config,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag another thread can set to halt `run` at the next round edge.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// One funding sweep plus liquidation attempts for whatever the sweep
    /// flagged. Does not advance the clock.
    pub fn run_once(
        &self,
        engine: &mut Engine,
        exchange_id: ExchangeId,
    ) -> Result<KeeperRound, ExchangeError> {
        let funding = engine.accrue_funding(exchange_id)?;

        let mut liquidated = Vec::new();
        let mut skipped = Vec::new();
        for position_id in &funding.liquidatable {
            match engine.liquidate_position(self.config.liquidator, exchange_id, *position_id) {
                Ok(_) => liquidated.push(*position_id),
                Err(reason) => skipped.push((*position_id, reason)),
            }
        }

        Ok(KeeperRound {
            funding,
            liquidated,
            skipped,
        })
    }

    /// Crank for up to `max_rounds`, advancing the engine clock by the poll
    /// interval between rounds.
    pub fn run(
        &self,
        engine: &mut Engine,
        exchange_id: ExchangeId,
    ) -> Result<KeeperReport, ExchangeError> {
        let mut report = KeeperReport::default();

        for round in 0..self.config.max_rounds {
            if self.stop.load(Ordering::Relaxed) {
                report.stopped_early = true;
                break;
            }
            if round > 0 {
                engine.advance_time(self.config.poll_interval_secs);
            }

            let outcome = self.run_once(engine, exchange_id)?;
            report.rounds_run += 1;
            report.liquidations += outcome.liquidated.len() as u64;
            report.skipped += outcome.skipped.len() as u64;
        }

        Ok(report)
    }
}
