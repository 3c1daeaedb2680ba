// 14.1: engine-level knobs. per-exchange economics live in
// `crate::config::ExchangeParams`; this only controls the runtime envelope.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Print committed events to stdout as they are emitted.
    pub verbose: bool,
    /// Cap on the in-memory event buffer; oldest events are dropped first.
    pub max_events: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            max_events: 10_000,
        }
    }
}
