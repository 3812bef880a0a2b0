//! Paper trading executor
//!
//! Wires the scanner, signal generator, risk gate and lifecycle engine
//! into the two legs of a live session: the entry leg around the entry
//! window and the monitoring leg for the rest of the week. The backtest
//! drives the very same components, so paper results and backtest
//! results differ only in their price source.

use anyhow::Result;
use chrono::{NaiveDateTime, TimeZone, Utc};
use options_engine::ChainScanner;
use risk_manager::{PortfolioState, RiskManager};
use services_common::{
    EngineError, Index, Notifier, Position, PositionStore, PriceSource,
    StrategyParams,
};
use tracing::{info, warn};

use crate::lifecycle::LifecycleEngine;
use crate::signal::SignalGenerator;

pub struct PaperTrader {
    params: StrategyParams,
    scanner: ChainScanner,
    signals: SignalGenerator,
    gate: RiskManager,
    lifecycle: LifecycleEngine,
}

impl PaperTrader {
    pub fn new(params: StrategyParams) -> Self {
        Self {
            scanner: ChainScanner::new(params.clone()),
            signals: SignalGenerator::new(params.clone()),
            gate: RiskManager::new(params.clone()),
            lifecycle: LifecycleEngine::new(params.clone()),
            params,
        }
    }

    /// Entry leg for one index.
    ///
    /// Scans the chain, generates signals, gates each one against the
    /// portfolio as it stands at that moment (so the first fill counts
    /// against the second candidate) and commits the accepted ones.
    /// A ladder that cannot reach the OTM target means no trade today,
    /// not a failure.
    pub fn run_entries(
        &self,
        index: Index,
        store: &dyn PositionStore,
        prices: &dyn PriceSource,
        notifier: &dyn Notifier,
        as_of: NaiveDateTime,
    ) -> Result<Vec<Position>> {
        if !self.signals.in_entry_window(as_of) {
            return Ok(Vec::new());
        }

        let spot = prices.spot(index, as_of.date())?;
        let expiry = ChainScanner::weekly_expiry(index, as_of.date());
        let candidates = match self.scanner.scan(
            index,
            spot,
            expiry,
            self.params.default_volatility,
        ) {
            Ok(candidates) => candidates,
            Err(EngineError::NoCandidate(detail)) => {
                warn!(%index, detail, "no tradable candidates this cycle");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let mut opened = Vec::new();
        for signal in self.signals.generate(&candidates, spot, as_of)? {
            let portfolio = PortfolioState::derive(store, &self.params);
            if !self.gate.authorize(&signal, &portfolio).is_accepted() {
                continue;
            }
            let now = Utc.from_utc_datetime(&as_of);
            let (position, event) = self.lifecycle.commit(&signal, now, store)?;
            notifier.entry(&event);
            opened.push(position);
        }
        info!(%index, opened = opened.len(), "entry leg complete");
        Ok(opened)
    }

    /// Monitoring leg: revalue every open position at its entry implied
    /// volatility and close whatever an exit condition catches.
    pub fn monitor(
        &self,
        store: &dyn PositionStore,
        prices: &dyn PriceSource,
        notifier: &dyn Notifier,
        as_of: NaiveDateTime,
    ) -> Result<Vec<Position>> {
        let now = Utc.from_utc_datetime(&as_of);
        self.lifecycle
            .tick(store, prices, None, as_of.date(), now, notifier)
    }
}
