//! Entry signal generation
//!
//! Zero signals outside the entry window is the normal non-entry-day
//! state, not an error.

use chrono::{Datelike, NaiveDateTime, TimeZone, Utc};
use options_engine::{BlackScholes, ChainCandidates};
use risk_manager::margin_required;
use services_common::{EngineError, OptionContract, Signal, StrategyParams};
use tracing::debug;

/// Applies the weekly option-selling entry rules to scanner output
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    params: StrategyParams,
}

impl SignalGenerator {
    pub fn new(params: StrategyParams) -> Self {
        Self { params }
    }

    /// True when `as_of` falls inside the entry window: the configured
    /// entry day, at or after the configured time of day
    pub fn in_entry_window(&self, as_of: NaiveDateTime) -> bool {
        as_of.weekday() == self.params.entry_day && as_of.time() >= self.params.entry_time
    }

    /// Emit sell signals for the candidate pair.
    ///
    /// The put is considered before the call so that output ordering is
    /// deterministic. Candidates priced below the minimum premium are
    /// dropped silently; an at/past-expiry candidate is an input error.
    pub fn generate(
        &self,
        candidates: &ChainCandidates,
        spot: f64,
        as_of: NaiveDateTime,
    ) -> Result<Vec<Signal>, EngineError> {
        if !self.in_entry_window(as_of) {
            debug!(%as_of, "outside entry window, no signals");
            return Ok(Vec::new());
        }

        let mut signals = Vec::with_capacity(2);
        for contract in [&candidates.put, &candidates.call] {
            if let Some(signal) = self.evaluate(contract, spot, as_of)? {
                signals.push(signal);
            }
        }
        Ok(signals)
    }

    fn evaluate(
        &self,
        contract: &OptionContract,
        spot: f64,
        as_of: NaiveDateTime,
    ) -> Result<Option<Signal>, EngineError> {
        let params = &self.params;
        let t = contract.time_to_expiry(as_of.date());
        let valuation = BlackScholes::value(
            contract.option_type,
            spot,
            contract.strike,
            contract.risk_free_rate,
            contract.implied_volatility,
            t,
        )?;
        let premium = valuation.premium;

        if premium < params.min_premium {
            debug!(
                symbol = %contract.trading_symbol(),
                premium,
                min = params.min_premium,
                "candidate below minimum premium"
            );
            return Ok(None);
        }

        Ok(Some(Signal {
            contract: contract.clone(),
            entry_premium: premium,
            stop_loss: premium * params.stop_loss_multiplier,
            target: premium * (1.0 - params.target_profit_fraction),
            margin_required: margin_required(
                contract,
                params.lots_per_trade,
                params.margin_percent,
            ),
            lots: params.lots_per_trade,
            generated_at: Utc.from_utc_datetime(&as_of),
        }))
    }
}
