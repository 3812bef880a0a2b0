//! Option chain scanning and strike selection
//!
//! Builds a synthetic strike ladder around spot and picks the PUT/CALL
//! candidates whose distance from spot best matches the configured OTM
//! percentage.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use services_common::{
    EngineError, Index, OptionContract, OptionType, StrategyParams,
};
use tracing::debug;

/// One PUT and one CALL candidate per scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainCandidates {
    pub put: OptionContract,
    pub call: OptionContract,
}

/// Scanner over the tradable strike ladder of an index
#[derive(Debug, Clone)]
pub struct ChainScanner {
    params: StrategyParams,
}

impl ChainScanner {
    pub fn new(params: StrategyParams) -> Self {
        Self { params }
    }

    /// Next weekly expiry for the index. When `today` is already at or
    /// past this week's expiry weekday, rolls to next week.
    pub fn weekly_expiry(index: Index, today: NaiveDate) -> NaiveDate {
        let target = index.expiry_weekday().num_days_from_monday() as i64;
        let current = today.weekday().num_days_from_monday() as i64;
        let mut ahead = target - current;
        if ahead <= 0 {
            ahead += 7;
        }
        today + Days::new(ahead as u64)
    }

    /// Tradable strikes around spot, `ladder_depth` steps on each side
    pub fn strike_ladder(&self, index: Index, spot: f64) -> Vec<f64> {
        let step = index.strike_step();
        let base = (spot / step).round() * step;
        let depth = i64::from(self.params.ladder_depth);
        (-depth..=depth)
            .map(|i| base + i as f64 * step)
            .filter(|&strike| strike > 0.0)
            .collect()
    }

    /// Strike whose distance from spot, as a fraction of spot, is closest
    /// to the OTM target, rounded to the tradable increment.
    ///
    /// Equidistant candidates break AWAY from spot (puts round down,
    /// calls round up): the farther strike carries the lower assignment
    /// probability. Fails with `NoCandidate` when the ladder does not
    /// reach the target.
    pub fn otm_strike(
        &self,
        index: Index,
        spot: f64,
        option_type: OptionType,
    ) -> Result<f64, EngineError> {
        if spot <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "spot must be positive, got {spot}"
            )));
        }
        let step = index.strike_step();
        let target = match option_type {
            OptionType::Call => spot * (1.0 + self.params.otm_percent),
            OptionType::Put => spot * (1.0 - self.params.otm_percent),
        };

        let lower = (target / step).floor() * step;
        let upper = lower + step;
        let below = target - lower;
        let above = upper - target;
        let strike = if (below - above).abs() < 1e-9 {
            // exact tie: prefer the strike farther from spot
            match option_type {
                OptionType::Put => lower,
                OptionType::Call => upper,
            }
        } else if below < above {
            lower
        } else {
            upper
        };

        let ladder = self.strike_ladder(index, spot);
        let on_ladder = ladder.iter().any(|&s| (s - strike).abs() < 1e-6);
        if strike <= 0.0 || !on_ladder {
            return Err(EngineError::NoCandidate(format!(
                "{} {:?} target {target:.2} resolves to strike {strike} \
                 outside the tradable ladder",
                index, option_type
            )));
        }
        Ok(strike)
    }

    /// Build the PUT and CALL candidates for one scan cycle.
    ///
    /// `volatility` is the annualized value to stamp on both contracts;
    /// the rate comes from the parameter set.
    pub fn scan(
        &self,
        index: Index,
        spot: f64,
        expiry: NaiveDate,
        volatility: f64,
    ) -> Result<ChainCandidates, EngineError> {
        if volatility <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "volatility must be positive, got {volatility}"
            )));
        }
        let put_strike = self.otm_strike(index, spot, OptionType::Put)?;
        let call_strike = self.otm_strike(index, spot, OptionType::Call)?;
        debug!(
            %index,
            spot,
            put_strike,
            call_strike,
            %expiry,
            "chain scan complete"
        );
        let contract = |option_type, strike| OptionContract {
            index,
            option_type,
            strike,
            expiry,
            implied_volatility: volatility,
            risk_free_rate: self.params.risk_free_rate,
        };
        Ok(ChainCandidates {
            put: contract(OptionType::Put, put_strike),
            call: contract(OptionType::Call, call_strike),
        })
    }
}
