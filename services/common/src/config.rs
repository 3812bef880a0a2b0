//! Strategy parameter set
//!
//! One immutable value threaded explicitly through every call. Nothing in
//! the engine reads ambient/global configuration, so a backtest with its
//! own parameters can never leak into a concurrently configured live run.

use crate::errors::EngineError;
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Which exit condition wins when stop-loss and target are both breached
/// on the same valuation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitPriority {
    /// Capital-preservation bias: stop-loss wins
    StopLossFirst,
    /// Profit-taking bias: target wins
    TargetFirst,
}

/// Immutable parameters for one scan cycle or one backtest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Total trading capital
    pub capital: f64,
    /// Fraction of capital risked per trade
    pub risk_per_trade: f64,
    /// Maximum simultaneously open positions
    pub max_positions: usize,
    /// Target OTM distance as a fraction of spot
    pub otm_percent: f64,
    /// Stop loss at entry premium times this multiplier
    pub stop_loss_multiplier: f64,
    /// Exit at this fraction of premium captured (0.5 = 50% profit)
    pub target_profit_fraction: f64,
    /// Skip candidates priced below this premium
    pub min_premium: f64,
    /// Margin as a fraction of notional (SPAN + exposure, approximated)
    pub margin_percent: f64,
    /// Lots sold per signal
    pub lots_per_trade: u32,
    /// Entry day of week
    pub entry_day: Weekday,
    /// Earliest entry time on the entry day
    pub entry_time: NaiveTime,
    /// Force-close open positions on this weekday
    pub forced_exit_day: Weekday,
    /// Annualized risk-free rate used for valuation
    pub risk_free_rate: f64,
    /// Volatility assumed when no estimate is available
    pub default_volatility: f64,
    /// Strikes kept on each side of spot in the synthetic ladder
    pub ladder_depth: u32,
    /// Tie-break policy for simultaneous stop/target breaches
    pub exit_priority: ExitPriority,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            capital: 100_000.0,
            risk_per_trade: 0.02,
            max_positions: 2,
            otm_percent: 0.15,
            stop_loss_multiplier: 2.0,
            target_profit_fraction: 0.50,
            min_premium: 50.0,
            margin_percent: 0.12,
            lots_per_trade: 1,
            entry_day: Weekday::Mon,
            entry_time: NaiveTime::from_hms_opt(9, 30, 0)
                .unwrap_or(NaiveTime::MIN),
            forced_exit_day: Weekday::Thu,
            risk_free_rate: 0.07,
            default_volatility: 0.30,
            ladder_depth: 100,
            exit_priority: ExitPriority::StopLossFirst,
        }
    }
}

impl StrategyParams {
    /// Reject parameter sets that cannot drive a meaningful run
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.capital <= 0.0 {
            return Err(EngineError::InvalidInput(
                "capital must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.risk_per_trade) {
            return Err(EngineError::InvalidInput(
                "risk_per_trade must be within [0, 1]".into(),
            ));
        }
        if self.max_positions == 0 {
            return Err(EngineError::InvalidInput(
                "max_positions must be at least 1".into(),
            ));
        }
        if self.otm_percent <= 0.0 || self.otm_percent >= 1.0 {
            return Err(EngineError::InvalidInput(
                "otm_percent must be within (0, 1)".into(),
            ));
        }
        if self.stop_loss_multiplier <= 1.0 {
            return Err(EngineError::InvalidInput(
                "stop_loss_multiplier must exceed 1.0 for a short".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.target_profit_fraction) {
            return Err(EngineError::InvalidInput(
                "target_profit_fraction must be within [0, 1)".into(),
            ));
        }
        if self.lots_per_trade == 0 {
            return Err(EngineError::InvalidInput(
                "lots_per_trade must be at least 1".into(),
            ));
        }
        if self.default_volatility <= 0.0 {
            return Err(EngineError::InvalidInput(
                "default_volatility must be positive".into(),
            ));
        }
        Ok(())
    }
}
