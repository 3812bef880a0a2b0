//! Risk gate for short option entries
//!
//! Authorization is advisory and side-effect free: the gate inspects a
//! signal against the derived portfolio state and answers accept/reject.
//! Committing an accepted signal into a position is the lifecycle
//! engine's job, never the gate's.

use serde::{Deserialize, Serialize};
use services_common::{
    OptionContract, Position, PositionStore, Signal, StrategyParams,
};
use std::fmt;
use tracing::{debug, warn};

/// Why a signal was rejected. A rejection is a normal outcome, logged
/// but never raised as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Open-position count would exceed the configured maximum
    MaxPositions { limit: usize },
    /// Required margin exceeds capital net of reserved margin
    InsufficientMargin { required: f64, available: f64 },
    /// Distance to stop-loss exceeds the per-trade risk budget
    RiskBudgetExceeded { risk: f64, budget: f64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MaxPositions { limit } => {
                write!(f, "max positions ({limit}) reached")
            }
            RejectReason::InsufficientMargin {
                required,
                available,
            } => write!(
                f,
                "insufficient capital (need {required:.0}, have {available:.0})"
            ),
            RejectReason::RiskBudgetExceeded { risk, budget } => write!(
                f,
                "per-trade risk {risk:.0} exceeds budget {budget:.0}"
            ),
        }
    }
}

/// Outcome of authorizing one signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RiskDecision {
    /// Signal may be committed; margin to reserve on entry
    Accepted { margin_required: f64 },
    /// Signal must be dropped
    Rejected(RejectReason),
}

impl RiskDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RiskDecision::Accepted { .. })
    }
}

/// Derived view of the portfolio: the open positions plus capital.
/// Never stored — recomputed from the position collection on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub open_positions: Vec<Position>,
    pub capital: f64,
}

impl PortfolioState {
    /// Snapshot the store as of now
    pub fn derive(store: &dyn PositionStore, params: &StrategyParams) -> Self {
        Self {
            open_positions: store.open_positions(None),
            capital: params.capital,
        }
    }

    /// Margin locked up by the open book
    pub fn reserved_margin(&self, params: &StrategyParams) -> f64 {
        self.open_positions
            .iter()
            .map(|p| margin_required(&p.contract, p.lots, params.margin_percent))
            .sum()
    }

    /// Capital left after reserved margin
    pub fn available_capital(&self, params: &StrategyParams) -> f64 {
        self.capital - self.reserved_margin(params)
    }
}

/// Margin to carry a short option: a flat fraction of notional
/// (strike x lot size x lots), approximating SPAN + exposure.
pub fn margin_required(contract: &OptionContract, lots: u32, margin_percent: f64) -> f64 {
    contract.strike * f64::from(contract.index.lot_size()) * f64::from(lots) * margin_percent
}

/// The advisory risk gate
#[derive(Debug, Clone)]
pub struct RiskManager {
    params: StrategyParams,
}

impl RiskManager {
    pub fn new(params: StrategyParams) -> Self {
        Self { params }
    }

    /// Gate one signal against the portfolio.
    ///
    /// Checks run in a fixed order and the first failure wins:
    /// position count, then margin headroom, then per-trade risk budget.
    pub fn authorize(&self, signal: &Signal, portfolio: &PortfolioState) -> RiskDecision {
        let params = &self.params;

        if portfolio.open_positions.len() >= params.max_positions {
            let reason = RejectReason::MaxPositions {
                limit: params.max_positions,
            };
            warn!(symbol = %signal.contract.trading_symbol(), %reason, "signal rejected");
            return RiskDecision::Rejected(reason);
        }

        let required = margin_required(&signal.contract, signal.lots, params.margin_percent);
        let available = portfolio.available_capital(params);
        if required > available {
            let reason = RejectReason::InsufficientMargin {
                required,
                available,
            };
            warn!(symbol = %signal.contract.trading_symbol(), %reason, "signal rejected");
            return RiskDecision::Rejected(reason);
        }

        // worst case for the short is buying back at the stop
        let risk = (signal.stop_loss - signal.entry_premium)
            * f64::from(signal.contract.index.lot_size())
            * f64::from(signal.lots);
        let budget = params.capital * params.risk_per_trade;
        if risk > budget {
            let reason = RejectReason::RiskBudgetExceeded { risk, budget };
            warn!(symbol = %signal.contract.trading_symbol(), %reason, "signal rejected");
            return RiskDecision::Rejected(reason);
        }

        debug!(
            symbol = %signal.contract.trading_symbol(),
            margin = required,
            "signal accepted"
        );
        RiskDecision::Accepted {
            margin_required: required,
        }
    }
}
