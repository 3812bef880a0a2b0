//! Positions, signals and the position state machine data

use crate::errors::EngineError;
use crate::types::instrument::OptionContract;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a position.
///
/// `PendingEntry` exists only transiently between authorize and commit;
/// it is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    /// Authorized but not yet committed to the store
    PendingEntry,
    /// Live short option, revalued every tick
    Open,
    /// Terminal; the record is immutable from here on
    Closed,
}

/// Why a position was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// Mark-to-market premium reached the stop-loss level
    StopLoss,
    /// Mark-to-market premium reached the profit target
    TargetHit,
    /// Forced exit on the configured weekday before expiry
    CalendarExit,
    /// Forced exit on the expiry date itself
    Expiry,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::StopLoss => "stop loss hit",
            ExitReason::TargetHit => "target hit",
            ExitReason::CalendarExit => "calendar exit",
            ExitReason::Expiry => "expiry",
        };
        f.write_str(s)
    }
}

/// A sell-to-open recommendation produced by the signal generator and
/// consumed exactly once by the risk gate. Not persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Contract to sell
    pub contract: OptionContract,
    /// Theoretical premium at generation time
    pub entry_premium: f64,
    /// Buy back if the premium rises to this level
    pub stop_loss: f64,
    /// Buy back if the premium falls to this level
    pub target: f64,
    /// Estimated margin to carry the short, in currency units
    pub margin_required: f64,
    /// Number of lots to sell
    pub lots: u32,
    /// When the signal was generated
    pub generated_at: DateTime<Utc>,
}

/// A short option position. The lifecycle engine owns it while open;
/// once closed it is an immutable historical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Store-assigned identifier, unique within a portfolio
    pub id: u64,
    /// The contract sold
    pub contract: OptionContract,
    /// Lots sold short
    pub lots: u32,
    /// Premium received per unit at entry
    pub entry_premium: f64,
    /// Entry timestamp
    pub entry_time: DateTime<Utc>,
    /// Premium level that forces a loss-cutting exit
    pub stop_loss: f64,
    /// Premium level that banks the profit target
    pub target: f64,
    /// Current lifecycle state
    pub status: PositionStatus,
    /// Premium paid per unit to close, set on exit
    pub exit_premium: Option<f64>,
    /// Exit timestamp, set on exit
    pub exit_time: Option<DateTime<Utc>>,
    /// Why the position was closed, set on exit
    pub exit_reason: Option<ExitReason>,
    /// Realized profit, set on exit
    pub realized_pnl: Option<f64>,
}

impl Position {
    /// Build an open position from an authorized signal. The id is a
    /// placeholder until the store assigns the real one.
    pub fn from_signal(signal: &Signal, entry_time: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            contract: signal.contract.clone(),
            lots: signal.lots,
            entry_premium: signal.entry_premium,
            entry_time,
            stop_loss: signal.stop_loss,
            target: signal.target,
            status: PositionStatus::Open,
            exit_premium: None,
            exit_time: None,
            exit_reason: None,
            realized_pnl: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// P&L of the short at the given mark premium:
    /// (entry − mark) × lot size × lots
    pub fn pnl_at(&self, mark_premium: f64) -> f64 {
        (self.entry_premium - mark_premium)
            * f64::from(self.contract.index.lot_size())
            * f64::from(self.lots)
    }

    /// Transition `Open → Closed`, freezing the exit fields.
    ///
    /// Transitions are monotonic: closing anything but an open position
    /// is an invalid input, and `exit_time` must not precede entry.
    pub fn close(
        &mut self,
        exit_premium: f64,
        exit_time: DateTime<Utc>,
        reason: ExitReason,
    ) -> Result<(), EngineError> {
        if self.status != PositionStatus::Open {
            return Err(EngineError::InvalidInput(format!(
                "position {} is not open (status {:?})",
                self.id, self.status
            )));
        }
        if exit_time < self.entry_time {
            return Err(EngineError::InvalidInput(format!(
                "exit time {} precedes entry time {}",
                exit_time, self.entry_time
            )));
        }
        self.status = PositionStatus::Closed;
        self.exit_premium = Some(exit_premium);
        self.exit_time = Some(exit_time);
        self.exit_reason = Some(reason);
        self.realized_pnl = Some(self.pnl_at(exit_premium));
        Ok(())
    }
}
