//! Structured notification payloads
//!
//! The core hands these to the [`crate::Notifier`] collaborator as plain
//! data; rendering (Telegram, console, anything else) happens outside.

use crate::types::instrument::OptionContract;
use crate::types::position::{ExitReason, Position, Signal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Emitted when an authorized signal is committed as a new position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryEvent {
    /// Store-assigned position id
    pub position_id: u64,
    /// Contract sold
    pub contract: OptionContract,
    /// Premium received per unit
    pub entry_premium: f64,
    /// Lots sold
    pub lots: u32,
    /// Margin reserved for the trade
    pub margin_required: f64,
    /// Stop-loss premium level
    pub stop_loss: f64,
    /// Target premium level
    pub target: f64,
    /// Commit timestamp
    pub entered_at: DateTime<Utc>,
}

impl EntryEvent {
    pub fn new(position_id: u64, signal: &Signal, entered_at: DateTime<Utc>) -> Self {
        Self {
            position_id,
            contract: signal.contract.clone(),
            entry_premium: signal.entry_premium,
            lots: signal.lots,
            margin_required: signal.margin_required,
            stop_loss: signal.stop_loss,
            target: signal.target,
            entered_at,
        }
    }
}

/// Emitted when an open position reaches a terminal state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitEvent {
    /// Position id
    pub position_id: u64,
    /// Contract that was short
    pub contract: OptionContract,
    /// Premium received at entry
    pub entry_premium: f64,
    /// Premium paid to close
    pub exit_premium: f64,
    /// Realized profit
    pub realized_pnl: f64,
    /// Exit trigger
    pub reason: ExitReason,
    /// Close timestamp
    pub exited_at: DateTime<Utc>,
}

impl ExitEvent {
    /// Build from a just-closed position. Returns `None` if the position
    /// has not actually been closed.
    pub fn from_position(position: &Position) -> Option<Self> {
        Some(Self {
            position_id: position.id,
            contract: position.contract.clone(),
            entry_premium: position.entry_premium,
            exit_premium: position.exit_premium?,
            realized_pnl: position.realized_pnl?,
            reason: position.exit_reason?,
            exited_at: position.exit_time?,
        })
    }
}
