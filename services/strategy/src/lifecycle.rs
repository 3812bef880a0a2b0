//! Position lifecycle engine
//!
//! Owns every transition of the `PendingEntry -> Open -> Closed` state
//! machine. Commit is all-or-nothing: a failure while persisting a new
//! position leaves the prior portfolio untouched. Once closed, a
//! position is immutable history.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use options_engine::BlackScholes;
use services_common::{
    EntryEvent, ExitEvent, ExitPriority, ExitReason, Notifier, OptionContract,
    Position, PositionStore, PriceSource, Signal, StrategyParams,
};
use tracing::{info, warn};

/// Drives positions from entry to exit
#[derive(Debug, Clone)]
pub struct LifecycleEngine {
    params: StrategyParams,
}

impl LifecycleEngine {
    pub fn new(params: StrategyParams) -> Self {
        Self { params }
    }

    /// Commit an authorized signal into a new open position.
    ///
    /// The store assigns the id. Nothing is mutated if the insert fails.
    pub fn commit(
        &self,
        signal: &Signal,
        entry_time: DateTime<Utc>,
        store: &dyn PositionStore,
    ) -> Result<(Position, EntryEvent)> {
        let mut position = Position::from_signal(signal, entry_time);
        let id = store
            .insert(position.clone())
            .context("failed to commit authorized signal")?;
        position.id = id;
        info!(
            id,
            symbol = %position.contract.trading_symbol(),
            premium = position.entry_premium,
            lots = position.lots,
            "position opened"
        );
        let event = EntryEvent::new(id, signal, entry_time);
        Ok((position, event))
    }

    /// Mark-to-market premium for a contract.
    ///
    /// At or past expiry the model has nothing to say, so the expected
    /// boundary case falls back to intrinsic value instead of failing;
    /// the same fallback covers any other valuation rejection.
    pub fn mark_premium(
        &self,
        contract: &OptionContract,
        spot: f64,
        volatility: f64,
        as_of: NaiveDate,
    ) -> f64 {
        let t = contract.time_to_expiry(as_of);
        if t <= 0.0 {
            return contract.intrinsic_value(spot);
        }
        match BlackScholes::value(
            contract.option_type,
            spot,
            contract.strike,
            contract.risk_free_rate,
            volatility,
            t,
        ) {
            Ok(valuation) => valuation.premium,
            Err(err) => {
                warn!(
                    symbol = %contract.trading_symbol(),
                    %err,
                    "valuation rejected, using intrinsic value"
                );
                contract.intrinsic_value(spot)
            }
        }
    }

    /// Which exit condition, if any, fires at this valuation tick.
    ///
    /// Stop-loss and target are evaluated first, ordered by the
    /// configured [`ExitPriority`]; both outrank the forced exits.
    /// Of the forced exits, expiry outranks the calendar day since it
    /// is unconditional.
    pub fn exit_trigger(
        &self,
        position: &Position,
        mark_premium: f64,
        as_of: NaiveDate,
    ) -> Option<ExitReason> {
        let stop_hit = mark_premium >= position.stop_loss;
        let target_hit = mark_premium <= position.target;

        let ordered = match self.params.exit_priority {
            ExitPriority::StopLossFirst => {
                [(stop_hit, ExitReason::StopLoss), (target_hit, ExitReason::TargetHit)]
            }
            ExitPriority::TargetFirst => {
                [(target_hit, ExitReason::TargetHit), (stop_hit, ExitReason::StopLoss)]
            }
        };
        for (hit, reason) in ordered {
            if hit {
                return Some(reason);
            }
        }

        if position.contract.is_expired(as_of) {
            return Some(ExitReason::Expiry);
        }
        if as_of.weekday() == self.params.forced_exit_day {
            return Some(ExitReason::CalendarExit);
        }
        None
    }

    /// Close an open position at the given mark and persist the terminal
    /// record.
    pub fn close(
        &self,
        position: &mut Position,
        exit_premium: f64,
        reason: ExitReason,
        exit_time: DateTime<Utc>,
        store: &dyn PositionStore,
    ) -> Result<ExitEvent> {
        position
            .close(exit_premium, exit_time, reason)
            .context("invalid close")?;
        store
            .update(position)
            .context("failed to persist closed position")?;
        info!(
            id = position.id,
            symbol = %position.contract.trading_symbol(),
            exit_premium,
            pnl = position.realized_pnl,
            %reason,
            "position closed"
        );
        ExitEvent::from_position(position)
            .context("closed position missing exit fields")
    }

    /// One valuation tick over every open position.
    ///
    /// Live callers pass `volatility: None` to revalue each contract at
    /// its entry implied volatility; the backtest passes the day's
    /// realized estimate. A price-source failure aborts the whole tick —
    /// partial revaluation would leave the book inconsistent.
    ///
    /// Returns the positions closed on this tick, in id order.
    pub fn tick(
        &self,
        store: &dyn PositionStore,
        prices: &dyn PriceSource,
        volatility: Option<f64>,
        as_of: NaiveDate,
        now: DateTime<Utc>,
        notifier: &dyn Notifier,
    ) -> Result<Vec<Position>> {
        let mut closed = Vec::new();
        for mut position in store.open_positions(None) {
            let spot = prices
                .spot(position.contract.index, as_of)
                .context("tick aborted: spot unavailable")?;
            let vol = volatility.unwrap_or(position.contract.implied_volatility);
            let mark = self.mark_premium(&position.contract, spot, vol, as_of);
            if let Some(reason) = self.exit_trigger(&position, mark, as_of) {
                let event = self.close(&mut position, mark, reason, now, store)?;
                notifier.exit(&event);
                closed.push(position);
            }
        }
        Ok(closed)
    }
}
