//! Deterministic backtest replay
//!
//! Drives the very same scanner / signal / risk-gate / lifecycle
//! components as the paper trader over a historical series, one trading
//! day at a time. The core is pure and synchronous: identical series and
//! parameters replay to identical output, byte for byte.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use options_engine::ChainScanner;
use reporting::PerformanceReport;
use risk_manager::{margin_required, PortfolioState, RiskManager};
use serde::{Deserialize, Serialize};
use services_common::{
    EngineError, Index, MemoryPositionStore, NoopNotifier, Position,
    PositionStore, PriceSource, StrategyParams,
};
use statrs::statistics::Statistics;
use strategy::{LifecycleEngine, SignalGenerator};
use tracing::{debug, info, warn};

use crate::series::HistoricalSeries;

/// Trading days in a year, for annualizing equity-return statistics
const TRADING_DAYS: f64 = 252.0;

/// Exchange close, the valuation time for the daily tick
const CLOSE_TIME: NaiveTime = match NaiveTime::from_hms_opt(15, 30, 0) {
    Some(t) => t,
    None => unreachable!(),
};

/// One point on the mark-to-market equity curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Complete output of one backtest replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRun {
    pub index: Index,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub starting_capital: f64,
    pub params: StrategyParams,
    /// Every position the replay opened, closed or still open
    pub positions: Vec<Position>,
    /// Realized performance over the ledger
    pub report: PerformanceReport,
    /// Margin locked by positions still open when the series ran out
    pub open_margin: f64,
    /// Mark-to-market equity, one point per trading day
    pub equity_curve: Vec<EquityPoint>,
    /// (final equity − starting capital) / starting capital
    pub total_return: f64,
    /// Worst peak-to-trough fraction of the equity curve
    pub max_drawdown: f64,
    /// Annualized standard deviation of daily equity returns
    pub return_volatility: f64,
    /// Annualized Sharpe ratio of daily equity returns
    pub sharpe_ratio: f64,
}

/// Replays the strategy over a [`HistoricalSeries`]
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    params: StrategyParams,
    scanner: ChainScanner,
    signals: SignalGenerator,
    gate: RiskManager,
    lifecycle: LifecycleEngine,
}

impl BacktestEngine {
    pub fn new(params: StrategyParams) -> Self {
        Self {
            scanner: ChainScanner::new(params.clone()),
            signals: SignalGenerator::new(params.clone()),
            gate: RiskManager::new(params.clone()),
            lifecycle: LifecycleEngine::new(params.clone()),
            params,
        }
    }

    /// Replay the full series.
    ///
    /// Each trading day runs the entry leg (entry days only) and then the
    /// valuation tick at the close, using that day's realized volatility
    /// for both. Positions still open when the series ends stay open and
    /// are reported as open exposure, never force-closed.
    pub fn run(&self, series: &HistoricalSeries) -> Result<BacktestRun> {
        self.params.validate().context("invalid parameter set")?;
        if series.is_empty() {
            return Err(EngineError::InvalidInput(
                "historical series is empty".into(),
            )
            .into());
        }

        let index = series.index();
        let store = MemoryPositionStore::new();
        let notifier = NoopNotifier;
        let mut equity_curve = Vec::with_capacity(series.len());

        for date in series.dates() {
            let volatility = series.realized_volatility(date);

            let entry_instant = date.and_time(self.params.entry_time);
            if self.signals.in_entry_window(entry_instant) {
                self.run_entry_leg(index, series, &store, date, volatility)?;
            }

            let close_instant = Utc.from_utc_datetime(&date.and_time(CLOSE_TIME));
            let closed = self.lifecycle.tick(
                &store,
                series,
                Some(volatility),
                date,
                close_instant,
                &notifier,
            )?;
            if !closed.is_empty() {
                debug!(%date, closed = closed.len(), "positions closed");
            }

            equity_curve.push(EquityPoint {
                date,
                equity: self.mark_to_market(&store, series, date, volatility)?,
            });
        }

        let positions = store.all_positions();
        let report = reporting::summarize(&positions);
        let open_margin: f64 = positions
            .iter()
            .filter(|p| p.is_open())
            .map(|p| margin_required(&p.contract, p.lots, self.params.margin_percent))
            .sum();

        let run = self.finish(index, series, positions, report, open_margin, equity_curve);
        info!(
            %index,
            trades = run.report.total_trades,
            win_rate = run.report.win_rate,
            total_return = run.total_return,
            "backtest complete"
        );
        Ok(run)
    }

    fn run_entry_leg(
        &self,
        index: Index,
        series: &HistoricalSeries,
        store: &dyn PositionStore,
        date: NaiveDate,
        volatility: f64,
    ) -> Result<()> {
        let spot = series.spot(index, date)?;
        let expiry = ChainScanner::weekly_expiry(index, date);
        let candidates = match self.scanner.scan(index, spot, expiry, volatility) {
            Ok(candidates) => candidates,
            Err(EngineError::NoCandidate(detail)) => {
                warn!(%date, detail, "no tradable candidates");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let entry_instant = date.and_time(self.params.entry_time);
        for signal in self.signals.generate(&candidates, spot, entry_instant)? {
            let portfolio = PortfolioState::derive(store, &self.params);
            if !self.gate.authorize(&signal, &portfolio).is_accepted() {
                continue;
            }
            let now = Utc.from_utc_datetime(&entry_instant);
            self.lifecycle.commit(&signal, now, store)?;
        }
        Ok(())
    }

    /// Capital plus realized P&L plus the unrealized P&L of the open book
    /// at this day's marks.
    fn mark_to_market(
        &self,
        store: &dyn PositionStore,
        series: &HistoricalSeries,
        date: NaiveDate,
        volatility: f64,
    ) -> Result<f64> {
        let mut equity = self.params.capital;
        for position in store.all_positions() {
            if let Some(pnl) = position.realized_pnl {
                equity += pnl;
            } else if position.is_open() {
                let spot = series.spot(position.contract.index, date)?;
                let mark =
                    self.lifecycle
                        .mark_premium(&position.contract, spot, volatility, date);
                equity += position.pnl_at(mark);
            }
        }
        Ok(equity)
    }

    fn finish(
        &self,
        index: Index,
        series: &HistoricalSeries,
        positions: Vec<Position>,
        report: PerformanceReport,
        open_margin: f64,
        equity_curve: Vec<EquityPoint>,
    ) -> BacktestRun {
        let capital = self.params.capital;
        let final_equity = equity_curve.last().map_or(capital, |p| p.equity);
        let total_return = (final_equity - capital) / capital;

        let returns: Vec<f64> = equity_curve
            .windows(2)
            .map(|w| (w[1].equity - w[0].equity) / w[0].equity)
            .collect();
        let (return_volatility, sharpe_ratio) = if returns.len() < 2 {
            (0.0, 0.0)
        } else {
            let mean = (&returns[..]).mean();
            let daily_vol = (&returns[..]).std_dev();
            let sharpe = if daily_vol > 0.0 {
                (mean - self.params.risk_free_rate / TRADING_DAYS) / daily_vol
                    * TRADING_DAYS.sqrt()
            } else {
                0.0
            };
            (daily_vol * TRADING_DAYS.sqrt(), sharpe)
        };

        let mut max_drawdown: f64 = 0.0;
        let mut peak = f64::MIN;
        for point in &equity_curve {
            if point.equity > peak {
                peak = point.equity;
            }
            let drawdown = (peak - point.equity) / peak;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }

        // both bounds exist: run() rejects an empty series
        let start = series.dates().next().unwrap_or_default();
        let end = series.dates().last().unwrap_or_default();

        BacktestRun {
            index,
            start,
            end,
            starting_capital: capital,
            params: self.params.clone(),
            positions,
            report,
            open_margin,
            equity_curve,
            total_return,
            max_drawdown,
            return_volatility,
            sharpe_ratio,
        }
    }
}
