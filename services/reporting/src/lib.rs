//! Trade performance aggregation
//!
//! Folds a position ledger into summary statistics. Only closed
//! positions count as trades; open ones are reported as a count and
//! never contaminate win rate or realized P&L. The aggregation is pure —
//! same ledger in, same report out.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use services_common::Position;

/// Realized statistics for one trading symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolStats {
    pub symbol: String,
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_pnl: f64,
}

/// Summary of a position ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Closed positions
    pub total_trades: usize,
    /// Closed positions with positive realized P&L
    pub winners: usize,
    /// Closed positions with realized P&L at or below zero
    pub losers: usize,
    /// winners / total_trades; 0.0 when no trades have closed
    pub win_rate: f64,
    /// Sum of realized P&L over closed positions
    pub total_pnl: f64,
    /// total_pnl / total_trades; 0.0 when no trades have closed
    pub avg_pnl: f64,
    /// Best single realized P&L, 0.0 when no trades have closed
    pub max_win: f64,
    /// Worst single realized P&L, 0.0 when no trades have closed
    pub max_loss: f64,
    /// Positions still open, excluded from every realized figure
    pub open_positions: usize,
    /// Per-symbol breakdown, sorted by symbol for stable output
    pub by_symbol: Vec<SymbolStats>,
}

impl PerformanceReport {
    fn empty(open_positions: usize) -> Self {
        Self {
            total_trades: 0,
            winners: 0,
            losers: 0,
            win_rate: 0.0,
            total_pnl: 0.0,
            avg_pnl: 0.0,
            max_win: 0.0,
            max_loss: 0.0,
            open_positions,
            by_symbol: Vec::new(),
        }
    }
}

/// Delivery sink for performance reports, the reporting counterpart of
/// the entry/exit notifier seam. Implementations format and route; the
/// aggregator only produces structured data.
pub trait ReportSink {
    fn report(&self, report: &PerformanceReport);
}

/// Summarize the ledger and hand the report to the sink
pub fn publish(positions: &[Position], sink: &dyn ReportSink) -> PerformanceReport {
    let report = summarize(positions);
    sink.report(&report);
    report
}

/// Aggregate a ledger into a [`PerformanceReport`]
pub fn summarize(positions: &[Position]) -> PerformanceReport {
    let open_positions = positions.iter().filter(|p| p.is_open()).count();

    let closed: Vec<(&Position, f64)> = positions
        .iter()
        .filter_map(|p| p.realized_pnl.map(|pnl| (p, pnl)))
        .collect();
    if closed.is_empty() {
        return PerformanceReport::empty(open_positions);
    }

    let total_trades = closed.len();
    let winners = closed.iter().filter(|(_, pnl)| *pnl > 0.0).count();
    let total_pnl: f64 = closed.iter().map(|(_, pnl)| pnl).sum();
    let max_win = closed.iter().map(|(_, pnl)| *pnl).fold(f64::MIN, f64::max);
    let max_loss = closed.iter().map(|(_, pnl)| *pnl).fold(f64::MAX, f64::min);

    let mut per_symbol: FxHashMap<String, SymbolStats> = FxHashMap::default();
    for (position, pnl) in &closed {
        let symbol = position.contract.trading_symbol();
        let stats = per_symbol
            .entry(symbol.clone())
            .or_insert_with(|| SymbolStats {
                symbol,
                trades: 0,
                wins: 0,
                losses: 0,
                win_rate: 0.0,
                total_pnl: 0.0,
                avg_pnl: 0.0,
            });
        stats.trades += 1;
        if *pnl > 0.0 {
            stats.wins += 1;
        } else {
            stats.losses += 1;
        }
        stats.total_pnl += pnl;
    }
    let mut by_symbol: Vec<SymbolStats> = per_symbol.into_values().collect();
    for stats in &mut by_symbol {
        stats.win_rate = stats.wins as f64 / stats.trades as f64;
        stats.avg_pnl = stats.total_pnl / stats.trades as f64;
    }
    by_symbol.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    PerformanceReport {
        total_trades,
        winners,
        losers: total_trades - winners,
        win_rate: winners as f64 / total_trades as f64,
        total_pnl,
        avg_pnl: total_pnl / total_trades as f64,
        max_win,
        max_loss,
        open_positions,
        by_symbol,
    }
}
