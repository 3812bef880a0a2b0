//! Backtest replay: entries, exits, determinism and edge cases

use approx::assert_relative_eq;
use backtesting::{BacktestEngine, HistoricalSeries};
use chrono::{Datelike, NaiveDate, Weekday};
use services_common::{Index, PositionStatus, StrategyParams};

/// Weekday closes at a constant level between the two dates, inclusive
fn flat_series(from: NaiveDate, to: NaiveDate, close: f64) -> HistoricalSeries {
    let mut series = HistoricalSeries::new(Index::Nifty, 0.30);
    let mut date = from;
    while date <= to {
        if date.weekday() != Weekday::Sat && date.weekday() != Weekday::Sun {
            series.insert(date, close);
        }
        date = date.succ_opt().unwrap();
    }
    series
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Strikes close enough to the money that weekly premiums clear the
/// filter, with capital sized for two simultaneous index shorts
fn session_params() -> StrategyParams {
    StrategyParams {
        capital: 1_000_000.0,
        otm_percent: 0.02,
        min_premium: 10.0,
        ..StrategyParams::default()
    }
}

#[test]
fn two_flat_weeks_close_every_position_profitably() {
    // Mon 2024-01-01 through Fri 2024-01-12: two Monday entries, two
    // Thursday expiries, spot pinned at 22000
    let series = flat_series(date(2024, 1, 1), date(2024, 1, 12), 22000.0);
    let run = BacktestEngine::new(session_params()).run(&series).unwrap();

    // one put and one call per week
    assert_eq!(run.positions.len(), 4);
    assert!(run.positions.iter().all(|p| p.status == PositionStatus::Closed));

    // a pinned spot decays every short into profit
    assert_eq!(run.report.total_trades, 4);
    assert_eq!(run.report.winners, 4);
    assert_eq!(run.report.win_rate, 1.0);
    assert!(run.report.total_pnl > 0.0);
    assert!(run.total_return > 0.0);
    assert_eq!(run.open_margin, 0.0);

    // equity only accrues decay, so the curve never draws down
    assert_eq!(run.equity_curve.len(), 10);
    assert!(run.max_drawdown.abs() < 1e-12);
    assert_eq!(run.start, date(2024, 1, 1));
    assert_eq!(run.end, date(2024, 1, 12));
}

#[test]
fn identical_inputs_replay_to_identical_output() {
    let series = flat_series(date(2024, 1, 1), date(2024, 1, 12), 22000.0);
    let engine = BacktestEngine::new(session_params());

    let first = engine.run(&series).unwrap();
    let second = engine.run(&series).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn exhausted_series_leaves_positions_as_open_exposure() {
    // Monday through Wednesday only; a wide target keeps both legs from
    // exiting before the series runs out
    let params = StrategyParams {
        target_profit_fraction: 0.9,
        ..session_params()
    };
    let series = flat_series(date(2024, 1, 1), date(2024, 1, 3), 22000.0);
    let run = BacktestEngine::new(params).run(&series).unwrap();

    assert_eq!(run.positions.len(), 2);
    assert!(run.positions.iter().all(|p| p.is_open()));
    assert_eq!(run.report.total_trades, 0);
    assert_eq!(run.report.win_rate, 0.0);
    assert_eq!(run.report.open_positions, 2);

    // margin still locked: (21550 + 22450) x 50 x 0.12
    let expected = (21550.0 + 22450.0) * 50.0 * 0.12;
    assert_relative_eq!(run.open_margin, expected, epsilon = 1e-9);
}

#[test]
fn insufficient_capital_yields_an_empty_run() {
    // default capital cannot carry a single near-the-money short
    let params = StrategyParams {
        otm_percent: 0.02,
        min_premium: 10.0,
        ..StrategyParams::default()
    };
    let series = flat_series(date(2024, 1, 1), date(2024, 1, 5), 22000.0);
    let run = BacktestEngine::new(params).run(&series).unwrap();

    assert!(run.positions.is_empty());
    assert_eq!(run.report.total_trades, 0);
    assert_eq!(run.total_return, 0.0);
    assert!(run.equity_curve.iter().all(|p| p.equity == 100_000.0));
}

#[test]
fn deep_otm_premiums_never_trade_under_default_params() {
    // 15% OTM weekly premiums sit far below the 50-point floor
    let series = flat_series(date(2024, 1, 1), date(2024, 1, 5), 22000.0);
    let run = BacktestEngine::new(StrategyParams::default())
        .run(&series)
        .unwrap();
    assert!(run.positions.is_empty());
}

#[test]
fn empty_series_is_rejected() {
    let series = HistoricalSeries::new(Index::Nifty, 0.30);
    assert!(BacktestEngine::new(session_params()).run(&series).is_err());
}

#[test]
fn invalid_params_are_rejected_before_replay() {
    let params = StrategyParams {
        capital: -1.0,
        ..StrategyParams::default()
    };
    let series = flat_series(date(2024, 1, 1), date(2024, 1, 5), 22000.0);
    assert!(BacktestEngine::new(params).run(&series).is_err());
}
