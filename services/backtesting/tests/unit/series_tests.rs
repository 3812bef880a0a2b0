//! Historical series: lookups and realized volatility

use assert_matches::assert_matches;
use backtesting::HistoricalSeries;
use chrono::NaiveDate;
use services_common::{EngineError, Index, PriceSource};

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(offset)
}

#[test]
fn spot_answers_from_the_series() {
    let series = HistoricalSeries::from_closes(
        Index::Nifty,
        0.30,
        [(day(0), 22000.0), (day(1), 22100.0)],
    );
    assert_eq!(series.spot(Index::Nifty, day(1)).unwrap(), 22100.0);
}

#[test]
fn missing_date_is_data_unavailable() {
    let series =
        HistoricalSeries::from_closes(Index::Nifty, 0.30, [(day(0), 22000.0)]);
    let err = series.spot(Index::Nifty, day(5)).unwrap_err();
    assert_matches!(err, EngineError::DataUnavailable(_));
}

#[test]
fn wrong_index_is_data_unavailable() {
    let series =
        HistoricalSeries::from_closes(Index::Nifty, 0.30, [(day(0), 22000.0)]);
    let err = series.spot(Index::BankNifty, day(0)).unwrap_err();
    assert_matches!(err, EngineError::DataUnavailable(_));
}

#[test]
fn short_history_falls_back_to_the_default() {
    let series = HistoricalSeries::from_closes(
        Index::Nifty,
        0.25,
        [(day(0), 22000.0), (day(1), 22100.0)],
    );
    assert_eq!(series.realized_volatility(day(1)), 0.25);
}

#[test]
fn flat_series_falls_back_to_the_default() {
    let closes = (0..30).map(|i| (day(i), 22000.0));
    let series = HistoricalSeries::from_closes(Index::Nifty, 0.30, closes);
    assert_eq!(series.realized_volatility(day(29)), 0.30);
}

#[test]
fn moving_series_yields_positive_volatility() {
    // alternating +/-1% closes
    let closes = (0..30).map(|i| {
        let close = if i % 2 == 0 { 22000.0 } else { 22220.0 };
        (day(i), close)
    });
    let series = HistoricalSeries::from_closes(Index::Nifty, 0.30, closes);
    let vol = series.realized_volatility(day(29));
    assert!(vol > 0.05, "got {vol}");
    assert!(vol.is_finite());
}

#[test]
fn volatility_window_ignores_old_turbulence() {
    // ten wild days followed by a flat month: the trailing window sees
    // only the flat stretch, so the estimate falls back to the default
    let mut series = HistoricalSeries::new(Index::Nifty, 0.30);
    for i in 0..10u64 {
        let close = if i % 2 == 0 { 20000.0 } else { 23000.0 };
        series.insert(day(i), close);
    }
    for i in 10..40u64 {
        series.insert(day(i), 22000.0);
    }
    assert_eq!(series.realized_volatility(day(39)), 0.30);
}

#[test]
fn volatility_is_computed_as_of_the_query_date() {
    // wild early, flat later: asking early must see the wild window
    let mut series = HistoricalSeries::new(Index::Nifty, 0.30);
    for i in 0..10u64 {
        let close = if i % 2 == 0 { 20000.0 } else { 23000.0 };
        series.insert(day(i), close);
    }
    for i in 10..40u64 {
        series.insert(day(i), 22000.0);
    }
    let early = series.realized_volatility(day(9));
    assert!(early > 1.0, "alternating 15% moves, got {early}");
}
