//! Chain scanner and strike selection tests

use chrono::NaiveDate;
use options_engine::ChainScanner;
use rstest::{fixture, rstest};
use services_common::{EngineError, Index, OptionType, StrategyParams};

#[fixture]
fn scanner() -> ChainScanner {
    ChainScanner::new(StrategyParams::default())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[rstest]
fn ten_percent_otm_put_rounds_to_nearest_increment() {
    // 22000 * 0.90 = 19800, already on the 50-point grid
    let scanner = ChainScanner::new(StrategyParams {
        otm_percent: 0.10,
        ..StrategyParams::default()
    });
    let strike = scanner
        .otm_strike(Index::Nifty, 22000.0, OptionType::Put)
        .unwrap();
    assert_eq!(strike, 19800.0);
}

#[rstest]
fn off_grid_target_rounds_to_nearest_strike(scanner: ChainScanner) {
    // 22010 * 0.85 = 18708.5 -> nearest 50-grid strike is 18700
    let strike = scanner
        .otm_strike(Index::Nifty, 22010.0, OptionType::Put)
        .unwrap();
    assert_eq!(strike, 18700.0);
}

#[rstest]
fn equidistant_target_breaks_away_from_spot() {
    // put target exactly halfway between two strikes: take the lower one
    let scanner = ChainScanner::new(StrategyParams {
        otm_percent: 0.10,
        ..StrategyParams::default()
    });
    // 22027.77..: 0.9 * spot = 19825.0, halfway between 19800 and 19850
    let spot = 19825.0 / 0.9;
    let put = scanner
        .otm_strike(Index::Nifty, spot, OptionType::Put)
        .unwrap();
    assert_eq!(put, 19800.0);

    // call target halfway: take the upper one
    let spot = 24225.0 / 1.1;
    let call = scanner
        .otm_strike(Index::Nifty, spot, OptionType::Call)
        .unwrap();
    assert_eq!(call, 24250.0);
}

#[rstest]
fn bank_nifty_uses_hundred_point_grid(scanner: ChainScanner) {
    let strike = scanner
        .otm_strike(Index::BankNifty, 48000.0, OptionType::Put)
        .unwrap();
    // 48000 * 0.85 = 40800, already on the 100-point grid
    assert_eq!(strike, 40800.0);
    assert_eq!(strike % 100.0, 0.0);
}

#[rstest]
fn exhausted_ladder_yields_no_candidate() {
    let scanner = ChainScanner::new(StrategyParams {
        otm_percent: 0.15,
        ladder_depth: 10, // +/- 500 points on Nifty, far short of 15%
        ..StrategyParams::default()
    });
    let result = scanner.otm_strike(Index::Nifty, 22000.0, OptionType::Put);
    assert!(matches!(result, Err(EngineError::NoCandidate(_))));
}

#[rstest]
fn scan_produces_one_put_and_one_call(scanner: ChainScanner) {
    let expiry = date(2024, 1, 4);
    let candidates = scanner
        .scan(Index::Nifty, 22000.0, expiry, 0.25)
        .unwrap();
    assert_eq!(candidates.put.option_type, OptionType::Put);
    assert_eq!(candidates.call.option_type, OptionType::Call);
    assert!(candidates.put.strike < 22000.0);
    assert!(candidates.call.strike > 22000.0);
    assert_eq!(candidates.put.expiry, expiry);
    assert_eq!(candidates.put.implied_volatility, 0.25);
    assert_eq!(candidates.put.risk_free_rate, 0.07);
}

#[rstest]
fn scan_rejects_bad_volatility(scanner: ChainScanner) {
    let result = scanner.scan(Index::Nifty, 22000.0, date(2024, 1, 4), 0.0);
    assert!(matches!(result, Err(EngineError::InvalidInput(_))));
}

#[rstest]
// 2024-01-01 is a Monday; Nifty expires Thursday, Bank Nifty Wednesday
#[case(Index::Nifty, date(2024, 1, 1), date(2024, 1, 4))]
#[case(Index::BankNifty, date(2024, 1, 1), date(2024, 1, 3))]
// on the expiry day itself, roll to next week
#[case(Index::Nifty, date(2024, 1, 4), date(2024, 1, 11))]
// Friday after expiry rolls forward too
#[case(Index::Nifty, date(2024, 1, 5), date(2024, 1, 11))]
fn weekly_expiry_calendar(
    #[case] index: Index,
    #[case] today: NaiveDate,
    #[case] expected: NaiveDate,
) {
    assert_eq!(ChainScanner::weekly_expiry(index, today), expected);
}

#[rstest]
fn ladder_is_centred_on_rounded_spot(scanner: ChainScanner) {
    let ladder = scanner.strike_ladder(Index::Nifty, 22013.0);
    assert!(ladder.contains(&22000.0));
    assert!(ladder.windows(2).all(|w| w[1] - w[0] == 50.0));
    assert_eq!(ladder.len(), 201);
}
