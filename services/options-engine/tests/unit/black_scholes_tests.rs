//! Black-Scholes pricing tests

use approx::assert_relative_eq;
use options_engine::BlackScholes;
use proptest::prelude::*;
use rstest::rstest;
use services_common::{EngineError, OptionType};

const SPOT: f64 = 22000.0;
const RATE: f64 = 0.07;
const WEEK: f64 = 4.0 / 365.0;

#[rstest]
#[case(OptionType::Call)]
#[case(OptionType::Put)]
fn rejects_zero_time_to_expiry(#[case] option_type: OptionType) {
    let result = BlackScholes::value(option_type, SPOT, 22000.0, RATE, 0.3, 0.0);
    assert!(matches!(result, Err(EngineError::InvalidInput(_))));

    let result = BlackScholes::value(option_type, SPOT, 22000.0, RATE, 0.3, -0.01);
    assert!(matches!(result, Err(EngineError::InvalidInput(_))));
}

#[rstest]
fn rejects_non_positive_volatility() {
    let result =
        BlackScholes::value(OptionType::Put, SPOT, 19800.0, RATE, 0.0, WEEK);
    assert!(matches!(result, Err(EngineError::InvalidInput(_))));
}

#[rstest]
fn put_call_parity_holds() {
    // C - P = S - K * e^(-rT)
    let strike = 21500.0;
    let t = 30.0 / 365.0;
    let call = BlackScholes::value(OptionType::Call, SPOT, strike, RATE, 0.2, t)
        .unwrap()
        .premium;
    let put = BlackScholes::value(OptionType::Put, SPOT, strike, RATE, 0.2, t)
        .unwrap()
        .premium;
    let forward = SPOT - strike * (-RATE * t).exp();
    assert_relative_eq!(call - put, forward, epsilon = 1e-6);
}

#[rstest]
fn valuation_is_deterministic() {
    let a = BlackScholes::value(OptionType::Put, SPOT, 19800.0, RATE, 0.3, WEEK)
        .unwrap();
    let b = BlackScholes::value(OptionType::Put, SPOT, 19800.0, RATE, 0.3, WEEK)
        .unwrap();
    assert_eq!(a, b);
}

#[rstest]
fn deep_otm_put_premium_is_small_but_positive() {
    let valuation =
        BlackScholes::value(OptionType::Put, SPOT, 18700.0, RATE, 0.15, WEEK)
            .unwrap();
    assert!(valuation.premium >= 0.0);
    assert!(valuation.premium < 50.0, "premium {}", valuation.premium);
}

#[rstest]
fn greeks_have_expected_signs_for_a_put() {
    let greeks =
        BlackScholes::value(OptionType::Put, SPOT, 21500.0, RATE, 0.25, WEEK)
            .unwrap()
            .greeks;
    assert!(greeks.delta < 0.0 && greeks.delta > -1.0);
    assert!(greeks.gamma > 0.0);
    assert!(greeks.theta < 0.0);
    assert!(greeks.vega > 0.0);
    assert!(greeks.rho < 0.0);
}

#[rstest]
fn atm_call_delta_near_half() {
    let greeks =
        BlackScholes::value(OptionType::Call, SPOT, 22000.0, RATE, 0.2, WEEK)
            .unwrap()
            .greeks;
    assert!(greeks.delta > 0.45 && greeks.delta < 0.60, "delta {}", greeks.delta);
}

#[rstest]
fn implied_volatility_recovers_the_input() {
    let sigma = 0.27;
    let premium =
        BlackScholes::value(OptionType::Put, SPOT, 21000.0, RATE, sigma, WEEK)
            .unwrap()
            .premium;
    let iv = BlackScholes::implied_volatility(
        OptionType::Put,
        SPOT,
        21000.0,
        RATE,
        WEEK,
        premium,
    )
    .unwrap();
    assert_relative_eq!(iv, sigma, epsilon = 1e-2);
}

proptest! {
    // Premium is monotonically non-decreasing in volatility.
    #[test]
    fn premium_non_decreasing_in_volatility(
        strike in 18000.0f64..26000.0,
        low in 0.05f64..0.8,
        bump in 0.01f64..0.5,
    ) {
        let cheap = BlackScholes::value(
            OptionType::Put, SPOT, strike, RATE, low, WEEK,
        ).unwrap().premium;
        let rich = BlackScholes::value(
            OptionType::Put, SPOT, strike, RATE, low + bump, WEEK,
        ).unwrap().premium;
        prop_assert!(rich >= cheap - 1e-9);
    }

    // Premium never falls below intrinsic value.
    #[test]
    fn premium_dominates_intrinsic(
        strike in 18000.0f64..26000.0,
        sigma in 0.05f64..0.8,
    ) {
        let call = BlackScholes::value(
            OptionType::Call, SPOT, strike, RATE, sigma, WEEK,
        ).unwrap().premium;
        prop_assert!(call >= (SPOT - strike).max(0.0) - 1e-6);
    }
}
