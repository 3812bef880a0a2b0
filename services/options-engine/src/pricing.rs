//! Black-Scholes pricing and Greeks
//!
//! Premiums and Greeks stay full-precision f64 end to end; rounding is a
//! presentation concern and never happens inside the pipeline, so daily
//! revaluations do not compound rounding error.

use serde::{Deserialize, Serialize};
use services_common::{EngineError, OptionType};

const SQRT_2PI: f64 = 2.5066282746310007;

/// First-order sensitivities of an option premium
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Premium change per unit move in the underlying
    pub delta: f64,
    /// Delta change per unit move in the underlying
    pub gamma: f64,
    /// Time decay per calendar day
    pub theta: f64,
    /// Premium change per 1% move in volatility
    pub vega: f64,
    /// Premium change per 1% move in the risk-free rate
    pub rho: f64,
}

/// Output of one valuation: pure function of its inputs, no identity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Theoretical premium per unit
    pub premium: f64,
    /// Sensitivities at the same point
    pub greeks: Greeks,
}

/// Closed-form Black-Scholes model
#[derive(Debug)]
pub struct BlackScholes;

impl BlackScholes {
    /// Standard normal cumulative distribution function
    pub fn norm_cdf(x: f64) -> f64 {
        0.5 * (1.0 + libm::erf(x / std::f64::consts::SQRT_2))
    }

    /// Standard normal probability density function
    pub fn norm_pdf(x: f64) -> f64 {
        (-0.5 * x * x).exp() / SQRT_2PI
    }

    fn d1(spot: f64, strike: f64, rate: f64, sigma: f64, t: f64) -> f64 {
        ((spot / strike).ln() + (rate + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt())
    }

    fn d2(spot: f64, strike: f64, rate: f64, sigma: f64, t: f64) -> f64 {
        Self::d1(spot, strike, rate, sigma, t) - sigma * t.sqrt()
    }

    /// Theoretical premium and Greeks.
    ///
    /// `time_to_expiry` is in years (ACT/365) and must be strictly
    /// positive: at or past expiry there is no time value to model and
    /// the caller is expected to value intrinsically instead. Theta is
    /// quoted per calendar day, vega and rho per 1% move.
    pub fn value(
        option_type: OptionType,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        time_to_expiry: f64,
    ) -> Result<Valuation, EngineError> {
        if time_to_expiry <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "time_to_expiry must be positive, got {time_to_expiry}"
            )));
        }
        if volatility <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "volatility must be positive, got {volatility}"
            )));
        }
        if spot <= 0.0 || strike <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "spot and strike must be positive, got spot={spot} strike={strike}"
            )));
        }

        let sqrt_t = time_to_expiry.sqrt();
        let d1 = Self::d1(spot, strike, rate, volatility, time_to_expiry);
        let d2 = Self::d2(spot, strike, rate, volatility, time_to_expiry);
        let discount = (-rate * time_to_expiry).exp();
        let npd1 = Self::norm_pdf(d1);

        let premium = match option_type {
            OptionType::Call => {
                spot * Self::norm_cdf(d1) - strike * discount * Self::norm_cdf(d2)
            }
            OptionType::Put => {
                strike * discount * Self::norm_cdf(-d2) - spot * Self::norm_cdf(-d1)
            }
        };

        let delta = match option_type {
            OptionType::Call => Self::norm_cdf(d1),
            OptionType::Put => -Self::norm_cdf(-d1),
        };
        let gamma = npd1 / (spot * volatility * sqrt_t);
        let vega = spot * npd1 * sqrt_t / 100.0;
        let theta = match option_type {
            OptionType::Call => {
                -spot * npd1 * volatility / (2.0 * sqrt_t)
                    - rate * strike * discount * Self::norm_cdf(d2)
            }
            OptionType::Put => {
                -spot * npd1 * volatility / (2.0 * sqrt_t)
                    + rate * strike * discount * Self::norm_cdf(-d2)
            }
        } / 365.0;
        let rho = match option_type {
            OptionType::Call => {
                strike * time_to_expiry * discount * Self::norm_cdf(d2) / 100.0
            }
            OptionType::Put => {
                -strike * time_to_expiry * discount * Self::norm_cdf(-d2) / 100.0
            }
        };

        Ok(Valuation {
            premium,
            greeks: Greeks {
                delta,
                gamma,
                theta,
                vega,
                rho,
            },
        })
    }

    /// Implied volatility from a market premium via Newton-Raphson on
    /// vega. IV is clamped to [0.01, 2.0]; returns the best estimate if
    /// convergence stalls before the iteration cap.
    pub fn implied_volatility(
        option_type: OptionType,
        spot: f64,
        strike: f64,
        rate: f64,
        time_to_expiry: f64,
        market_premium: f64,
    ) -> Result<f64, EngineError> {
        if market_premium <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "market premium must be positive, got {market_premium}"
            )));
        }

        let mut iv: f64 = 0.3;
        let tolerance = 1e-4;
        let max_iterations = 100;

        for _ in 0..max_iterations {
            let valuation =
                Self::value(option_type, spot, strike, rate, iv, time_to_expiry)?;
            let diff = valuation.premium - market_premium;
            if diff.abs() < tolerance {
                return Ok(iv);
            }
            // vega is quoted per 1% move; the raw derivative is 100x
            let vega = valuation.greeks.vega * 100.0;
            if vega.abs() < 1e-10 {
                break;
            }
            iv = (iv - diff / vega).clamp(0.01, 2.0);
        }

        Ok(iv)
    }
}
