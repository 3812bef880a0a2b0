//! Index instruments and option contracts

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// NSE index underlyings supported by the strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Index {
    /// Nifty 50
    Nifty,
    /// Bank Nifty
    BankNifty,
}

impl Index {
    /// Units per lot
    pub fn lot_size(&self) -> u32 {
        match self {
            Index::Nifty => 50,
            Index::BankNifty => 15,
        }
    }

    /// Distance between adjacent tradable strikes, in index points
    pub fn strike_step(&self) -> f64 {
        match self {
            Index::Nifty => 50.0,
            Index::BankNifty => 100.0,
        }
    }

    /// Weekly expiry day: Thursday for Nifty, Wednesday for Bank Nifty
    pub fn expiry_weekday(&self) -> Weekday {
        match self {
            Index::Nifty => Weekday::Thu,
            Index::BankNifty => Weekday::Wed,
        }
    }

    /// Exchange ticker for the index
    pub fn symbol(&self) -> &'static str {
        match self {
            Index::Nifty => "NIFTY",
            Index::BankNifty => "BANKNIFTY",
        }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Option side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    /// Right to buy the underlying at strike
    Call,
    /// Right to sell the underlying at strike
    Put,
}

impl OptionType {
    /// Payoff if exercised immediately, ignoring time value
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    /// NSE suffix: CE for calls, PE for puts
    pub fn suffix(&self) -> &'static str {
        match self {
            OptionType::Call => "CE",
            OptionType::Put => "PE",
        }
    }
}

/// A single option contract. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Underlying index
    pub index: Index,
    /// Call or put
    pub option_type: OptionType,
    /// Strike price in index points
    pub strike: f64,
    /// Expiry date (exchange close of that day)
    pub expiry: NaiveDate,
    /// Volatility assumed for valuation, annualized
    pub implied_volatility: f64,
    /// Annualized risk-free rate
    pub risk_free_rate: f64,
}

impl OptionContract {
    /// Time to expiry in years (ACT/365), negative once past expiry
    pub fn time_to_expiry(&self, as_of: NaiveDate) -> f64 {
        let days = (self.expiry - as_of).num_days();
        days as f64 / 365.0
    }

    /// True on or after the expiry date
    pub fn is_expired(&self, as_of: NaiveDate) -> bool {
        as_of >= self.expiry
    }

    /// Payoff at the given spot, ignoring time value
    pub fn intrinsic_value(&self, spot: f64) -> f64 {
        self.option_type.intrinsic(spot, self.strike)
    }

    /// Exchange-style trading symbol, e.g. `NIFTY20260903 19800PE`
    /// collapsed to `NIFTY2026090319800PE`
    pub fn trading_symbol(&self) -> String {
        format!(
            "{}{}{:02}{:02}{}{}",
            self.index.symbol(),
            self.expiry.year(),
            self.expiry.month(),
            self.expiry.day(),
            self.strike as i64,
            self.option_type.suffix(),
        )
    }
}
