//! Historical daily close series
//!
//! One series per index. Iteration order is the `BTreeMap` date order,
//! which is what makes replay deterministic without any sorting step.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use services_common::{EngineError, Index, PriceSource};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Trading days in a year, for annualizing daily return volatility
const TRADING_DAYS: f64 = 252.0;

/// Window of daily returns behind the realized-volatility estimate
const VOLATILITY_WINDOW: usize = 20;

/// Daily close series for one index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    index: Index,
    closes: BTreeMap<NaiveDate, f64>,
    /// Used whenever the window is too short to estimate volatility
    default_volatility: f64,
}

impl HistoricalSeries {
    pub fn new(index: Index, default_volatility: f64) -> Self {
        Self {
            index,
            closes: BTreeMap::new(),
            default_volatility,
        }
    }

    pub fn from_closes<I>(index: Index, default_volatility: f64, closes: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self {
            index,
            closes: closes.into_iter().collect(),
            default_volatility,
        }
    }

    pub fn index(&self) -> Index {
        self.index
    }

    pub fn insert(&mut self, date: NaiveDate, close: f64) {
        self.closes.insert(date, close);
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Trading dates in ascending order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.closes.keys().copied()
    }

    pub fn close(&self, date: NaiveDate) -> Option<f64> {
        self.closes.get(&date).copied()
    }

    /// Annualized realized volatility as of `as_of`: sample standard
    /// deviation of the trailing window of daily percentage returns,
    /// scaled by sqrt(252). Falls back to the default when the window
    /// holds fewer than two returns or degenerates to zero.
    pub fn realized_volatility(&self, as_of: NaiveDate) -> f64 {
        let closes: Vec<f64> = self
            .closes
            .range(..=as_of)
            .map(|(_, close)| *close)
            .collect();
        if closes.len() < 3 {
            return self.default_volatility;
        }

        let start = closes.len().saturating_sub(VOLATILITY_WINDOW + 1);
        let returns: Vec<f64> = closes[start..]
            .windows(2)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();

        let vol = (&returns[..]).std_dev() * TRADING_DAYS.sqrt();
        if vol.is_finite() && vol > 0.0 {
            vol
        } else {
            self.default_volatility
        }
    }
}

impl PriceSource for HistoricalSeries {
    fn spot(&self, index: Index, as_of: NaiveDate) -> Result<f64, EngineError> {
        if index != self.index {
            return Err(EngineError::DataUnavailable(format!(
                "series covers {}, not {index}",
                self.index
            )));
        }
        self.close(as_of).ok_or_else(|| {
            EngineError::DataUnavailable(format!("no close for {index} on {as_of}"))
        })
    }
}
