//! Historical replay of the weekly option-selling strategy
//!
//! The replay shares the scanner, signal generator, risk gate and
//! lifecycle engine with the paper-trading path; only the price source
//! differs. Determinism is structural: ordered date iteration, a pure
//! pricing model and sequential store ids mean identical inputs always
//! produce identical runs.

pub mod engine;
pub mod series;

pub use engine::{BacktestEngine, BacktestRun, EquityPoint};
pub use series::HistoricalSeries;
