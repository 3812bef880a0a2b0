//! Options valuation and chain scanning
//!
//! - Black-Scholes premium and Greeks for NSE index options
//! - Implied volatility via Newton-Raphson
//! - Synthetic strike ladder and OTM strike selection
//! - Weekly expiry calendar (Thursday for Nifty, Wednesday for Bank Nifty)
//!
//! Every function here is pure and deterministic: identical inputs yield
//! identical outputs, which is what backtest reproducibility rests on.

pub mod chain;
pub mod pricing;

pub use chain::{ChainCandidates, ChainScanner};
pub use pricing::{BlackScholes, Greeks, Valuation};
