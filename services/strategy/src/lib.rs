//! Weekly option-selling strategy
//!
//! - Signal generation: sell one OTM put and one OTM call on the entry
//!   day, premium-filtered and valued through the pricing model
//! - Position lifecycle: commit, daily mark-to-market, exit evaluation
//!   (stop / target / calendar / expiry) and close
//! - Paper executor: the live-path counterpart of the backtest loop,
//!   sharing the identical signal / risk / lifecycle code paths
//!
//! Historical context for the rules: sell 10-20% OTM weekly strangles on
//! Monday, buy back at 50% of premium or 2x premium, flat by Thursday.

pub mod lifecycle;
pub mod paper;
pub mod signal;

pub use lifecycle::LifecycleEngine;
pub use paper::PaperTrader;
pub use signal::SignalGenerator;
