//! Error taxonomy for the engine core
//!
//! Risk rejections are deliberately NOT errors — they are a normal
//! `RiskDecision` outcome and live in the risk-manager crate.

use thiserror::Error;

/// Errors produced by the engine core
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// Malformed contract or valuation inputs; fatal to the single
    /// operation, never to the process
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No strike on the tradable ladder satisfies the OTM target
    #[error("no candidate strike: {0}")]
    NoCandidate(String),

    /// Market data provider could not supply a quote; the scan cycle
    /// must be aborted, never silently defaulted
    #[error("market data unavailable: {0}")]
    DataUnavailable(String),
}
