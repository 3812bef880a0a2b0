//! Collaborator traits: market data and notification delivery

use crate::errors::EngineError;
use crate::events::{EntryEvent, ExitEvent};
use crate::types::instrument::Index;
use chrono::NaiveDate;

/// Source of underlying spot prices, keyed by date.
///
/// The live path answers with the latest quote; a backtest answers from
/// the historical series. Both call sites are interchangeable, which is
/// what makes backtest fidelity structural rather than incidental.
pub trait PriceSource {
    /// Spot price of the index as of the given date.
    ///
    /// Fails with [`EngineError::DataUnavailable`] when no quote exists;
    /// callers must abort the cycle rather than default the price.
    fn spot(&self, index: Index, as_of: NaiveDate) -> Result<f64, EngineError>;
}

/// Delivery sink for entry/exit events. Implementations format and route
/// the payloads; the core only produces structured data.
pub trait Notifier {
    fn entry(&self, event: &EntryEvent);
    fn exit(&self, event: &ExitEvent);
}

/// Notifier that drops everything. Used by backtests and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn entry(&self, _event: &EntryEvent) {}
    fn exit(&self, _event: &ExitEvent) {}
}
