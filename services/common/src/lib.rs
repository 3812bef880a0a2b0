//! Shared data model and collaborator interfaces for the F&O
//! weekly option-selling engine.
//!
//! Everything here is plain in-memory data: instruments, contracts,
//! positions, signals, the strategy parameter set and the error taxonomy.
//! The collaborator traits ([`PriceSource`], [`PositionStore`],
//! [`Notifier`]) are the only seams to the outside world — market data,
//! durable storage and message delivery all live behind them.

pub mod config;
pub mod errors;
pub mod events;
pub mod market;
pub mod store;
pub mod types;

pub use config::{ExitPriority, StrategyParams};
pub use errors::EngineError;
pub use events::{EntryEvent, ExitEvent};
pub use market::{NoopNotifier, Notifier, PriceSource};
pub use store::{MemoryPositionStore, PositionStore};
pub use types::instrument::{Index, OptionContract, OptionType};
pub use types::position::{ExitReason, Position, PositionStatus, Signal};
