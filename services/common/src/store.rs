//! Position store abstraction
//!
//! The store is the single source of truth for which positions exist at
//! the start of every scan. Persisted history is append-mostly: rows
//! become immutable once closed, so an ordered collection keyed by id is
//! the natural shape.

use crate::types::instrument::Index;
use crate::types::position::{Position, PositionStatus};
use anyhow::{bail, Result};
use parking_lot::RwLock;
use tracing::debug;

/// Durable storage seam for positions
pub trait PositionStore {
    /// Persist a new open position, returning the assigned id.
    /// Must be all-or-nothing: on failure the prior state is unchanged.
    fn insert(&self, position: Position) -> Result<u64>;

    /// Replace the stored record for `position.id`
    fn update(&self, position: &Position) -> Result<()>;

    /// Currently open positions, optionally filtered by index,
    /// in id order
    fn open_positions(&self, index: Option<Index>) -> Vec<Position>;

    /// Every position ever recorded, in id order
    fn all_positions(&self) -> Vec<Position>;
}

/// In-memory store used by backtests, paper trading and tests.
/// Ids are assigned sequentially from 1, which keeps replay output
/// deterministic.
#[derive(Debug, Default)]
pub struct MemoryPositionStore {
    inner: RwLock<Vec<Position>>,
}

impl MemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PositionStore for MemoryPositionStore {
    fn insert(&self, mut position: Position) -> Result<u64> {
        if position.status != PositionStatus::Open {
            bail!(
                "refusing to insert position in status {:?}",
                position.status
            );
        }
        let mut inner = self.inner.write();
        let id = inner.len() as u64 + 1;
        position.id = id;
        debug!(id, symbol = %position.contract.trading_symbol(), "position recorded");
        inner.push(position);
        Ok(id)
    }

    fn update(&self, position: &Position) -> Result<()> {
        let mut inner = self.inner.write();
        match inner.iter_mut().find(|p| p.id == position.id) {
            Some(slot) => {
                *slot = position.clone();
                Ok(())
            }
            None => bail!("unknown position id {}", position.id),
        }
    }

    fn open_positions(&self, index: Option<Index>) -> Vec<Position> {
        self.inner
            .read()
            .iter()
            .filter(|p| p.is_open())
            .filter(|p| index.map_or(true, |ix| p.contract.index == ix))
            .cloned()
            .collect()
    }

    fn all_positions(&self) -> Vec<Position> {
        self.inner.read().clone()
    }
}
