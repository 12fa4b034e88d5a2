//! Identifier generation.
//!
//! Each identifier kind keeps its own monotonically increasing counter.
//! Counters never wrap: exhaustion is reported as a collision so the caller
//! can refuse the operation instead of silently reusing an id.

use crate::domain::{ExecutionId, MdRequestId, OrderId, TradeId};
use thiserror::Error;

/// Identifier allocation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The counter for the requested kind is exhausted; allocating would
    /// collide with an already-issued identifier.
    #[error("identifier collision detected, counter exhausted")]
    CollisionDetected,
}

/// Allocates unique order, execution, trade and market-data identifiers.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next_order_id: u64,
    next_execution_id: u64,
    next_trade_id: u64,
    next_md_entry_id: u64,
}

impl IdGenerator {
    /// Creates a generator with every counter starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::seeded(1)
    }

    /// Creates a generator with every counter starting at `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            next_order_id: seed,
            next_execution_id: seed,
            next_trade_id: seed,
            next_md_entry_id: seed,
        }
    }

    /// Moves the order-id counter past `observed`, so recovered state never
    /// collides with newly allocated identifiers. The other counters are
    /// floored to the same value.
    pub fn reseed_after(&mut self, observed: OrderId) {
        let floor = observed.value().saturating_add(1);
        self.next_order_id = self.next_order_id.max(floor);
        self.next_execution_id = self.next_execution_id.max(floor);
        self.next_trade_id = self.next_trade_id.max(floor);
        self.next_md_entry_id = self.next_md_entry_id.max(floor);
    }

    /// Allocates the next order identifier.
    pub fn next_order_id(&mut self) -> Result<OrderId, GenerationError> {
        Self::advance(&mut self.next_order_id).map(OrderId::new)
    }

    /// Allocates the next execution identifier.
    pub fn next_execution_id(&mut self) -> Result<ExecutionId, GenerationError> {
        Self::advance(&mut self.next_execution_id).map(ExecutionId::new)
    }

    /// Allocates the next trade identifier.
    pub fn next_trade_id(&mut self) -> Result<TradeId, GenerationError> {
        Self::advance(&mut self.next_trade_id).map(TradeId::new)
    }

    /// Allocates the next market-data entry identifier.
    pub fn next_md_entry_id(&mut self) -> Result<MdRequestId, GenerationError> {
        Self::advance(&mut self.next_md_entry_id).map(MdRequestId::new)
    }

    fn advance(counter: &mut u64) -> Result<u64, GenerationError> {
        let issued = *counter;
        match issued.checked_add(1) {
            Some(next) => {
                *counter = next;
                Ok(issued)
            }
            None => Err(GenerationError::CollisionDetected),
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
