//! Market-state capture and recovery.
//!
//! Capture copies the engine's book (both pages in priority order), last
//! trade and session aggregates into a persistable image. Recovery is
//! all-or-nothing: the image is fully re-validated first, and any violation
//! leaves the engine in its pre-recovery state.

use super::MatchingEngine;
use crate::domain::{InstrumentState, OrderId, Side, TradingPhase};
use crate::utils::current_system_time;
use thiserror::Error;
use tracing::info;

/// Failure to recover an engine from a persisted instrument state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoverError {
    /// Recovery is only accepted while the instrument is halted.
    #[error("market state recovery requires the Halted phase")]
    PhaseDisallows,
    /// The snapshot instrument does not match the engine's listing.
    #[error("snapshot instrument does not match the configured listing")]
    InstrumentMismatch,
    /// The snapshot failed re-validation.
    #[error("snapshot invalid: {}", violations.join("; "))]
    SnapshotInvalid {
        /// One entry per violating order, trade or aggregate.
        violations: Vec<String>,
    },
}

impl MatchingEngine {
    /// Copies the engine's complete market state into a persistable image.
    #[must_use]
    pub fn capture_state(&self) -> InstrumentState {
        InstrumentState {
            instrument: self.instrument.clone(),
            last_trade: self.last_trade.clone(),
            info: self.info,
            order_book: self.book.image(),
        }
    }

    /// Re-runs every validator over a snapshot image without touching the
    /// engine. All violations are collected, not just the first.
    pub fn validate_recovery(&self, state: &InstrumentState) -> Result<(), RecoverError> {
        if self.phase.trading_phase() != TradingPhase::Halted {
            return Err(RecoverError::PhaseDisallows);
        }
        if state.instrument != self.instrument {
            return Err(RecoverError::InstrumentMismatch);
        }

        let now = current_system_time();
        let mut violations = Vec::new();

        for (side, orders) in [
            (Side::Buy, &state.order_book.buy_orders),
            (Side::Sell, &state.order_book.sell_orders),
        ] {
            for order in orders {
                if let Err(violation) = self.order_validator.validate_resting(order, side, now) {
                    violations.push(format!(
                        "{} order {}: {}",
                        side, order.order_id, violation
                    ));
                }
            }
        }

        if let Some(trade) = &state.last_trade
            && let Err(violation) = self.state_validator.validate_trade(trade)
        {
            violations.push(format!("last trade: {violation}"));
        }
        if let Some(info) = &state.info
            && let Err(violation) = self.state_validator.validate_info(info)
        {
            violations.push(format!("instrument info: {violation}"));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(RecoverError::SnapshotInvalid { violations })
        }
    }

    /// Replaces the engine's market state with a validated snapshot image.
    ///
    /// Callers must have run [`Self::validate_recovery`]; this method does
    /// not fail. Identifier counters are reseeded past every recovered
    /// order id.
    pub fn apply_recovery(&mut self, state: InstrumentState) {
        let now = current_system_time();
        self.book.clear();

        let max_order_id = state
            .order_book
            .buy_orders
            .iter()
            .chain(&state.order_book.sell_orders)
            .map(|order| order.order_id)
            .max();

        for order in state.order_book.buy_orders {
            self.book.page_mut(Side::Buy).insert(order);
        }
        for order in state.order_book.sell_orders {
            self.book.page_mut(Side::Sell).insert(order);
        }
        self.last_trade = state.last_trade;
        self.info = state.info;

        if let Some(max_order_id) = max_order_id {
            self.idgen.reseed_after(max_order_id);
        } else {
            self.idgen.reseed_after(OrderId::new(0));
        }

        info!(
            instrument = %self.instrument,
            orders = self.book.order_count(),
            "market state recovered"
        );
        self.publish_market_data(now);
    }

    /// Validates and applies a snapshot image in one step.
    pub fn recover_state(&mut self, state: InstrumentState) -> Result<(), RecoverError> {
        self.validate_recovery(&state)?;
        self.apply_recovery(state);
        Ok(())
    }
}
