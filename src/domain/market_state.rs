//! Persisted market-state document model.
//!
//! The snapshot is the venue's sole persistent representation: for every
//! instrument it keeps the listing record, the full order book in priority
//! order, the last trade and the session price aggregates.

use super::attributes::Price;
use super::instrument::Instrument;
use super::order::LimitOrder;
use super::trade::Trade;
use serde::{Deserialize, Serialize};

/// Session-derived price aggregates of one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstrumentInfo {
    pub low_price: Price,
    pub high_price: Price,
}

impl InstrumentInfo {
    /// Starts the aggregates from a first trade price.
    #[must_use]
    pub fn from_trade_price(price: Price) -> Self {
        Self {
            low_price: price,
            high_price: price,
        }
    }

    /// Widens the range to include a new trade price.
    pub fn absorb(&mut self, price: Price) {
        if price < self.low_price {
            self.low_price = price;
        }
        if price > self.high_price {
            self.high_price = price;
        }
    }
}

/// Both pages of an order book in priority order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBookState {
    pub buy_orders: Vec<LimitOrder>,
    pub sell_orders: Vec<LimitOrder>,
}

/// The complete persisted state of one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentState {
    pub instrument: Instrument,
    pub last_trade: Option<Trade>,
    pub info: Option<InstrumentInfo>,
    pub order_book: OrderBookState,
}

/// A venue-level market-state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub venue_id: String,
    pub instruments: Vec<InstrumentState>,
}
