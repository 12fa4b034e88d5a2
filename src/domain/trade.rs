//! Executed trades.

use super::attributes::{BuyerId, Price, Quantity, SellerId};
use super::enums::AggressorSide;
use super::market_phase::MarketPhase;
use crate::utils::serde_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single executed trade.
///
/// `aggressor_side` is absent for trades initiated by the book itself, such
/// as an auction uncrossing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub buyer: Option<BuyerId>,
    pub seller: Option<SellerId>,
    pub trade_price: Price,
    pub traded_quantity: Quantity,
    pub aggressor_side: Option<AggressorSide>,
    #[serde(with = "serde_timestamp")]
    pub trade_time: DateTime<Utc>,
    /// Phase in which the trade occurred.
    pub market_phase: MarketPhase,
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} ({}) in {}",
            self.traded_quantity,
            self.trade_price,
            match self.aggressor_side {
                Some(side) => format!("aggressor={side}"),
                None => "book-initiated".to_owned(),
            },
            self.market_phase,
        )
    }
}
