//! Resting limit orders.
//!
//! One struct serves both as the live order held by a book page and as the
//! persisted image inside a market-state snapshot, so store/recover needs no
//! conversion layer.

use super::attributes::{
    ClientOrderId, CumExecutedQuantity, OrderId, OrderPrice, OrderQuantity,
    ShortSaleExemptionReason,
};
use super::enums::{OrderStatus, Side, TimeInForce};
use super::instrument::InstrumentDescriptor;
use super::party::Party;
use super::session::Session;
use crate::utils::{serde_opt_date, serde_opt_timestamp, serde_timestamp};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A limit order resting on (or being recovered into) an order page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitOrder {
    /// The descriptor the client used; echoed back on replies.
    pub client_instrument_descriptor: InstrumentDescriptor,
    /// The session replies are routed to.
    pub client_session: Session,
    pub client_order_id: Option<ClientOrderId>,
    #[serde(default)]
    pub order_parties: Vec<Party>,
    #[serde(with = "serde_opt_timestamp")]
    pub expire_time: Option<DateTime<Utc>>,
    #[serde(with = "serde_opt_date")]
    pub expire_date: Option<NaiveDate>,
    pub short_sale_exemption_reason: Option<ShortSaleExemptionReason>,
    pub time_in_force: TimeInForce,
    pub order_id: OrderId,
    /// Arrival timestamp; the time component of price-time priority.
    #[serde(with = "serde_timestamp")]
    pub order_time: DateTime<Utc>,
    pub side: Side,
    pub order_status: OrderStatus,
    pub order_price: OrderPrice,
    pub total_quantity: OrderQuantity,
    pub cum_executed_quantity: CumExecutedQuantity,
}

impl LimitOrder {
    /// Quantity still open: `total_quantity - cum_executed_quantity`.
    #[must_use]
    pub fn leaves(&self) -> f64 {
        self.total_quantity.value() - self.cum_executed_quantity.value()
    }

    /// True once the whole quantity has executed.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.leaves() <= 0.0
    }

    /// Records a fill of `quantity` and updates the order status.
    pub fn execute(&mut self, quantity: f64) {
        let executed = self.cum_executed_quantity.value() + quantity;
        self.cum_executed_quantity = CumExecutedQuantity::new(executed);
        self.order_status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }

    /// True when the order belongs to the given client session.
    #[must_use]
    pub fn owned_by(&self, session: &Session) -> bool {
        self.client_session == *session
    }
}

impl fmt::Display for LimitOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}@{} (cum {}, {}, {})",
            self.order_id,
            self.side,
            self.total_quantity,
            self.order_price,
            self.cum_executed_quantity,
            self.time_in_force,
            self.order_status,
        )
    }
}
