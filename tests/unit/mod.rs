//! Cross-component integration tests.

mod book_properties;
mod middleware_tests;
mod snapshot_format_tests;
mod system_tests;
mod venue_runtime_tests;

use std::sync::{Arc, Mutex};
use venue_sim::prelude::*;

/// Reply sink shared by the integration tests.
#[derive(Default)]
pub struct RecordingSink {
    replies: Mutex<Vec<TradingReply>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn replies(&self) -> Vec<TradingReply> {
        self.replies.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<TradingReply> {
        std::mem::take(&mut self.replies.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

impl TradingReplyReceiver for RecordingSink {
    fn process(&self, reply: TradingReply) {
        self.replies.lock().unwrap().push(reply);
    }
}

/// The instrument used across the integration tests.
pub fn listed_instrument(symbol: &str) -> Instrument {
    Instrument {
        symbol: Some(Symbol::new(symbol)),
        price_tick: Some(PriceTick::new(0.01)),
        quantity_tick: Some(QuantityTick::new(1.0)),
        min_quantity: Some(MinQuantity::new(1.0)),
        max_quantity: Some(MaxQuantity::new(1_000.0)),
        ..Instrument::default()
    }
}

pub fn fix_client(name: &str) -> Session {
    Session::Fix(FixSession::new("FIX.4.4", name, "VENUE"))
}

pub fn limit_order(
    symbol: &str,
    session: &str,
    side: Side,
    quantity: f64,
    price: f64,
) -> OrderPlacementRequest {
    let mut request = OrderPlacementRequest::new(
        fix_client(session),
        InstrumentDescriptor::for_symbol(symbol),
    );
    request.side = Some(side);
    request.order_type = Some(OrderType::Limit);
    request.order_quantity = Some(OrderQuantity::new(quantity));
    request.order_price = Some(OrderPrice::new(price));
    request.time_in_force = Some(TimeInForce::GoodTillCancel);
    request
}
