//! Shared fixtures for engine tests.

use crate::domain::{
    ExecutionType, FixSession, Instrument, InstrumentDescriptor, MaxQuantity, MdRequestId,
    MdSubscriptionRequestType, MinQuantity, OrderPrice, OrderQuantity, OrderType, PriceTick,
    QuantityTick, Session, Side, Symbol, TimeInForce,
};
use crate::engine::{AggregatorConfig, MatchingEngine};
use crate::middleware::TradingReplyReceiver;
use crate::protocol::replies::{
    ExecutionReport, MarketDataSnapshot, MarketDataUpdate, OrderPlacementReject, TradingReply,
};
use crate::protocol::requests::{MarketDataRequest, OrderPlacementRequest};
use crate::utils::TzClock;
use std::sync::{Arc, Mutex};

/// Reply sink collecting everything an engine emits.
#[derive(Default)]
pub struct CollectingSink {
    replies: Mutex<Vec<TradingReply>>,
}

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All collected replies so far.
    pub fn replies(&self) -> Vec<TradingReply> {
        self.replies.lock().unwrap().clone()
    }

    /// Drains the collected replies.
    pub fn take(&self) -> Vec<TradingReply> {
        std::mem::take(&mut self.replies.lock().unwrap())
    }
}

impl TradingReplyReceiver for CollectingSink {
    fn process(&self, reply: TradingReply) {
        self.replies.lock().unwrap().push(reply);
    }
}

/// The standard test instrument: tick 0.01, quantity tick 1, bounds 1..1000.
pub fn test_instrument() -> Instrument {
    Instrument {
        symbol: Some(Symbol::new("TEST")),
        price_tick: Some(PriceTick::new(0.01)),
        quantity_tick: Some(QuantityTick::new(1.0)),
        min_quantity: Some(MinQuantity::new(1.0)),
        max_quantity: Some(MaxQuantity::new(1_000.0)),
        ..Instrument::default()
    }
}

/// A fresh engine over the standard instrument, in `Open/Resume`.
pub fn test_engine() -> (MatchingEngine, Arc<CollectingSink>) {
    let sink = CollectingSink::new();
    let engine = MatchingEngine::new(
        test_instrument(),
        TzClock::default(),
        AggregatorConfig::default(),
        sink.clone(),
    );
    (engine, sink)
}

pub fn client(name: &str) -> Session {
    Session::Fix(FixSession::new("FIX.4.4", name, "VENUE"))
}

pub fn descriptor() -> InstrumentDescriptor {
    InstrumentDescriptor::for_symbol("TEST")
}

/// A limit order placement request.
pub fn limit(session: &str, side: Side, quantity: f64, price: f64) -> OrderPlacementRequest {
    let mut request = OrderPlacementRequest::new(client(session), descriptor());
    request.side = Some(side);
    request.order_type = Some(OrderType::Limit);
    request.order_quantity = Some(OrderQuantity::new(quantity));
    request.order_price = Some(OrderPrice::new(price));
    request.time_in_force = Some(TimeInForce::GoodTillCancel);
    request
}

/// A market order placement request.
pub fn market(session: &str, side: Side, quantity: f64) -> OrderPlacementRequest {
    let mut request = OrderPlacementRequest::new(client(session), descriptor());
    request.side = Some(side);
    request.order_type = Some(OrderType::Market);
    request.order_quantity = Some(OrderQuantity::new(quantity));
    request
}

/// A market-data request.
pub fn md_request(
    session: &str,
    request_type: MdSubscriptionRequestType,
    md_request_id: Option<u64>,
) -> MarketDataRequest {
    MarketDataRequest {
        session: client(session),
        instrument: descriptor(),
        md_request_id: md_request_id.map(MdRequestId::new),
        request_type: Some(request_type),
        market_depth: None,
        entry_types: Vec::new(),
    }
}

/// Execution reports with `ExecutionType::Trade`.
pub fn trade_reports(replies: &[TradingReply]) -> Vec<ExecutionReport> {
    replies
        .iter()
        .filter_map(|reply| match reply {
            TradingReply::ExecutionReport(report)
                if report.execution_type == ExecutionType::Trade =>
            {
                Some(report.clone())
            }
            _ => None,
        })
        .collect()
}

/// Execution reports of any type.
pub fn execution_reports(replies: &[TradingReply]) -> Vec<ExecutionReport> {
    replies
        .iter()
        .filter_map(|reply| match reply {
            TradingReply::ExecutionReport(report) => Some(report.clone()),
            _ => None,
        })
        .collect()
}

pub fn placement_rejects(replies: &[TradingReply]) -> Vec<OrderPlacementReject> {
    replies
        .iter()
        .filter_map(|reply| match reply {
            TradingReply::PlacementReject(reject) => Some(reject.clone()),
            _ => None,
        })
        .collect()
}

pub fn md_snapshots(replies: &[TradingReply]) -> Vec<MarketDataSnapshot> {
    replies
        .iter()
        .filter_map(|reply| match reply {
            TradingReply::MarketDataSnapshot(snapshot) => Some(snapshot.clone()),
            _ => None,
        })
        .collect()
}

pub fn md_updates(replies: &[TradingReply]) -> Vec<MarketDataUpdate> {
    replies
        .iter()
        .filter_map(|reply| match reply {
            TradingReply::MarketDataUpdate(update) => Some(update.clone()),
            _ => None,
        })
        .collect()
}
