//! Inbound trading requests built by the I/O frontends.
//!
//! Field presence mirrors the wire: everything a client may omit is an
//! `Option`, and the engine's validators decide what a given operation
//! requires.

use crate::domain::{
    ClientOrderId, InstrumentDescriptor, MarketDepth, MdEntryType, MdRequestId,
    MdSubscriptionRequestType, OrderId, OrderPrice, OrderQuantity, OrderType,
    OrigClientOrderId, Party, SecurityStatusReqId, Session, ShortSaleExemptionReason, Side,
    TimeInForce,
};
use chrono::{DateTime, NaiveDate, Utc};

/// Request to place a new order.
#[derive(Debug, Clone)]
pub struct OrderPlacementRequest {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    pub client_order_id: Option<ClientOrderId>,
    pub parties: Vec<Party>,
    pub side: Option<Side>,
    pub order_type: Option<OrderType>,
    pub order_price: Option<OrderPrice>,
    pub order_quantity: Option<OrderQuantity>,
    pub time_in_force: Option<TimeInForce>,
    pub expire_time: Option<DateTime<Utc>>,
    pub expire_date: Option<NaiveDate>,
    pub short_sale_exemption_reason: Option<ShortSaleExemptionReason>,
}

impl OrderPlacementRequest {
    /// A minimal request shell for the given session and instrument;
    /// callers fill the order fields.
    #[must_use]
    pub fn new(session: Session, instrument: InstrumentDescriptor) -> Self {
        Self {
            session,
            instrument,
            client_order_id: None,
            parties: Vec::new(),
            side: None,
            order_type: None,
            order_price: None,
            order_quantity: None,
            time_in_force: None,
            expire_time: None,
            expire_date: None,
            short_sale_exemption_reason: None,
        }
    }
}

/// Request to modify a resting order.
#[derive(Debug, Clone)]
pub struct OrderModificationRequest {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    /// Engine order identifier, when the client echoes it back.
    pub venue_order_id: Option<OrderId>,
    /// New client order identifier assigned to the modified order.
    pub client_order_id: Option<ClientOrderId>,
    /// Client identifier of the order being modified.
    pub orig_client_order_id: Option<OrigClientOrderId>,
    pub side: Option<Side>,
    pub order_type: Option<OrderType>,
    pub order_price: Option<OrderPrice>,
    pub order_quantity: Option<OrderQuantity>,
    pub time_in_force: Option<TimeInForce>,
    pub expire_time: Option<DateTime<Utc>>,
    pub expire_date: Option<NaiveDate>,
}

/// Request to cancel a resting order.
#[derive(Debug, Clone)]
pub struct OrderCancellationRequest {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    pub venue_order_id: Option<OrderId>,
    pub client_order_id: Option<ClientOrderId>,
    pub orig_client_order_id: Option<OrigClientOrderId>,
    pub side: Option<Side>,
}

/// Market-data snapshot/subscription request.
#[derive(Debug, Clone)]
pub struct MarketDataRequest {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    pub md_request_id: Option<MdRequestId>,
    pub request_type: Option<MdSubscriptionRequestType>,
    /// Requested depth; zero or absent means full depth.
    pub market_depth: Option<MarketDepth>,
    /// Entry kinds the client is interested in; empty means all.
    pub entry_types: Vec<MdEntryType>,
}

/// Security-status snapshot/subscription request.
#[derive(Debug, Clone)]
pub struct SecurityStatusRequest {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    pub request_id: Option<SecurityStatusReqId>,
    pub request_type: Option<MdSubscriptionRequestType>,
}

/// Synchronous query of an instrument's visible state.
#[derive(Debug, Clone, Default)]
pub struct InstrumentStateRequest {
    pub instrument: InstrumentDescriptor,
}

/// Sum of the asynchronous trading requests routed through the
/// trading-request channel.
#[derive(Debug, Clone)]
pub enum TradingRequest {
    OrderPlacement(OrderPlacementRequest),
    OrderModification(OrderModificationRequest),
    OrderCancellation(OrderCancellationRequest),
    MarketData(MarketDataRequest),
    SecurityStatus(SecurityStatusRequest),
}

impl TradingRequest {
    /// The session that originated the request.
    #[must_use]
    pub fn session(&self) -> &Session {
        match self {
            Self::OrderPlacement(request) => &request.session,
            Self::OrderModification(request) => &request.session,
            Self::OrderCancellation(request) => &request.session,
            Self::MarketData(request) => &request.session,
            Self::SecurityStatus(request) => &request.session,
        }
    }

    /// The instrument descriptor the request targets.
    #[must_use]
    pub fn instrument(&self) -> &InstrumentDescriptor {
        match self {
            Self::OrderPlacement(request) => &request.instrument,
            Self::OrderModification(request) => &request.instrument,
            Self::OrderCancellation(request) => &request.instrument,
            Self::MarketData(request) => &request.instrument,
            Self::SecurityStatus(request) => &request.instrument,
        }
    }
}

impl From<OrderPlacementRequest> for TradingRequest {
    fn from(request: OrderPlacementRequest) -> Self {
        Self::OrderPlacement(request)
    }
}

impl From<OrderModificationRequest> for TradingRequest {
    fn from(request: OrderModificationRequest) -> Self {
        Self::OrderModification(request)
    }
}

impl From<OrderCancellationRequest> for TradingRequest {
    fn from(request: OrderCancellationRequest) -> Self {
        Self::OrderCancellation(request)
    }
}

impl From<MarketDataRequest> for TradingRequest {
    fn from(request: MarketDataRequest) -> Self {
        Self::MarketData(request)
    }
}

impl From<SecurityStatusRequest> for TradingRequest {
    fn from(request: SecurityStatusRequest) -> Self {
        Self::SecurityStatus(request)
    }
}
