//! Replies the trading core emits back to the frontends.

use crate::domain::{
    AggressorSide, BestBidPrice, BestOfferPrice, BusinessRejectReason, ClientOrderId,
    CumExecutedQuantity, CurrentBidDepth, CurrentOfferDepth, ExecutedQuantity, ExecutionId,
    ExecutionPrice, ExecutionType, InstrumentDescriptor, InstrumentId, LeavesQuantity,
    MarketDataUpdateType, MarketEntryAction, MarketPhase, MdEntryType, MdRejectReason,
    MdRequestId, OrderId, OrderPrice, OrderQuantity, OrderStatus, OrigClientOrderId, Party,
    PartyId, Price, Quantity, RejectText, RejectedMessageType, SecurityStatusReqId, Session,
    Side, TimeInForce,
};
use chrono::{DateTime, Utc};

/// Acknowledges an accepted order placement.
#[derive(Debug, Clone)]
pub struct OrderPlacementConfirmation {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    pub client_order_id: Option<ClientOrderId>,
    pub venue_order_id: OrderId,
    pub execution_id: ExecutionId,
    pub side: Side,
    pub order_price: Option<OrderPrice>,
    pub order_quantity: OrderQuantity,
    pub time_in_force: TimeInForce,
    pub parties: Vec<Party>,
}

/// Rejects an order placement.
#[derive(Debug, Clone)]
pub struct OrderPlacementReject {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    pub client_order_id: Option<ClientOrderId>,
    pub reject_text: RejectText,
}

/// Reports an execution event (trade, expiry, residual cancel) on an order.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    pub client_order_id: Option<ClientOrderId>,
    pub venue_order_id: OrderId,
    pub execution_id: ExecutionId,
    pub execution_type: ExecutionType,
    pub order_status: OrderStatus,
    pub side: Side,
    pub order_price: Option<OrderPrice>,
    pub execution_price: Option<ExecutionPrice>,
    pub executed_quantity: Option<ExecutedQuantity>,
    pub cum_executed_quantity: CumExecutedQuantity,
    pub leaves_quantity: LeavesQuantity,
    pub parties: Vec<Party>,
}

/// Acknowledges an accepted order modification.
#[derive(Debug, Clone)]
pub struct OrderModificationConfirmation {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    pub client_order_id: Option<ClientOrderId>,
    pub orig_client_order_id: Option<OrigClientOrderId>,
    pub venue_order_id: OrderId,
    pub execution_id: ExecutionId,
    pub side: Side,
    pub order_price: OrderPrice,
    pub order_quantity: OrderQuantity,
    pub cum_executed_quantity: CumExecutedQuantity,
    pub leaves_quantity: LeavesQuantity,
    pub order_status: OrderStatus,
    pub time_in_force: TimeInForce,
}

/// Rejects an order modification.
#[derive(Debug, Clone)]
pub struct OrderModificationReject {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    pub client_order_id: Option<ClientOrderId>,
    pub orig_client_order_id: Option<OrigClientOrderId>,
    pub venue_order_id: Option<OrderId>,
    pub reject_text: RejectText,
}

/// Confirms an order cancellation, carrying the last known quantities.
#[derive(Debug, Clone)]
pub struct OrderCancellationConfirmation {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    pub client_order_id: Option<ClientOrderId>,
    pub orig_client_order_id: Option<OrigClientOrderId>,
    pub venue_order_id: OrderId,
    pub execution_id: ExecutionId,
    pub side: Side,
    pub order_price: OrderPrice,
    pub order_quantity: OrderQuantity,
    pub cum_executed_quantity: CumExecutedQuantity,
    pub leaves_quantity: LeavesQuantity,
    pub order_status: OrderStatus,
}

/// Rejects an order cancellation.
#[derive(Debug, Clone)]
pub struct OrderCancellationReject {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    pub client_order_id: Option<ClientOrderId>,
    pub orig_client_order_id: Option<OrigClientOrderId>,
    pub venue_order_id: Option<OrderId>,
    pub reject_text: RejectText,
}

/// One published market-data entry: a price level or a trade-tape record.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataEntry {
    pub entry_type: MdEntryType,
    /// Incremental action; absent in full snapshots.
    pub action: Option<MarketEntryAction>,
    pub price: Option<Price>,
    pub quantity: Option<Quantity>,
    /// Owning party identifiers, concatenated per level when configured.
    pub party_ids: Vec<PartyId>,
    pub time: Option<DateTime<Utc>>,
    pub aggressor_side: Option<AggressorSide>,
    pub market_phase: Option<MarketPhase>,
}

/// Full market-data snapshot for one instrument.
#[derive(Debug, Clone)]
pub struct MarketDataSnapshot {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    pub md_request_id: Option<MdRequestId>,
    pub update_type: MarketDataUpdateType,
    pub entries: Vec<MarketDataEntry>,
}

/// Incremental market-data update against a subscription's prior state.
#[derive(Debug, Clone)]
pub struct MarketDataUpdate {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    pub md_request_id: Option<MdRequestId>,
    pub update_type: MarketDataUpdateType,
    pub entries: Vec<MarketDataEntry>,
}

/// Rejects a market-data request.
#[derive(Debug, Clone)]
pub struct MarketDataReject {
    pub session: Session,
    pub md_request_id: Option<MdRequestId>,
    pub reason: MdRejectReason,
    pub reject_text: RejectText,
}

/// Security-status report for one instrument.
#[derive(Debug, Clone)]
pub struct SecurityStatus {
    pub session: Session,
    pub instrument: InstrumentDescriptor,
    pub request_id: Option<SecurityStatusReqId>,
    pub market_phase: MarketPhase,
}

/// Session-level rejection of a message the core could not route.
#[derive(Debug, Clone)]
pub struct BusinessMessageReject {
    pub session: Session,
    pub rejected_message_type: RejectedMessageType,
    pub business_reject_reason: BusinessRejectReason,
    pub reject_text: RejectText,
}

/// Reply to a synchronous instrument-state query.
#[derive(Debug, Clone, Default)]
pub struct InstrumentStateReply {
    pub instrument_id: Option<InstrumentId>,
    pub best_bid_price: Option<BestBidPrice>,
    pub best_offer_price: Option<BestOfferPrice>,
    pub current_bid_depth: Option<CurrentBidDepth>,
    pub current_offer_depth: Option<CurrentOfferDepth>,
    pub market_phase: Option<MarketPhase>,
}

/// Sum of the asynchronous replies routed through the trading-reply channel.
#[derive(Debug, Clone)]
pub enum TradingReply {
    PlacementConfirmation(OrderPlacementConfirmation),
    PlacementReject(OrderPlacementReject),
    ExecutionReport(ExecutionReport),
    ModificationConfirmation(OrderModificationConfirmation),
    ModificationReject(OrderModificationReject),
    CancellationConfirmation(OrderCancellationConfirmation),
    CancellationReject(OrderCancellationReject),
    MarketDataSnapshot(MarketDataSnapshot),
    MarketDataUpdate(MarketDataUpdate),
    MarketDataReject(MarketDataReject),
    SecurityStatus(SecurityStatus),
    BusinessReject(BusinessMessageReject),
}

macro_rules! reply_from {
    ($type:ty => $variant:ident) => {
        impl From<$type> for TradingReply {
            fn from(reply: $type) -> Self {
                Self::$variant(reply)
            }
        }
    };
}

reply_from!(OrderPlacementConfirmation => PlacementConfirmation);
reply_from!(OrderPlacementReject => PlacementReject);
reply_from!(ExecutionReport => ExecutionReport);
reply_from!(OrderModificationConfirmation => ModificationConfirmation);
reply_from!(OrderModificationReject => ModificationReject);
reply_from!(OrderCancellationConfirmation => CancellationConfirmation);
reply_from!(OrderCancellationReject => CancellationReject);
reply_from!(MarketDataSnapshot => MarketDataSnapshot);
reply_from!(MarketDataUpdate => MarketDataUpdate);
reply_from!(MarketDataReject => MarketDataReject);
reply_from!(SecurityStatus => SecurityStatus);
reply_from!(BusinessMessageReject => BusinessReject);
