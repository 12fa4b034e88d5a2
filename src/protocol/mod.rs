//! Typed protocol values exchanged between the I/O frontends and the
//! trading core: order-flow requests, replies, administrative operations and
//! session events.

pub mod admin;
pub mod events;
pub mod replies;
pub mod requests;

pub use admin::{
    AdminResult, GenerationStatus, GenerationStatusReply, GenerationStatusRequest,
    HaltPhaseReply, HaltPhaseRequest, RecoverMarketStateReply, RecoverMarketStateRequest,
    ResumePhaseReply, ResumePhaseRequest, StartGenerationReply, StartGenerationRequest,
    StopGenerationReply, StopGenerationRequest, StoreMarketStateReply, StoreMarketStateRequest,
};
pub use events::SessionTerminatedEvent;
pub use replies::{
    BusinessMessageReject, ExecutionReport, InstrumentStateReply, MarketDataEntry,
    MarketDataReject, MarketDataSnapshot, MarketDataUpdate, OrderCancellationConfirmation,
    OrderCancellationReject, OrderModificationConfirmation, OrderModificationReject,
    OrderPlacementConfirmation, OrderPlacementReject, SecurityStatus, TradingReply,
};
pub use requests::{
    InstrumentStateRequest, MarketDataRequest, OrderCancellationRequest,
    OrderModificationRequest, OrderPlacementRequest, SecurityStatusRequest, TradingRequest,
};
