//! Receiver contracts of the middleware channels.

use crate::protocol::{
    GenerationStatusReply, GenerationStatusRequest, HaltPhaseReply, HaltPhaseRequest,
    InstrumentStateReply, InstrumentStateRequest, RecoverMarketStateReply,
    RecoverMarketStateRequest, ResumePhaseReply, ResumePhaseRequest, SessionTerminatedEvent,
    StartGenerationReply, StartGenerationRequest, StopGenerationReply, StopGenerationRequest,
    StoreMarketStateReply, StoreMarketStateRequest, TradingReply, TradingRequest,
};

/// Consumes trading requests routed through the trading-request channel.
///
/// Asynchronous requests are handed over on the caller's thread; a receiver
/// that needs off-thread execution marshals internally. The synchronous
/// instrument-state query blocks the caller until the reply is filled.
pub trait TradingRequestReceiver: Send + Sync {
    /// Processes an asynchronous trading request.
    fn process(&self, request: TradingRequest);

    /// Fills the reply for a synchronous instrument-state query.
    fn process_instrument_state(
        &self,
        request: &InstrumentStateRequest,
        reply: &mut InstrumentStateReply,
    );
}

/// Consumes replies routed through the trading-reply channel.
pub trait TradingReplyReceiver: Send + Sync {
    /// Processes an asynchronous trading reply.
    fn process(&self, reply: TradingReply);
}

/// Consumes venue administration requests, synchronously.
pub trait TradingAdminRequestReceiver: Send + Sync {
    fn process_halt(&self, request: &HaltPhaseRequest, reply: &mut HaltPhaseReply);

    fn process_resume(&self, request: &ResumePhaseRequest, reply: &mut ResumePhaseReply);

    fn process_store(&self, request: &StoreMarketStateRequest, reply: &mut StoreMarketStateReply);

    fn process_recover(
        &self,
        request: &RecoverMarketStateRequest,
        reply: &mut RecoverMarketStateReply,
    );
}

/// Consumes generator administration requests, synchronously.
pub trait GeneratorAdminReceiver: Send + Sync {
    fn process_status(&self, request: &GenerationStatusRequest, reply: &mut GenerationStatusReply);

    fn process_start(&self, request: &StartGenerationRequest, reply: &mut StartGenerationReply);

    fn process_stop(&self, request: &StopGenerationRequest, reply: &mut StopGenerationReply);
}

/// Listens to client session lifecycle events.
pub trait TradingSessionEventListener: Send + Sync {
    /// Reacts to a terminated client session.
    fn on_event(&self, event: SessionTerminatedEvent);
}
