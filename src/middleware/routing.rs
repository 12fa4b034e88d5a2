//! Channel binding slots and send entry points.
//!
//! Each channel holds one currently bound receiver behind shared ownership:
//! a sender takes a short-lived strong reference per call, so a receiver
//! released concurrently stays alive until in-flight calls return. Bind and
//! release belong to the orchestration thread.

use super::ChannelError;
use super::channels::{
    GeneratorAdminReceiver, TradingAdminRequestReceiver, TradingReplyReceiver,
    TradingRequestReceiver, TradingSessionEventListener,
};
use crate::protocol::{
    GenerationStatusReply, GenerationStatusRequest, HaltPhaseReply, HaltPhaseRequest,
    InstrumentStateReply, InstrumentStateRequest, RecoverMarketStateReply,
    RecoverMarketStateRequest, ResumePhaseReply, ResumePhaseRequest, SessionTerminatedEvent,
    StartGenerationReply, StartGenerationRequest, StopGenerationReply, StopGenerationRequest,
    StoreMarketStateReply, StoreMarketStateRequest, TradingReply, TradingRequest,
};
use std::sync::{Arc, RwLock};
use tracing::debug;

struct Channel<R: ?Sized> {
    receiver: RwLock<Option<Arc<R>>>,
}

impl<R: ?Sized> Channel<R> {
    const fn new() -> Self {
        Self {
            receiver: RwLock::new(None),
        }
    }

    fn bind(&self, receiver: Arc<R>) {
        let mut slot = match self.receiver.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(receiver);
    }

    fn release(&self) {
        let mut slot = match self.receiver.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = None;
    }

    fn acquire(&self) -> Result<Arc<R>, ChannelError> {
        let slot = match self.receiver.read() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.clone().ok_or(ChannelError::ChannelUnbound)
    }
}

static TRADING_REQUEST_CHANNEL: Channel<dyn TradingRequestReceiver> = Channel::new();
static TRADING_REPLY_CHANNEL: Channel<dyn TradingReplyReceiver> = Channel::new();
static TRADING_ADMIN_CHANNEL: Channel<dyn TradingAdminRequestReceiver> = Channel::new();
static GENERATOR_ADMIN_CHANNEL: Channel<dyn GeneratorAdminReceiver> = Channel::new();
static SESSION_EVENT_CHANNEL: Channel<dyn TradingSessionEventListener> = Channel::new();

/// Installs the trading-request receiver.
pub fn bind_trading_request_channel(receiver: Arc<dyn TradingRequestReceiver>) {
    debug!("binding trading request channel");
    TRADING_REQUEST_CHANNEL.bind(receiver);
}

/// Drops the trading-request receiver.
pub fn release_trading_request_channel() {
    debug!("releasing trading request channel");
    TRADING_REQUEST_CHANNEL.release();
}

/// Sends an asynchronous trading request to the bound receiver.
pub fn send_trading_request(request: impl Into<TradingRequest>) -> Result<(), ChannelError> {
    TRADING_REQUEST_CHANNEL.acquire()?.process(request.into());
    Ok(())
}

/// Sends a synchronous instrument-state query; blocks until the receiver
/// fills the reply.
pub fn send_instrument_state_request(
    request: &InstrumentStateRequest,
    reply: &mut InstrumentStateReply,
) -> Result<(), ChannelError> {
    TRADING_REQUEST_CHANNEL
        .acquire()?
        .process_instrument_state(request, reply);
    Ok(())
}

/// Installs the trading-reply receiver.
pub fn bind_trading_reply_channel(receiver: Arc<dyn TradingReplyReceiver>) {
    debug!("binding trading reply channel");
    TRADING_REPLY_CHANNEL.bind(receiver);
}

/// Drops the trading-reply receiver.
pub fn release_trading_reply_channel() {
    debug!("releasing trading reply channel");
    TRADING_REPLY_CHANNEL.release();
}

/// Sends a trading reply to the bound receiver.
pub fn send_trading_reply(reply: impl Into<TradingReply>) -> Result<(), ChannelError> {
    TRADING_REPLY_CHANNEL.acquire()?.process(reply.into());
    Ok(())
}

/// Installs the trading-admin receiver.
pub fn bind_trading_admin_channel(receiver: Arc<dyn TradingAdminRequestReceiver>) {
    debug!("binding trading admin channel");
    TRADING_ADMIN_CHANNEL.bind(receiver);
}

/// Drops the trading-admin receiver.
pub fn release_trading_admin_channel() {
    debug!("releasing trading admin channel");
    TRADING_ADMIN_CHANNEL.release();
}

/// Sends a synchronous phase-halt request.
pub fn send_halt_phase_request(
    request: &HaltPhaseRequest,
    reply: &mut HaltPhaseReply,
) -> Result<(), ChannelError> {
    TRADING_ADMIN_CHANNEL.acquire()?.process_halt(request, reply);
    Ok(())
}

/// Sends a synchronous phase-resume request.
pub fn send_resume_phase_request(
    request: &ResumePhaseRequest,
    reply: &mut ResumePhaseReply,
) -> Result<(), ChannelError> {
    TRADING_ADMIN_CHANNEL
        .acquire()?
        .process_resume(request, reply);
    Ok(())
}

/// Sends a synchronous market-state store request.
pub fn send_store_market_state_request(
    request: &StoreMarketStateRequest,
    reply: &mut StoreMarketStateReply,
) -> Result<(), ChannelError> {
    TRADING_ADMIN_CHANNEL
        .acquire()?
        .process_store(request, reply);
    Ok(())
}

/// Sends a synchronous market-state recover request.
pub fn send_recover_market_state_request(
    request: &RecoverMarketStateRequest,
    reply: &mut RecoverMarketStateReply,
) -> Result<(), ChannelError> {
    TRADING_ADMIN_CHANNEL
        .acquire()?
        .process_recover(request, reply);
    Ok(())
}

/// Installs the generator-admin receiver.
pub fn bind_generator_admin_channel(receiver: Arc<dyn GeneratorAdminReceiver>) {
    debug!("binding generator admin channel");
    GENERATOR_ADMIN_CHANNEL.bind(receiver);
}

/// Drops the generator-admin receiver.
pub fn release_generator_admin_channel() {
    debug!("releasing generator admin channel");
    GENERATOR_ADMIN_CHANNEL.release();
}

/// Sends a synchronous generator-status query.
pub fn send_generation_status_request(
    request: &GenerationStatusRequest,
    reply: &mut GenerationStatusReply,
) -> Result<(), ChannelError> {
    GENERATOR_ADMIN_CHANNEL
        .acquire()?
        .process_status(request, reply);
    Ok(())
}

/// Sends a synchronous generator-start request.
pub fn send_generation_start_request(
    request: &StartGenerationRequest,
    reply: &mut StartGenerationReply,
) -> Result<(), ChannelError> {
    GENERATOR_ADMIN_CHANNEL
        .acquire()?
        .process_start(request, reply);
    Ok(())
}

/// Sends a synchronous generator-stop request.
pub fn send_generation_stop_request(
    request: &StopGenerationRequest,
    reply: &mut StopGenerationReply,
) -> Result<(), ChannelError> {
    GENERATOR_ADMIN_CHANNEL
        .acquire()?
        .process_stop(request, reply);
    Ok(())
}

/// Installs the session-event listener.
pub fn bind_trading_session_event_channel(listener: Arc<dyn TradingSessionEventListener>) {
    debug!("binding trading session event channel");
    SESSION_EVENT_CHANNEL.bind(listener);
}

/// Drops the session-event listener.
pub fn release_trading_session_event_channel() {
    debug!("releasing trading session event channel");
    SESSION_EVENT_CHANNEL.release();
}

/// Emits a session lifecycle event to the bound listener.
pub fn emit_session_event(event: SessionTerminatedEvent) -> Result<(), ChannelError> {
    SESSION_EVENT_CHANNEL.acquire()?.on_event(event);
    Ok(())
}
