//! Middleware channel binding and routing.
//!
//! Channel slots are process-wide, so these tests serialize themselves on
//! one mutex and release every binding they install.

use crate::RecordingSink;
use std::sync::{Arc, Mutex, OnceLock};
use venue_sim::middleware::{
    self, ChannelError, TradingRequestReceiver, TradingSessionEventListener,
};
use venue_sim::prelude::*;

fn channel_guard() -> std::sync::MutexGuard<'static, ()> {
    static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    match GUARD.get_or_init(|| Mutex::new(())).lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Default)]
struct RecordingRequestReceiver {
    requests: Mutex<Vec<TradingRequest>>,
    events: Mutex<Vec<SessionTerminatedEvent>>,
}

impl TradingRequestReceiver for RecordingRequestReceiver {
    fn process(&self, request: TradingRequest) {
        self.requests.lock().unwrap().push(request);
    }

    fn process_instrument_state(
        &self,
        _request: &InstrumentStateRequest,
        reply: &mut InstrumentStateReply,
    ) {
        reply.market_phase = Some(MarketPhase::closed());
    }
}

impl TradingSessionEventListener for RecordingRequestReceiver {
    fn on_event(&self, event: SessionTerminatedEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn placement() -> OrderPlacementRequest {
    OrderPlacementRequest::new(
        Session::Generator,
        InstrumentDescriptor::for_symbol("AAPL"),
    )
}

#[test]
fn bound_request_channel_delivers_to_the_receiver() {
    let _guard = channel_guard();
    let receiver = Arc::new(RecordingRequestReceiver::default());
    middleware::bind_trading_request_channel(receiver.clone());

    middleware::send_trading_request(placement()).expect("channel bound");
    assert_eq!(receiver.requests.lock().unwrap().len(), 1);

    middleware::release_trading_request_channel();
}

#[test]
fn sync_request_blocks_until_the_reply_is_filled() {
    let _guard = channel_guard();
    let receiver = Arc::new(RecordingRequestReceiver::default());
    middleware::bind_trading_request_channel(receiver);

    let request = InstrumentStateRequest::default();
    let mut reply = InstrumentStateReply::default();
    middleware::send_instrument_state_request(&request, &mut reply).expect("channel bound");
    assert_eq!(reply.market_phase, Some(MarketPhase::closed()));

    middleware::release_trading_request_channel();
}

#[test]
fn unbound_channels_report_channel_unbound() {
    let _guard = channel_guard();
    middleware::release_trading_request_channel();
    middleware::release_trading_reply_channel();
    middleware::release_trading_session_event_channel();

    assert_eq!(
        middleware::send_trading_request(placement()),
        Err(ChannelError::ChannelUnbound)
    );

    let request = InstrumentStateRequest::default();
    let mut reply = InstrumentStateReply::default();
    assert_eq!(
        middleware::send_instrument_state_request(&request, &mut reply),
        Err(ChannelError::ChannelUnbound)
    );

    assert_eq!(
        middleware::emit_session_event(SessionTerminatedEvent {
            session: Session::Generator
        }),
        Err(ChannelError::ChannelUnbound)
    );
}

#[test]
fn release_makes_a_bound_channel_unbound_again() {
    let _guard = channel_guard();
    let receiver = Arc::new(RecordingRequestReceiver::default());
    middleware::bind_trading_request_channel(receiver);
    middleware::release_trading_request_channel();

    assert_eq!(
        middleware::send_trading_request(placement()),
        Err(ChannelError::ChannelUnbound)
    );
}

#[test]
fn reply_channel_routes_to_the_bound_sink() {
    let _guard = channel_guard();
    let sink = RecordingSink::new();
    middleware::bind_trading_reply_channel(sink.clone());

    let reject = BusinessMessageReject {
        session: Session::Generator,
        rejected_message_type: venue_sim::domain::RejectedMessageType::OrderPlacement,
        business_reject_reason: venue_sim::domain::BusinessRejectReason::Other,
        reject_text: venue_sim::domain::RejectText::new("test"),
    };
    middleware::send_trading_reply(reject).expect("channel bound");
    assert_eq!(sink.len(), 1);

    middleware::release_trading_reply_channel();
}

#[derive(Default)]
struct StubGeneratorAdmin;

impl venue_sim::middleware::GeneratorAdminReceiver for StubGeneratorAdmin {
    fn process_status(
        &self,
        _request: &venue_sim::protocol::GenerationStatusRequest,
        reply: &mut venue_sim::protocol::GenerationStatusReply,
    ) {
        reply.status = venue_sim::protocol::GenerationStatus::Running;
        reply.result = AdminResult::Success;
    }

    fn process_start(
        &self,
        _request: &venue_sim::protocol::StartGenerationRequest,
        reply: &mut venue_sim::protocol::StartGenerationReply,
    ) {
        reply.result = AdminResult::Success;
    }

    fn process_stop(
        &self,
        _request: &venue_sim::protocol::StopGenerationRequest,
        reply: &mut venue_sim::protocol::StopGenerationReply,
    ) {
        reply.result = AdminResult::error("not-running", "generator is stopped");
    }
}

#[test]
fn generator_admin_channel_round_trips_sync_requests() {
    let _guard = channel_guard();
    middleware::bind_generator_admin_channel(Arc::new(StubGeneratorAdmin));

    let mut status = venue_sim::protocol::GenerationStatusReply::default();
    middleware::send_generation_status_request(
        &venue_sim::protocol::GenerationStatusRequest,
        &mut status,
    )
    .expect("channel bound");
    assert_eq!(status.status, venue_sim::protocol::GenerationStatus::Running);

    let mut stop = venue_sim::protocol::StopGenerationReply::default();
    middleware::send_generation_stop_request(
        &venue_sim::protocol::StopGenerationRequest,
        &mut stop,
    )
    .expect("channel bound");
    assert!(!stop.result.is_success());

    middleware::release_generator_admin_channel();

    let mut start = venue_sim::protocol::StartGenerationReply::default();
    assert_eq!(
        middleware::send_generation_start_request(
            &venue_sim::protocol::StartGenerationRequest,
            &mut start,
        ),
        Err(ChannelError::ChannelUnbound)
    );
}

#[test]
fn session_events_reach_the_bound_listener() {
    let _guard = channel_guard();
    let receiver = Arc::new(RecordingRequestReceiver::default());
    middleware::bind_trading_session_event_channel(receiver.clone());

    middleware::emit_session_event(SessionTerminatedEvent {
        session: Session::Generator,
    })
    .expect("channel bound");
    assert_eq!(receiver.events.lock().unwrap().len(), 1);

    middleware::release_trading_session_event_channel();
}
