//! End-to-end venue runtime: launch, marshal requests across threads,
//! administer synchronously, terminate.

use crate::{RecordingSink, limit_order, listed_instrument};
use std::time::{Duration, Instant};
use venue_sim::domain::ExecutionType;
use venue_sim::middleware::TradingRequestReceiver;
use venue_sim::prelude::*;

fn wait_for(sink: &RecordingSink, expected: usize) -> Vec<TradingReply> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let replies = sink.replies();
        if replies.len() >= expected {
            return replies;
        }
        assert!(
            Instant::now() < deadline,
            "timed out waiting for {expected} replies, got {}",
            replies.len()
        );
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn launched_venue_processes_marshalled_order_flow() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = VenueConfig::new("SIM");
    config.snapshot_path = dir.path().join("market_state.json");

    let sink = RecordingSink::new();
    let venue = launch_trading_system(&config, vec![listed_instrument("AAPL")], sink.clone())
        .expect("valid configuration");
    let handle = venue.handle();

    handle.process(limit_order("AAPL", "A", Side::Sell, 100.0, 10.0).into());
    handle.process(limit_order("AAPL", "B", Side::Buy, 100.0, 10.0).into());

    // Two confirmations plus two trade reports.
    let replies = wait_for(&sink, 4);
    let trades = replies
        .iter()
        .filter(|reply| {
            matches!(
                reply,
                TradingReply::ExecutionReport(report)
                    if report.execution_type == ExecutionType::Trade
            )
        })
        .count();
    assert_eq!(trades, 2);

    venue.terminate();
}

#[test]
fn sync_admin_operations_round_trip_through_the_runtime_thread() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = VenueConfig::new("SIM");
    config.snapshot_path = dir.path().join("market_state.json");

    let sink = RecordingSink::new();
    let venue = launch_trading_system(&config, vec![listed_instrument("AAPL")], sink.clone())
        .expect("valid configuration");
    let handle = venue.handle();

    handle.process(limit_order("AAPL", "A", Side::Buy, 25.0, 10.0).into());
    wait_for(&sink, 1);

    use venue_sim::middleware::TradingAdminRequestReceiver;

    let mut store_reply = StoreMarketStateReply::default();
    handle.process_store(&StoreMarketStateRequest, &mut store_reply);
    assert!(store_reply.result.is_success());

    let mut halt_reply = HaltPhaseReply::default();
    handle.process_halt(&HaltPhaseRequest::default(), &mut halt_reply);
    assert!(halt_reply.result.is_success());

    let mut recover_reply = RecoverMarketStateReply::default();
    handle.process_recover(&RecoverMarketStateRequest, &mut recover_reply);
    assert!(recover_reply.result.is_success());

    let mut resume_reply = ResumePhaseReply::default();
    handle.process_resume(&ResumePhaseRequest, &mut resume_reply);
    assert!(resume_reply.result.is_success());

    // The recovered book answers the synchronous state query.
    let mut state_reply = InstrumentStateReply::default();
    handle.process_instrument_state(
        &InstrumentStateRequest {
            instrument: InstrumentDescriptor::for_symbol("AAPL"),
        },
        &mut state_reply,
    );
    assert_eq!(state_reply.best_bid_price.unwrap().value(), 10.0);
    assert_eq!(state_reply.current_bid_depth.unwrap().value(), 25.0);

    venue.terminate();
}

#[test]
fn unknown_timezone_fails_the_launch() {
    let mut config = VenueConfig::new("SIM");
    config.timezone = "Nowhere/Void".to_owned();

    let sink = RecordingSink::new();
    let result = launch_trading_system(&config, vec![listed_instrument("AAPL")], sink);
    assert!(matches!(result, Err(ConfigError::UnknownTimezone(_))));
}

#[test]
fn terminated_session_orders_are_swept_by_the_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = VenueConfig::new("SIM");
    config.snapshot_path = dir.path().join("market_state.json");

    let sink = RecordingSink::new();
    let venue = launch_trading_system(&config, vec![listed_instrument("AAPL")], sink.clone())
        .expect("valid configuration");
    let handle = venue.handle();

    handle.process(limit_order("AAPL", "A", Side::Buy, 10.0, 10.0).into());
    wait_for(&sink, 1);

    use venue_sim::middleware::TradingSessionEventListener;
    handle.on_event(SessionTerminatedEvent {
        session: crate::fix_client("A"),
    });

    let replies = wait_for(&sink, 2);
    let cancelled = replies
        .iter()
        .filter(|reply| {
            matches!(
                reply,
                TradingReply::ExecutionReport(report)
                    if report.execution_type == ExecutionType::Cancelled
            )
        })
        .count();
    assert_eq!(cancelled, 1);

    venue.terminate();
}
