//! Trading-system dispatch and venue-wide administration.

use crate::{RecordingSink, fix_client, limit_order, listed_instrument};
use std::sync::Arc;
use venue_sim::domain::{ExecutionType, RejectedMessageType};
use venue_sim::prelude::*;

fn venue_config(dir: &tempfile::TempDir) -> VenueConfig {
    let mut config = VenueConfig::new("SIM");
    config.snapshot_path = dir.path().join("market_state.json");
    config
}

fn test_system(dir: &tempfile::TempDir) -> (TradingSystem, Arc<RecordingSink>) {
    let sink = RecordingSink::new();
    let system = TradingSystem::new(
        &venue_config(dir),
        vec![listed_instrument("AAPL"), listed_instrument("MSFT")],
        sink.clone(),
    )
    .expect("valid configuration");
    (system, sink)
}

#[test]
fn requests_are_routed_to_the_owning_instrument() {
    let dir = tempfile::tempdir().unwrap();
    let (mut system, sink) = test_system(&dir);

    system.dispatch(limit_order("AAPL", "A", Side::Sell, 100.0, 10.0).into());
    system.dispatch(limit_order("MSFT", "B", Side::Buy, 100.0, 10.0).into());
    sink.take();

    // Crossing AAPL must not touch MSFT.
    system.dispatch(limit_order("AAPL", "C", Side::Buy, 100.0, 10.0).into());

    let trades: Vec<_> = sink
        .replies()
        .into_iter()
        .filter_map(|reply| match reply {
            TradingReply::ExecutionReport(report)
                if report.execution_type == ExecutionType::Trade =>
            {
                Some(report)
            }
            _ => None,
        })
        .collect();
    assert_eq!(trades.len(), 2);

    let aapl = system
        .engine(InstrumentId::new(0))
        .expect("aapl engine exists");
    assert_eq!(aapl.book().order_count(), 0);
    let msft = system
        .engine(InstrumentId::new(1))
        .expect("msft engine exists");
    assert_eq!(msft.book().order_count(), 1);
}

#[test]
fn unknown_symbol_yields_a_business_reject() {
    let dir = tempfile::tempdir().unwrap();
    let (mut system, sink) = test_system(&dir);

    system.dispatch(limit_order("TSLA", "A", Side::Buy, 10.0, 10.0).into());

    let replies = sink.replies();
    match replies.as_slice() {
        [TradingReply::BusinessReject(reject)] => {
            assert_eq!(
                reject.rejected_message_type,
                RejectedMessageType::OrderPlacement
            );
            assert_eq!(
                reject.business_reject_reason,
                venue_sim::domain::BusinessRejectReason::UnknownSecurity
            );
        }
        other => panic!("unexpected replies {other:?}"),
    }
}

#[test]
fn empty_descriptor_yields_a_business_reject() {
    let dir = tempfile::tempdir().unwrap();
    let (mut system, sink) = test_system(&dir);

    let mut request = limit_order("AAPL", "A", Side::Buy, 10.0, 10.0);
    request.instrument = InstrumentDescriptor::default();
    system.dispatch(request.into());

    let replies = sink.replies();
    assert!(matches!(
        replies.as_slice(),
        [TradingReply::BusinessReject(_)]
    ));
}

#[test]
fn instrument_state_reports_best_prices_and_depths() {
    let dir = tempfile::tempdir().unwrap();
    let (mut system, _sink) = test_system(&dir);

    system.dispatch(limit_order("AAPL", "A", Side::Buy, 40.0, 10.0).into());
    system.dispatch(limit_order("AAPL", "B", Side::Buy, 30.0, 9.9).into());
    system.dispatch(limit_order("AAPL", "C", Side::Sell, 20.0, 10.2).into());

    let reply = system.instrument_state(&InstrumentStateRequest {
        instrument: InstrumentDescriptor::for_symbol("AAPL"),
    });
    assert_eq!(reply.instrument_id, Some(InstrumentId::new(0)));
    assert_eq!(reply.best_bid_price.unwrap().value(), 10.0);
    assert_eq!(reply.best_offer_price.unwrap().value(), 10.2);
    assert_eq!(reply.current_bid_depth.unwrap().value(), 70.0);
    assert_eq!(reply.current_offer_depth.unwrap().value(), 20.0);

    let unknown = system.instrument_state(&InstrumentStateRequest {
        instrument: InstrumentDescriptor::for_symbol("TSLA"),
    });
    assert!(unknown.instrument_id.is_none());
}

#[test]
fn halt_and_resume_apply_to_every_engine() {
    let dir = tempfile::tempdir().unwrap();
    let (mut system, _sink) = test_system(&dir);

    let reply = system.process_halt(&HaltPhaseRequest::default());
    assert!(reply.result.is_success());
    for id in 0..2 {
        let engine = system.engine(InstrumentId::new(id)).unwrap();
        assert_eq!(engine.phase().trading_phase(), TradingPhase::Halted);
    }

    let reply = system.process_resume();
    assert!(reply.result.is_success());
    for id in 0..2 {
        let engine = system.engine(InstrumentId::new(id)).unwrap();
        assert_eq!(engine.phase().trading_phase(), TradingPhase::Open);
        assert_eq!(engine.phase().trading_status(), TradingStatus::Resume);
    }
}

#[test]
fn store_halt_recover_round_trips_the_whole_venue() {
    let dir = tempfile::tempdir().unwrap();
    let (mut system, sink) = test_system(&dir);

    system.dispatch(limit_order("AAPL", "A", Side::Buy, 40.0, 10.0).into());
    system.dispatch(limit_order("AAPL", "B", Side::Sell, 15.0, 10.0).into());
    system.dispatch(limit_order("MSFT", "C", Side::Sell, 25.0, 50.0).into());
    sink.take();

    let aapl_before = system
        .engine(InstrumentId::new(0))
        .unwrap()
        .capture_state();

    assert!(system.process_store_state().result.is_success());

    // Mutate after the store, then halt and recover.
    system.dispatch(limit_order("AAPL", "D", Side::Buy, 99.0, 9.5).into());
    system.process_halt(&HaltPhaseRequest::default());

    let reply = system.process_recover_state();
    assert!(reply.result.is_success(), "recover failed: {}", reply.result);

    let aapl_after = system
        .engine(InstrumentId::new(0))
        .unwrap()
        .capture_state();
    assert_eq!(aapl_after, aapl_before);
}

#[test]
fn recover_outside_halt_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let (mut system, _sink) = test_system(&dir);

    assert!(system.process_store_state().result.is_success());
    let reply = system.process_recover_state();
    match reply.result {
        AdminResult::Error { code, .. } => assert_eq!(code, "phase-disallows"),
        AdminResult::Success => panic!("recovery must be refused outside halt"),
    }
}

#[test]
fn recover_without_a_snapshot_reports_the_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (mut system, _sink) = test_system(&dir);

    system.process_halt(&HaltPhaseRequest::default());
    let reply = system.process_recover_state();
    match reply.result {
        AdminResult::Error { code, .. } => assert_eq!(code, "load-failed"),
        AdminResult::Success => panic!("recovery must fail without a snapshot"),
    }
}

#[test]
fn session_termination_sweeps_every_engine() {
    let dir = tempfile::tempdir().unwrap();
    let (mut system, sink) = test_system(&dir);

    system.dispatch(limit_order("AAPL", "A", Side::Buy, 10.0, 10.0).into());
    system.dispatch(limit_order("MSFT", "A", Side::Buy, 10.0, 50.0).into());
    system.dispatch(limit_order("MSFT", "B", Side::Buy, 10.0, 49.0).into());
    sink.take();

    system.react_on(&SessionTerminatedEvent {
        session: fix_client("A"),
    });

    assert_eq!(
        system.engine(InstrumentId::new(0)).unwrap().book().order_count(),
        0
    );
    assert_eq!(
        system.engine(InstrumentId::new(1)).unwrap().book().order_count(),
        1
    );
}
