//! Market-state capture and recovery.

use super::helpers::*;
use crate::domain::{MdSubscriptionRequestType, OrderPrice, Side};
use crate::engine::RecoverError;

#[test]
fn capture_preserves_priority_order() {
    let (mut engine, _sink) = test_engine();

    engine.process_placement(limit("A", Side::Buy, 10.0, 10.0));
    engine.process_placement(limit("B", Side::Buy, 10.0, 10.1));
    engine.process_placement(limit("C", Side::Sell, 10.0, 10.3));
    engine.process_placement(limit("D", Side::Sell, 10.0, 10.2));

    let state = engine.capture_state();
    let buy_prices: Vec<f64> = state
        .order_book
        .buy_orders
        .iter()
        .map(|order| order.order_price.value())
        .collect();
    assert_eq!(buy_prices, vec![10.1, 10.0]);
    let sell_prices: Vec<f64> = state
        .order_book
        .sell_orders
        .iter()
        .map(|order| order.order_price.value())
        .collect();
    assert_eq!(sell_prices, vec![10.2, 10.3]);
}

#[test]
fn recovery_requires_the_halted_phase() {
    let (mut engine, _sink) = test_engine();
    let state = engine.capture_state();

    assert_eq!(
        engine.recover_state(state.clone()),
        Err(RecoverError::PhaseDisallows)
    );

    engine.halt(true);
    assert_eq!(engine.recover_state(state), Ok(()));
}

#[test]
fn recovered_engine_reproduces_identical_market_data() {
    let (mut source, source_sink) = test_engine();

    source.process_placement(limit("A", Side::Buy, 40.0, 10.0));
    source.process_placement(limit("B", Side::Buy, 25.0, 9.9));
    source.process_placement(limit("C", Side::Sell, 30.0, 10.1));
    source.process_placement(limit("D", Side::Sell, 30.0, 10.0)); // trades 30 @ 10.0
    source_sink.take();

    let state = source.capture_state();

    let (mut replica, replica_sink) = test_engine();
    replica.halt(true);
    replica_sink.take();
    assert_eq!(replica.recover_state(state.clone()), Ok(()));
    replica.resume();
    replica_sink.take();

    // Same state image.
    assert_eq!(replica.capture_state(), state);

    // Same market-data snapshot entries.
    source.process_market_data(md_request("S", MdSubscriptionRequestType::Snapshot, None));
    replica.process_market_data(md_request("S", MdSubscriptionRequestType::Snapshot, None));
    let source_entries = md_snapshots(&source_sink.replies())[0].entries.clone();
    let replica_entries = md_snapshots(&replica_sink.replies())[0].entries.clone();
    assert_eq!(source_entries, replica_entries);
}

#[test]
fn invalid_snapshot_aborts_recovery_and_keeps_prior_state() {
    let (mut engine, sink) = test_engine();

    engine.process_placement(limit("A", Side::Buy, 40.0, 10.0));
    sink.take();
    let good = engine.capture_state();

    let mut bad = good.clone();
    bad.order_book.buy_orders[0].order_price = OrderPrice::new(10.005); // off tick

    engine.halt(true);
    let error = engine.recover_state(bad).expect_err("snapshot must be rejected");
    match error {
        RecoverError::SnapshotInvalid { violations } => {
            assert_eq!(violations.len(), 1);
            assert!(violations[0].contains("order price tick constraint violated"));
        }
        other => panic!("unexpected error {other:?}"),
    }

    // Pre-recovery book untouched.
    assert_eq!(engine.capture_state().order_book, good.order_book);
}

#[test]
fn recovery_rejects_a_foreign_instrument() {
    let (mut engine, _sink) = test_engine();
    engine.halt(true);

    let mut state = engine.capture_state();
    state.instrument.symbol = Some(crate::domain::Symbol::new("OTHER"));

    assert_eq!(
        engine.recover_state(state),
        Err(RecoverError::InstrumentMismatch)
    );
}

#[test]
fn recovery_reseeds_order_identifiers_past_the_snapshot() {
    let (mut engine, sink) = test_engine();

    engine.process_placement(limit("A", Side::Buy, 10.0, 10.0));
    engine.process_placement(limit("B", Side::Buy, 10.0, 9.9));
    let state = engine.capture_state();
    let max_recovered = state
        .order_book
        .buy_orders
        .iter()
        .map(|order| order.order_id)
        .max()
        .unwrap();

    let (mut replica, replica_sink) = test_engine();
    replica.halt(true);
    assert_eq!(replica.recover_state(state), Ok(()));
    replica.resume();
    replica_sink.take();
    sink.take();

    replica.process_placement(limit("C", Side::Sell, 5.0, 11.0));
    let new_id = replica
        .book()
        .sell_page()
        .best()
        .expect("order rests")
        .order_id;
    assert!(new_id > max_recovered);
}

#[test]
fn recovered_trade_and_info_survive_the_round_trip() {
    let (mut engine, sink) = test_engine();

    engine.process_placement(limit("A", Side::Sell, 50.0, 10.0));
    engine.process_placement(limit("B", Side::Buy, 50.0, 10.0));
    sink.take();
    let state = engine.capture_state();
    assert!(state.last_trade.is_some());
    assert!(state.info.is_some());

    let (mut replica, _replica_sink) = test_engine();
    replica.halt(true);
    assert_eq!(replica.recover_state(state.clone()), Ok(()));
    assert_eq!(replica.last_trade(), state.last_trade.as_ref());
    assert_eq!(replica.info(), state.info);
}
