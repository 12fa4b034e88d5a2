//! Continuous matching scenarios.

use super::helpers::*;
use crate::domain::{AggressorSide, OrderStatus, Price, Side, TimeInForce};
use crate::engine::{FOK_UNSATISFIED_TEXT, NO_LIQUIDITY_TEXT};
use crate::protocol::replies::TradingReply;

#[test]
fn basic_cross_trades_at_resting_price() {
    let (mut engine, sink) = test_engine();

    engine.process_placement(limit("A", Side::Sell, 100.0, 10.0));
    engine.process_placement(limit("B", Side::Buy, 100.0, 10.0));

    let replies = sink.replies();
    let trades = trade_reports(&replies);
    // Two execution reports, one per side, for a single trade.
    assert_eq!(trades.len(), 2);
    for report in &trades {
        assert_eq!(report.execution_price.unwrap().value(), 10.0);
        assert_eq!(report.executed_quantity.unwrap().value(), 100.0);
        assert_eq!(report.order_status, OrderStatus::Filled);
    }

    let trade = engine.last_trade().expect("last trade recorded");
    assert_eq!(trade.trade_price, Price::new(10.0));
    assert_eq!(trade.aggressor_side, Some(AggressorSide::Buy));

    let info = engine.info().expect("aggregates recorded");
    assert_eq!(info.low_price, Price::new(10.0));
    assert_eq!(info.high_price, Price::new(10.0));

    // Both orders are gone from the book.
    assert_eq!(engine.book().order_count(), 0);
}

#[test]
fn partial_fill_rests_the_remainder() {
    let (mut engine, sink) = test_engine();

    engine.process_placement(limit("A", Side::Buy, 100.0, 10.0));
    engine.process_placement(limit("B", Side::Sell, 60.0, 10.0));

    let trades = trade_reports(&sink.replies());
    assert_eq!(trades.len(), 2);
    assert!(trades.iter().all(|r| r.executed_quantity.unwrap().value() == 60.0));

    let trade = engine.last_trade().expect("trade recorded");
    assert_eq!(trade.aggressor_side, Some(AggressorSide::Sell));

    let resting = engine.book().buy_page().best().expect("buy order rests");
    assert_eq!(resting.cum_executed_quantity.value(), 60.0);
    assert_eq!(resting.order_status, OrderStatus::PartiallyFilled);
    assert!(engine.book().sell_page().is_empty());
}

#[test]
fn price_time_priority_orders_the_fills() {
    let (mut engine, sink) = test_engine();

    engine.process_placement(limit("A", Side::Sell, 50.0, 10.0)); // t1
    engine.process_placement(limit("B", Side::Sell, 50.0, 10.0)); // t2
    engine.process_placement(limit("C", Side::Sell, 50.0, 9.99)); // t3, better price
    sink.take();

    engine.process_placement(limit("D", Side::Buy, 150.0, 10.0));

    let trades = trade_reports(&sink.replies());
    // Three trades, two reports each; maker reports are the even entries
    // after the taker's. Collect maker-side prices in fill order.
    let maker_reports: Vec<_> = trades
        .iter()
        .filter(|report| report.side.is_selling())
        .collect();
    assert_eq!(maker_reports.len(), 3);
    assert_eq!(maker_reports[0].execution_price.unwrap().value(), 9.99);
    assert_eq!(maker_reports[1].execution_price.unwrap().value(), 10.0);
    assert_eq!(maker_reports[2].execution_price.unwrap().value(), 10.0);

    // FIFO at equal price: A filled before B.
    let a_report = maker_reports[1];
    let b_report = maker_reports[2];
    assert!(a_report.venue_order_id < b_report.venue_order_id);
    assert_eq!(engine.book().order_count(), 0);
}

#[test]
fn fill_or_kill_rolls_back_atomically() {
    let (mut engine, sink) = test_engine();

    engine.process_placement(limit("A", Side::Sell, 40.0, 10.0));
    sink.take();

    let mut fok = limit("B", Side::Buy, 100.0, 10.0);
    fok.time_in_force = Some(TimeInForce::FillOrKill);
    engine.process_placement(fok);

    let replies = sink.replies();
    assert!(trade_reports(&replies).is_empty());
    let rejects = placement_rejects(&replies);
    assert_eq!(rejects.len(), 1);
    assert_eq!(rejects[0].reject_text.as_str(), FOK_UNSATISFIED_TEXT);

    // The resting sell is untouched.
    let resting = engine.book().sell_page().best().expect("sell still rests");
    assert_eq!(resting.cum_executed_quantity.value(), 0.0);
    assert_eq!(resting.total_quantity.value(), 40.0);
}

#[test]
fn fill_or_kill_matching_exact_quantity_empties_both_sides() {
    let (mut engine, sink) = test_engine();

    engine.process_placement(limit("A", Side::Sell, 100.0, 10.0));
    sink.take();

    let mut fok = limit("B", Side::Buy, 100.0, 10.0);
    fok.time_in_force = Some(TimeInForce::FillOrKill);
    engine.process_placement(fok);

    let trades = trade_reports(&sink.replies());
    assert_eq!(trades.len(), 2);
    assert_eq!(engine.book().order_count(), 0);
}

#[test]
fn immediate_or_cancel_without_overlap_leaves_no_trace() {
    let (mut engine, sink) = test_engine();

    engine.process_placement(limit("A", Side::Sell, 100.0, 10.05));
    sink.take();

    let mut ioc = limit("B", Side::Buy, 100.0, 10.0);
    ioc.time_in_force = Some(TimeInForce::ImmediateOrCancel);
    engine.process_placement(ioc);

    let replies = sink.replies();
    assert!(trade_reports(&replies).is_empty());
    // The residual is cancelled, never rested.
    let reports = execution_reports(&replies);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].order_status, OrderStatus::Cancelled);
    assert_eq!(engine.book().buy_page().len(), 0);
    assert_eq!(engine.book().sell_page().len(), 1);
}

#[test]
fn market_order_sweeps_multiple_levels() {
    let (mut engine, sink) = test_engine();

    engine.process_placement(limit("A", Side::Sell, 50.0, 10.0));
    engine.process_placement(limit("B", Side::Sell, 50.0, 10.05));
    sink.take();

    engine.process_placement(market("C", Side::Buy, 80.0));

    let trades = trade_reports(&sink.replies());
    let taker_fills: Vec<_> = trades
        .iter()
        .filter(|report| report.side == Side::Buy)
        .collect();
    assert_eq!(taker_fills.len(), 2);
    assert_eq!(taker_fills[0].execution_price.unwrap().value(), 10.0);
    assert_eq!(taker_fills[1].execution_price.unwrap().value(), 10.05);
    // Market taker reports carry no order price.
    assert!(taker_fills.iter().all(|report| report.order_price.is_none()));

    let resting = engine.book().sell_page().best().expect("partial maker rests");
    assert_eq!(resting.leaves(), 20.0);
}

#[test]
fn market_order_against_empty_page_is_rejected() {
    let (mut engine, sink) = test_engine();

    engine.process_placement(market("A", Side::Buy, 10.0));

    let rejects = placement_rejects(&sink.replies());
    assert_eq!(rejects.len(), 1);
    assert_eq!(rejects[0].reject_text.as_str(), NO_LIQUIDITY_TEXT);
}

#[test]
fn market_order_residual_is_cancelled() {
    let (mut engine, sink) = test_engine();

    engine.process_placement(limit("A", Side::Sell, 30.0, 10.0));
    sink.take();

    engine.process_placement(market("B", Side::Buy, 100.0));

    let replies = sink.replies();
    assert_eq!(trade_reports(&replies).len(), 2);
    let cancelled: Vec<_> = execution_reports(&replies)
        .into_iter()
        .filter(|report| report.order_status == OrderStatus::Cancelled)
        .collect();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].cum_executed_quantity.value(), 30.0);
    assert_eq!(cancelled[0].leaves_quantity.value(), 70.0);
}

#[test]
fn book_never_stays_crossed_after_matching() {
    let (mut engine, _sink) = test_engine();

    engine.process_placement(limit("A", Side::Buy, 10.0, 10.0));
    engine.process_placement(limit("B", Side::Sell, 10.0, 9.9));
    engine.process_placement(limit("C", Side::Buy, 25.0, 10.1));
    engine.process_placement(limit("D", Side::Sell, 5.0, 9.8));

    assert!(!engine.book().is_crossed());
}

#[test]
fn taker_report_follows_trade_with_partial_status() {
    let (mut engine, sink) = test_engine();

    engine.process_placement(limit("A", Side::Sell, 40.0, 10.0));
    sink.take();
    engine.process_placement(limit("B", Side::Buy, 100.0, 10.0));

    let replies = sink.replies();
    let trades = trade_reports(&replies);
    let taker = trades
        .iter()
        .find(|report| report.side == Side::Buy)
        .expect("taker report");
    assert_eq!(taker.order_status, OrderStatus::PartiallyFilled);
    assert_eq!(taker.cum_executed_quantity.value(), 40.0);
    assert_eq!(taker.leaves_quantity.value(), 60.0);

    // The remainder rests with the partial status intact.
    let resting = engine.book().buy_page().best().expect("rests");
    assert_eq!(resting.order_status, OrderStatus::PartiallyFilled);
}

#[test]
fn all_replies_route_back_to_the_originating_session() {
    let (mut engine, sink) = test_engine();

    engine.process_placement(limit("maker", Side::Sell, 10.0, 10.0));
    engine.process_placement(limit("taker", Side::Buy, 10.0, 10.0));

    for reply in sink.replies() {
        match reply {
            TradingReply::PlacementConfirmation(confirmation) => {
                assert!(confirmation.session.fix().is_some());
            }
            TradingReply::ExecutionReport(report) => {
                let fix = report.session.fix().expect("fix session");
                let expected_side = if fix.sender_comp_id == "maker" {
                    Side::Sell
                } else {
                    Side::Buy
                };
                assert_eq!(report.side, expected_side);
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }
}
