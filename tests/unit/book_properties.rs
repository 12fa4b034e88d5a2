//! Property tests over book ordering and engine invariants.

use crate::{RecordingSink, limit_order, listed_instrument};
use proptest::prelude::*;
use venue_sim::engine::{AggregatorConfig, MatchingEngine};
use venue_sim::prelude::*;

fn engine() -> MatchingEngine {
    MatchingEngine::new(
        listed_instrument("AAPL"),
        TzClock::default(),
        AggregatorConfig::default(),
        RecordingSink::new(),
    )
}

#[derive(Debug, Clone)]
struct Op {
    buy: bool,
    price_ticks: u32,
    quantity: u32,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    (any::<bool>(), 990u32..=1010, 1u32..=50).prop_map(|(buy, price_ticks, quantity)| Op {
        buy,
        price_ticks,
        quantity,
    })
}

fn assert_page_ordered(page: &OrderPage) {
    let orders = page.orders();
    for pair in orders.windows(2) {
        let (front, back) = (&pair[0], &pair[1]);
        match page.side() {
            Side::Buy => assert!(
                front.order_price >= back.order_price,
                "buy page must be descending"
            ),
            _ => assert!(
                front.order_price <= back.order_price,
                "sell page must be ascending"
            ),
        }
        if front.order_price == back.order_price {
            assert!(
                front.order_time <= back.order_time,
                "equal prices must keep FIFO order"
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_order_flow_keeps_book_invariants(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut engine = engine();

        for op in ops {
            let side = if op.buy { Side::Buy } else { Side::Sell };
            let price = f64::from(op.price_ticks) * 0.01;
            let quantity = f64::from(op.quantity);
            engine.process_placement(limit_order("AAPL", "P", side, quantity, price));

            // Invariant: pages stay price-time ordered.
            assert_page_ordered(engine.book().buy_page());
            assert_page_ordered(engine.book().sell_page());

            // Invariant: the book is never crossed after matching.
            prop_assert!(!engine.book().is_crossed());

            // Invariant: every resting order has open quantity within its
            // instrument constraints.
            for page in [engine.book().buy_page(), engine.book().sell_page()] {
                for order in page.orders() {
                    prop_assert!(order.cum_executed_quantity.value() >= 0.0);
                    prop_assert!(
                        order.cum_executed_quantity.value() < order.total_quantity.value()
                    );
                }
            }

            // Invariant: aggregates bracket the last trade.
            if let (Some(trade), Some(info)) = (engine.last_trade(), engine.info()) {
                prop_assert!(info.low_price <= trade.trade_price);
                prop_assert!(trade.trade_price <= info.high_price);
            }
        }
    }

    #[test]
    fn capture_recover_is_lossless_for_random_books(ops in prop::collection::vec(op_strategy(), 1..25)) {
        let mut source = engine();
        for op in ops {
            let side = if op.buy { Side::Buy } else { Side::Sell };
            let price = f64::from(op.price_ticks) * 0.01;
            source.process_placement(limit_order("AAPL", "P", side, f64::from(op.quantity), price));
        }
        let state = source.capture_state();

        let mut replica = engine();
        replica.halt(true);
        prop_assert!(replica.recover_state(state.clone()).is_ok());
        prop_assert_eq!(replica.capture_state(), state);
    }
}
