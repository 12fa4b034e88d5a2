//! Continuous-trading matcher.
//!
//! An arriving taker executes against the opposite page best-first; every
//! fill trades at the maker's price. The loop mutates one maker per
//! iteration and allocates all identifiers before touching state, so each
//! iteration is atomic even under identifier exhaustion.

use super::MatchingEngine;
use crate::domain::{AggressorSide, ExecutionType, LimitOrder, Price, Quantity, Side, Trade};
use chrono::{DateTime, Utc};
use tracing::{error, trace};

impl MatchingEngine {
    /// Quantity on the opposite page executable against the given limit
    /// (`None` means a market order: everything counts).
    ///
    /// Pages are price-ordered, so compatibility is a prefix property.
    pub(super) fn executable_quantity(&self, taker_side: Side, limit_price: Option<f64>) -> f64 {
        self.book
            .page(taker_side.opposite())
            .orders()
            .iter()
            .take_while(|maker| price_compatible(taker_side, limit_price, maker))
            .map(LimitOrder::leaves)
            .sum()
    }

    /// Matches a taker against the book until its quantity is exhausted or
    /// the opposite best is no longer price-compatible. Emits a trade and
    /// two execution reports per fill, updates the tape and aggregates.
    pub(super) fn match_against_book(
        &mut self,
        taker: &mut LimitOrder,
        limit_price: Option<f64>,
        aggressor: Option<AggressorSide>,
        now: DateTime<Utc>,
    ) {
        while taker.leaves() > 0.0 {
            let fill = {
                let page = self.book.opposite_page_mut(taker.side);
                match page.best_mut() {
                    None => None,
                    Some(best) if !price_compatible(taker.side, limit_price, best) => None,
                    Some(best) => {
                        let trade_price = best.order_price.value();
                        let match_qty = taker.leaves().min(best.leaves());
                        best.execute(match_qty);
                        let maker = best.clone();
                        if maker.is_filled() {
                            page.remove_best();
                        }
                        Some((maker, trade_price, match_qty))
                    }
                }
            };
            let Some((maker, trade_price, match_qty)) = fill else {
                break;
            };

            taker.execute(match_qty);

            let trade_id = match self.idgen.next_trade_id() {
                Ok(id) => id,
                Err(err) => {
                    error!(instrument = %self.instrument, %err, "trade id exhausted, matching stopped");
                    break;
                }
            };
            let taker_execution_id = match self.idgen.next_execution_id() {
                Ok(id) => id,
                Err(err) => {
                    error!(instrument = %self.instrument, %err, "execution id exhausted, matching stopped");
                    break;
                }
            };
            let maker_execution_id = match self.idgen.next_execution_id() {
                Ok(id) => id,
                Err(err) => {
                    error!(instrument = %self.instrument, %err, "execution id exhausted, matching stopped");
                    break;
                }
            };

            let (buyer, seller) = if taker.side.page() == Side::Buy {
                (Self::buyer_of(taker), Self::seller_of(&maker))
            } else {
                (Self::buyer_of(&maker), Self::seller_of(taker))
            };

            let trade = Trade {
                buyer,
                seller,
                trade_price: Price::new(trade_price),
                traded_quantity: Quantity::new(match_qty),
                aggressor_side: aggressor,
                trade_time: now,
                market_phase: self.phase,
            };
            trace!(
                instrument = %self.instrument,
                %trade_id,
                taker = %taker.order_id,
                maker = %maker.order_id,
                quantity = match_qty,
                price = trade_price,
                "matched"
            );
            self.record_trade(trade);

            let taker_order_price = limit_price.is_some().then_some(taker.order_price);
            self.emit(self.execution_report(
                taker,
                ExecutionType::Trade,
                taker_execution_id,
                taker_order_price,
                Some(trade_price),
                Some(match_qty),
            ));
            self.emit(self.execution_report(
                &maker,
                ExecutionType::Trade,
                maker_execution_id,
                Some(maker.order_price),
                Some(trade_price),
                Some(match_qty),
            ));
        }

        self.debug_assert_book_sane();
    }
}

fn price_compatible(taker_side: Side, limit_price: Option<f64>, maker: &LimitOrder) -> bool {
    let Some(limit) = limit_price else {
        return true;
    };
    let maker_price = maker.order_price.value();
    match taker_side.page() {
        Side::Buy => maker_price <= limit,
        _ => maker_price >= limit,
    }
}
