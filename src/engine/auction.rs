//! Auction uncrossing.
//!
//! Orders accumulate without matching during auction phases; on phase exit
//! the book is uncrossed at a single clearing price chosen by maximum
//! executed volume, then minimum surplus, then closeness to the last trade,
//! with remaining ties broken towards the lower price.

use super::MatchingEngine;
use crate::domain::{ExecutionType, LimitOrder, Price, Quantity, Side, Trade};
use chrono::{DateTime, Utc};
use tracing::{error, info};

impl MatchingEngine {
    /// Uncrosses the book at the computed clearing price. Trades are
    /// book-initiated: they carry no aggressor side.
    pub(super) fn uncross(&mut self, now: DateTime<Utc>) {
        let Some(clearing_price) = self.clearing_price() else {
            return;
        };
        info!(
            instrument = %self.instrument,
            price = clearing_price,
            "auction uncrossing"
        );

        loop {
            let quantities = {
                let buy = self.book.buy_page().best();
                let sell = self.book.sell_page().best();
                match (buy, sell) {
                    (Some(buy), Some(sell))
                        if buy.order_price.value() >= clearing_price
                            && sell.order_price.value() <= clearing_price =>
                    {
                        Some((buy.leaves(), sell.leaves()))
                    }
                    _ => None,
                }
            };
            let Some((buy_leaves, sell_leaves)) = quantities else {
                break;
            };
            let match_qty = buy_leaves.min(sell_leaves);

            let Some(buyer_order) = Self::fill_best(self, Side::Buy, match_qty) else {
                break;
            };
            let Some(seller_order) = Self::fill_best(self, Side::Sell, match_qty) else {
                break;
            };

            let trade_id = match self.idgen.next_trade_id() {
                Ok(id) => id,
                Err(err) => {
                    error!(instrument = %self.instrument, %err, "trade id exhausted, uncross stopped");
                    break;
                }
            };
            let buyer_execution_id = match self.idgen.next_execution_id() {
                Ok(id) => id,
                Err(err) => {
                    error!(instrument = %self.instrument, %err, "execution id exhausted, uncross stopped");
                    break;
                }
            };
            let seller_execution_id = match self.idgen.next_execution_id() {
                Ok(id) => id,
                Err(err) => {
                    error!(instrument = %self.instrument, %err, "execution id exhausted, uncross stopped");
                    break;
                }
            };

            let trade = Trade {
                buyer: Self::buyer_of(&buyer_order),
                seller: Self::seller_of(&seller_order),
                trade_price: Price::new(clearing_price),
                traded_quantity: Quantity::new(match_qty),
                aggressor_side: None,
                trade_time: now,
                market_phase: self.phase,
            };
            tracing::trace!(
                instrument = %self.instrument,
                %trade_id,
                quantity = match_qty,
                price = clearing_price,
                "uncross match"
            );
            self.record_trade(trade);

            self.emit(self.execution_report(
                &buyer_order,
                ExecutionType::Trade,
                buyer_execution_id,
                Some(buyer_order.order_price),
                Some(clearing_price),
                Some(match_qty),
            ));
            self.emit(self.execution_report(
                &seller_order,
                ExecutionType::Trade,
                seller_execution_id,
                Some(seller_order.order_price),
                Some(clearing_price),
                Some(match_qty),
            ));
        }

        self.debug_assert_book_sane();
    }

    fn fill_best(&mut self, side: Side, quantity: f64) -> Option<LimitOrder> {
        let page = self.book.page_mut(side);
        let best = page.best_mut()?;
        best.execute(quantity);
        let snapshot = best.clone();
        if snapshot.is_filled() {
            page.remove_best();
        }
        Some(snapshot)
    }

    /// Computes the single clearing price, or `None` when nothing crosses.
    fn clearing_price(&self) -> Option<f64> {
        let mut prices: Vec<f64> = self
            .book
            .buy_page()
            .orders()
            .iter()
            .chain(self.book.sell_page().orders())
            .map(|order| order.order_price.value())
            .collect();
        prices.sort_by(f64::total_cmp);
        prices.dedup();

        let last_trade_price = self
            .last_trade
            .as_ref()
            .map(|trade| trade.trade_price.value());

        let mut selected: Option<CandidatePrice> = None;
        for price in prices {
            let demand: f64 = self
                .book
                .buy_page()
                .orders()
                .iter()
                .filter(|order| order.order_price.value() >= price)
                .map(LimitOrder::leaves)
                .sum();
            let supply: f64 = self
                .book
                .sell_page()
                .orders()
                .iter()
                .filter(|order| order.order_price.value() <= price)
                .map(LimitOrder::leaves)
                .sum();
            let volume = demand.min(supply);
            if volume <= 0.0 {
                continue;
            }
            let candidate = CandidatePrice {
                price,
                volume,
                surplus: (demand - supply).abs(),
                distance: last_trade_price.map(|last| (price - last).abs()),
            };
            selected = Some(match selected {
                None => candidate,
                Some(current) if candidate.beats(&current) => candidate,
                Some(current) => current,
            });
        }

        selected.map(|candidate| candidate.price)
    }
}

#[derive(Debug, Clone, Copy)]
struct CandidatePrice {
    price: f64,
    volume: f64,
    surplus: f64,
    distance: Option<f64>,
}

impl CandidatePrice {
    /// Tie-break ordering: maximum volume, minimum surplus, closest to the
    /// last trade, lower price.
    fn beats(&self, other: &CandidatePrice) -> bool {
        if self.volume != other.volume {
            return self.volume > other.volume;
        }
        if self.surplus != other.surplus {
            return self.surplus < other.surplus;
        }
        if let (Some(own), Some(their)) = (self.distance, other.distance)
            && own != their
        {
            return own < their;
        }
        self.price < other.price
    }
}
