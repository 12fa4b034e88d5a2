//! Per-instrument limit order book: two price-time ordered pages of resting
//! orders, the sole owner of every order resting on them.

mod page;

pub use page::{BetterOrderComparator, OrderPage};

use crate::domain::{OrderBookState, OrderId, Side};

/// A limit order book with a buy page and a sell page.
#[derive(Debug)]
pub struct OrderBook {
    buy_page: OrderPage,
    sell_page: OrderPage,
}

impl OrderBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buy_page: OrderPage::new(Side::Buy),
            sell_page: OrderPage::new(Side::Sell),
        }
    }

    /// The buy page.
    #[must_use]
    pub fn buy_page(&self) -> &OrderPage {
        &self.buy_page
    }

    /// The sell page.
    #[must_use]
    pub fn sell_page(&self) -> &OrderPage {
        &self.sell_page
    }

    /// The page a given order side rests on.
    #[must_use]
    pub fn page(&self, side: Side) -> &OrderPage {
        match side.page() {
            Side::Buy => &self.buy_page,
            _ => &self.sell_page,
        }
    }

    /// Mutable access to the page a given order side rests on.
    pub fn page_mut(&mut self, side: Side) -> &mut OrderPage {
        match side.page() {
            Side::Buy => &mut self.buy_page,
            _ => &mut self.sell_page,
        }
    }

    /// The page opposite to a given order side.
    pub fn opposite_page_mut(&mut self, side: Side) -> &mut OrderPage {
        self.page_mut(side.opposite())
    }

    /// Finds the side a resting order lives on.
    #[must_use]
    pub fn side_of(&self, order_id: OrderId) -> Option<Side> {
        if self.buy_page.find(order_id).is_some() {
            return Some(Side::Buy);
        }
        if self.sell_page.find(order_id).is_some() {
            return Some(Side::Sell);
        }
        None
    }

    /// Best buy price, if any order rests on the buy page.
    #[must_use]
    pub fn best_bid(&self) -> Option<f64> {
        self.buy_page.best().map(|order| order.order_price.value())
    }

    /// Best sell price, if any order rests on the sell page.
    #[must_use]
    pub fn best_offer(&self) -> Option<f64> {
        self.sell_page.best().map(|order| order.order_price.value())
    }

    /// True when the best bid meets or exceeds the best offer.
    #[must_use]
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_offer()) {
            (Some(bid), Some(offer)) => bid >= offer,
            _ => false,
        }
    }

    /// Total number of resting orders across both pages.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.buy_page.len() + self.sell_page.len()
    }

    /// Removes every resting order from both pages.
    pub fn clear(&mut self) {
        self.buy_page.clear();
        self.sell_page.clear();
    }

    /// Copies both pages, in priority order, into a persistable image.
    #[must_use]
    pub fn image(&self) -> OrderBookState {
        OrderBookState {
            buy_orders: self.buy_page.orders().to_vec(),
            sell_orders: self.sell_page.orders().to_vec(),
        }
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}
