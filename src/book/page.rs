//! Order pages: price-time ordered sequences of resting limit orders.

use crate::domain::{LimitOrder, OrderId, OrderPrice, Side};

/// Decides which of two resting orders has priority on a page.
///
/// On the buy page a higher price is better; on the sell page a lower price
/// is better; at equal price the earlier `order_time` wins (strict FIFO).
#[derive(Debug, Clone, Copy)]
pub struct BetterOrderComparator {
    side: Side,
}

impl BetterOrderComparator {
    /// Creates a comparator for the given page side.
    #[must_use]
    pub fn new(side: Side) -> Self {
        Self { side: side.page() }
    }

    /// True when `left` has priority over `right`.
    #[must_use]
    pub fn is_better(&self, left: &LimitOrder, right: &LimitOrder) -> bool {
        if left.order_price != right.order_price {
            return self.is_price_better(left.order_price, right.order_price);
        }
        left.order_time < right.order_time
    }

    fn is_price_better(&self, left: OrderPrice, right: OrderPrice) -> bool {
        match self.side {
            Side::Buy => left > right,
            _ => left < right,
        }
    }
}

/// One side of an order book, owning its resting orders in priority order.
#[derive(Debug)]
pub struct OrderPage {
    side: Side,
    orders: Vec<LimitOrder>,
    comparator: BetterOrderComparator,
}

impl OrderPage {
    /// Creates an empty page for the given side.
    #[must_use]
    pub fn new(side: Side) -> Self {
        Self {
            side: side.page(),
            orders: Vec::new(),
            comparator: BetterOrderComparator::new(side),
        }
    }

    /// The canonical side of this page.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Number of resting orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// True when no order rests on the page.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// The resting orders in priority order.
    #[must_use]
    pub fn orders(&self) -> &[LimitOrder] {
        &self.orders
    }

    /// Inserts an order at its price-time position. An order that ties on
    /// price goes behind every earlier arrival at that price.
    pub fn insert(&mut self, order: LimitOrder) {
        let position = self
            .orders
            .iter()
            .position(|resting| self.comparator.is_better(&order, resting))
            .unwrap_or(self.orders.len());
        self.orders.insert(position, order);
    }

    /// The order with the highest priority.
    #[must_use]
    pub fn best(&self) -> Option<&LimitOrder> {
        self.orders.first()
    }

    /// Mutable access to the order with the highest priority.
    pub fn best_mut(&mut self) -> Option<&mut LimitOrder> {
        self.orders.first_mut()
    }

    /// Removes and returns the order with the highest priority.
    pub fn remove_best(&mut self) -> Option<LimitOrder> {
        if self.orders.is_empty() {
            None
        } else {
            Some(self.orders.remove(0))
        }
    }

    /// Finds a resting order by its engine identifier.
    #[must_use]
    pub fn find(&self, order_id: OrderId) -> Option<&LimitOrder> {
        self.orders.iter().find(|order| order.order_id == order_id)
    }

    /// Mutable lookup by engine identifier.
    pub fn find_mut(&mut self, order_id: OrderId) -> Option<&mut LimitOrder> {
        self.orders
            .iter_mut()
            .find(|order| order.order_id == order_id)
    }

    /// Removes a resting order by its engine identifier.
    pub fn remove(&mut self, order_id: OrderId) -> Option<LimitOrder> {
        let position = self
            .orders
            .iter()
            .position(|order| order.order_id == order_id)?;
        Some(self.orders.remove(position))
    }

    /// Removes every order matching the predicate, returning them in
    /// priority order.
    pub fn extract_if(&mut self, mut predicate: impl FnMut(&LimitOrder) -> bool) -> Vec<LimitOrder> {
        let mut extracted = Vec::new();
        let mut index = 0;
        while index < self.orders.len() {
            if predicate(&self.orders[index]) {
                extracted.push(self.orders.remove(index));
            } else {
                index += 1;
            }
        }
        extracted
    }

    /// Removes every resting order.
    pub fn clear(&mut self) {
        self.orders.clear();
    }

    /// Sum of open quantity at the given price.
    #[must_use]
    pub fn quantity_at(&self, price: OrderPrice) -> f64 {
        self.orders
            .iter()
            .filter(|order| order.order_price == price)
            .map(LimitOrder::leaves)
            .sum()
    }
}
