//! Time-in-force expiry sweep, driven by the runtime tick.

use super::MatchingEngine;
use crate::domain::{ExecutionType, LimitOrder, OrderStatus, Side, TimeInForce};
use chrono::{DateTime, Utc};
use tracing::{debug, error};

impl MatchingEngine {
    /// Removes and reports every resting order whose time in force has
    /// elapsed. Returns the number of expired orders.
    ///
    /// Day orders expire once the venue-local calendar day of their arrival
    /// has passed; GoodTillDate orders expire at `expire_time` (inclusive)
    /// or once `expire_date` has passed in the venue timezone.
    ///
    /// The execution identifier is allocated before an order is removed;
    /// an exhausted counter stops the sweep and the remaining orders stay
    /// on the book for the next tick.
    pub(super) fn sweep_expired(&mut self, now: DateTime<Utc>) -> usize {
        let today = self.clock.venue_date(now);
        let clock = self.clock;

        let mut expired_count = 0usize;
        'sweep: for side in [Side::Buy, Side::Sell] {
            loop {
                let Some(order_id) = self
                    .book
                    .page(side)
                    .orders()
                    .iter()
                    .find(|order| is_expired(order, now, today, &clock))
                    .map(|order| order.order_id)
                else {
                    break;
                };
                let execution_id = match self.idgen.next_execution_id() {
                    Ok(id) => id,
                    Err(err) => {
                        error!(
                            instrument = %self.instrument,
                            %err,
                            "execution id exhausted, expiry sweep stopped"
                        );
                        break 'sweep;
                    }
                };
                let Some(mut order) = self.book.page_mut(side).remove(order_id) else {
                    break;
                };
                order.order_status = OrderStatus::Expired;
                debug!(instrument = %self.instrument, order = %order.order_id, "order expired");
                self.emit(self.execution_report(
                    &order,
                    ExecutionType::Expired,
                    execution_id,
                    Some(order.order_price),
                    None,
                    None,
                ));
                expired_count += 1;
            }
        }

        expired_count
    }
}

fn is_expired(
    order: &LimitOrder,
    now: DateTime<Utc>,
    today: chrono::NaiveDate,
    clock: &crate::utils::TzClock,
) -> bool {
    match order.time_in_force {
        TimeInForce::Day => clock.venue_date(order.order_time) < today,
        TimeInForce::GoodTillDate => {
            if let Some(expire_time) = order.expire_time {
                // Inclusive at the cutoff instant.
                return expire_time <= now;
            }
            if let Some(expire_date) = order.expire_date {
                return expire_date < today;
            }
            false
        }
        _ => false,
    }
}
