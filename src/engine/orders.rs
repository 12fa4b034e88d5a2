//! Order placement, modification and cancellation.

use super::MatchingEngine;
use crate::domain::{
    AggressorSide, BusinessRejectReason, ExecutionType, LimitOrder, OrderId, OrderPrice,
    OrderQuantity, OrderStatus, OrderType, OrigClientOrderId, RejectText, RejectedMessageType,
    Session, Side, TimeInForce,
};
use crate::protocol::replies::{
    BusinessMessageReject, OrderCancellationConfirmation, OrderCancellationReject,
    OrderModificationConfirmation, OrderModificationReject, OrderPlacementConfirmation,
    OrderPlacementReject,
};
use crate::protocol::requests::{
    OrderCancellationRequest, OrderModificationRequest, OrderPlacementRequest,
};
use crate::utils::current_system_time;
use crate::validation::PlacementCandidate;
use chrono::{DateTime, Utc};
use tracing::{debug, error, trace, warn};

/// Reject text for a market order hitting an empty opposite page.
pub const NO_LIQUIDITY_TEXT: &str = "no liquidity to execute market order";

/// Reject text for a fill-or-kill order that cannot fully execute.
pub const FOK_UNSATISFIED_TEXT: &str = "fill-or-kill quantity cannot be fully executed";

/// Reject text for a market order arriving outside continuous trading.
pub const MARKET_ORDER_CONTINUOUS_ONLY_TEXT: &str =
    "market orders are accepted in continuous trading only";

/// Reject text for modify/cancel requests referencing an unknown or
/// foreign order.
pub const ORDER_NOT_FOUND_TEXT: &str = "order not found";

impl MatchingEngine {
    /// Processes an order placement request.
    pub fn process_placement(&mut self, request: OrderPlacementRequest) {
        let now = current_system_time();
        trace!(instrument = %self.instrument, session = %request.session, "order placement");

        if !self.phase.allows_new_orders() {
            self.reject_placement(
                &request,
                format!("{} phase does not accept new orders", self.phase),
            );
            return;
        }

        let time_in_force = request.time_in_force.unwrap_or(TimeInForce::Day);
        let candidate = PlacementCandidate {
            side: request.side,
            order_type: request.order_type,
            order_price: request.order_price,
            order_quantity: request.order_quantity,
            time_in_force,
            expire_time: request.expire_time,
            expire_date: request.expire_date,
        };
        if let Err(violation) = self.order_validator.validate_placement(&candidate, now) {
            debug!(instrument = %self.instrument, %violation, "placement validation failed");
            self.reject_placement(&request, violation.describe().to_owned());
            return;
        }

        // Validation guarantees presence of these fields.
        let (Some(side), Some(order_type), Some(quantity)) =
            (request.side, request.order_type, request.order_quantity)
        else {
            return;
        };

        match order_type {
            OrderType::Market => self.place_market(request, side, quantity, time_in_force, now),
            OrderType::Limit => self.place_limit(request, side, quantity, time_in_force, now),
            _ => {}
        }
    }

    fn place_market(
        &mut self,
        request: OrderPlacementRequest,
        side: Side,
        quantity: OrderQuantity,
        time_in_force: TimeInForce,
        now: DateTime<Utc>,
    ) {
        if !self.phase.allows_matching() {
            self.reject_placement(&request, MARKET_ORDER_CONTINUOUS_ONLY_TEXT.to_owned());
            return;
        }
        if self.book.page(side.opposite()).is_empty() {
            self.reject_placement(&request, NO_LIQUIDITY_TEXT.to_owned());
            return;
        }
        if time_in_force == TimeInForce::FillOrKill
            && self.executable_quantity(side, None) < quantity.value()
        {
            self.reject_placement(&request, FOK_UNSATISFIED_TEXT.to_owned());
            return;
        }

        let Some(order_id) = self.allocate_order_id(&request) else {
            return;
        };
        let ack_execution_id = match self.idgen.next_execution_id() {
            Ok(id) => id,
            Err(err) => {
                self.reject_id_exhausted(&request.session, RejectedMessageType::OrderPlacement, err);
                return;
            }
        };
        let mut taker = self.build_order(&request, order_id, side, quantity, time_in_force, now);

        self.emit(OrderPlacementConfirmation {
            session: request.session.clone(),
            instrument: request.instrument.clone(),
            client_order_id: request.client_order_id.clone(),
            venue_order_id: order_id,
            execution_id: ack_execution_id,
            side,
            order_price: None,
            order_quantity: quantity,
            time_in_force,
            parties: request.parties.clone(),
        });

        self.match_against_book(&mut taker, None, Some(AggressorSide::from(side)), now);

        // A market order never rests; any residual is cancelled.
        if taker.leaves() > 0.0 {
            taker.order_status = OrderStatus::Cancelled;
            match self.idgen.next_execution_id() {
                Ok(execution_id) => self.emit(self.execution_report(
                    &taker,
                    ExecutionType::Cancelled,
                    execution_id,
                    None,
                    None,
                    None,
                )),
                Err(err) => self.reject_id_exhausted(
                    &request.session,
                    RejectedMessageType::OrderPlacement,
                    err,
                ),
            }
        }

        self.publish_market_data(now);
    }

    fn place_limit(
        &mut self,
        request: OrderPlacementRequest,
        side: Side,
        quantity: OrderQuantity,
        time_in_force: TimeInForce,
        now: DateTime<Utc>,
    ) {
        let Some(price) = request.order_price else {
            return;
        };

        if time_in_force == TimeInForce::FillOrKill {
            // Staged check: the whole operation is rejected atomically when
            // the book cannot absorb the full quantity.
            if !self.phase.allows_matching()
                || self.executable_quantity(side, Some(price.value())) < quantity.value()
            {
                self.reject_placement(&request, FOK_UNSATISFIED_TEXT.to_owned());
                return;
            }
        }

        let Some(order_id) = self.allocate_order_id(&request) else {
            return;
        };
        let ack_execution_id = match self.idgen.next_execution_id() {
            Ok(id) => id,
            Err(err) => {
                self.reject_id_exhausted(&request.session, RejectedMessageType::OrderPlacement, err);
                return;
            }
        };
        let mut order = self.build_order(&request, order_id, side, quantity, time_in_force, now);
        order.order_price = price;

        self.emit(OrderPlacementConfirmation {
            session: request.session.clone(),
            instrument: request.instrument.clone(),
            client_order_id: request.client_order_id.clone(),
            venue_order_id: order_id,
            execution_id: ack_execution_id,
            side,
            order_price: Some(price),
            order_quantity: quantity,
            time_in_force,
            parties: request.parties.clone(),
        });

        if self.phase.allows_matching() {
            self.match_against_book(
                &mut order,
                Some(price.value()),
                Some(AggressorSide::from(side)),
                now,
            );
        }

        if order.leaves() > 0.0 {
            if time_in_force == TimeInForce::ImmediateOrCancel {
                order.order_status = OrderStatus::Cancelled;
                match self.idgen.next_execution_id() {
                    Ok(execution_id) => self.emit(self.execution_report(
                        &order,
                        ExecutionType::Cancelled,
                        execution_id,
                        Some(order.order_price),
                        None,
                        None,
                    )),
                    Err(err) => self.reject_id_exhausted(
                        &request.session,
                        RejectedMessageType::OrderPlacement,
                        err,
                    ),
                }
            } else {
                self.book.page_mut(side).insert(order);
            }
        }

        self.publish_market_data(now);
    }

    /// Processes an order modification request.
    pub fn process_modification(&mut self, request: OrderModificationRequest) {
        let now = current_system_time();

        if !self.phase.allows_new_orders() {
            self.reject_modification(
                &request,
                format!("{} phase does not accept modifications", self.phase),
            );
            return;
        }

        let Some((side, order_id)) = self.locate_order(
            request.side,
            request.venue_order_id,
            request.orig_client_order_id.as_ref(),
            &request.session,
        ) else {
            self.reject_modification(&request, ORDER_NOT_FOUND_TEXT.to_owned());
            return;
        };

        // Build the post-modification image and validate it before touching
        // the book.
        let Some(resting) = self.book.page(side).find(order_id).cloned() else {
            self.reject_modification(&request, ORDER_NOT_FOUND_TEXT.to_owned());
            return;
        };

        let mut updated = resting.clone();
        updated.order_price = request.order_price.unwrap_or(resting.order_price);
        updated.total_quantity = request.order_quantity.unwrap_or(resting.total_quantity);
        updated.time_in_force = request.time_in_force.unwrap_or(resting.time_in_force);
        updated.expire_time = request.expire_time.or(resting.expire_time);
        updated.expire_date = request.expire_date.or(resting.expire_date);
        if request.client_order_id.is_some() {
            updated.client_order_id = request.client_order_id.clone();
        }
        updated.order_status = OrderStatus::Modified;

        if let Err(violation) = self.order_validator.validate_resting(&updated, side, now) {
            debug!(instrument = %self.instrument, %violation, "modification validation failed");
            self.reject_modification(&request, violation.describe().to_owned());
            return;
        }

        let price_changed = updated.order_price != resting.order_price;
        let quantity_increased = updated.total_quantity > resting.total_quantity;
        let loses_priority = price_changed || quantity_increased;

        let confirmation_execution_id = match self.idgen.next_execution_id() {
            Ok(id) => id,
            Err(err) => {
                self.reject_id_exhausted(
                    &request.session,
                    RejectedMessageType::OrderModification,
                    err,
                );
                return;
            }
        };
        self.emit(OrderModificationConfirmation {
            session: request.session.clone(),
            instrument: request.instrument.clone(),
            client_order_id: updated.client_order_id.clone(),
            orig_client_order_id: request.orig_client_order_id.clone(),
            venue_order_id: order_id,
            execution_id: confirmation_execution_id,
            side: updated.side,
            order_price: updated.order_price,
            order_quantity: updated.total_quantity,
            cum_executed_quantity: updated.cum_executed_quantity,
            leaves_quantity: crate::domain::LeavesQuantity::new(updated.leaves()),
            order_status: OrderStatus::Modified,
            time_in_force: updated.time_in_force,
        });

        if loses_priority {
            let _ = self.book.page_mut(side).remove(order_id);
            updated.order_time = now;

            if self.phase.allows_matching() {
                // A re-priced order that crosses executes as a taker; the
                // book never stays crossed in continuous trading.
                let limit = updated.order_price.value();
                let aggressor_side = Some(AggressorSide::from(updated.side));
                self.match_against_book(
                    &mut updated,
                    Some(limit),
                    aggressor_side,
                    now,
                );
            }
            if updated.leaves() > 0.0 {
                self.book.page_mut(side).insert(updated);
            }
        } else if let Some(order) = self.book.page_mut(side).find_mut(order_id) {
            order.total_quantity = updated.total_quantity;
            order.time_in_force = updated.time_in_force;
            order.expire_time = updated.expire_time;
            order.expire_date = updated.expire_date;
            order.client_order_id = updated.client_order_id.clone();
            order.order_status = OrderStatus::Modified;
        }

        self.publish_market_data(now);
    }

    /// Processes an order cancellation request.
    pub fn process_cancellation(&mut self, request: OrderCancellationRequest) {
        let now = current_system_time();

        if !self.cancels_allowed {
            self.reject_cancellation(
                &request,
                format!("{} phase does not accept cancellations", self.phase),
            );
            return;
        }

        let Some((side, order_id)) = self.locate_order(
            request.side,
            request.venue_order_id,
            request.orig_client_order_id.as_ref(),
            &request.session,
        ) else {
            self.reject_cancellation(&request, ORDER_NOT_FOUND_TEXT.to_owned());
            return;
        };

        let cancel_execution_id = match self.idgen.next_execution_id() {
            Ok(id) => id,
            Err(err) => {
                self.reject_id_exhausted(
                    &request.session,
                    RejectedMessageType::OrderCancellation,
                    err,
                );
                return;
            }
        };
        let Some(mut order) = self.book.page_mut(side).remove(order_id) else {
            self.reject_cancellation(&request, ORDER_NOT_FOUND_TEXT.to_owned());
            return;
        };
        order.order_status = OrderStatus::Cancelled;

        debug!(instrument = %self.instrument, order = %order.order_id, "order cancelled");
        self.emit(OrderCancellationConfirmation {
            session: request.session.clone(),
            instrument: request.instrument.clone(),
            client_order_id: request.client_order_id.clone(),
            orig_client_order_id: request.orig_client_order_id.clone(),
            venue_order_id: order.order_id,
            execution_id: cancel_execution_id,
            side: order.side,
            order_price: order.order_price,
            order_quantity: order.total_quantity,
            cum_executed_quantity: order.cum_executed_quantity,
            leaves_quantity: crate::domain::LeavesQuantity::new(order.leaves()),
            order_status: OrderStatus::Cancelled,
        });

        self.publish_market_data(now);
    }

    fn build_order(
        &self,
        request: &OrderPlacementRequest,
        order_id: OrderId,
        side: Side,
        quantity: OrderQuantity,
        time_in_force: TimeInForce,
        now: DateTime<Utc>,
    ) -> LimitOrder {
        LimitOrder {
            client_instrument_descriptor: request.instrument.clone(),
            client_session: request.session.clone(),
            client_order_id: request.client_order_id.clone(),
            order_parties: request.parties.clone(),
            expire_time: request.expire_time,
            expire_date: request.expire_date,
            short_sale_exemption_reason: request.short_sale_exemption_reason,
            time_in_force,
            order_id,
            order_time: now,
            side,
            order_status: OrderStatus::New,
            order_price: OrderPrice::new(0.0),
            total_quantity: quantity,
            cum_executed_quantity: crate::domain::CumExecutedQuantity::new(0.0),
        }
    }

    fn allocate_order_id(&mut self, request: &OrderPlacementRequest) -> Option<OrderId> {
        match self.idgen.next_order_id() {
            Ok(order_id) => Some(order_id),
            Err(err) => {
                error!(instrument = %self.instrument, %err, "order id exhausted");
                self.emit(BusinessMessageReject {
                    session: request.session.clone(),
                    rejected_message_type: RejectedMessageType::OrderPlacement,
                    business_reject_reason: BusinessRejectReason::Other,
                    reject_text: RejectText::new("order identifier generation failed"),
                });
                None
            }
        }
    }

    /// Finds a resting order referenced by a modify/cancel request.
    ///
    /// Ownership is part of the lookup: an order held by another session is
    /// reported as not found rather than leaking its existence.
    fn locate_order(
        &self,
        side_hint: Option<Side>,
        venue_order_id: Option<OrderId>,
        orig_client_order_id: Option<&OrigClientOrderId>,
        session: &Session,
    ) -> Option<(Side, OrderId)> {
        let sides: &[Side] = match side_hint {
            Some(side) if side != Side::Unknown => match side.page() {
                Side::Buy => &[Side::Buy],
                _ => &[Side::Sell],
            },
            _ => &[Side::Buy, Side::Sell],
        };

        for &side in sides {
            let found = self.book.page(side).orders().iter().find(|order| {
                let referenced = match (venue_order_id, orig_client_order_id) {
                    (Some(id), _) => order.order_id == id,
                    (None, Some(orig)) => order
                        .client_order_id
                        .as_ref()
                        .is_some_and(|client| client.as_str() == orig.as_str()),
                    (None, None) => false,
                };
                referenced && order.owned_by(session)
            });
            if let Some(order) = found {
                return Some((side, order.order_id));
            }
        }
        None
    }

    fn reject_placement(&self, request: &OrderPlacementRequest, text: String) {
        warn!(instrument = %self.instrument, %text, "order placement rejected");
        self.emit(OrderPlacementReject {
            session: request.session.clone(),
            instrument: request.instrument.clone(),
            client_order_id: request.client_order_id.clone(),
            reject_text: RejectText::new(text),
        });
    }

    fn reject_modification(&self, request: &OrderModificationRequest, text: String) {
        warn!(instrument = %self.instrument, %text, "order modification rejected");
        self.emit(OrderModificationReject {
            session: request.session.clone(),
            instrument: request.instrument.clone(),
            client_order_id: request.client_order_id.clone(),
            orig_client_order_id: request.orig_client_order_id.clone(),
            venue_order_id: request.venue_order_id,
            reject_text: RejectText::new(text),
        });
    }

    fn reject_cancellation(&self, request: &OrderCancellationRequest, text: String) {
        warn!(instrument = %self.instrument, %text, "order cancellation rejected");
        self.emit(OrderCancellationReject {
            session: request.session.clone(),
            instrument: request.instrument.clone(),
            client_order_id: request.client_order_id.clone(),
            orig_client_order_id: request.orig_client_order_id.clone(),
            venue_order_id: request.venue_order_id,
            reject_text: RejectText::new(text),
        });
    }
}
