//! Per-instrument matching engine.
//!
//! Each engine owns one instrument's order book, last trade, session
//! aggregates, market phase and market-data subscriptions, and processes
//! every request targeting that instrument. Replies and market-data
//! publications are emitted through the trading-reply sink the engine was
//! constructed with.

mod auction;
mod expiry;
pub mod market_data;
mod matching;
mod orders;
mod state;

#[cfg(test)]
mod tests;

pub use market_data::{AggregationFlags, AggregatorConfig, MarketDataAggregator};
pub use orders::{
    FOK_UNSATISFIED_TEXT, MARKET_ORDER_CONTINUOUS_ONLY_TEXT, NO_LIQUIDITY_TEXT,
    ORDER_NOT_FOUND_TEXT,
};
pub use state::RecoverError;

use crate::book::OrderBook;
use crate::domain::{
    BestBidPrice, BestOfferPrice, BusinessRejectReason, BuyerId, CurrentBidDepth,
    CurrentOfferDepth, ExecutedQuantity, ExecutionId, ExecutionPrice, ExecutionType, Instrument,
    InstrumentDescriptor, InstrumentInfo, LeavesQuantity, LimitOrder, MarketPhase, MdRequestId,
    OrderStatus, RejectText, RejectedMessageType, SecurityStatusReqId, SellerId, Session, Trade,
    TradingPhase, TradingStatus,
};
use crate::idgen::{GenerationError, IdGenerator};
use crate::middleware::TradingReplyReceiver;
use crate::protocol::replies::{
    BusinessMessageReject, ExecutionReport, InstrumentStateReply, SecurityStatus, TradingReply,
};
use crate::utils::{TzClock, current_system_time};
use crate::validation::{MarketStateValidator, OrderValidator};
use chrono::{DateTime, Utc};
use market_data::Subscription;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, trace};

/// An active security-status subscription.
#[derive(Debug, Clone)]
struct StatusSubscription {
    session: Session,
    request_id: Option<SecurityStatusReqId>,
    instrument: InstrumentDescriptor,
}

/// The per-instrument trading state machine.
pub struct MatchingEngine {
    instrument: Instrument,
    clock: TzClock,
    book: OrderBook,
    last_trade: Option<Trade>,
    info: Option<InstrumentInfo>,
    phase: MarketPhase,
    /// Phase to restore when an administrative halt is lifted.
    resume_phase: TradingPhase,
    cancels_allowed: bool,
    idgen: IdGenerator,
    order_validator: OrderValidator,
    state_validator: MarketStateValidator,
    aggregator: MarketDataAggregator,
    subscriptions: BTreeMap<MdRequestId, Subscription>,
    status_subscriptions: Vec<StatusSubscription>,
    replies: Arc<dyn TradingReplyReceiver>,
}

impl MatchingEngine {
    /// Creates an engine for one instrument.
    #[must_use]
    pub fn new(
        instrument: Instrument,
        clock: TzClock,
        aggregation: AggregatorConfig,
        replies: Arc<dyn TradingReplyReceiver>,
    ) -> Self {
        let order_validator = OrderValidator::new(&instrument, clock);
        let state_validator = MarketStateValidator::new(&instrument);
        Self {
            instrument,
            clock,
            book: OrderBook::new(),
            last_trade: None,
            info: None,
            phase: MarketPhase::open(),
            resume_phase: TradingPhase::Open,
            cancels_allowed: true,
            idgen: IdGenerator::new(),
            order_validator,
            state_validator,
            aggregator: MarketDataAggregator::new(aggregation),
            subscriptions: BTreeMap::new(),
            status_subscriptions: Vec::new(),
            replies,
        }
    }

    /// The instrument this engine trades.
    #[must_use]
    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// The current market phase.
    #[must_use]
    pub fn phase(&self) -> MarketPhase {
        self.phase
    }

    /// The order book (read access, used by the trading system and tests).
    #[must_use]
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// The last trade, if any occurred this session.
    #[must_use]
    pub fn last_trade(&self) -> Option<&Trade> {
        self.last_trade.as_ref()
    }

    /// The session price aggregates, if any trade occurred.
    #[must_use]
    pub fn info(&self) -> Option<InstrumentInfo> {
        self.info
    }

    pub(crate) fn emit(&self, reply: impl Into<TradingReply>) {
        self.replies.process(reply.into());
    }

    /// Runs the 1 Hz housekeeping: the expiry sweep.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        let expired = self.sweep_expired(now);
        if expired > 0 {
            self.publish_market_data(now);
        }
    }

    /// Moves the engine to a new trading phase. Leaving an auction phase
    /// performs the uncrossing before the new phase takes effect.
    pub fn set_trading_phase(&mut self, target: TradingPhase, allow_cancels: Option<bool>) {
        if self.phase.trading_phase() == target {
            self.cancels_allowed = allow_cancels.unwrap_or(true);
            return;
        }

        let now = current_system_time();
        let leaving_auction = self.phase.trading_phase().is_auction();
        info!(
            instrument = %self.instrument,
            from = %self.phase.trading_phase(),
            to = %target,
            "trading phase transition"
        );

        if leaving_auction {
            self.uncross(now);
        }

        self.phase = MarketPhase::new(target, self.phase.trading_status());
        self.resume_phase = target;
        self.cancels_allowed = allow_cancels.unwrap_or(true);
        self.push_security_status();
        self.publish_market_data(now);
    }

    /// Applies an administrative halt: the phase becomes `Halted` with
    /// status `Halt` until [`Self::resume`] restores the previous phase.
    pub fn halt(&mut self, allow_cancels: bool) {
        if self.phase.trading_phase() != TradingPhase::Halted {
            self.resume_phase = self.phase.trading_phase();
        }
        self.phase = MarketPhase::new(TradingPhase::Halted, TradingStatus::Halt);
        self.cancels_allowed = allow_cancels;
        info!(instrument = %self.instrument, "trading halted");
        self.push_security_status();
    }

    /// Lifts an administrative halt, restoring the pre-halt phase.
    pub fn resume(&mut self) {
        self.phase = MarketPhase::new(self.resume_phase, TradingStatus::Resume);
        self.cancels_allowed = true;
        info!(instrument = %self.instrument, phase = %self.phase, "trading resumed");
        self.push_security_status();
    }

    /// Answers the synchronous instrument-state query.
    #[must_use]
    pub fn instrument_state(&self) -> InstrumentStateReply {
        let bid_depth: f64 = self.book.buy_page().orders().iter().map(LimitOrder::leaves).sum();
        let offer_depth: f64 = self
            .book
            .sell_page()
            .orders()
            .iter()
            .map(LimitOrder::leaves)
            .sum();

        InstrumentStateReply {
            instrument_id: Some(self.instrument.identifier),
            best_bid_price: self.book.best_bid().map(BestBidPrice::new),
            best_offer_price: self.book.best_offer().map(BestOfferPrice::new),
            current_bid_depth: (bid_depth > 0.0).then(|| CurrentBidDepth::new(bid_depth)),
            current_offer_depth: (offer_depth > 0.0).then(|| CurrentOfferDepth::new(offer_depth)),
            market_phase: Some(self.phase),
        }
    }

    /// Cancels every resting order owned by a terminated session.
    ///
    /// Execution identifiers are allocated before each removal, so an
    /// exhausted counter stops the sweep with the remaining orders still
    /// resting.
    pub fn react_on_session_terminated(&mut self, session: &Session) {
        let now = current_system_time();
        let mut cancelled = 0usize;
        'sweep: for side in [crate::domain::Side::Buy, crate::domain::Side::Sell] {
            loop {
                let Some(order_id) = self
                    .book
                    .page(side)
                    .orders()
                    .iter()
                    .find(|order| order.owned_by(session))
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
                            "execution id exhausted, session sweep stopped"
                        );
                        break 'sweep;
                    }
                };
                let Some(mut order) = self.book.page_mut(side).remove(order_id) else {
                    break;
                };
                order.order_status = OrderStatus::Cancelled;
                self.emit(self.execution_report(
                    &order,
                    ExecutionType::Cancelled,
                    execution_id,
                    Some(order.order_price),
                    None,
                    None,
                ));
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            debug!(
                instrument = %self.instrument,
                session = %session,
                cancelled,
                "cancelled resting orders of terminated session"
            );
            self.publish_market_data(now);
        }
        // Drop the session's market-data interest as well.
        self.subscriptions.retain(|_, sub| sub.session() != session);
        self.status_subscriptions
            .retain(|sub| &sub.session != session);
    }

    fn push_security_status(&self) {
        for subscription in &self.status_subscriptions {
            self.emit(SecurityStatus {
                session: subscription.session.clone(),
                instrument: subscription.instrument.clone(),
                request_id: subscription.request_id.clone(),
                market_phase: self.phase,
            });
        }
    }

    /// Logs an exhausted identifier counter and surfaces the refusal to the
    /// requester as a business-level reject with a generic reason.
    fn reject_id_exhausted(
        &self,
        session: &Session,
        rejected_message_type: RejectedMessageType,
        err: GenerationError,
    ) {
        error!(
            instrument = %self.instrument,
            %err,
            "execution id exhausted, operation refused"
        );
        self.emit(BusinessMessageReject {
            session: session.clone(),
            rejected_message_type,
            business_reject_reason: BusinessRejectReason::Other,
            reject_text: RejectText::new("execution identifier generation failed"),
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn execution_report(
        &self,
        order: &LimitOrder,
        execution_type: ExecutionType,
        execution_id: ExecutionId,
        order_price: Option<crate::domain::OrderPrice>,
        execution_price: Option<f64>,
        executed_quantity: Option<f64>,
    ) -> ExecutionReport {
        ExecutionReport {
            session: order.client_session.clone(),
            instrument: order.client_instrument_descriptor.clone(),
            client_order_id: order.client_order_id.clone(),
            venue_order_id: order.order_id,
            execution_id,
            execution_type,
            order_status: order.order_status,
            side: order.side,
            order_price,
            execution_price: execution_price.map(ExecutionPrice::new),
            executed_quantity: executed_quantity.map(ExecutedQuantity::new),
            cum_executed_quantity: order.cum_executed_quantity,
            leaves_quantity: LeavesQuantity::new(order.leaves().max(0.0)),
            parties: order.order_parties.clone(),
        }
    }

    /// Records a trade between two orders: updates the tape and session
    /// aggregates.
    fn record_trade(&mut self, trade: Trade) {
        trace!(instrument = %self.instrument, %trade, "trade");
        match &mut self.info {
            Some(info) => info.absorb(trade.trade_price),
            None => self.info = Some(InstrumentInfo::from_trade_price(trade.trade_price)),
        }
        self.last_trade = Some(trade);
    }

    fn buyer_of(order: &LimitOrder) -> Option<BuyerId> {
        order
            .order_parties
            .first()
            .map(|party| BuyerId::new(party.identifier().party_id().as_str()))
    }

    fn seller_of(order: &LimitOrder) -> Option<SellerId> {
        order
            .order_parties
            .first()
            .map(|party| SellerId::new(party.identifier().party_id().as_str()))
    }

    /// Recomputes cum-quantity invariants in debug builds.
    #[cfg(debug_assertions)]
    fn debug_assert_book_sane(&self) {
        for page in [self.book.buy_page(), self.book.sell_page()] {
            for order in page.orders() {
                debug_assert!(order.cum_executed_quantity.value() >= 0.0);
                debug_assert!(order.leaves() > 0.0, "filled order resting on page");
            }
        }
    }

    #[cfg(not(debug_assertions))]
    fn debug_assert_book_sane(&self) {}
}
