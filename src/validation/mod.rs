//! Order and market-state validation.
//!
//! Validators are pure: they inspect values against the instrument's
//! constraints and report the first violation as a tagged error. The
//! matching engine turns violations into rejection replies; the recovery
//! path collects them into a snapshot-invalid report.

pub mod checkers;
pub mod errors;

pub use checkers::{Check, respects_tick, run_chain};
pub use errors::{MarketStateValidationError, OrderValidationError};

use crate::domain::{
    Instrument, InstrumentInfo, LimitOrder, MaxQuantity, MinQuantity, OrderPrice, OrderQuantity,
    OrderType, PriceTick, QuantityTick, Side, TimeInForce, Trade,
};
use crate::utils::TzClock;
use checkers::{
    CumExecutedQuantityIsLessThanTotalQuantity, CumExecutedQuantityRespectsNonNegativity,
    CumExecutedQuantityRespectsTick, DayOrderNotExpired, ExpireInfoSpecified,
    HighPriceRespectsTick, LowPriceIsLessThanOrEqualToHighPrice, LowPriceRespectsTick,
    OrderNotExpired, OrderPricePresence, OrderPriceRespectsTick, OrderSideSupported,
    OrderStatusSupported, OrderTypeSupported, SideSupported, TimeInForceSupported,
    TotalQuantityRespectsMaximum, TotalQuantityRespectsMinimum, TotalQuantityRespectsTick,
    TradePriceRespectsTick, TradedQuantityRespectsMaximum, TradedQuantityRespectsMinimum,
    TradedQuantityRespectsTick,
};
use chrono::{DateTime, NaiveDate, Utc};

/// The order fields of an inbound placement request, before the engine has
/// accepted them.
#[derive(Debug, Clone)]
pub struct PlacementCandidate {
    pub side: Option<Side>,
    pub order_type: Option<OrderType>,
    pub order_price: Option<OrderPrice>,
    pub order_quantity: Option<OrderQuantity>,
    pub time_in_force: TimeInForce,
    pub expire_time: Option<DateTime<Utc>>,
    pub expire_date: Option<NaiveDate>,
}

impl Default for PlacementCandidate {
    fn default() -> Self {
        Self {
            side: None,
            order_type: None,
            order_price: None,
            order_quantity: None,
            time_in_force: TimeInForce::Day,
            expire_time: None,
            expire_date: None,
        }
    }
}

/// Validates order values against one instrument's constraints.
#[derive(Debug, Clone)]
pub struct OrderValidator {
    price_tick: Option<PriceTick>,
    quantity_tick: Option<QuantityTick>,
    min_quantity: Option<MinQuantity>,
    max_quantity: Option<MaxQuantity>,
    clock: TzClock,
}

impl OrderValidator {
    /// Creates a validator for the given instrument and venue clock.
    #[must_use]
    pub fn new(instrument: &Instrument, clock: TzClock) -> Self {
        Self {
            price_tick: instrument.price_tick,
            quantity_tick: instrument.quantity_tick,
            min_quantity: instrument.min_quantity,
            max_quantity: instrument.max_quantity,
            clock,
        }
    }

    /// Validates the fields of an inbound placement request. The first
    /// violation stops the chain.
    pub fn validate_placement(
        &self,
        candidate: &PlacementCandidate,
        now: DateTime<Utc>,
    ) -> Result<(), OrderValidationError> {
        if let Some(error) = SideSupported::check(candidate.side) {
            return Err(error);
        }
        if let Some(error) = OrderTypeSupported::check(candidate.order_type) {
            return Err(error);
        }
        let order_type = candidate.order_type.unwrap_or(OrderType::Limit);

        if let Some(error) = self.check_order_quantity(candidate.order_quantity) {
            return Err(error);
        }

        if let Some(error) =
            OrderPricePresence::check(order_type, candidate.order_price.map(|p| p.value()))
        {
            return Err(error);
        }
        if let (Some(price), Some(tick)) = (candidate.order_price, self.price_tick)
            && !respects_tick(price.value(), tick.value())
        {
            return Err(OrderValidationError::OrderPriceTickViolated);
        }

        self.check_time_in_force(
            candidate.time_in_force,
            candidate.expire_time,
            candidate.expire_date,
            now,
        )
    }

    /// Validates a resting order against the page it sits (or would sit) on.
    /// Used both for placement residuals and for snapshot recovery.
    pub fn validate_resting(
        &self,
        order: &LimitOrder,
        page_side: Side,
        now: DateTime<Utc>,
    ) -> Result<(), OrderValidationError> {
        let checks: Vec<Box<dyn Check<LimitOrder, Error = OrderValidationError>>> = vec![
            Box::new(OrderSideSupported::new(page_side)),
            Box::new(OrderStatusSupported),
            Box::new(TotalQuantityRespectsMinimum::new(self.min_quantity)),
            Box::new(TotalQuantityRespectsMaximum::new(self.max_quantity)),
            Box::new(TotalQuantityRespectsTick::new(self.quantity_tick)),
            Box::new(CumExecutedQuantityRespectsNonNegativity),
            Box::new(CumExecutedQuantityRespectsTick::new(self.quantity_tick)),
            Box::new(CumExecutedQuantityIsLessThanTotalQuantity),
            Box::new(OrderPriceRespectsTick::new(self.price_tick)),
            Box::new(TimeInForceSupported),
            Box::new(DayOrderNotExpired::new(self.clock, now)),
        ];
        for check in &checks {
            if let Some(error) = check.check(order) {
                return Err(error);
            }
        }
        self.check_time_in_force(order.time_in_force, order.expire_time, order.expire_date, now)
    }

    fn check_order_quantity(
        &self,
        quantity: Option<OrderQuantity>,
    ) -> Option<OrderValidationError> {
        let Some(quantity) = quantity else {
            return Some(OrderValidationError::OrderQuantityMissing);
        };
        if let Some(min) = self.min_quantity
            && quantity.value() < min.value()
        {
            return Some(OrderValidationError::OrderQuantityMinViolated);
        }
        if let Some(max) = self.max_quantity
            && quantity.value() > max.value()
        {
            return Some(OrderValidationError::OrderQuantityMaxViolated);
        }
        if let Some(tick) = self.quantity_tick
            && !respects_tick(quantity.value(), tick.value())
        {
            return Some(OrderValidationError::OrderQuantityTickViolated);
        }
        None
    }

    fn check_time_in_force(
        &self,
        time_in_force: TimeInForce,
        expire_time: Option<DateTime<Utc>>,
        expire_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<(), OrderValidationError> {
        match time_in_force {
            TimeInForce::Unknown => Err(OrderValidationError::TimeInForceInvalid),
            TimeInForce::GoodTillDate => {
                if let Some(error) = ExpireInfoSpecified::check(expire_time, expire_date) {
                    return Err(error);
                }
                let not_expired = OrderNotExpired::new(self.clock);
                if let Some(time) = expire_time
                    && let Some(error) = not_expired.check_time(time, now)
                {
                    return Err(error);
                }
                if let Some(date) = expire_date
                    && let Some(error) = not_expired.check_date(date, now)
                {
                    return Err(error);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Validates trades and instrument aggregates on snapshot recovery.
#[derive(Debug, Clone)]
pub struct MarketStateValidator {
    price_tick: Option<PriceTick>,
    quantity_tick: Option<QuantityTick>,
    min_quantity: Option<MinQuantity>,
    max_quantity: Option<MaxQuantity>,
}

impl MarketStateValidator {
    /// Creates a validator for the given instrument.
    #[must_use]
    pub fn new(instrument: &Instrument) -> Self {
        Self {
            price_tick: instrument.price_tick,
            quantity_tick: instrument.quantity_tick,
            min_quantity: instrument.min_quantity,
            max_quantity: instrument.max_quantity,
        }
    }

    /// Validates a recovered trade.
    pub fn validate_trade(&self, trade: &Trade) -> Result<(), MarketStateValidationError> {
        let checks: Vec<Box<dyn Check<Trade, Error = MarketStateValidationError>>> = vec![
            Box::new(TradePriceRespectsTick::new(self.price_tick)),
            Box::new(TradedQuantityRespectsTick::new(self.quantity_tick)),
            Box::new(TradedQuantityRespectsMinimum::new(self.min_quantity)),
            Box::new(TradedQuantityRespectsMaximum::new(self.max_quantity)),
        ];
        match checks.iter().find_map(|check| check.check(trade)) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Validates recovered session aggregates.
    pub fn validate_info(&self, info: &InstrumentInfo) -> Result<(), MarketStateValidationError> {
        let checks: Vec<Box<dyn Check<InstrumentInfo, Error = MarketStateValidationError>>> = vec![
            Box::new(LowPriceRespectsTick::new(self.price_tick)),
            Box::new(HighPriceRespectsTick::new(self.price_tick)),
            Box::new(LowPriceIsLessThanOrEqualToHighPrice),
        ];
        match checks.iter().find_map(|check| check.check(info)) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
