//! Elementary validation checkers.
//!
//! Each checker is a pure predicate over one aspect of a value and reports
//! the first violation as a tagged error. Checkers compose into chains that
//! short-circuit on the first failure.

use super::errors::{MarketStateValidationError, OrderValidationError};
use crate::domain::{
    InstrumentInfo, LimitOrder, MaxQuantity, MinQuantity, OrderStatus, OrderType, PriceTick,
    QuantityTick, Side, TimeInForce, Trade,
};
use crate::utils::TzClock;
use chrono::{DateTime, NaiveDate, Utc};

/// Relative tolerance used when testing whether a fixed-precision double is
/// a whole multiple of a tick.
const TICK_TOLERANCE: f64 = 1.0e-9;

/// A single validation predicate over values of type `T`.
pub trait Check<T> {
    /// Error tag reported on violation.
    type Error;

    /// Returns `None` on success, or the violation tag.
    fn check(&self, value: &T) -> Option<Self::Error>;
}

/// Runs checkers in order, stopping at the first violation.
pub fn run_chain<T, E>(value: &T, checks: &[&dyn Check<T, Error = E>]) -> Option<E> {
    checks.iter().find_map(|check| check.check(value))
}

/// True when `value` is a whole multiple of `tick` within tolerance.
#[must_use]
pub fn respects_tick(value: f64, tick: f64) -> bool {
    if tick <= 0.0 {
        return false;
    }
    let ratio = value / tick;
    (ratio - ratio.round()).abs() <= TICK_TOLERANCE * ratio.abs().max(1.0)
}

// --- placement-time field checks -------------------------------------------

/// Side must be present and one of the supported values.
pub struct SideSupported;

impl SideSupported {
    pub fn check(side: Option<Side>) -> Option<OrderValidationError> {
        match side {
            None => Some(OrderValidationError::SideMissing),
            Some(Side::Unknown) => Some(OrderValidationError::SideUnknown),
            Some(_) => None,
        }
    }
}

/// Order type must be present and one of `Limit` / `Market`.
pub struct OrderTypeSupported;

impl OrderTypeSupported {
    pub fn check(order_type: Option<OrderType>) -> Option<OrderValidationError> {
        match order_type {
            None => Some(OrderValidationError::OrderTypeMissing),
            Some(OrderType::Limit | OrderType::Market) => None,
            Some(_) => Some(OrderValidationError::OrderTypeUnknown),
        }
    }
}

/// A limit order must carry a price; a market order must not.
pub struct OrderPricePresence;

impl OrderPricePresence {
    pub fn check(order_type: OrderType, price: Option<f64>) -> Option<OrderValidationError> {
        match (order_type, price) {
            (OrderType::Limit, None) => Some(OrderValidationError::OrderPriceMissing),
            (OrderType::Market, Some(_)) => Some(OrderValidationError::OrderPriceNotAllowed),
            _ => None,
        }
    }
}

/// Exactly one of expire time / expire date must accompany a GoodTillDate
/// order.
pub struct ExpireInfoSpecified;

impl ExpireInfoSpecified {
    pub fn check(
        expire_time: Option<DateTime<Utc>>,
        expire_date: Option<NaiveDate>,
    ) -> Option<OrderValidationError> {
        match (expire_time, expire_date) {
            (Some(_), Some(_)) => Some(OrderValidationError::BothExpireDateTimeSpecified),
            (None, None) => Some(OrderValidationError::ExpireDateTimeMissing),
            _ => None,
        }
    }
}

/// The specified expiry must lie strictly in the future (venue timezone for
/// calendar dates).
pub struct OrderNotExpired {
    clock: TzClock,
}

impl OrderNotExpired {
    #[must_use]
    pub fn new(clock: TzClock) -> Self {
        Self { clock }
    }

    pub fn check_time(
        &self,
        expire_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<OrderValidationError> {
        (expire_time <= now).then_some(OrderValidationError::OrderAlreadyExpired)
    }

    pub fn check_date(
        &self,
        expire_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Option<OrderValidationError> {
        (expire_date < self.clock.venue_date(now))
            .then_some(OrderValidationError::OrderAlreadyExpired)
    }
}

// --- resting-order checks (placement residuals and recovery) ----------------

/// The order side must be valid for the page it would rest on.
pub struct OrderSideSupported {
    page_side: Side,
}

impl OrderSideSupported {
    #[must_use]
    pub fn new(page_side: Side) -> Self {
        Self {
            page_side: page_side.page(),
        }
    }
}

impl Check<LimitOrder> for OrderSideSupported {
    type Error = OrderValidationError;

    fn check(&self, order: &LimitOrder) -> Option<OrderValidationError> {
        let valid = match self.page_side {
            Side::Buy => order.side == Side::Buy,
            _ => order.side.is_selling(),
        };
        (!valid).then_some(OrderValidationError::SideInvalid)
    }
}

/// Only `New`, `PartiallyFilled` and `Modified` orders may rest on a page.
pub struct OrderStatusSupported;

impl Check<LimitOrder> for OrderStatusSupported {
    type Error = OrderValidationError;

    fn check(&self, order: &LimitOrder) -> Option<OrderValidationError> {
        let supported = matches!(
            order.order_status,
            OrderStatus::New | OrderStatus::PartiallyFilled | OrderStatus::Modified
        );
        (!supported).then_some(OrderValidationError::OrderStatusUnknown)
    }
}

/// Total quantity must not fall below the instrument minimum.
pub struct TotalQuantityRespectsMinimum {
    min: Option<MinQuantity>,
}

impl TotalQuantityRespectsMinimum {
    #[must_use]
    pub fn new(min: Option<MinQuantity>) -> Self {
        Self { min }
    }
}

impl Check<LimitOrder> for TotalQuantityRespectsMinimum {
    type Error = OrderValidationError;

    fn check(&self, order: &LimitOrder) -> Option<OrderValidationError> {
        let min = self.min?;
        (order.total_quantity.value() < min.value())
            .then_some(OrderValidationError::TotalQuantityMinViolated)
    }
}

/// Total quantity must not exceed the instrument maximum.
pub struct TotalQuantityRespectsMaximum {
    max: Option<MaxQuantity>,
}

impl TotalQuantityRespectsMaximum {
    #[must_use]
    pub fn new(max: Option<MaxQuantity>) -> Self {
        Self { max }
    }
}

impl Check<LimitOrder> for TotalQuantityRespectsMaximum {
    type Error = OrderValidationError;

    fn check(&self, order: &LimitOrder) -> Option<OrderValidationError> {
        let max = self.max?;
        (order.total_quantity.value() > max.value())
            .then_some(OrderValidationError::TotalQuantityMaxViolated)
    }
}

/// Total quantity must be a multiple of the quantity tick.
pub struct TotalQuantityRespectsTick {
    tick: Option<QuantityTick>,
}

impl TotalQuantityRespectsTick {
    #[must_use]
    pub fn new(tick: Option<QuantityTick>) -> Self {
        Self { tick }
    }
}

impl Check<LimitOrder> for TotalQuantityRespectsTick {
    type Error = OrderValidationError;

    fn check(&self, order: &LimitOrder) -> Option<OrderValidationError> {
        let tick = self.tick?;
        (!respects_tick(order.total_quantity.value(), tick.value()))
            .then_some(OrderValidationError::TotalQuantityTickViolated)
    }
}

/// Cumulative executed quantity must not be negative.
pub struct CumExecutedQuantityRespectsNonNegativity;

impl Check<LimitOrder> for CumExecutedQuantityRespectsNonNegativity {
    type Error = OrderValidationError;

    fn check(&self, order: &LimitOrder) -> Option<OrderValidationError> {
        (order.cum_executed_quantity.value() < 0.0)
            .then_some(OrderValidationError::CumExecutedQuantityNonNegativityViolated)
    }
}

/// Cumulative executed quantity must be a multiple of the quantity tick.
pub struct CumExecutedQuantityRespectsTick {
    tick: Option<QuantityTick>,
}

impl CumExecutedQuantityRespectsTick {
    #[must_use]
    pub fn new(tick: Option<QuantityTick>) -> Self {
        Self { tick }
    }
}

impl Check<LimitOrder> for CumExecutedQuantityRespectsTick {
    type Error = OrderValidationError;

    fn check(&self, order: &LimitOrder) -> Option<OrderValidationError> {
        let tick = self.tick?;
        (!respects_tick(order.cum_executed_quantity.value(), tick.value()))
            .then_some(OrderValidationError::CumExecutedQuantityTickViolated)
    }
}

/// A resting order must still have open quantity.
pub struct CumExecutedQuantityIsLessThanTotalQuantity;

impl Check<LimitOrder> for CumExecutedQuantityIsLessThanTotalQuantity {
    type Error = OrderValidationError;

    fn check(&self, order: &LimitOrder) -> Option<OrderValidationError> {
        (order.cum_executed_quantity.value() >= order.total_quantity.value())
            .then_some(OrderValidationError::CumExecutedQuantityIsLessThanTotalQuantityViolated)
    }
}

/// Order price must be a multiple of the price tick.
pub struct OrderPriceRespectsTick {
    tick: Option<PriceTick>,
}

impl OrderPriceRespectsTick {
    #[must_use]
    pub fn new(tick: Option<PriceTick>) -> Self {
        Self { tick }
    }
}

impl Check<LimitOrder> for OrderPriceRespectsTick {
    type Error = OrderValidationError;

    fn check(&self, order: &LimitOrder) -> Option<OrderValidationError> {
        let tick = self.tick?;
        (!respects_tick(order.order_price.value(), tick.value()))
            .then_some(OrderValidationError::OrderPriceTickViolated)
    }
}

/// Time in force must be one of the supported values.
pub struct TimeInForceSupported;

impl Check<LimitOrder> for TimeInForceSupported {
    type Error = OrderValidationError;

    fn check(&self, order: &LimitOrder) -> Option<OrderValidationError> {
        let supported = matches!(
            order.time_in_force,
            TimeInForce::Day
                | TimeInForce::ImmediateOrCancel
                | TimeInForce::FillOrKill
                | TimeInForce::GoodTillDate
                | TimeInForce::GoodTillCancel
        );
        (!supported).then_some(OrderValidationError::TimeInForceInvalid)
    }
}

/// A Day order must have arrived today or later in the venue timezone.
pub struct DayOrderNotExpired {
    clock: TzClock,
    now: DateTime<Utc>,
}

impl DayOrderNotExpired {
    #[must_use]
    pub fn new(clock: TzClock, now: DateTime<Utc>) -> Self {
        Self { clock, now }
    }
}

impl Check<LimitOrder> for DayOrderNotExpired {
    type Error = OrderValidationError;

    fn check(&self, order: &LimitOrder) -> Option<OrderValidationError> {
        if order.time_in_force != TimeInForce::Day {
            return None;
        }
        (self.clock.venue_date(order.order_time) < self.clock.venue_date(self.now))
            .then_some(OrderValidationError::OrderAlreadyExpired)
    }
}

// --- trade / instrument-info checks (recovery) ------------------------------

/// Trade price must be a multiple of the price tick.
pub struct TradePriceRespectsTick {
    tick: Option<PriceTick>,
}

impl TradePriceRespectsTick {
    #[must_use]
    pub fn new(tick: Option<PriceTick>) -> Self {
        Self { tick }
    }
}

impl Check<Trade> for TradePriceRespectsTick {
    type Error = MarketStateValidationError;

    fn check(&self, trade: &Trade) -> Option<MarketStateValidationError> {
        let tick = self.tick?;
        (!respects_tick(trade.trade_price.value(), tick.value()))
            .then_some(MarketStateValidationError::TradePriceTickViolated)
    }
}

/// Traded quantity must be a multiple of the quantity tick.
pub struct TradedQuantityRespectsTick {
    tick: Option<QuantityTick>,
}

impl TradedQuantityRespectsTick {
    #[must_use]
    pub fn new(tick: Option<QuantityTick>) -> Self {
        Self { tick }
    }
}

impl Check<Trade> for TradedQuantityRespectsTick {
    type Error = MarketStateValidationError;

    fn check(&self, trade: &Trade) -> Option<MarketStateValidationError> {
        let tick = self.tick?;
        (!respects_tick(trade.traded_quantity.value(), tick.value()))
            .then_some(MarketStateValidationError::TradedQuantityTickViolated)
    }
}

/// Traded quantity must respect the instrument minimum.
pub struct TradedQuantityRespectsMinimum {
    min: Option<MinQuantity>,
}

impl TradedQuantityRespectsMinimum {
    #[must_use]
    pub fn new(min: Option<MinQuantity>) -> Self {
        Self { min }
    }
}

impl Check<Trade> for TradedQuantityRespectsMinimum {
    type Error = MarketStateValidationError;

    fn check(&self, trade: &Trade) -> Option<MarketStateValidationError> {
        let min = self.min?;
        (trade.traded_quantity.value() < min.value())
            .then_some(MarketStateValidationError::TradedQuantityMinViolated)
    }
}

/// Traded quantity must respect the instrument maximum.
pub struct TradedQuantityRespectsMaximum {
    max: Option<MaxQuantity>,
}

impl TradedQuantityRespectsMaximum {
    #[must_use]
    pub fn new(max: Option<MaxQuantity>) -> Self {
        Self { max }
    }
}

impl Check<Trade> for TradedQuantityRespectsMaximum {
    type Error = MarketStateValidationError;

    fn check(&self, trade: &Trade) -> Option<MarketStateValidationError> {
        let max = self.max?;
        (trade.traded_quantity.value() > max.value())
            .then_some(MarketStateValidationError::TradedQuantityMaxViolated)
    }
}

/// Session low price must be a multiple of the price tick.
pub struct LowPriceRespectsTick {
    tick: Option<PriceTick>,
}

impl LowPriceRespectsTick {
    #[must_use]
    pub fn new(tick: Option<PriceTick>) -> Self {
        Self { tick }
    }
}

impl Check<InstrumentInfo> for LowPriceRespectsTick {
    type Error = MarketStateValidationError;

    fn check(&self, info: &InstrumentInfo) -> Option<MarketStateValidationError> {
        let tick = self.tick?;
        (!respects_tick(info.low_price.value(), tick.value()))
            .then_some(MarketStateValidationError::LowPriceTickViolated)
    }
}

/// Session high price must be a multiple of the price tick.
pub struct HighPriceRespectsTick {
    tick: Option<PriceTick>,
}

impl HighPriceRespectsTick {
    #[must_use]
    pub fn new(tick: Option<PriceTick>) -> Self {
        Self { tick }
    }
}

impl Check<InstrumentInfo> for HighPriceRespectsTick {
    type Error = MarketStateValidationError;

    fn check(&self, info: &InstrumentInfo) -> Option<MarketStateValidationError> {
        let tick = self.tick?;
        (!respects_tick(info.high_price.value(), tick.value()))
            .then_some(MarketStateValidationError::HighPriceTickViolated)
    }
}

/// Session low price must not exceed the high price.
pub struct LowPriceIsLessThanOrEqualToHighPrice;

impl Check<InstrumentInfo> for LowPriceIsLessThanOrEqualToHighPrice {
    type Error = MarketStateValidationError;

    fn check(&self, info: &InstrumentInfo) -> Option<MarketStateValidationError> {
        (info.low_price.value() > info.high_price.value())
            .then_some(MarketStateValidationError::LowPriceIsLessThanOrEqualToHighPriceViolated)
    }
}
